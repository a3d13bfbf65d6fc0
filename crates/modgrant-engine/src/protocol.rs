//! Protocol identifier formatting.

use chrono::NaiveDate;

/// Prefix of every protocol identifier.
pub const PROTOCOL_PREFIX: &str = "ACC";

/// Format a protocol identifier: `ACC-YYYYMMDD-NNNN`.
///
/// The sequence is zero-padded to four digits but keeps growing past 9999.
#[must_use]
pub fn format_protocol(date: NaiveDate, sequence: i64) -> String {
    format!("{PROTOCOL_PREFIX}-{}-{sequence:04}", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_date_and_padded_sequence() {
        assert_eq!(format_protocol(date(2026, 8, 27), 7), "ACC-20260827-0007");
        assert_eq!(format_protocol(date(2026, 1, 2), 123), "ACC-20260102-0123");
    }

    #[test]
    fn sequence_grows_past_four_digits() {
        assert_eq!(
            format_protocol(date(2026, 8, 27), 12345),
            "ACC-20260827-12345"
        );
    }
}
