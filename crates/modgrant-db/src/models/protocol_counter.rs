//! Atomic counter for protocol sequence numbers.
//!
//! Deriving the sequence from a row count is racy: two submissions in the
//! same transaction window would compute the same number. A single-row
//! `UPDATE .. RETURNING` increments atomically instead.

use sqlx::PgConnection;

/// Handle for the protocol sequence counter.
pub struct ProtocolCounter;

impl ProtocolCounter {
    /// Claim the next protocol sequence number.
    pub async fn next(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            UPDATE protocol_counter
            SET value = value + 1
            WHERE id = 1
            RETURNING value
            "#,
        )
        .fetch_one(conn)
        .await
    }
}
