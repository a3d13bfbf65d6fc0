//! Department enumeration.

use serde::{Deserialize, Serialize};

/// Closed set of departments an employee can belong to.
///
/// IT is privileged: it bypasses module eligibility checks and carries a
/// higher active-grant quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(type_name = "department", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Department {
    It,
    Finance,
    Hr,
    Operations,
    Other,
}

impl Department {
    /// Maximum number of simultaneously active grants for this department.
    #[must_use]
    pub fn quota(self) -> i64 {
        match self {
            Department::It => 10,
            _ => 5,
        }
    }

    /// IT bypasses module eligibility checks entirely.
    #[must_use]
    pub fn is_privileged(self) -> bool {
        matches!(self, Department::It)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_has_higher_quota() {
        assert_eq!(Department::It.quota(), 10);
        assert_eq!(Department::Finance.quota(), 5);
        assert_eq!(Department::Hr.quota(), 5);
        assert_eq!(Department::Operations.quota(), 5);
        assert_eq!(Department::Other.quota(), 5);
    }

    #[test]
    fn only_it_is_privileged() {
        assert!(Department::It.is_privileged());
        assert!(!Department::Finance.is_privileged());
        assert!(!Department::Other.is_privileged());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Department::Operations).unwrap();
        assert_eq!(json, "\"operations\"");
    }
}
