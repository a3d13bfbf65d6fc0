//! Adjudication rules.
//!
//! Rules run in a fixed order and the first denial short-circuits:
//! department eligibility, incompatibility against active grants,
//! incompatibility within the requested batch, then quota. A denial is a
//! successful adjudication outcome, not an error.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use modgrant_db::{Department, ModuleDetail};

use crate::error::AccessError;

/// How long granted access stays valid, in days.
pub const ACCESS_VALIDITY_DAYS: i64 = 180;

/// Renewal is allowed only within this many days of expiration.
pub const RENEWAL_WINDOW_DAYS: i64 = 30;

/// Minimum justification length.
pub const MIN_JUSTIFICATION_LENGTH: usize = 20;

/// Maximum number of modules in one request.
pub const MAX_MODULES_PER_REQUEST: usize = 3;

/// Modules open to every department when a module declares no allowed
/// departments at all.
pub const UNIVERSALLY_OPEN_MODULES: [&str; 2] = ["Employee Portal", "Management Reports"];

/// Exact low-effort justifications rejected outright.
const BLOCKED_JUSTIFICATIONS: [&str; 3] = ["test", "aaa", "need it"];

/// Short letters-and-spaces-only text. Coarse spam heuristic, not NLP.
static LOW_EFFORT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z\s]{1,20}$").expect("valid regex"));

/// Why an adjudication denied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The user's department is not eligible for a requested module.
    DepartmentNotPermitted,
    /// A requested module conflicts with one the user already holds.
    IncompatibleWithActive,
    /// Two requested modules conflict with each other.
    IncompatibleWithinBatch,
    /// The request would exceed the department's active-grant quota.
    QuotaExceeded,
}

impl DenialReason {
    /// The human-readable denial reason persisted on the request.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::DepartmentNotPermitted => {
                "Department does not have permission to access this module"
            }
            // Both incompatibility denials surface the same wording.
            Self::IncompatibleWithActive | Self::IncompatibleWithinBatch => {
                "Module is incompatible with another module already active on your profile"
            }
            Self::QuotaExceeded => "Active module limit reached",
        }
    }
}

/// Outcome of running the adjudication rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjudication {
    /// No rule denied; the request is approved.
    Approved,
    /// A rule denied; the request is persisted with this reason.
    Denied(DenialReason),
}

/// Reject generic or low-effort justifications.
///
/// Fails if the trimmed, lowercased text is one of the blocked phrases, is
/// shorter than [`MIN_JUSTIFICATION_LENGTH`], or matches the letters-and-
/// spaces-only pattern.
pub fn validate_justification(justification: &str) -> Result<(), AccessError> {
    let lower = justification.trim().to_lowercase();

    if BLOCKED_JUSTIFICATIONS.contains(&lower.as_str())
        || lower.chars().count() < MIN_JUSTIFICATION_LENGTH
        || LOW_EFFORT_PATTERN.is_match(&lower)
    {
        return Err(AccessError::GenericJustification);
    }

    Ok(())
}

/// Bound the number of modules in one request.
pub fn validate_batch_size(module_ids: &[Uuid]) -> Result<(), AccessError> {
    if module_ids.is_empty() || module_ids.len() > MAX_MODULES_PER_REQUEST {
        return Err(AccessError::Validation(format!(
            "Request between 1 and {MAX_MODULES_PER_REQUEST} modules"
        )));
    }
    Ok(())
}

/// Whether a department may request a module.
///
/// IT always passes. A module with an empty allowed-department set is open
/// only if it is one of the universally open modules.
#[must_use]
pub fn is_department_allowed(department: Department, module: &ModuleDetail) -> bool {
    if department.is_privileged() {
        return true;
    }

    if module.allowed_departments.is_empty() {
        return UNIVERSALLY_OPEN_MODULES.contains(&module.module.name.as_str());
    }

    module.allowed_departments.contains(&department)
}

/// Symmetric incompatibility check.
///
/// Storage may hold the edge in either direction, so both sides are
/// OR-checked.
#[must_use]
pub fn are_incompatible(a: &ModuleDetail, b: &ModuleDetail) -> bool {
    a.incompatible_with.contains(&b.module.id) || b.incompatible_with.contains(&a.module.id)
}

/// Run the submission rules in order; the first denial wins.
#[must_use]
pub fn adjudicate_submission(
    department: Department,
    requested: &[ModuleDetail],
    active: &[ModuleDetail],
) -> Adjudication {
    for module in requested {
        if !is_department_allowed(department, module) {
            return Adjudication::Denied(DenialReason::DepartmentNotPermitted);
        }
    }

    for requested_module in requested {
        for active_module in active {
            if are_incompatible(requested_module, active_module) {
                return Adjudication::Denied(DenialReason::IncompatibleWithActive);
            }
        }
    }

    if batch_has_conflict(requested) {
        return Adjudication::Denied(DenialReason::IncompatibleWithinBatch);
    }

    if active.len() as i64 + requested.len() as i64 > department.quota() {
        return Adjudication::Denied(DenialReason::QuotaExceeded);
    }

    Adjudication::Approved
}

/// Run the renewal variant of the rules.
///
/// Identical to submission except: active modules belonging to the original
/// request are excluded from the cross-check (a module cannot be flagged
/// incompatible with itself across the renewal boundary), and quota is not
/// re-evaluated since existing grants are only being extended.
#[must_use]
pub fn adjudicate_renewal(
    department: Department,
    requested: &[ModuleDetail],
    active: &[ModuleDetail],
    original_module_ids: &HashSet<Uuid>,
) -> Adjudication {
    for module in requested {
        if !is_department_allowed(department, module) {
            return Adjudication::Denied(DenialReason::DepartmentNotPermitted);
        }
    }

    for requested_module in requested {
        for active_module in active {
            if original_module_ids.contains(&active_module.module.id) {
                continue;
            }
            if are_incompatible(requested_module, active_module) {
                return Adjudication::Denied(DenialReason::IncompatibleWithActive);
            }
        }
    }

    if batch_has_conflict(requested) {
        return Adjudication::Denied(DenialReason::IncompatibleWithinBatch);
    }

    Adjudication::Approved
}

fn batch_has_conflict(requested: &[ModuleDetail]) -> bool {
    for (i, a) in requested.iter().enumerate() {
        for b in &requested[i + 1..] {
            if are_incompatible(a, b) {
                return true;
            }
        }
    }
    false
}

/// Check that a request is close enough to expiry to renew.
///
/// Renewal is allowed when the expiration has already passed, or when no
/// more than [`RENEWAL_WINDOW_DAYS`] days remain.
pub fn check_renewal_window(
    expiration: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), AccessError> {
    if expiration <= now {
        return Ok(());
    }

    let days_remaining = (expiration - now).num_days();
    if days_remaining > RENEWAL_WINDOW_DAYS {
        return Err(AccessError::RenewalWindowNotOpen { days_remaining });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use modgrant_db::Module;

    fn module(name: &str, allowed: &[Department]) -> ModuleDetail {
        ModuleDetail {
            module: Module {
                id: Uuid::new_v4(),
                name: name.to_string(),
                description: None,
                active: true,
                created_at: Utc::now(),
            },
            allowed_departments: allowed.to_vec(),
            incompatible_with: vec![],
        }
    }

    fn mark_incompatible(a: &mut ModuleDetail, b: &ModuleDetail) {
        a.incompatible_with.push(b.module.id);
    }

    #[test]
    fn blocked_phrases_are_rejected() {
        assert!(validate_justification("test").is_err());
        assert!(validate_justification("  TEST  ").is_err());
        assert!(validate_justification("aaa").is_err());
        assert!(validate_justification("need it").is_err());
    }

    #[test]
    fn short_justifications_are_rejected() {
        assert!(validate_justification("too short").is_err());
        assert!(validate_justification("1234567890123456789").is_err());
    }

    #[test]
    fn justification_length_counts_characters_not_bytes() {
        // 10 two-byte characters: 20 bytes, still only 10 characters.
        assert!(validate_justification(&"é".repeat(10)).is_err());
        assert!(validate_justification(&"é1".repeat(10)).is_ok());
    }

    #[test]
    fn letters_and_spaces_only_is_rejected() {
        // 20 chars of plain letters: passes the length check, caught by
        // the low-effort pattern.
        assert!(validate_justification("aaaaa aaaaa aaaaa aa").is_err());
    }

    #[test]
    fn substantive_justifications_pass() {
        assert!(
            validate_justification("Need access to close the Q3 financial reporting cycle.")
                .is_ok()
        );
        assert!(validate_justification("12345678901234567890").is_ok());
    }

    #[test]
    fn batch_size_is_bounded_to_one_through_three() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        assert!(validate_batch_size(&[]).is_err());
        assert!(validate_batch_size(&ids[..1]).is_ok());
        assert!(validate_batch_size(&ids[..3]).is_ok());
        assert!(validate_batch_size(&ids).is_err());
    }

    #[test]
    fn it_bypasses_department_eligibility() {
        let audit = module("Audit", &[]);
        assert!(is_department_allowed(Department::It, &audit));
        assert!(!is_department_allowed(Department::Finance, &audit));
    }

    #[test]
    fn empty_allowed_set_opens_only_universal_modules() {
        let portal = module("Employee Portal", &[]);
        let reports = module("Management Reports", &[]);
        let audit = module("Audit", &[]);

        assert!(is_department_allowed(Department::Other, &portal));
        assert!(is_department_allowed(Department::Other, &reports));
        assert!(!is_department_allowed(Department::Other, &audit));
    }

    #[test]
    fn incompatibility_is_symmetric_from_either_direction() {
        let mut approver = module("Finance Approver", &[Department::Finance]);
        let requester = module("Finance Requester", &[Department::Finance]);

        // Edge stored only on one side.
        mark_incompatible(&mut approver, &requester);

        assert!(are_incompatible(&approver, &requester));
        assert!(are_incompatible(&requester, &approver));
    }

    #[test]
    fn denies_incompatibility_with_active_grant() {
        let mut approver = module("Finance Approver", &[Department::Finance]);
        let requester = module("Finance Requester", &[Department::Finance]);
        mark_incompatible(&mut approver, &requester);

        let outcome =
            adjudicate_submission(Department::Finance, &[approver], &[requester]);
        assert_eq!(
            outcome,
            Adjudication::Denied(DenialReason::IncompatibleWithActive)
        );
    }

    #[test]
    fn denies_incompatibility_within_batch() {
        let mut admin = module("HR Administrator", &[Department::Hr]);
        let collaborator = module("HR Collaborator", &[Department::Hr]);
        mark_incompatible(&mut admin, &collaborator);

        let outcome = adjudicate_submission(Department::Hr, &[admin, collaborator], &[]);
        assert_eq!(
            outcome,
            Adjudication::Denied(DenialReason::IncompatibleWithinBatch)
        );
    }

    #[test]
    fn department_check_runs_before_incompatibility() {
        let mut approver = module("Finance Approver", &[Department::Finance]);
        let requester = module("Finance Requester", &[Department::Finance]);
        mark_incompatible(&mut approver, &requester);

        // HR is not eligible for either module, so the earlier rule wins.
        let outcome = adjudicate_submission(Department::Hr, &[approver, requester], &[]);
        assert_eq!(
            outcome,
            Adjudication::Denied(DenialReason::DepartmentNotPermitted)
        );
    }

    #[test]
    fn quota_boundary_for_default_departments() {
        let active: Vec<_> = (0..5)
            .map(|i| module(&format!("Module {i}"), &[Department::Finance]))
            .collect();
        let requested = [module("Financial Management", &[Department::Finance])];

        let outcome = adjudicate_submission(Department::Finance, &requested, &active);
        assert_eq!(outcome, Adjudication::Denied(DenialReason::QuotaExceeded));

        let outcome = adjudicate_submission(Department::Finance, &requested, &active[..4]);
        assert_eq!(outcome, Adjudication::Approved);
    }

    #[test]
    fn quota_boundary_for_it() {
        let active: Vec<_> = (0..10)
            .map(|i| module(&format!("Module {i}"), &[]))
            .collect();
        let requested = [module("Audit", &[Department::It])];

        let outcome = adjudicate_submission(Department::It, &requested, &active);
        assert_eq!(outcome, Adjudication::Denied(DenialReason::QuotaExceeded));

        let outcome = adjudicate_submission(Department::It, &requested, &active[..9]);
        assert_eq!(outcome, Adjudication::Approved);
    }

    #[test]
    fn renewal_excludes_original_modules_from_cross_check() {
        let mut approver = module("Finance Approver", &[Department::Finance]);
        let requester = module("Finance Requester", &[Department::Finance]);
        mark_incompatible(&mut approver, &requester);

        // Renewing the approver grant: the only conflicting active module is
        // the approver itself, which belongs to the original request.
        let original: HashSet<Uuid> = [approver.module.id].into_iter().collect();
        let active = [approver.clone()];

        let outcome = adjudicate_renewal(
            Department::Finance,
            std::slice::from_ref(&approver),
            &active,
            &original,
        );
        assert_eq!(outcome, Adjudication::Approved);
    }

    #[test]
    fn renewal_still_denies_conflicts_outside_original_set() {
        let mut approver = module("Finance Approver", &[Department::Finance]);
        let requester = module("Finance Requester", &[Department::Finance]);
        mark_incompatible(&mut approver, &requester);

        // The conflicting requester grant is NOT part of the original
        // request, so it still blocks the renewal.
        let original: HashSet<Uuid> = [approver.module.id].into_iter().collect();
        let active = [approver.clone(), requester];

        let outcome = adjudicate_renewal(
            Department::Finance,
            std::slice::from_ref(&approver),
            &active,
            &original,
        );
        assert_eq!(
            outcome,
            Adjudication::Denied(DenialReason::IncompatibleWithActive)
        );
    }

    #[test]
    fn renewal_does_not_check_quota() {
        let active: Vec<_> = (0..10)
            .map(|i| module(&format!("Module {i}"), &[Department::Finance]))
            .collect();
        let requested = [active[0].clone()];
        let original: HashSet<Uuid> = [active[0].module.id].into_iter().collect();

        let outcome =
            adjudicate_renewal(Department::Finance, &requested, &active, &original);
        assert_eq!(outcome, Adjudication::Approved);
    }

    #[test]
    fn renewal_window_boundaries() {
        let now = Utc::now();

        // Already expired: allowed.
        assert!(check_renewal_window(now - Duration::days(1), now).is_ok());

        // Within the window: allowed.
        assert!(check_renewal_window(now + Duration::days(30), now).is_ok());
        assert!(check_renewal_window(now + Duration::days(1), now).is_ok());

        // Too early: rejected with the days remaining.
        let err = check_renewal_window(now + Duration::days(31), now).unwrap_err();
        match err {
            AccessError::RenewalWindowNotOpen { days_remaining } => {
                assert_eq!(days_remaining, 31);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn denial_messages_are_stable() {
        assert_eq!(
            DenialReason::QuotaExceeded.message(),
            "Active module limit reached"
        );
        assert_eq!(
            DenialReason::IncompatibleWithActive.message(),
            DenialReason::IncompatibleWithinBatch.message()
        );
    }
}
