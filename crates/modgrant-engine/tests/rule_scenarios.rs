//! End-to-end rule scenarios over a realistic catalog snapshot.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use modgrant_db::{Department, Module, ModuleDetail};
use modgrant_engine::rules::{
    adjudicate_renewal, adjudicate_submission, validate_justification, Adjudication, DenialReason,
};

struct Catalog {
    portal: ModuleDetail,
    finance_approver: ModuleDetail,
    finance_requester: ModuleDetail,
    financial_management: ModuleDetail,
    audit: ModuleDetail,
}

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

/// Build the demo catalog: the incompatibility edge between the finance
/// pair is stored in one direction only, as legacy rows may be.
fn catalog() -> Catalog {
    let portal = module("Employee Portal", &[]);
    let mut finance_approver = module("Finance Approver", &[Department::Finance, Department::It]);
    let finance_requester = module("Finance Requester", &[Department::Finance, Department::It]);
    let financial_management =
        module("Financial Management", &[Department::Finance, Department::It]);
    let audit = module("Audit", &[Department::It]);

    finance_approver
        .incompatible_with
        .push(finance_requester.module.id);

    Catalog {
        portal,
        finance_approver,
        finance_requester,
        financial_management,
        audit,
    }
}

#[test]
fn finance_user_at_quota_is_denied_one_more() {
    let cat = catalog();
    let active: Vec<ModuleDetail> = (0..5)
        .map(|i| module(&format!("Granted {i}"), &[Department::Finance]))
        .collect();

    let outcome = adjudicate_submission(
        Department::Finance,
        std::slice::from_ref(&cat.financial_management),
        &active,
    );
    assert_eq!(outcome, Adjudication::Denied(DenialReason::QuotaExceeded));
}

#[test]
fn mutually_exclusive_finance_pair_in_one_batch_is_denied() {
    let cat = catalog();
    let batch = [cat.finance_approver.clone(), cat.finance_requester.clone()];

    let outcome = adjudicate_submission(Department::Finance, &batch, &[]);
    assert_eq!(
        outcome,
        Adjudication::Denied(DenialReason::IncompatibleWithinBatch)
    );
}

#[test]
fn holding_one_side_of_the_pair_blocks_the_other() {
    let cat = catalog();

    // Edge is stored on the approver side only; requesting the requester
    // while holding the approver must still deny.
    let outcome = adjudicate_submission(
        Department::Finance,
        std::slice::from_ref(&cat.finance_requester),
        std::slice::from_ref(&cat.finance_approver),
    );
    assert_eq!(
        outcome,
        Adjudication::Denied(DenialReason::IncompatibleWithActive)
    );
}

#[test]
fn it_user_passes_department_check_for_any_module() {
    let cat = catalog();

    for restricted in [&cat.audit, &cat.financial_management, &cat.portal] {
        let outcome =
            adjudicate_submission(Department::It, std::slice::from_ref(restricted), &[]);
        assert_eq!(outcome, Adjudication::Approved);
    }
}

#[test]
fn non_eligible_department_is_denied() {
    let cat = catalog();

    let outcome = adjudicate_submission(
        Department::Operations,
        std::slice::from_ref(&cat.financial_management),
        &[],
    );
    assert_eq!(
        outcome,
        Adjudication::Denied(DenialReason::DepartmentNotPermitted)
    );
}

#[test]
fn generic_justification_fails_before_any_adjudication() {
    assert!(validate_justification("test").is_err());
    assert!(
        validate_justification("Monthly closing requires access to the finance module.").is_ok()
    );
}

#[test]
fn renewal_of_approver_grant_is_not_self_incompatible() {
    let cat = catalog();
    let original: HashSet<Uuid> = [cat.finance_approver.module.id].into_iter().collect();

    let outcome = adjudicate_renewal(
        Department::Finance,
        std::slice::from_ref(&cat.finance_approver),
        std::slice::from_ref(&cat.finance_approver),
        &original,
    );
    assert_eq!(outcome, Adjudication::Approved);
}
