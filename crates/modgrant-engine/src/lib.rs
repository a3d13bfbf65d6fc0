//! Access-request adjudication engine.
//!
//! The rules that decide, synchronously and deterministically, whether a
//! submitted request is auto-approved or auto-denied, and the lifecycle
//! checks for renewal and cancellation. Everything here is pure: decision
//! functions take snapshots loaded by the caller and an explicit `now`, so
//! the same inputs always produce the same outcome.
//!
//! Two kinds of negative results are deliberately kept apart:
//!
//! - [`AccessError`]: precondition failures (unknown module, duplicate
//!   grant, generic justification, ...). Nothing is persisted; the caller
//!   surfaces a client error.
//! - [`rules::Adjudication::Denied`]: a successful adjudication whose
//!   outcome is a denial. The request is persisted with status denied, the
//!   reason, and a history entry.

pub mod error;
pub mod protocol;
pub mod rules;

pub use error::{AccessError, Result};
pub use rules::{
    Adjudication, DenialReason, ACCESS_VALIDITY_DAYS, MAX_MODULES_PER_REQUEST,
    MIN_JUSTIFICATION_LENGTH, RENEWAL_WINDOW_DAYS,
};
