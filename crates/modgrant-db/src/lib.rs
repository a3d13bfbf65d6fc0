//! Persistence layer for the modgrant access governance service.
//!
//! This crate owns the relational schema and the typed models on top of it:
//!
//! - the module catalog (read-only to the adjudication engine),
//! - the grant store ([`models::ModuleGrant`], one active grant per user and
//!   module, enforced by a partial unique index),
//! - the request ledger ([`models::AccessRequest`] plus its append-only
//!   [`models::AccessHistory`] trail),
//! - the atomic protocol counter.
//!
//! Model methods take `&mut PgConnection` so callers can compose them inside
//! a single transaction; every adjudication call commits all of its writes or
//! none of them.

pub mod bootstrap;
pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::{
    AccessHistory, AccessRequest, AccessRequestFilter, CreateAccessRequest, Department, Module,
    ModuleDetail, ModuleGrant, ProtocolCounter, RequestStatus, User,
};
pub use pool::DbPool;
