//! HTTP API for the modgrant access governance service.
//!
//! # Endpoints
//!
//! - `POST /requests` - submit an access request (adjudicated immediately)
//! - `GET /requests` - list the caller's requests with filters
//! - `GET /requests/{id}` - request details including history
//! - `POST /requests/{id}/renew` - renew an active request near expiry
//! - `POST /requests/{id}/cancel` - cancel a request and revoke its grants
//! - `GET /modules` - full module catalog
//! - `GET /modules/available` - catalog filtered by caller eligibility
//! - `GET /health` - liveness probe (unauthenticated)
//!
//! Callers are resolved from a bearer token by the auth middleware; token
//! issuance belongs to the external authenticator.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use auth::{AuthConfig, AuthLayer, JwtClaims};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use router::{api_router, AppState};
