//! Business services orchestrating persistence and adjudication.

mod access_request_service;
mod module_service;

pub use access_request_service::{AccessRequestService, RequestDetails, SubmitOutcome};
pub use module_service::ModuleService;
