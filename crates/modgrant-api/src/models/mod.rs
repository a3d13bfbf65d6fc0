//! Request and response models for the API.

mod access_request;
mod module;

pub use access_request::{
    AccessHistoryEntry, AccessRequestListResponse, AccessRequestResponse, AccessRequestSummary,
    AdjudicationOutcomeResponse, CancelAccessRequestRequest, CreateAccessRequestRequest,
    ListAccessRequestsQuery, MessageResponse,
};
pub use module::ModuleResponse;
