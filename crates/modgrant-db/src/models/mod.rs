//! Typed models over the modgrant schema.

mod access_history;
mod access_request;
mod department;
mod module;
mod module_grant;
mod protocol_counter;
mod user;

pub use access_history::AccessHistory;
pub use access_request::{
    AccessRequest, AccessRequestFilter, CreateAccessRequest, RequestStatus,
};
pub use department::Department;
pub use module::{Module, ModuleDetail};
pub use module_grant::ModuleGrant;
pub use protocol_counter::ProtocolCounter;
pub use user::User;
