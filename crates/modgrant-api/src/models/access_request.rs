//! Request and response models for access request endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use modgrant_db::{AccessHistory, AccessRequest, RequestStatus};

/// Request to submit a new access request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAccessRequestRequest {
    /// Modules being requested (1 to 3).
    #[validate(length(min = 1, max = 3, message = "Request between 1 and 3 modules"))]
    pub module_ids: Vec<Uuid>,

    /// Business justification for the request.
    #[validate(length(
        min = 20,
        max = 500,
        message = "Justification must be between 20 and 500 characters"
    ))]
    pub justification: String,

    /// Whether the request is urgent.
    #[serde(default)]
    pub urgent: bool,
}

/// Request to cancel an access request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CancelAccessRequestRequest {
    /// Reason recorded in the request history.
    #[validate(length(min = 1, max = 500, message = "Reason is required (1-500 characters)"))]
    pub reason: String,
}

/// Query parameters for listing access requests.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListAccessRequestsQuery {
    /// Substring match against protocol or module name.
    pub search: Option<String>,

    /// Filter by status.
    pub status: Option<RequestStatus>,

    /// Filter by urgency flag.
    pub urgent: Option<bool>,

    /// Only requests submitted at or after this instant.
    pub start_date: Option<DateTime<Utc>>,

    /// Only requests submitted at or before this instant.
    pub end_date: Option<DateTime<Utc>>,

    /// Maximum number of results (default: 50, max: 100).
    pub limit: Option<i64>,

    /// Number of results to skip.
    pub offset: Option<i64>,
}

/// One status transition in a request's history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessHistoryEntry {
    /// Status before the transition; absent for the initial decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<RequestStatus>,

    /// Status after the transition.
    pub new_status: RequestStatus,

    /// When the transition happened.
    pub changed_at: DateTime<Utc>,

    /// Reason recorded by the engine.
    pub reason: String,
}

impl From<AccessHistory> for AccessHistoryEntry {
    fn from(h: AccessHistory) -> Self {
        Self {
            previous_status: h.previous_status,
            new_status: h.new_status,
            changed_at: h.changed_at,
            reason: h.reason,
        }
    }
}

/// Full access request representation, including history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessRequestResponse {
    pub id: Uuid,
    pub protocol: String,
    pub module_names: Vec<String>,
    pub justification: String,
    pub urgent: bool,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewed_from: Option<Uuid>,
    pub history: Vec<AccessHistoryEntry>,
}

impl AccessRequestResponse {
    /// Assemble a response from the persisted parts.
    #[must_use]
    pub fn from_parts(
        request: AccessRequest,
        module_names: Vec<String>,
        history: Vec<AccessHistory>,
    ) -> Self {
        Self {
            id: request.id,
            protocol: request.protocol,
            module_names,
            justification: request.justification,
            urgent: request.urgent,
            status: request.status,
            request_date: request.request_date,
            expiration_date: request.expiration_date,
            denial_reason: request.denial_reason,
            renewed_from: request.renewed_from,
            history: history.into_iter().map(Into::into).collect(),
        }
    }
}

/// Access request summary for list views (no history).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessRequestSummary {
    pub id: Uuid,
    pub protocol: String,
    pub module_names: Vec<String>,
    pub urgent: bool,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
}

impl AccessRequestSummary {
    /// Assemble a summary from a request row and its module names.
    #[must_use]
    pub fn from_parts(request: AccessRequest, module_names: Vec<String>) -> Self {
        Self {
            id: request.id,
            protocol: request.protocol,
            module_names,
            urgent: request.urgent,
            status: request.status,
            request_date: request.request_date,
            expiration_date: request.expiration_date,
            denial_reason: request.denial_reason,
        }
    }
}

/// Paginated list of access requests.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessRequestListResponse {
    pub items: Vec<AccessRequestSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Outcome of submitting or renewing a request.
///
/// Returned for approvals and adjudicated denials alike; a denial is a
/// persisted outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjudicationOutcomeResponse {
    /// Human-readable outcome containing the protocol.
    pub message: String,

    /// The persisted request.
    pub request: AccessRequestResponse,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn request(module_count: usize, justification: &str) -> CreateAccessRequestRequest {
        CreateAccessRequestRequest {
            module_ids: (0..module_count).map(|_| Uuid::new_v4()).collect(),
            justification: justification.to_string(),
            urgent: false,
        }
    }

    #[test]
    fn accepts_one_to_three_modules() {
        let justification = "Need access to close the quarterly reporting cycle.";
        assert!(request(1, justification).validate().is_ok());
        assert!(request(3, justification).validate().is_ok());
    }

    #[test]
    fn rejects_empty_and_oversized_batches() {
        let justification = "Need access to close the quarterly reporting cycle.";
        assert!(request(0, justification).validate().is_err());
        assert!(request(4, justification).validate().is_err());
    }

    #[test]
    fn rejects_short_justification() {
        assert!(request(1, "too short").validate().is_err());
    }

    #[test]
    fn cancel_requires_a_reason() {
        let empty = CancelAccessRequestRequest {
            reason: String::new(),
        };
        assert!(empty.validate().is_err());

        let ok = CancelAccessRequestRequest {
            reason: "No longer needed".to_string(),
        };
        assert!(ok.validate().is_ok());
    }
}
