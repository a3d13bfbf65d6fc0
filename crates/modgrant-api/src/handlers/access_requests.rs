//! Access request endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use modgrant_db::AccessRequestFilter;

use crate::auth::JwtClaims;
use crate::error::ApiResult;
use crate::models::{
    AccessRequestListResponse, AccessRequestResponse, AccessRequestSummary,
    AdjudicationOutcomeResponse, CancelAccessRequestRequest, CreateAccessRequestRequest,
    ListAccessRequestsQuery, MessageResponse,
};
use crate::router::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

/// Submit a new access request.
///
/// The request is adjudicated immediately; both approvals and denials
/// return 201 with the persisted request. Precondition failures (unknown
/// module, duplicate grant, generic justification) return an error and
/// persist nothing.
#[utoipa::path(
    post,
    path = "/requests",
    tag = "access-requests",
    request_body = CreateAccessRequestRequest,
    responses(
        (status = 201, description = "Request adjudicated", body = AdjudicationOutcomeResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User or module not found"),
        (status = 409, description = "Module already granted"),
        (status = 422, description = "Business rule violation"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_request(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
    Json(body): Json<CreateAccessRequestRequest>,
) -> ApiResult<(StatusCode, Json<AdjudicationOutcomeResponse>)> {
    body.validate()?;
    let user_id = super::caller_id(&claims)?;

    let outcome = state
        .access_request_service
        .submit(user_id, &body.module_ids, &body.justification, body.urgent)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdjudicationOutcomeResponse {
            message: outcome.message,
            request: AccessRequestResponse::from_parts(
                outcome.details.request,
                outcome.details.module_names,
                outcome.details.history,
            ),
        }),
    ))
}

/// List the caller's access requests.
#[utoipa::path(
    get,
    path = "/requests",
    tag = "access-requests",
    params(ListAccessRequestsQuery),
    responses(
        (status = 200, description = "Paginated requests", body = AccessRequestListResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
    Query(query): Query<ListAccessRequestsQuery>,
) -> ApiResult<Json<AccessRequestListResponse>> {
    let user_id = super::caller_id(&claims)?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let filter = AccessRequestFilter {
        search: query.search,
        status: query.status,
        urgent: query.urgent,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    let (items, total) = state
        .access_request_service
        .list(user_id, &filter, limit, offset)
        .await?;

    Ok(Json(AccessRequestListResponse {
        items: items
            .into_iter()
            .map(|(request, module_names)| AccessRequestSummary::from_parts(request, module_names))
            .collect(),
        total,
        limit,
        offset,
    }))
}

/// Get one of the caller's requests, with its full history.
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "access-requests",
    params(("id" = Uuid, Path, description = "Access request ID")),
    responses(
        (status = 200, description = "Request details", body = AccessRequestResponse),
        (status = 403, description = "Not the request owner"),
        (status = 404, description = "Request not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_request(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AccessRequestResponse>> {
    let user_id = super::caller_id(&claims)?;

    let details = state.access_request_service.get_details(user_id, id).await?;

    Ok(Json(AccessRequestResponse::from_parts(
        details.request,
        details.module_names,
        details.history,
    )))
}

/// Renew an active request near its expiration.
#[utoipa::path(
    post,
    path = "/requests/{id}/renew",
    tag = "access-requests",
    params(("id" = Uuid, Path, description = "Access request ID")),
    responses(
        (status = 201, description = "Renewal adjudicated", body = AdjudicationOutcomeResponse),
        (status = 403, description = "Not the request owner"),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Renewal window not open or request not active"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn renew_request(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<AdjudicationOutcomeResponse>)> {
    let user_id = super::caller_id(&claims)?;

    let outcome = state.access_request_service.renew(user_id, id).await?;

    Ok((
        StatusCode::CREATED,
        Json(AdjudicationOutcomeResponse {
            message: outcome.message,
            request: AccessRequestResponse::from_parts(
                outcome.details.request,
                outcome.details.module_names,
                outcome.details.history,
            ),
        }),
    ))
}

/// Cancel an active request and revoke its grants.
#[utoipa::path(
    post,
    path = "/requests/{id}/cancel",
    tag = "access-requests",
    params(("id" = Uuid, Path, description = "Access request ID")),
    request_body = CancelAccessRequestRequest,
    responses(
        (status = 200, description = "Request canceled", body = MessageResponse),
        (status = 403, description = "Not the request owner"),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Request is not active"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_request(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(body): Json<CancelAccessRequestRequest>,
) -> ApiResult<Json<MessageResponse>> {
    body.validate()?;
    let user_id = super::caller_id(&claims)?;

    state
        .access_request_service
        .cancel(user_id, id, &body.reason)
        .await?;

    Ok(Json(MessageResponse {
        message: "Request canceled and access revoked".to_string(),
    }))
}
