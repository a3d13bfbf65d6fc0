//! Module catalog endpoints.

use axum::{extract::State, Extension, Json};

use crate::auth::JwtClaims;
use crate::error::ApiResult;
use crate::models::ModuleResponse;
use crate::router::AppState;

/// List the full active module catalog.
#[utoipa::path(
    get,
    path = "/modules",
    tag = "modules",
    responses(
        (status = 200, description = "Active modules", body = [ModuleResponse]),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_modules(State(state): State<AppState>) -> ApiResult<Json<Vec<ModuleResponse>>> {
    let details = state.module_service.list_catalog().await?;
    Ok(Json(details.into_iter().map(Into::into).collect()))
}

/// List the modules the caller's department may request.
#[utoipa::path(
    get,
    path = "/modules/available",
    tag = "modules",
    responses(
        (status = 200, description = "Modules available to the caller", body = [ModuleResponse]),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn available_modules(
    State(state): State<AppState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<Vec<ModuleResponse>>> {
    let user_id = super::caller_id(&claims)?;

    let details = state.module_service.available_modules(user_id).await?;
    Ok(Json(details.into_iter().map(Into::into).collect()))
}
