//! Access request service.
//!
//! Owns the transactional lifecycle of access requests: submission,
//! renewal, cancellation and reads. Every mutating operation runs inside a
//! single transaction, so a decision either commits all of its effects
//! (request row, history trail, grants) or none of them.

use chrono::{Duration, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use modgrant_db::{
    AccessHistory, AccessRequest, AccessRequestFilter, CreateAccessRequest, ModuleDetail,
    ModuleGrant, ProtocolCounter, RequestStatus, User,
};
use modgrant_engine::{
    protocol::format_protocol, rules, AccessError, Adjudication, ACCESS_VALIDITY_DAYS,
};

/// A request together with the associated data clients need.
#[derive(Debug, Clone)]
pub struct RequestDetails {
    pub request: AccessRequest,
    pub module_names: Vec<String>,
    pub history: Vec<AccessHistory>,
}

/// Result of a submission or renewal: the human-readable outcome plus the
/// persisted request. Denials land here too; they are outcomes, not errors.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub message: String,
    pub details: RequestDetails,
}

/// Service for access request operations.
pub struct AccessRequestService {
    pool: PgPool,
}

impl AccessRequestService {
    /// Create a new access request service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit a new access request and adjudicate it immediately.
    ///
    /// Precondition failures (unknown module, duplicate grant, generic
    /// justification, ...) roll back without persisting anything. Once the
    /// preconditions pass, a request row always commits: approved with
    /// grants, or denied with the reason and a history entry.
    pub async fn submit(
        &self,
        user_id: Uuid,
        module_ids: &[Uuid],
        justification: &str,
        urgent: bool,
    ) -> Result<SubmitOutcome, AccessError> {
        let module_ids = dedup_preserving_order(module_ids);
        rules::validate_batch_size(&module_ids)?;

        let mut tx = self.pool.begin().await?;

        let user = User::find_by_id(&mut tx, user_id)
            .await?
            .ok_or(AccessError::UserNotFound(user_id))?;

        let requested = load_requested_modules(&mut tx, &module_ids).await?;

        let active_module_ids = ModuleGrant::active_module_ids_for_user(&mut tx, user_id).await?;
        for detail in &requested {
            if active_module_ids.contains(&detail.module.id) {
                return Err(AccessError::DuplicateGrant(detail.module.name.clone()));
            }
        }

        rules::validate_justification(justification)?;

        let now = Utc::now();
        let sequence = ProtocolCounter::next(&mut tx).await?;
        let protocol = format_protocol(now.date_naive(), sequence);

        let request = AccessRequest::create(
            &mut tx,
            CreateAccessRequest {
                protocol,
                user_id,
                justification: justification.to_string(),
                urgent,
                renewed_from: None,
            },
        )
        .await?;
        AccessRequest::add_modules(&mut tx, request.id, &module_ids).await?;

        let active = load_module_details(&mut tx, &active_module_ids).await?;

        let (message, request) =
            match rules::adjudicate_submission(user.department, &requested, &active) {
                Adjudication::Denied(reason) => {
                    let request =
                        AccessRequest::set_denied(&mut tx, request.id, reason.message()).await?;
                    AccessHistory::append(
                        &mut tx,
                        request.id,
                        None,
                        RequestStatus::Denied,
                        reason.message(),
                    )
                    .await?;

                    tracing::info!(
                        protocol = %request.protocol,
                        user_id = %user_id,
                        reason = reason.message(),
                        "access request denied"
                    );

                    (
                        format!("Request denied. Reason: {}", reason.message()),
                        request,
                    )
                }
                Adjudication::Approved => {
                    let expiration = now + Duration::days(ACCESS_VALIDITY_DAYS);
                    let request =
                        AccessRequest::set_approved(&mut tx, request.id, expiration).await?;
                    AccessHistory::append(
                        &mut tx,
                        request.id,
                        None,
                        RequestStatus::Active,
                        "Request approved automatically",
                    )
                    .await?;

                    for detail in &requested {
                        ModuleGrant::create(&mut tx, user_id, detail.module.id, now, expiration)
                            .await
                            .map_err(|e| map_grant_conflict(e, &detail.module.name))?;
                    }

                    tracing::info!(
                        protocol = %request.protocol,
                        user_id = %user_id,
                        modules = requested.len(),
                        "access request approved"
                    );

                    (
                        format!(
                            "Request created successfully! Protocol: {}. Your access is now available.",
                            request.protocol
                        ),
                        request,
                    )
                }
            };

        let details = load_details(&mut tx, request).await?;
        tx.commit().await?;

        Ok(SubmitOutcome { message, details })
    }

    /// Renew an active request close to (or past) its expiration.
    ///
    /// Creates a successor request linked via `renewed_from` and re-runs the
    /// renewal variant of the rules. On approval, existing active grants are
    /// extended in place; a fresh grant is created only where no active
    /// grant survives.
    pub async fn renew(&self, user_id: Uuid, request_id: Uuid) -> Result<SubmitOutcome, AccessError> {
        let mut tx = self.pool.begin().await?;

        let original = AccessRequest::find_by_id_for_update(&mut tx, request_id)
            .await?
            .ok_or(AccessError::RequestNotFound(request_id))?;

        if original.user_id != user_id {
            return Err(AccessError::NotRequestOwner);
        }
        if original.status != RequestStatus::Active {
            return Err(AccessError::RequestNotActive);
        }
        let expiration = original
            .expiration_date
            .ok_or(AccessError::MissingExpirationDate)?;

        let now = Utc::now();
        rules::check_renewal_window(expiration, now)?;

        let user = User::find_by_id(&mut tx, user_id)
            .await?
            .ok_or(AccessError::UserNotFound(user_id))?;

        let original_module_ids = AccessRequest::module_ids(&mut tx, original.id).await?;
        let requested = load_requested_modules(&mut tx, &original_module_ids).await?;

        let sequence = ProtocolCounter::next(&mut tx).await?;
        let protocol = format_protocol(now.date_naive(), sequence);

        let renewal = AccessRequest::create(
            &mut tx,
            CreateAccessRequest {
                protocol,
                user_id,
                justification: format!("Renewal of access - {}", original.justification),
                urgent: original.urgent,
                renewed_from: Some(original.id),
            },
        )
        .await?;
        AccessRequest::add_modules(&mut tx, renewal.id, &original_module_ids).await?;

        let active_module_ids = ModuleGrant::active_module_ids_for_user(&mut tx, user_id).await?;
        let active = load_module_details(&mut tx, &active_module_ids).await?;
        let original_set = original_module_ids.iter().copied().collect();

        let (message, renewal) = match rules::adjudicate_renewal(
            user.department,
            &requested,
            &active,
            &original_set,
        ) {
            Adjudication::Denied(reason) => {
                let renewal =
                    AccessRequest::set_denied(&mut tx, renewal.id, reason.message()).await?;
                AccessHistory::append(
                    &mut tx,
                    renewal.id,
                    None,
                    RequestStatus::Denied,
                    reason.message(),
                )
                .await?;

                tracing::info!(
                    protocol = %renewal.protocol,
                    renewed_from = %original.id,
                    reason = reason.message(),
                    "renewal denied"
                );

                (
                    format!("Renewal denied. Reason: {}", reason.message()),
                    renewal,
                )
            }
            Adjudication::Approved => {
                let new_expiration = now + Duration::days(ACCESS_VALIDITY_DAYS);
                let renewal =
                    AccessRequest::set_approved(&mut tx, renewal.id, new_expiration).await?;

                // The closing entry states the new expiration explicitly.
                let closing = format!(
                    "Renewal approved automatically - access extended for {ACCESS_VALIDITY_DAYS} days until {}",
                    new_expiration.format("%Y-%m-%d")
                );
                AccessHistory::append(
                    &mut tx,
                    renewal.id,
                    None,
                    RequestStatus::Active,
                    &closing,
                )
                .await?;

                for detail in &requested {
                    match ModuleGrant::find_active_for_user_module(
                        &mut tx,
                        user_id,
                        detail.module.id,
                    )
                    .await?
                    {
                        Some(grant) => {
                            ModuleGrant::extend_expiration(&mut tx, grant.id, new_expiration)
                                .await?;
                        }
                        // Grant was revoked while the request stayed open:
                        // recreate it instead of extending.
                        None => {
                            ModuleGrant::create(
                                &mut tx,
                                user_id,
                                detail.module.id,
                                now,
                                new_expiration,
                            )
                            .await?;
                        }
                    }
                }

                tracing::info!(
                    protocol = %renewal.protocol,
                    renewed_from = %original.id,
                    "renewal approved"
                );

                (
                    format!(
                        "Renewal completed successfully! Protocol: {}. Your access has been extended for {ACCESS_VALIDITY_DAYS} days until {}.",
                        renewal.protocol,
                        new_expiration.format("%Y-%m-%d")
                    ),
                    renewal,
                )
            }
        };

        let details = load_details(&mut tx, renewal).await?;
        tx.commit().await?;

        Ok(SubmitOutcome { message, details })
    }

    /// Cancel an active request and revoke its grants.
    ///
    /// Deactivates exactly the caller's active grants whose module belongs
    /// to the request's module set; grants for other modules are untouched.
    pub async fn cancel(
        &self,
        user_id: Uuid,
        request_id: Uuid,
        reason: &str,
    ) -> Result<(), AccessError> {
        let mut tx = self.pool.begin().await?;

        let request = AccessRequest::find_by_id_for_update(&mut tx, request_id)
            .await?
            .ok_or(AccessError::RequestNotFound(request_id))?;

        if request.user_id != user_id {
            return Err(AccessError::NotRequestOwner);
        }
        if request.status != RequestStatus::Active {
            return Err(AccessError::RequestNotActive);
        }

        AccessRequest::set_canceled(&mut tx, request.id).await?;
        AccessHistory::append(
            &mut tx,
            request.id,
            Some(RequestStatus::Active),
            RequestStatus::Canceled,
            reason,
        )
        .await?;

        let request_module_ids = AccessRequest::module_ids(&mut tx, request.id).await?;
        let grants = ModuleGrant::find_active_for_user(&mut tx, user_id).await?;
        for grant_id in revocable_grant_ids(&grants, &request_module_ids) {
            ModuleGrant::deactivate(&mut tx, grant_id).await?;
        }

        tx.commit().await?;

        tracing::info!(
            protocol = %request.protocol,
            user_id = %user_id,
            "access request canceled, grants revoked"
        );

        Ok(())
    }

    /// Get a request with its module names and full history.
    ///
    /// Only the owner may read it.
    pub async fn get_details(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<RequestDetails, AccessError> {
        let mut conn = self.pool.acquire().await?;

        let request = AccessRequest::find_by_id(&mut conn, request_id)
            .await?
            .ok_or(AccessError::RequestNotFound(request_id))?;

        if request.user_id != user_id {
            return Err(AccessError::NotRequestOwner);
        }

        load_details(&mut conn, request).await
    }

    /// List the user's requests, newest first.
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &AccessRequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<(AccessRequest, Vec<String>)>, i64), AccessError> {
        let mut conn = self.pool.acquire().await?;

        let requests =
            AccessRequest::list_for_user(&mut conn, user_id, filter, limit, offset).await?;
        let total = AccessRequest::count_for_user(&mut conn, user_id, filter).await?;

        let ids: Vec<Uuid> = requests.iter().map(|r| r.id).collect();
        let names = AccessRequest::module_names_for_requests(&mut conn, &ids).await?;

        let items = requests
            .into_iter()
            .map(|request| {
                let module_names = names
                    .iter()
                    .filter(|(request_id, _)| *request_id == request.id)
                    .map(|(_, name)| name.clone())
                    .collect();
                (request, module_names)
            })
            .collect();

        Ok((items, total))
    }
}

/// Grants to revoke on cancellation: exactly the caller's active grants
/// whose module belongs to the request's module set. Grants for other
/// modules are untouched.
fn revocable_grant_ids(grants: &[ModuleGrant], request_module_ids: &[Uuid]) -> Vec<Uuid> {
    grants
        .iter()
        .filter(|grant| request_module_ids.contains(&grant.module_id))
        .map(|grant| grant.id)
        .collect()
}

/// Deduplicate module IDs while keeping submission order.
fn dedup_preserving_order(module_ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(module_ids.len());
    for id in module_ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

/// Load snapshots for requested modules, failing on unknown or inactive ones.
async fn load_requested_modules(
    conn: &mut PgConnection,
    module_ids: &[Uuid],
) -> Result<Vec<ModuleDetail>, AccessError> {
    let mut details = Vec::with_capacity(module_ids.len());
    for module_id in module_ids {
        let detail = ModuleDetail::load(conn, *module_id)
            .await?
            .ok_or(AccessError::ModuleNotFound(*module_id))?;
        if !detail.module.active {
            return Err(AccessError::ModuleInactive(detail.module.name));
        }
        details.push(detail);
    }
    Ok(details)
}

/// Load snapshots for a set of modules (active grants) without the
/// active-flag precondition.
async fn load_module_details(
    conn: &mut PgConnection,
    module_ids: &[Uuid],
) -> Result<Vec<ModuleDetail>, AccessError> {
    let mut details = Vec::with_capacity(module_ids.len());
    for module_id in module_ids {
        if let Some(detail) = ModuleDetail::load(conn, *module_id).await? {
            details.push(detail);
        }
    }
    Ok(details)
}

async fn load_details(
    conn: &mut PgConnection,
    request: AccessRequest,
) -> Result<RequestDetails, AccessError> {
    let names = AccessRequest::module_names_for_requests(conn, &[request.id]).await?;
    let module_names = names.into_iter().map(|(_, name)| name).collect();
    let history = AccessHistory::list_for_request(conn, request.id).await?;

    Ok(RequestDetails {
        request,
        module_names,
        history,
    })
}

/// Map a unique-violation on the active-grant index to `DuplicateGrant`.
///
/// The partial unique index is the real concurrency guard; the engine's own
/// duplicate check is only a fast path.
fn map_grant_conflict(err: sqlx::Error, module_name: &str) -> AccessError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return AccessError::DuplicateGrant(module_name.to_string());
        }
    }
    AccessError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(module_id: Uuid) -> ModuleGrant {
        let now = Utc::now();
        ModuleGrant {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            module_id,
            granted_date: now,
            expiration_date: now + Duration::days(180),
            active: true,
        }
    }

    #[test]
    fn cancellation_revokes_only_grants_in_the_request_module_set() {
        let requested_module = Uuid::new_v4();
        let other_module = Uuid::new_v4();

        let in_set = grant(requested_module);
        let outside_set = grant(other_module);
        let grants = [in_set.clone(), outside_set.clone()];

        let revoked = revocable_grant_ids(&grants, &[requested_module]);
        assert_eq!(revoked, vec![in_set.id]);
        assert!(!revoked.contains(&outside_set.id));
    }

    #[test]
    fn no_grants_are_revoked_when_none_match_the_request() {
        let grants = [grant(Uuid::new_v4())];
        assert!(revocable_grant_ids(&grants, &[Uuid::new_v4()]).is_empty());
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_preserving_order(&[a, b, a, b, a]), vec![a, b]);
    }

    #[test]
    fn dedup_of_distinct_ids_is_identity() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        assert_eq!(dedup_preserving_order(&ids), ids);
    }
}
