//! Access request ledger model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

/// Status of an access request.
///
/// There is no separate APPROVED state: an approved request stays `Active`
/// until it is canceled, and expiry is implicit from `expiration_date`
/// compared to now. `Denied` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Valid request; for adjudicated requests this doubles as "approved".
    Active,
    /// Auto-denied by the adjudication rules. Terminal.
    Denied,
    /// Canceled by the requester; grants revoked. Terminal.
    Canceled,
}

impl RequestStatus {
    /// Check if the request can still transition.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Denied | Self::Canceled)
    }
}

/// A submitted access request.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Unique identifier.
    pub id: Uuid,

    /// Human-readable protocol, unique, date-sequenced.
    pub protocol: String,

    /// The requesting user.
    pub user_id: Uuid,

    /// Business justification supplied by the requester.
    pub justification: String,

    /// Whether the requester flagged the request as urgent.
    pub urgent: bool,

    /// Current status.
    pub status: RequestStatus,

    /// When the request was submitted.
    pub request_date: DateTime<Utc>,

    /// Access expiration, set only on approval.
    pub expiration_date: Option<DateTime<Utc>>,

    /// Denial reason, set only when denied.
    pub denial_reason: Option<String>,

    /// The request this one renews, if it is a renewal.
    pub renewed_from: Option<Uuid>,
}

/// Input for creating a new access request row.
#[derive(Debug, Clone)]
pub struct CreateAccessRequest {
    pub protocol: String,
    pub user_id: Uuid,
    pub justification: String,
    pub urgent: bool,
    pub renewed_from: Option<Uuid>,
}

/// Filter options for listing a user's access requests.
#[derive(Debug, Clone, Default)]
pub struct AccessRequestFilter {
    /// Substring match against the protocol or a requested module's name.
    pub search: Option<String>,
    pub status: Option<RequestStatus>,
    pub urgent: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl AccessRequest {
    /// Find a request by ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM access_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Find a request by ID with row-level locking.
    ///
    /// Uses `FOR UPDATE` so concurrent renew/cancel calls for the same
    /// request serialize on the row.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM access_requests
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Create a new request row in `active` status.
    pub async fn create(
        conn: &mut PgConnection,
        input: CreateAccessRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO access_requests (protocol, user_id, justification, urgent, renewed_from)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&input.protocol)
        .bind(input.user_id)
        .bind(&input.justification)
        .bind(input.urgent)
        .bind(input.renewed_from)
        .fetch_one(conn)
        .await
    }

    /// Link the requested modules to a request.
    pub async fn add_modules(
        conn: &mut PgConnection,
        request_id: Uuid,
        module_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        for module_id in module_ids {
            sqlx::query(
                r#"
                INSERT INTO access_request_modules (request_id, module_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(request_id)
            .bind(module_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Module IDs requested by a request.
    pub async fn module_ids(
        conn: &mut PgConnection,
        request_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT module_id FROM access_request_modules
            WHERE request_id = $1
            "#,
        )
        .bind(request_id)
        .fetch_all(conn)
        .await
    }

    /// Names of the modules requested by each of the given requests.
    pub async fn module_names_for_requests(
        conn: &mut PgConnection,
        request_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, String)>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT arm.request_id, m.name
            FROM access_request_modules arm
            JOIN modules m ON m.id = arm.module_id
            WHERE arm.request_id = ANY($1)
            ORDER BY m.name
            "#,
        )
        .bind(request_ids)
        .fetch_all(conn)
        .await
    }

    /// Mark a request as denied with the given reason.
    pub async fn set_denied(
        conn: &mut PgConnection,
        id: Uuid,
        reason: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE access_requests
            SET status = 'denied', denial_reason = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_one(conn)
        .await
    }

    /// Mark a request as approved by setting its expiration date.
    ///
    /// Status stays `active`; there is no distinct approved state.
    pub async fn set_approved(
        conn: &mut PgConnection,
        id: Uuid,
        expiration_date: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE access_requests
            SET expiration_date = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expiration_date)
        .fetch_one(conn)
        .await
    }

    /// Transition a request to `canceled`.
    pub async fn set_canceled(conn: &mut PgConnection, id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE access_requests
            SET status = 'canceled'
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(conn)
        .await
    }

    /// List a user's requests with filtering, newest first.
    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        filter: &AccessRequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            r#"
            SELECT * FROM access_requests
            WHERE user_id = $1
            "#,
        );
        let mut param_count = 1;

        if filter.search.is_some() {
            param_count += 1;
            query.push_str(&format!(
                " AND (protocol ILIKE ${n} OR EXISTS (
                    SELECT 1 FROM access_request_modules arm
                    JOIN modules m ON m.id = arm.module_id
                    WHERE arm.request_id = access_requests.id
                      AND m.name ILIKE ${n}))",
                n = param_count
            ));
        }
        if filter.status.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND status = ${param_count}"));
        }
        if filter.urgent.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND urgent = ${param_count}"));
        }
        if filter.start_date.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND request_date >= ${param_count}"));
        }
        if filter.end_date.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND request_date <= ${param_count}"));
        }

        query.push_str(&format!(
            " ORDER BY request_date DESC LIMIT ${} OFFSET ${}",
            param_count + 1,
            param_count + 2
        ));

        let mut q = sqlx::query_as::<_, AccessRequest>(&query).bind(user_id);

        if let Some(search) = &filter.search {
            q = q.bind(format!("%{}%", search.trim()));
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(urgent) = filter.urgent {
            q = q.bind(urgent);
        }
        if let Some(start_date) = filter.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = filter.end_date {
            q = q.bind(end_date);
        }

        q.bind(limit).bind(offset).fetch_all(conn).await
    }

    /// Count a user's requests under the same filter.
    pub async fn count_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        filter: &AccessRequestFilter,
    ) -> Result<i64, sqlx::Error> {
        let mut query = String::from(
            r#"
            SELECT COUNT(*) FROM access_requests
            WHERE user_id = $1
            "#,
        );
        let mut param_count = 1;

        if filter.search.is_some() {
            param_count += 1;
            query.push_str(&format!(
                " AND (protocol ILIKE ${n} OR EXISTS (
                    SELECT 1 FROM access_request_modules arm
                    JOIN modules m ON m.id = arm.module_id
                    WHERE arm.request_id = access_requests.id
                      AND m.name ILIKE ${n}))",
                n = param_count
            ));
        }
        if filter.status.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND status = ${param_count}"));
        }
        if filter.urgent.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND urgent = ${param_count}"));
        }
        if filter.start_date.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND request_date >= ${param_count}"));
        }
        if filter.end_date.is_some() {
            param_count += 1;
            query.push_str(&format!(" AND request_date <= ${param_count}"));
        }

        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(user_id);

        if let Some(search) = &filter.search {
            q = q.bind(format!("%{}%", search.trim()));
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(urgent) = filter.urgent {
            q = q.bind(urgent);
        }
        if let Some(start_date) = filter.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = filter.end_date {
            q = q.bind(end_date);
        }

        q.fetch_one(conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_and_canceled_are_terminal() {
        assert!(RequestStatus::Denied.is_terminal());
        assert!(RequestStatus::Canceled.is_terminal());
        assert!(!RequestStatus::Active.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&RequestStatus::Canceled).unwrap(),
            "\"canceled\""
        );
    }

    #[test]
    fn filter_defaults_to_no_constraints() {
        let filter = AccessRequestFilter::default();
        assert!(filter.search.is_none());
        assert!(filter.status.is_none());
        assert!(filter.urgent.is_none());
        assert!(filter.start_date.is_none());
        assert!(filter.end_date.is_none());
    }
}
