//! Append-only status history for access requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use super::RequestStatus;

/// One status transition of an access request.
///
/// Rows are written only by the adjudication engine at decision points and
/// never mutated afterwards. `previous_status` is `None` for the very first
/// entry of a freshly adjudicated request, where no real prior status exists.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccessHistory {
    /// Unique identifier.
    pub id: Uuid,

    /// The request this entry belongs to.
    pub request_id: Uuid,

    /// Status before the transition, if there was one.
    pub previous_status: Option<RequestStatus>,

    /// Status after the transition.
    pub new_status: RequestStatus,

    /// When the transition happened.
    pub changed_at: DateTime<Utc>,

    /// Human-readable reason for the transition.
    pub reason: String,
}

impl AccessHistory {
    /// Append a history entry for a request.
    pub async fn append(
        conn: &mut PgConnection,
        request_id: Uuid,
        previous_status: Option<RequestStatus>,
        new_status: RequestStatus,
        reason: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO access_histories (request_id, previous_status, new_status, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(previous_status)
        .bind(new_status)
        .bind(reason)
        .fetch_one(conn)
        .await
    }

    /// List a request's history in chronological order.
    pub async fn list_for_request(
        conn: &mut PgConnection,
        request_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM access_histories
            WHERE request_id = $1
            ORDER BY changed_at
            "#,
        )
        .bind(request_id)
        .fetch_all(conn)
        .await
    }
}
