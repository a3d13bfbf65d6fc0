//! Grant store model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

/// An active, time-bounded permission for a user to use a module.
///
/// A partial unique index on `(user_id, module_id) WHERE active` guarantees
/// at most one active grant per pair, even when two submissions race past
/// the engine's duplicate check.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ModuleGrant {
    /// Unique identifier.
    pub id: Uuid,

    /// The user holding the grant.
    pub user_id: Uuid,

    /// The granted module.
    pub module_id: Uuid,

    /// When access was granted.
    pub granted_date: DateTime<Utc>,

    /// When access expires. Extended in place on renewal.
    pub expiration_date: DateTime<Utc>,

    /// Flipped to false on cancellation or revocation; never deleted.
    pub active: bool,
}

impl ModuleGrant {
    /// Create an active grant.
    pub async fn create(
        conn: &mut PgConnection,
        user_id: Uuid,
        module_id: Uuid,
        granted_date: DateTime<Utc>,
        expiration_date: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO module_grants (user_id, module_id, granted_date, expiration_date, active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(module_id)
        .bind(granted_date)
        .bind(expiration_date)
        .fetch_one(conn)
        .await
    }

    /// The user's currently active grants.
    pub async fn find_active_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM module_grants
            WHERE user_id = $1 AND active
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
    }

    /// Module IDs of the user's currently active grants.
    pub async fn active_module_ids_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT module_id FROM module_grants
            WHERE user_id = $1 AND active
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
    }

    /// The user's active grant for a specific module, if any.
    pub async fn find_active_for_user_module(
        conn: &mut PgConnection,
        user_id: Uuid,
        module_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM module_grants
            WHERE user_id = $1 AND module_id = $2 AND active
            "#,
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(conn)
        .await
    }

    /// Push a grant's expiration date forward in place.
    pub async fn extend_expiration(
        conn: &mut PgConnection,
        id: Uuid,
        expiration_date: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE module_grants
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

    /// Revoke a grant. The row is kept for history.
    pub async fn deactivate(conn: &mut PgConnection, id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE module_grants
            SET active = FALSE
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(conn)
        .await
    }
}
