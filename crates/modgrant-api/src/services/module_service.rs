//! Module catalog service.
//!
//! Read-only views over the catalog: the full listing and the subset a
//! given user's department is actually eligible to request.

use sqlx::PgPool;
use uuid::Uuid;

use modgrant_db::{ModuleDetail, User};
use modgrant_engine::{rules, AccessError};

/// Service for module catalog reads.
pub struct ModuleService {
    pool: PgPool,
}

impl ModuleService {
    /// Create a new module service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every active module with its associations.
    pub async fn list_catalog(&self) -> Result<Vec<ModuleDetail>, AccessError> {
        let mut conn = self.pool.acquire().await?;
        let details = ModuleDetail::load_all_active(&mut conn).await?;
        Ok(details)
    }

    /// List the active modules the user's department may request.
    ///
    /// Applies the same eligibility rule the adjudication uses, so the
    /// result is exactly the set a submission would not deny on
    /// department grounds.
    pub async fn available_modules(&self, user_id: Uuid) -> Result<Vec<ModuleDetail>, AccessError> {
        let mut conn = self.pool.acquire().await?;

        let user = User::find_by_id(&mut conn, user_id)
            .await?
            .ok_or(AccessError::UserNotFound(user_id))?;

        let details = ModuleDetail::load_all_active(&mut conn).await?;
        Ok(details
            .into_iter()
            .filter(|detail| rules::is_department_allowed(user.department, detail))
            .collect())
    }
}
