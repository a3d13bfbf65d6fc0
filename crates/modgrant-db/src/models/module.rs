//! Module catalog models.
//!
//! The catalog is owned by an external administrative collaborator; the
//! adjudication engine only reads it. Loaders return fresh snapshots per
//! call rather than cached graphs, so concurrent edits to incompatibility
//! edges never feed stale data into a decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use super::Department;

/// A software module employees can request access to.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Module {
    /// Unique identifier.
    pub id: Uuid,

    /// Human-readable name, unique.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Whether the module can currently be requested.
    pub active: bool,

    /// When the module was registered.
    pub created_at: DateTime<Utc>,
}

/// A module together with its eligibility and incompatibility associations,
/// as needed by the adjudication rules.
#[derive(Debug, Clone)]
pub struct ModuleDetail {
    pub module: Module,

    /// Departments allowed to request this module. Empty means the module is
    /// open only if it is one of the universally available modules.
    pub allowed_departments: Vec<Department>,

    /// Modules this one cannot coexist with, collected from both directions
    /// of the association table.
    pub incompatible_with: Vec<Uuid>,
}

impl Module {
    /// Find a module by ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM modules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Find a module by its unique name.
    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM modules
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(conn)
        .await
    }

    /// List active modules ordered by name.
    pub async fn list_active(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM modules
            WHERE active = TRUE
            ORDER BY name
            "#,
        )
        .fetch_all(conn)
        .await
    }

    /// Departments allowed to request the given module.
    pub async fn allowed_departments(
        conn: &mut PgConnection,
        module_id: Uuid,
    ) -> Result<Vec<Department>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT department FROM module_allowed_departments
            WHERE module_id = $1
            "#,
        )
        .bind(module_id)
        .fetch_all(conn)
        .await
    }

    /// Modules incompatible with the given module.
    ///
    /// The relation is symmetric but may be stored one-directionally, so both
    /// directions of the association table are unioned.
    pub async fn incompatible_ids(
        conn: &mut PgConnection,
        module_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT incompatible_module_id FROM module_incompatibilities
            WHERE module_id = $1
            UNION
            SELECT module_id FROM module_incompatibilities
            WHERE incompatible_module_id = $1
            "#,
        )
        .bind(module_id)
        .fetch_all(conn)
        .await
    }
}

impl ModuleDetail {
    /// Load a module snapshot with its associations.
    pub async fn load(
        conn: &mut PgConnection,
        module_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(module) = Module::find_by_id(conn, module_id).await? else {
            return Ok(None);
        };

        let allowed_departments = Module::allowed_departments(conn, module_id).await?;
        let incompatible_with = Module::incompatible_ids(conn, module_id).await?;

        Ok(Some(Self {
            module,
            allowed_departments,
            incompatible_with,
        }))
    }

    /// Load snapshots for every active module in the catalog.
    pub async fn load_all_active(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        let modules = Module::list_active(conn).await?;
        let mut details = Vec::with_capacity(modules.len());

        for module in modules {
            let allowed_departments = Module::allowed_departments(conn, module.id).await?;
            let incompatible_with = Module::incompatible_ids(conn, module.id).await?;
            details.push(Self {
                module,
                allowed_departments,
                incompatible_with,
            });
        }

        Ok(details)
    }
}
