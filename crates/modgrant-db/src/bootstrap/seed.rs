//! Idempotent demo fixture: one user per department plus the module catalog.
//!
//! Bootstrap state lives outside the adjudication engine. Re-running the
//! seed is a no-op for rows that already exist, and incompatibility edges
//! are written in both directions so the symmetric relation holds in
//! storage, not just at query time.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{Department, Module};
use crate::pool::DbPool;

/// Seed demo users and the module catalog.
///
/// # Errors
///
/// Returns `DbError::QueryFailed` if any statement fails; the whole seed
/// runs in one transaction.
pub async fn seed_demo_data(pool: &DbPool) -> Result<(), DbError> {
    let mut tx = pool.inner().begin().await?;

    seed_users(&mut tx).await?;
    seed_modules(&mut tx).await?;

    tx.commit().await?;

    tracing::info!("Demo data seeded");
    Ok(())
}

async fn seed_users(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    let users: &[(&str, &str, Department)] = &[
        ("it@example.com", "Joan Silva - IT", Department::It),
        ("finance@example.com", "Maria Santos - Finance", Department::Finance),
        ("hr@example.com", "Peter Oliver - HR", Department::Hr),
        ("operations@example.com", "Ana Costa - Operations", Department::Operations),
        ("other@example.com", "Carl Mendes - Other", Department::Other),
    ];

    for (email, display_name, department) in users {
        sqlx::query(
            r#"
            INSERT INTO users (email, display_name, department)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(email)
        .bind(display_name)
        .bind(department)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

const ALL_DEPARTMENTS: [Department; 5] = [
    Department::It,
    Department::Finance,
    Department::Hr,
    Department::Operations,
    Department::Other,
];

async fn seed_modules(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    let modules: &[(&str, &str, &[Department])] = &[
        (
            "Employee Portal",
            "Main portal for all employees",
            &ALL_DEPARTMENTS,
        ),
        (
            "Management Reports",
            "Management reporting system",
            &ALL_DEPARTMENTS,
        ),
        (
            "Financial Management",
            "Financial management system",
            &[Department::Finance, Department::It],
        ),
        (
            "Finance Approver",
            "Approval of financial requests",
            &[Department::Finance, Department::It],
        ),
        (
            "Finance Requester",
            "Requesting of financial resources",
            &[Department::Finance, Department::It],
        ),
        (
            "HR Administrator",
            "Human resources administration",
            &[Department::Hr, Department::It],
        ),
        (
            "HR Collaborator",
            "Human resources collaborator tools",
            &[Department::Hr, Department::It],
        ),
        (
            "Inventory Management",
            "Inventory management system",
            &[Department::Operations, Department::It],
        ),
        (
            "Procurement",
            "Purchasing management system",
            &[Department::Operations, Department::It],
        ),
        ("Audit", "System audit module", &[Department::It]),
    ];

    for (name, description, departments) in modules {
        let module_id = upsert_module(conn, name, description).await?;

        for department in *departments {
            sqlx::query(
                r#"
                INSERT INTO module_allowed_departments (module_id, department)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(module_id)
            .bind(department)
            .execute(&mut *conn)
            .await?;
        }
    }

    seed_incompatibility(conn, "Finance Approver", "Finance Requester").await?;
    seed_incompatibility(conn, "HR Administrator", "HR Collaborator").await?;

    Ok(())
}

async fn upsert_module(
    conn: &mut PgConnection,
    name: &str,
    description: &str,
) -> Result<Uuid, sqlx::Error> {
    if let Some(existing) = Module::find_by_name(conn, name).await? {
        return Ok(existing.id);
    }

    sqlx::query_scalar(
        r#"
        INSERT INTO modules (name, description, active)
        VALUES ($1, $2, TRUE)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(conn)
    .await
}

/// Record a mutual exclusion between two modules, both directions.
async fn seed_incompatibility(
    conn: &mut PgConnection,
    name_a: &str,
    name_b: &str,
) -> Result<(), sqlx::Error> {
    let a = Module::find_by_name(conn, name_a)
        .await?
        .map(|m| m.id)
        .ok_or_else(|| sqlx::Error::RowNotFound)?;
    let b = Module::find_by_name(conn, name_b)
        .await?
        .map(|m| m.id)
        .ok_or_else(|| sqlx::Error::RowNotFound)?;

    for (left, right) in [(a, b), (b, a)] {
        sqlx::query(
            r#"
            INSERT INTO module_incompatibilities (module_id, incompatible_module_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(left)
        .bind(right)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
