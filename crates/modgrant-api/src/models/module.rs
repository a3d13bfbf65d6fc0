//! Response models for the module catalog.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use modgrant_db::{Department, ModuleDetail};

/// A catalog module as exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModuleResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub active: bool,
    pub allowed_departments: Vec<Department>,
}

impl From<ModuleDetail> for ModuleResponse {
    fn from(detail: ModuleDetail) -> Self {
        Self {
            id: detail.module.id,
            name: detail.module.name,
            description: detail.module.description,
            active: detail.module.active,
            allowed_departments: detail.allowed_departments,
        }
    }
}
