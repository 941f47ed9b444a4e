//! Role domain model.
//!
//! A role is a named permission bundle owned by exactly one corp.
//! System roles (the auto-provisioned Admin) are immutable: they can
//! never be renamed, deleted, or have their permissions replaced
//! through the mutation endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub corp_id: Uuid,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub corp_id: Uuid,
    pub name: String,
    pub description: String,
    pub is_system: bool,
}

/// Fields that can be updated on an existing role.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
}
