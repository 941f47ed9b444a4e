//! Corporation (tenant) domain model.
//!
//! Corps provide full data isolation: every role, user, and business
//! record belongs to exactly one corp. `allowed_resources` is the
//! ceiling — no role under a corp may ever be granted a resource
//! absent from this list, and the ceiling is re-checked on every
//! permission read, not just at grant time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corp {
    pub id: Uuid,
    pub corp_name: String,
    /// Soft-scoping flag; inactive corps keep their data.
    pub corp_active: bool,
    /// Catalog codes this corp may grant to its roles.
    pub allowed_resources: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new corp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCorp {
    pub corp_name: String,
    pub allowed_resources: Vec<String>,
}

/// Fields that can be updated on an existing corp.
///
/// `None` always means "keep the stored value". Valid falsy values
/// (`corp_active: Some(false)`, an empty allow-list) are applied as
/// given — presence is checked, never truthiness.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCorp {
    pub corp_name: Option<String>,
    pub corp_active: Option<bool>,
    pub allowed_resources: Option<Vec<String>>,
}
