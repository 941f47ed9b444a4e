//! Organization profile domain model.
//!
//! The org profile is the legal/registry record attached to a corp at
//! onboarding, populated from the external organization directory. It
//! lives and dies with its corp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgAddress {
    pub street: String,
    pub municipality: String,
    pub zip: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Org {
    pub id: Uuid,
    pub corp_id: Uuid,
    /// Registry identifier (organization number), unique system-wide.
    pub legal_id: String,
    pub org_name: String,
    pub country: String,
    pub addresses: Vec<OrgAddress>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile data as returned by the external organization directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgProfile {
    pub legal_id: String,
    pub org_name: String,
    pub country: String,
    pub addresses: Vec<OrgAddress>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}
