//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub corp_id: Uuid,
    /// `None` means no role assigned — the user holds zero permissions.
    pub role_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new user.
///
/// Carries the already-hashed credential, like `CorpProvisioning`
/// does: hashing policy (Argon2id parameters, optional pepper) lives
/// in one place in the service layer, and the raw password never
/// reaches the storage crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub corp_id: Uuid,
    pub role_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2id PHC-format hash.
    pub password_hash: String,
}
