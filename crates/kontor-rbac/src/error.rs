//! Authorization-layer error types.

use kontor_core::error::KontorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RbacError {
    #[error("system roles cannot be modified")]
    SystemRoleImmutable,

    #[error("resources not allowed for this corporation: {}", .0.join(", "))]
    DisallowedResources(Vec<String>),

    #[error("organization directory lookup failed: {0}")]
    OrgLookup(String),

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<RbacError> for KontorError {
    fn from(err: RbacError) -> Self {
        match err {
            RbacError::SystemRoleImmutable => KontorError::Forbidden {
                reason: err.to_string(),
            },
            RbacError::DisallowedResources(resource_ids) => {
                KontorError::DisallowedResources { resource_ids }
            }
            RbacError::OrgLookup(msg) => {
                KontorError::Internal(format!("organization lookup failed: {msg}"))
            }
            RbacError::WeakPassword { .. } => KontorError::Validation {
                message: err.to_string(),
            },
            RbacError::Crypto(msg) => KontorError::Internal(msg),
        }
    }
}
