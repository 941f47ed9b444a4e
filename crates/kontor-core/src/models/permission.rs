//! Permission domain model.
//!
//! A permission is the CRUD quadruple a role holds for one catalog
//! resource, plus one quadruple per declared sub-resource. Exactly one
//! row exists per `(role_id, resource_id)` pair; rows are owned by,
//! and destroyed with, their role.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four CRUD flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CrudFlags {
    pub can_read: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl CrudFlags {
    pub const NONE: CrudFlags = CrudFlags {
        can_read: false,
        can_create: false,
        can_update: false,
        can_delete: false,
    };

    pub const ALL: CrudFlags = CrudFlags {
        can_read: true,
        can_create: true,
        can_update: true,
        can_delete: true,
    };
}

/// Stored sub-resource grant, keyed by the parent resource's declared
/// route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubresourcePermission {
    pub subresource_route: String,
    #[serde(flatten)]
    pub flags: CrudFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub permission_id: Uuid,
    pub role_id: Uuid,
    /// Catalog code of the protected resource.
    pub resource_id: String,
    pub flags: CrudFlags,
    /// Present only for resources with `has_subresources = true`;
    /// routes are a subset of the parent's declared routes.
    pub subresource_permissions: Vec<SubresourcePermission>,
}

/// Caller-supplied grant for one resource.
///
/// All four flags are required — an absent flag is a deserialization
/// error, never an implicit `false`. `subresources` defaults to empty;
/// entries for routes the catalog does not declare are ignored, and
/// declared routes without an entry default to all-false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub resource_id: String,
    pub can_read: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
    #[serde(default)]
    pub subresources: Vec<SubresourceGrant>,
}

/// Caller-supplied grant for one sub-resource route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubresourceGrant {
    pub route: String,
    pub can_read: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl PermissionGrant {
    pub fn flags(&self) -> CrudFlags {
        CrudFlags {
            can_read: self.can_read,
            can_create: self.can_create,
            can_update: self.can_update,
            can_delete: self.can_delete,
        }
    }

    /// Convenience constructor for a uniform grant with no
    /// sub-resource entries.
    pub fn uniform(resource_id: impl Into<String>, flags: CrudFlags) -> Self {
        Self {
            resource_id: resource_id.into(),
            can_read: flags.can_read,
            can_create: flags.can_create,
            can_update: flags.can_update,
            can_delete: flags.can_delete,
            subresources: Vec::new(),
        }
    }
}

impl SubresourceGrant {
    pub fn flags(&self) -> CrudFlags {
        CrudFlags {
            can_read: self.can_read,
            can_create: self.can_create,
            can_update: self.can_update,
            can_delete: self.can_delete,
        }
    }
}

/// A permission row as handed to the storage layer: resolved flags and
/// the already-reconciled sub-resource list.
#[derive(Debug, Clone)]
pub struct PermissionRecord {
    pub resource_id: String,
    pub flags: CrudFlags,
    pub subresource_permissions: Vec<SubresourcePermission>,
}
