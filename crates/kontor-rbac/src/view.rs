//! Shaped permission views consumed by the API layer and front-end
//! menu rendering.

use std::collections::HashMap;

use kontor_core::models::permission::{CrudFlags, Permission};
use kontor_core::models::resource::Resource;
use serde::Serialize;
use uuid::Uuid;

/// One of the four CRUD actions, as checked by API middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    fn allowed_by(self, flags: &CrudFlags) -> bool {
        match self {
            Action::Read => flags.can_read,
            Action::Create => flags.can_create,
            Action::Update => flags.can_update,
            Action::Delete => flags.can_delete,
        }
    }
}

/// A sub-resource entry in a shaped view. Every declared sub-resource
/// of the parent appears here, granted or not.
#[derive(Debug, Clone, Serialize)]
pub struct SubresourceView {
    pub route: String,
    pub title: String,
    pub icon: String,
    pub position: i64,
    pub permissions: CrudFlags,
}

/// The effective permission a role holds over one catalog resource.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceView {
    pub resource_id: String,
    pub title: String,
    pub route: String,
    pub icon: String,
    pub position: i64,
    pub has_subresources: bool,
    pub subresources: Vec<SubresourceView>,
    pub permissions: CrudFlags,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    pub role_id: Uuid,
    pub name: String,
    pub description: String,
}

/// The corp-filtered, resource-shaped permission set of one user.
#[derive(Debug, Clone, Serialize)]
pub struct EffectivePermissions {
    /// `None` when the user has no role assigned.
    pub role: Option<RoleSummary>,
    /// Keyed by catalog code; ordering is irrelevant (key lookup only).
    pub resources: HashMap<String, ResourceView>,
}

impl EffectivePermissions {
    pub fn allows(&self, resource_id: &str, action: Action) -> bool {
        self.resources
            .get(resource_id)
            .is_some_and(|view| action.allowed_by(&view.permissions))
    }

    pub fn allows_subresource(&self, resource_id: &str, route: &str, action: Action) -> bool {
        self.resources
            .get(resource_id)
            .and_then(|view| view.subresources.iter().find(|s| s.route == route))
            .is_some_and(|sub| action.allowed_by(&sub.permissions))
    }
}

/// A role with its shaped permissions, as returned by the role
/// listing endpoint. Resources are ordered by catalog position for
/// stable menu rendering.
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    pub role_id: Uuid,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub resources: Vec<ResourceView>,
    pub permissions_count: usize,
}

/// Shape one stored permission against its catalog resource.
///
/// The sub-resource list always enumerates every route the catalog
/// declares: stored entries carry their flags, unstored ones are
/// all-false. Stored routes the catalog no longer declares are not
/// shown.
pub fn shape_resource_view(resource: &Resource, permission: &Permission) -> ResourceView {
    let subresources = resource
        .subresources
        .iter()
        .map(|sub| SubresourceView {
            route: sub.route.clone(),
            title: sub.title.clone(),
            icon: sub.icon.clone(),
            position: resource.position,
            permissions: permission
                .subresource_permissions
                .iter()
                .find(|sp| sp.subresource_route == sub.route)
                .map(|sp| sp.flags)
                .unwrap_or(CrudFlags::NONE),
        })
        .collect();

    ResourceView {
        resource_id: resource.resource_id.clone(),
        title: resource.title.clone(),
        route: resource.route.clone(),
        icon: resource.icon.clone(),
        position: resource.position,
        has_subresources: resource.has_subresources,
        subresources: if resource.has_subresources {
            subresources
        } else {
            Vec::new()
        },
        permissions: permission.flags,
    }
}
