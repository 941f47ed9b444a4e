//! Effective-permission evaluation.
//!
//! Answers "what may this user touch right now": role rows intersected
//! with the corp allow-list at read time, shaped into per-resource
//! views. The allow-list filter here is the enforcement point for
//! allow-list shrinkage; stale permission rows are never trusted.

use std::collections::HashMap;

use kontor_core::error::KontorResult;
use kontor_core::repository::{
    CorpRepository, PermissionRepository, ResourceCatalog, RoleRepository, UserRepository,
};
use tracing::debug;
use uuid::Uuid;

use crate::view::{EffectivePermissions, RoleSummary, shape_resource_view};

pub struct Evaluator<U, R, P, C, Res>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
    C: CorpRepository,
    Res: ResourceCatalog,
{
    users: U,
    roles: R,
    permissions: P,
    corps: C,
    catalog: Res,
}

impl<U, R, P, C, Res> Evaluator<U, R, P, C, Res>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
    C: CorpRepository,
    Res: ResourceCatalog,
{
    pub fn new(users: U, roles: R, permissions: P, corps: C, catalog: Res) -> Self {
        Self {
            users,
            roles,
            permissions,
            corps,
            catalog,
        }
    }

    /// Resolve the full permission view for a user.
    ///
    /// A user without an assigned role gets an empty view, not an
    /// error. A dangling role or corp reference is an error.
    pub async fn effective_permissions(
        &self,
        user_id: Uuid,
    ) -> KontorResult<EffectivePermissions> {
        let user = self.users.get_by_id(user_id).await?;

        let Some(role_id) = user.role_id else {
            debug!(user_id = %user_id, "User has no role; empty permission view");
            return Ok(EffectivePermissions {
                role: None,
                resources: HashMap::new(),
            });
        };

        let role = self.roles.get_by_id(role_id).await?;
        let corp = self.corps.get_by_id(user.corp_id).await?;
        let permissions = self.permissions.list_by_role(role.id).await?;

        let allowed: Vec<String> = permissions
            .iter()
            .map(|p| p.resource_id.clone())
            .filter(|id| corp.allowed_resources.contains(id))
            .collect();

        let dropped = permissions.len() - allowed.len();
        if dropped > 0 {
            debug!(
                role_id = %role.id,
                corp_id = %corp.id,
                dropped,
                "Dropped permission rows outside the corp allow-list"
            );
        }

        let resources = self.catalog.find_by_ids(&allowed).await?;

        let mut views = HashMap::with_capacity(resources.len());
        for resource in &resources {
            if let Some(permission) = permissions
                .iter()
                .find(|p| p.resource_id == resource.resource_id)
            {
                views.insert(
                    resource.resource_id.clone(),
                    shape_resource_view(resource, permission),
                );
            }
        }

        Ok(EffectivePermissions {
            role: Some(RoleSummary {
                role_id: role.id,
                name: role.name,
                description: role.description,
            }),
            resources: views,
        })
    }
}
