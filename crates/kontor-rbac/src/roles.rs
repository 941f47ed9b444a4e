//! Role management — creation, mutation, and the two permission
//! update contracts.
//!
//! `replace_permissions` is a full reset: the caller submits the
//! complete desired set and omissions are deletions.
//! `upsert_permissions` is an incremental edit: only the named
//! resources change. Both exist because callers rely on the
//! difference.

use kontor_core::error::{KontorError, KontorResult};
use kontor_core::models::corp::Corp;
use kontor_core::models::permission::{
    CrudFlags, Permission, PermissionGrant, PermissionRecord,
};
use kontor_core::models::role::{CreateRole, Role, UpdateRole};
use kontor_core::repository::{
    CorpRepository, PermissionRepository, ResourceCatalog, RoleRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::error::RbacError;
use crate::guard::validate_grant;
use crate::reconcile::reconcile_subresources;
use crate::view::{RoleWithPermissions, shape_resource_view};

/// Role manager.
///
/// Generic over repository implementations so the service layer has
/// no dependency on the database crate.
pub struct RoleService<R, P, C, Res>
where
    R: RoleRepository,
    P: PermissionRepository,
    C: CorpRepository,
    Res: ResourceCatalog,
{
    roles: R,
    permissions: P,
    corps: C,
    catalog: Res,
}

impl<R, P, C, Res> RoleService<R, P, C, Res>
where
    R: RoleRepository,
    P: PermissionRepository,
    C: CorpRepository,
    Res: ResourceCatalog,
{
    pub fn new(roles: R, permissions: P, corps: C, catalog: Res) -> Self {
        Self {
            roles,
            permissions,
            corps,
            catalog,
        }
    }

    /// Create a custom role and seed one all-false permission row per
    /// resource in the corp's allow-list.
    ///
    /// Every role starts with a complete-but-empty permission surface:
    /// explicit false rows, never "missing row means deny". Allow-list
    /// entries that no longer resolve in the catalog are skipped.
    pub async fn create_role(
        &self,
        corp_id: Uuid,
        name: &str,
        description: &str,
    ) -> KontorResult<(Role, Vec<Permission>)> {
        if name.trim().is_empty() {
            return Err(KontorError::Validation {
                message: "role name must not be empty".into(),
            });
        }

        let corp = self.corps.get_by_id(corp_id).await?;
        let resources = self.catalog.find_by_ids(&corp.allowed_resources).await?;

        let role = self
            .roles
            .create(CreateRole {
                corp_id,
                name: name.to_string(),
                description: description.to_string(),
                is_system: false,
            })
            .await?;

        let records: Vec<PermissionRecord> = resources
            .iter()
            .map(|resource| PermissionRecord {
                resource_id: resource.resource_id.clone(),
                flags: CrudFlags::NONE,
                subresource_permissions: reconcile_subresources(resource, &[]),
            })
            .collect();

        let seeded = self.permissions.replace_for_role(role.id, records).await?;

        info!(
            role_id = %role.id,
            corp_id = %corp_id,
            seeded = seeded.len(),
            "Created role"
        );

        Ok((role, seeded))
    }

    /// Rename a custom role. System roles are immutable.
    pub async fn update_role(&self, role_id: Uuid, input: UpdateRole) -> KontorResult<Role> {
        let role = self.roles.get_by_id(role_id).await?;
        if role.is_system {
            return Err(RbacError::SystemRoleImmutable.into());
        }

        self.roles.update(role_id, input).await
    }

    /// Delete a custom role; its permission rows cascade with it.
    pub async fn delete_role(&self, role_id: Uuid) -> KontorResult<()> {
        let role = self.roles.get_by_id(role_id).await?;
        if role.is_system {
            return Err(RbacError::SystemRoleImmutable.into());
        }

        self.roles.delete(role_id).await?;

        info!(role_id = %role_id, "Deleted role");

        Ok(())
    }

    /// Full replace: delete every permission row for the role and
    /// recreate from `grants`, atomically.
    pub async fn replace_permissions(
        &self,
        role_id: Uuid,
        grants: Vec<PermissionGrant>,
    ) -> KontorResult<Vec<Permission>> {
        let (_, corp) = self.mutable_role_and_corp(role_id).await?;
        let records = self.resolve_grants(&corp, grants).await?;

        let replaced = self.permissions.replace_for_role(role_id, records).await?;

        info!(
            role_id = %role_id,
            rows = replaced.len(),
            "Replaced role permissions"
        );

        Ok(replaced)
    }

    /// Incremental edit: find-or-create each named `(role, resource)`
    /// row and overwrite its flags and sub-resource array. Rows for
    /// resources not named are untouched.
    pub async fn upsert_permissions(
        &self,
        role_id: Uuid,
        grants: Vec<PermissionGrant>,
    ) -> KontorResult<Vec<Permission>> {
        let (_, corp) = self.mutable_role_and_corp(role_id).await?;
        let records = self.resolve_grants(&corp, grants).await?;

        for record in records {
            self.permissions.put(role_id, record).await?;
        }

        self.permissions.list_by_role(role_id).await
    }

    /// Every role of the corp with its shaped permissions, restricted
    /// to public catalog resources and ordered by catalog position.
    pub async fn list_roles(&self, corp_id: Uuid) -> KontorResult<Vec<RoleWithPermissions>> {
        let roles = self.roles.list_by_corp(corp_id).await?;

        let mut out = Vec::with_capacity(roles.len());
        for role in roles {
            let permissions = self.permissions.list_by_role(role.id).await?;
            let ids: Vec<String> = permissions.iter().map(|p| p.resource_id.clone()).collect();
            let resources = self.catalog.find_by_ids(&ids).await?;

            // find_by_ids returns catalog position order.
            let mut views = Vec::new();
            for resource in resources.iter().filter(|r| r.is_public) {
                if let Some(permission) = permissions
                    .iter()
                    .find(|p| p.resource_id == resource.resource_id)
                {
                    views.push(shape_resource_view(resource, permission));
                }
            }

            let permissions_count = views.len();
            out.push(RoleWithPermissions {
                role_id: role.id,
                name: role.name,
                description: role.description,
                is_system: role.is_system,
                resources: views,
                permissions_count,
            });
        }

        Ok(out)
    }

    /// Load the role and its corp, rejecting system roles.
    async fn mutable_role_and_corp(&self, role_id: Uuid) -> KontorResult<(Role, Corp)> {
        let role = self.roles.get_by_id(role_id).await?;
        if role.is_system {
            return Err(RbacError::SystemRoleImmutable.into());
        }
        let corp = self.corps.get_by_id(role.corp_id).await?;
        Ok((role, corp))
    }

    /// Validate grants against the corp allow-list and reconcile each
    /// against its catalog entry. Grants for resources missing from
    /// the catalog are dropped (stale allow-list tolerance).
    async fn resolve_grants(
        &self,
        corp: &Corp,
        grants: Vec<PermissionGrant>,
    ) -> KontorResult<Vec<PermissionRecord>> {
        let requested: Vec<String> = grants.iter().map(|g| g.resource_id.clone()).collect();
        validate_grant(corp, &requested)?;

        let resources = self.catalog.find_by_ids(&requested).await?;

        let records = grants
            .into_iter()
            .filter_map(|grant| {
                let resource = resources
                    .iter()
                    .find(|r| r.resource_id == grant.resource_id)?;
                Some(PermissionRecord {
                    resource_id: grant.resource_id.clone(),
                    flags: grant.flags(),
                    subresource_permissions: reconcile_subresources(resource, &grant.subresources),
                })
            })
            .collect();

        Ok(records)
    }
}
