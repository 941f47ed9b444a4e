//! SurrealDB implementation of [`PermissionRepository`].
//!
//! Permission records use the composite `"{role_id}:{resource_id}"`
//! as their record id, so the one-row-per-pair invariant holds by
//! construction: a find-or-create is a plain `UPSERT` on a known id.

use kontor_core::error::KontorResult;
use kontor_core::models::permission::{
    CrudFlags, Permission, PermissionRecord, SubresourcePermission,
};
use kontor_core::repository::PermissionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct SubresourcePermissionRow {
    pub subresource_route: String,
    pub can_read: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl SubresourcePermissionRow {
    pub(crate) fn from_model(sp: &SubresourcePermission) -> Self {
        Self {
            subresource_route: sp.subresource_route.clone(),
            can_read: sp.flags.can_read,
            can_create: sp.flags.can_create,
            can_update: sp.flags.can_update,
            can_delete: sp.flags.can_delete,
        }
    }

    fn into_model(self) -> SubresourcePermission {
        SubresourcePermission {
            subresource_route: self.subresource_route,
            flags: CrudFlags {
                can_read: self.can_read,
                can_create: self.can_create,
                can_update: self.can_update,
                can_delete: self.can_delete,
            },
        }
    }
}

#[derive(Debug, SurrealValue)]
pub(crate) struct PermissionRow {
    permission_id: String,
    role_id: String,
    resource_id: String,
    can_read: bool,
    can_create: bool,
    can_update: bool,
    can_delete: bool,
    subresource_permissions: Vec<SubresourcePermissionRow>,
}

impl PermissionRow {
    pub(crate) fn try_into_permission(self) -> Result<Permission, DbError> {
        let permission_id = Uuid::parse_str(&self.permission_id)
            .map_err(|e| DbError::Migration(format!("invalid permission UUID: {e}")))?;
        let role_id = Uuid::parse_str(&self.role_id)
            .map_err(|e| DbError::Migration(format!("invalid role UUID: {e}")))?;
        Ok(Permission {
            permission_id,
            role_id,
            resource_id: self.resource_id,
            flags: CrudFlags {
                can_read: self.can_read,
                can_create: self.can_create,
                can_update: self.can_update,
                can_delete: self.can_delete,
            },
            subresource_permissions: self
                .subresource_permissions
                .into_iter()
                .map(SubresourcePermissionRow::into_model)
                .collect(),
        })
    }
}

/// Record id shared with the provisioning repository.
pub(crate) fn permission_record_id(role_id: Uuid, resource_id: &str) -> String {
    format!("{role_id}:{resource_id}")
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn put(&self, role_id: Uuid, record: PermissionRecord) -> KontorResult<Permission> {
        let id = permission_record_id(role_id, &record.resource_id);
        let subs: Vec<SubresourcePermissionRow> = record
            .subresource_permissions
            .iter()
            .map(SubresourcePermissionRow::from_model)
            .collect();

        // `permission_id ?? $pid` keeps the original UUID stable on
        // overwrite; everything else is replaced unconditionally.
        let result = self
            .db
            .query(
                "UPSERT type::record('permission', $id) SET \
                 permission_id = permission_id ?? $pid, \
                 role_id = $role_id, resource_id = $resource_id, \
                 can_read = $can_read, can_create = $can_create, \
                 can_update = $can_update, can_delete = $can_delete, \
                 subresource_permissions = $subs",
            )
            .bind(("id", id.clone()))
            .bind(("pid", Uuid::new_v4().to_string()))
            .bind(("role_id", role_id.to_string()))
            .bind(("resource_id", record.resource_id))
            .bind(("can_read", record.flags.can_read))
            .bind(("can_create", record.flags.can_create))
            .bind(("can_update", record.flags.can_update))
            .bind(("can_delete", record.flags.can_delete))
            .bind(("subs", subs))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "permission".into(),
            id,
        })?;

        Ok(row.try_into_permission()?)
    }

    async fn get(&self, role_id: Uuid, resource_id: &str) -> KontorResult<Option<Permission>> {
        let id = permission_record_id(role_id, resource_id);

        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_permission()?)),
            None => Ok(None),
        }
    }

    async fn list_by_role(&self, role_id: Uuid) -> KontorResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM permission WHERE role_id = $role_id \
                 ORDER BY resource_id ASC",
            )
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let permissions = rows
            .into_iter()
            .map(PermissionRow::try_into_permission)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }

    async fn replace_for_role(
        &self,
        role_id: Uuid,
        records: Vec<PermissionRecord>,
    ) -> KontorResult<Vec<Permission>> {
        // One transaction: overwrite every named row in place and
        // delete only the rows the new set omits. Deleting a record
        // id and recreating it inside the same transaction aborts in
        // SurrealDB, so the named rows must be UPSERTs, not
        // delete-then-CREATE.
        let keep_ids: Vec<String> = records.iter().map(|r| r.resource_id.clone()).collect();

        let mut statements = vec![
            "BEGIN TRANSACTION;".to_string(),
            "DELETE permission WHERE role_id = $role_id \
             AND resource_id NOTINSIDE $keep_ids;"
                .to_string(),
        ];
        for i in 0..records.len() {
            statements.push(format!(
                "UPSERT type::record('permission', $id_{i}) SET \
                 permission_id = permission_id ?? $pid_{i}, \
                 role_id = $role_id, resource_id = $rid_{i}, \
                 can_read = $cr_{i}, can_create = $cc_{i}, \
                 can_update = $cu_{i}, can_delete = $cd_{i}, \
                 subresource_permissions = $subs_{i};"
            ));
        }
        statements.push("COMMIT TRANSACTION;".to_string());

        let mut builder = self
            .db
            .query(statements.join(" "))
            .bind(("role_id", role_id.to_string()))
            .bind(("keep_ids", keep_ids));

        for (i, record) in records.into_iter().enumerate() {
            let subs: Vec<SubresourcePermissionRow> = record
                .subresource_permissions
                .iter()
                .map(SubresourcePermissionRow::from_model)
                .collect();
            builder = builder
                .bind((
                    format!("id_{i}"),
                    permission_record_id(role_id, &record.resource_id),
                ))
                .bind((format!("pid_{i}"), Uuid::new_v4().to_string()))
                .bind((format!("rid_{i}"), record.resource_id))
                .bind((format!("cr_{i}"), record.flags.can_read))
                .bind((format!("cc_{i}"), record.flags.can_create))
                .bind((format!("cu_{i}"), record.flags.can_update))
                .bind((format!("cd_{i}"), record.flags.can_delete))
                .bind((format!("subs_{i}"), subs));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        self.list_by_role(role_id).await
    }

    async fn delete_by_role(&self, role_id: Uuid) -> KontorResult<()> {
        self.db
            .query("DELETE permission WHERE role_id = $role_id")
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
