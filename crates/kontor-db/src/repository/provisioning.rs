//! SurrealDB implementation of [`ProvisioningRepository`].
//!
//! Tenant onboarding writes corp, system role, permission rows, admin
//! user, and (optionally) the org profile as one transaction, so a
//! half-created tenant is never observable. Corp deletion cascades the
//! same set in one transaction.

use kontor_core::error::KontorResult;
use kontor_core::repository::{
    CorpProvisioning, CorpRepository, OrgRepository, ProvisionedCorp, ProvisioningRepository,
    RoleRepository, UserRepository,
};
use surrealdb::{Connection, Surreal};
use tracing::info;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::corp::SurrealCorpRepository;
use crate::repository::org::{OrgAddressRow, SurrealOrgRepository};
use crate::repository::permission::{SubresourcePermissionRow, permission_record_id};
use crate::repository::role::SurrealRoleRepository;
use crate::repository::user::SurrealUserRepository;

/// SurrealDB implementation of the tenant provisioning repository.
#[derive(Clone)]
pub struct SurrealProvisioningRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProvisioningRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProvisioningRepository for SurrealProvisioningRepository<C> {
    async fn provision_corp(&self, input: CorpProvisioning) -> KontorResult<ProvisionedCorp> {
        let corp_id = Uuid::new_v4();
        let role_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();
        let with_org = input.org_profile.is_some();

        let mut statements = vec![
            "BEGIN TRANSACTION;".to_string(),
            "CREATE type::record('corp', $corp_id) SET \
             corp_name = $corp_name, corp_active = true, \
             allowed_resources = $allowed_resources;"
                .to_string(),
            "CREATE type::record('role', $role_id) SET \
             corp_id = $corp_id, name = $role_name, \
             description = $role_description, is_system = true;"
                .to_string(),
        ];
        for i in 0..input.admin_permissions.len() {
            statements.push(format!(
                "CREATE type::record('permission', $perm_id_{i}) SET \
                 permission_id = $perm_uuid_{i}, role_id = $role_id, \
                 resource_id = $perm_resource_{i}, \
                 can_read = $perm_cr_{i}, can_create = $perm_cc_{i}, \
                 can_update = $perm_cu_{i}, can_delete = $perm_cd_{i}, \
                 subresource_permissions = $perm_subs_{i};"
            ));
        }
        statements.push(
            "CREATE type::record('user', $user_id) SET \
             corp_id = $corp_id, role_id = $role_id, \
             first_name = $first_name, last_name = $last_name, \
             email = $email, password_hash = $password_hash, \
             active = true;"
                .to_string(),
        );
        if with_org {
            statements.push(
                "CREATE type::record('org', $org_id) SET \
                 corp_id = $corp_id, legal_id = $legal_id, \
                 org_name = $org_name, country = $country, \
                 addresses = $addresses, emails = $emails, \
                 phones = $phones;"
                    .to_string(),
            );
        }
        statements.push("COMMIT TRANSACTION;".to_string());

        let mut builder = self
            .db
            .query(statements.join(" "))
            .bind(("corp_id", corp_id.to_string()))
            .bind(("corp_name", input.corp.corp_name.clone()))
            .bind(("allowed_resources", input.corp.allowed_resources.clone()))
            .bind(("role_id", role_id.to_string()))
            .bind(("role_name", input.admin_role_name))
            .bind(("role_description", input.admin_role_description))
            .bind(("user_id", user_id.to_string()))
            .bind(("first_name", input.admin_first_name))
            .bind(("last_name", input.admin_last_name))
            .bind(("email", input.admin_email.to_lowercase()))
            .bind(("password_hash", input.admin_password_hash));

        for (i, record) in input.admin_permissions.iter().enumerate() {
            let subs: Vec<SubresourcePermissionRow> = record
                .subresource_permissions
                .iter()
                .map(SubresourcePermissionRow::from_model)
                .collect();
            builder = builder
                .bind((
                    format!("perm_id_{i}"),
                    permission_record_id(role_id, &record.resource_id),
                ))
                .bind((format!("perm_uuid_{i}"), Uuid::new_v4().to_string()))
                .bind((format!("perm_resource_{i}"), record.resource_id.clone()))
                .bind((format!("perm_cr_{i}"), record.flags.can_read))
                .bind((format!("perm_cc_{i}"), record.flags.can_create))
                .bind((format!("perm_cu_{i}"), record.flags.can_update))
                .bind((format!("perm_cd_{i}"), record.flags.can_delete))
                .bind((format!("perm_subs_{i}"), subs));
        }

        if let Some(profile) = &input.org_profile {
            let addresses: Vec<OrgAddressRow> = profile
                .addresses
                .iter()
                .map(OrgAddressRow::from_model)
                .collect();
            builder = builder
                .bind(("org_id", org_id.to_string()))
                .bind(("legal_id", profile.legal_id.clone()))
                .bind(("org_name", profile.org_name.clone()))
                .bind(("country", profile.country.clone()))
                .bind(("addresses", addresses))
                .bind(("emails", profile.emails.clone()))
                .bind(("phones", profile.phones.clone()));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        info!(
            corp_id = %corp_id,
            corp_name = %input.corp.corp_name,
            with_org,
            "Provisioned tenant"
        );

        // Read back through the ordinary repositories.
        let corp = SurrealCorpRepository::new(self.db.clone())
            .get_by_id(corp_id)
            .await?;
        let admin_role = SurrealRoleRepository::new(self.db.clone())
            .get_by_id(role_id)
            .await?;
        let admin_user = SurrealUserRepository::new(self.db.clone())
            .get_by_id(user_id)
            .await?;
        let org = if with_org {
            SurrealOrgRepository::new(self.db.clone())
                .get_by_corp(corp_id)
                .await?
        } else {
            None
        };

        Ok(ProvisionedCorp {
            corp,
            admin_role,
            admin_user,
            org,
        })
    }

    async fn delete_corp_cascade(&self, corp_id: Uuid) -> KontorResult<()> {
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE permission WHERE role_id IN \
                     (SELECT VALUE meta::id(id) FROM role \
                      WHERE corp_id = $corp_id); \
                 DELETE role WHERE corp_id = $corp_id; \
                 DELETE user WHERE corp_id = $corp_id; \
                 DELETE org WHERE corp_id = $corp_id; \
                 DELETE type::record('corp', $corp_id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("corp_id", corp_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        info!(corp_id = %corp_id, "Deleted corp and all related data");

        Ok(())
    }
}
