//! Tenant lifecycle — corp creation, organization onboarding, and
//! teardown.
//!
//! Both creation paths end in a single provisioning transaction that
//! writes the corp, its system admin role with full-CRUD permission
//! rows, and the admin user together. Onboarding additionally resolves
//! the organization profile from the external directory before any row
//! is written: a failed lookup leaves nothing behind.

use kontor_core::error::{KontorError, KontorResult};
use kontor_core::models::corp::{Corp, CreateCorp, UpdateCorp};
use kontor_core::models::org::OrgProfile;
use kontor_core::models::permission::{CrudFlags, PermissionRecord};
use kontor_core::repository::{
    CorpProvisioning, CorpRepository, OrgRepository, ProvisionedCorp, ProvisioningRepository,
    ResourceCatalog, UserRepository,
};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::RbacConfig;
use crate::error::RbacError;
use crate::guard::validate_grant;
use crate::password::hash_password;
use crate::reconcile::full_subresources;

/// External organization directory lookup seam.
///
/// Implementations wrap whichever registry provider is configured; the
/// tenant service only cares about profile-or-error.
pub trait OrgDirectory: Send + Sync {
    fn lookup(
        &self,
        legal_id: &str,
        country: &str,
    ) -> impl Future<Output = Result<OrgProfile, OrgDirectoryError>> + Send;
}

#[derive(Debug, Error)]
pub enum OrgDirectoryError {
    #[error("no organization registered under {legal_id}")]
    NotFound { legal_id: String },

    #[error("organization directory unavailable: {0}")]
    Unavailable(String),
}

/// Input for the plain corp-management creation path.
#[derive(Debug, Clone)]
pub struct NewCorp {
    pub corp_name: String,
    pub allowed_resources: Vec<String>,
    pub admin_first_name: String,
    pub admin_last_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

/// Input for self-service organization onboarding.
#[derive(Debug, Clone)]
pub struct RegisterOrganization {
    pub legal_id: String,
    pub country: String,
    pub corp_name: String,
    pub allowed_resources: Vec<String>,
    pub admin_first_name: String,
    pub admin_last_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

pub struct TenantService<Pv, C, U, O, Res, D>
where
    Pv: ProvisioningRepository,
    C: CorpRepository,
    U: UserRepository,
    O: OrgRepository,
    Res: ResourceCatalog,
    D: OrgDirectory,
{
    config: RbacConfig,
    provisioning: Pv,
    corps: C,
    users: U,
    orgs: O,
    catalog: Res,
    directory: D,
}

impl<Pv, C, U, O, Res, D> TenantService<Pv, C, U, O, Res, D>
where
    Pv: ProvisioningRepository,
    C: CorpRepository,
    U: UserRepository,
    O: OrgRepository,
    Res: ResourceCatalog,
    D: OrgDirectory,
{
    pub fn new(
        config: RbacConfig,
        provisioning: Pv,
        corps: C,
        users: U,
        orgs: O,
        catalog: Res,
        directory: D,
    ) -> Self {
        Self {
            config,
            provisioning,
            corps,
            users,
            orgs,
            catalog,
            directory,
        }
    }

    /// Create a corp on behalf of an existing tenant.
    ///
    /// The new corp's allow-list must be a subset of the requesting
    /// corp's own ceiling: a tenant can never hand out more than it
    /// holds.
    pub async fn create_corp(
        &self,
        requesting_corp_id: Uuid,
        input: NewCorp,
    ) -> KontorResult<ProvisionedCorp> {
        require_fields(&[
            ("corp_name", &input.corp_name),
            ("admin_first_name", &input.admin_first_name),
            ("admin_last_name", &input.admin_last_name),
            ("admin_email", &input.admin_email),
            ("admin_password", &input.admin_password),
        ])?;
        self.check_password(&input.admin_password)?;
        self.check_email_free(&input.admin_email).await?;

        let requesting = self.corps.get_by_id(requesting_corp_id).await?;
        validate_grant(&requesting, &input.allowed_resources)?;

        let provisioned = self
            .provision(
                CreateCorp {
                    corp_name: input.corp_name,
                    allowed_resources: input.allowed_resources,
                },
                input.admin_first_name,
                input.admin_last_name,
                input.admin_email,
                &input.admin_password,
                None,
            )
            .await?;

        info!(
            corp_id = %provisioned.corp.id,
            requesting_corp_id = %requesting_corp_id,
            "Created corporation"
        );

        Ok(provisioned)
    }

    /// Onboard a new organization end to end.
    ///
    /// The directory lookup runs before the provisioning transaction;
    /// on any failure no row exists for the submitted corp name.
    pub async fn register_organization(
        &self,
        requesting_corp_id: Uuid,
        input: RegisterOrganization,
    ) -> KontorResult<ProvisionedCorp> {
        require_fields(&[
            ("legal_id", &input.legal_id),
            ("country", &input.country),
            ("corp_name", &input.corp_name),
            ("admin_first_name", &input.admin_first_name),
            ("admin_last_name", &input.admin_last_name),
            ("admin_email", &input.admin_email),
            ("admin_password", &input.admin_password),
        ])?;
        self.check_password(&input.admin_password)?;
        self.check_email_free(&input.admin_email).await?;

        if self.orgs.get_by_legal_id(&input.legal_id).await?.is_some() {
            return Err(KontorError::Conflict {
                message: format!("organization {} is already registered", input.legal_id),
            });
        }

        let requesting = self.corps.get_by_id(requesting_corp_id).await?;
        validate_grant(&requesting, &input.allowed_resources)?;

        let profile = match self.directory.lookup(&input.legal_id, &input.country).await {
            Ok(profile) => profile,
            Err(OrgDirectoryError::NotFound { legal_id }) => {
                warn!(legal_id = %legal_id, "Organization not found in directory");
                return Err(KontorError::Validation {
                    message: format!("no organization registered under {legal_id}"),
                });
            }
            Err(OrgDirectoryError::Unavailable(msg)) => {
                return Err(RbacError::OrgLookup(msg).into());
            }
        };

        let provisioned = self
            .provision(
                CreateCorp {
                    corp_name: input.corp_name,
                    allowed_resources: input.allowed_resources,
                },
                input.admin_first_name,
                input.admin_last_name,
                input.admin_email,
                &input.admin_password,
                Some(profile),
            )
            .await?;

        info!(
            corp_id = %provisioned.corp.id,
            legal_id = %input.legal_id,
            "Registered organization"
        );

        Ok(provisioned)
    }

    /// Update a corp; a new allow-list is guarded against the
    /// requesting corp's ceiling.
    pub async fn update_corp(
        &self,
        requesting_corp_id: Uuid,
        corp_id: Uuid,
        input: UpdateCorp,
    ) -> KontorResult<Corp> {
        if let Some(allowed) = &input.allowed_resources {
            let requesting = self.corps.get_by_id(requesting_corp_id).await?;
            validate_grant(&requesting, allowed)?;
        }

        self.corps.update(corp_id, input).await
    }

    /// Delete a corp and everything under it.
    pub async fn delete_corp(&self, corp_id: Uuid) -> KontorResult<()> {
        // Surface NotFound before touching the cascade.
        let corp = self.corps.get_by_id(corp_id).await?;

        self.provisioning.delete_corp_cascade(corp.id).await?;

        info!(corp_id = %corp_id, "Deleted corporation");

        Ok(())
    }

    /// Build the admin permission set and run the provisioning
    /// transaction. The system role gets full CRUD on every
    /// allow-listed resource, including every declared sub-route.
    async fn provision(
        &self,
        corp: CreateCorp,
        first_name: String,
        last_name: String,
        email: String,
        password: &str,
        org_profile: Option<OrgProfile>,
    ) -> KontorResult<ProvisionedCorp> {
        let resources = self.catalog.find_by_ids(&corp.allowed_resources).await?;
        let admin_permissions: Vec<PermissionRecord> = resources
            .iter()
            .map(|resource| PermissionRecord {
                resource_id: resource.resource_id.clone(),
                flags: CrudFlags::ALL,
                subresource_permissions: full_subresources(resource),
            })
            .collect();

        let admin_role_description = self.config.admin_role_description(&corp.corp_name);
        let password_hash = hash_password(password, self.config.pepper.as_deref())?;

        self.provisioning
            .provision_corp(CorpProvisioning {
                corp,
                admin_role_name: self.config.admin_role_name.clone(),
                admin_role_description,
                admin_permissions,
                admin_first_name: first_name,
                admin_last_name: last_name,
                admin_email: email,
                admin_password_hash: password_hash,
                org_profile,
            })
            .await
    }

    fn check_password(&self, password: &str) -> Result<(), RbacError> {
        if password.len() < self.config.min_password_length {
            return Err(RbacError::WeakPassword {
                min: self.config.min_password_length,
            });
        }
        Ok(())
    }

    async fn check_email_free(&self, email: &str) -> KontorResult<()> {
        if self.users.get_by_email(email).await?.is_some() {
            return Err(KontorError::Conflict {
                message: format!("a user with email {email} already exists"),
            });
        }
        Ok(())
    }
}

/// Reject blank required fields, naming every missing one.
fn require_fields(fields: &[(&str, &str)]) -> KontorResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(KontorError::Validation {
            message: format!("missing required fields: {}", missing.join(", ")),
        })
    }
}
