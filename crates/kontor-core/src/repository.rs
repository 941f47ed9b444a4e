//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The services in `kontor-rbac`
//! are generic over these traits so they carry no dependency on the
//! storage crate.

use uuid::Uuid;

use crate::error::KontorResult;
use crate::models::{
    corp::{Corp, CreateCorp, UpdateCorp},
    org::{Org, OrgProfile},
    permission::{Permission, PermissionRecord},
    resource::{CreateResource, Resource},
    role::{CreateRole, Role, UpdateRole},
    user::{CreateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Resource catalog (global scope, admin-seeded, read-only for tenants)
// ---------------------------------------------------------------------------

pub trait ResourceCatalog: Send + Sync {
    /// Seed/admin path; tenants never call this.
    fn create(&self, input: CreateResource) -> impl Future<Output = KontorResult<Resource>> + Send;

    fn get(&self, resource_id: &str) -> impl Future<Output = KontorResult<Resource>> + Send;

    /// Only `is_public = true` entries — the set any corp may request
    /// access to.
    fn list_public(&self) -> impl Future<Output = KontorResult<Vec<Resource>>> + Send;

    fn list_all(&self) -> impl Future<Output = KontorResult<Vec<Resource>>> + Send;

    /// Resolve a list of catalog codes. Unknown ids are silently
    /// dropped, not an error, to tolerate stale allow-lists.
    fn find_by_ids(
        &self,
        resource_ids: &[String],
    ) -> impl Future<Output = KontorResult<Vec<Resource>>> + Send;
}

// ---------------------------------------------------------------------------
// Corp (tenant) scope
// ---------------------------------------------------------------------------

pub trait CorpRepository: Send + Sync {
    fn create(&self, input: CreateCorp) -> impl Future<Output = KontorResult<Corp>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = KontorResult<Corp>> + Send;
    fn get_by_name(&self, corp_name: &str) -> impl Future<Output = KontorResult<Corp>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateCorp,
    ) -> impl Future<Output = KontorResult<Corp>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = KontorResult<PaginatedResult<Corp>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = KontorResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = KontorResult<Role>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateRole,
    ) -> impl Future<Output = KontorResult<Role>> + Send;
    /// Deletes the role and its permission rows in one transaction.
    fn delete(&self, id: Uuid) -> impl Future<Output = KontorResult<()>> + Send;
    fn list_by_corp(&self, corp_id: Uuid) -> impl Future<Output = KontorResult<Vec<Role>>> + Send;
    /// The corp's auto-provisioned system role, if present.
    fn find_system_role(
        &self,
        corp_id: Uuid,
    ) -> impl Future<Output = KontorResult<Option<Role>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    /// Find-or-create the `(role_id, resource_id)` row and
    /// unconditionally overwrite its flags and sub-resource array.
    fn put(
        &self,
        role_id: Uuid,
        record: PermissionRecord,
    ) -> impl Future<Output = KontorResult<Permission>> + Send;

    fn get(
        &self,
        role_id: Uuid,
        resource_id: &str,
    ) -> impl Future<Output = KontorResult<Option<Permission>>> + Send;

    fn list_by_role(
        &self,
        role_id: Uuid,
    ) -> impl Future<Output = KontorResult<Vec<Permission>>> + Send;

    /// Full replace: after the call the role's rows are exactly
    /// `records`, atomically — a crash can never leave the role with
    /// omitted rows deleted but the new set missing.
    fn replace_for_role(
        &self,
        role_id: Uuid,
        records: Vec<PermissionRecord>,
    ) -> impl Future<Output = KontorResult<Vec<Permission>>> + Send;

    fn delete_by_role(&self, role_id: Uuid) -> impl Future<Output = KontorResult<()>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = KontorResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = KontorResult<User>> + Send;
    fn get_by_email(&self, email: &str)
    -> impl Future<Output = KontorResult<Option<User>>> + Send;
    fn list_by_corp(&self, corp_id: Uuid) -> impl Future<Output = KontorResult<Vec<User>>> + Send;
    /// Rebind a user to a different role (`None` clears the binding).
    fn assign_role(
        &self,
        id: Uuid,
        role_id: Option<Uuid>,
    ) -> impl Future<Output = KontorResult<User>> + Send;
}

pub trait OrgRepository: Send + Sync {
    fn get_by_corp(&self, corp_id: Uuid) -> impl Future<Output = KontorResult<Option<Org>>> + Send;
    fn get_by_legal_id(
        &self,
        legal_id: &str,
    ) -> impl Future<Output = KontorResult<Option<Org>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant provisioning (cross-entity transactions)
// ---------------------------------------------------------------------------

/// Everything written when a tenant comes into existence.
#[derive(Debug, Clone)]
pub struct CorpProvisioning {
    pub corp: CreateCorp,
    pub admin_role_name: String,
    pub admin_role_description: String,
    /// Full-CRUD rows for the admin role, already reconciled against
    /// the catalog.
    pub admin_permissions: Vec<PermissionRecord>,
    pub admin_first_name: String,
    pub admin_last_name: String,
    pub admin_email: String,
    pub admin_password_hash: String,
    /// Org profile from the external directory; absent on the plain
    /// corp-management path.
    pub org_profile: Option<OrgProfile>,
}

/// The rows produced by a successful provisioning transaction.
#[derive(Debug, Clone)]
pub struct ProvisionedCorp {
    pub corp: Corp,
    pub admin_role: Role,
    pub admin_user: User,
    pub org: Option<Org>,
}

pub trait ProvisioningRepository: Send + Sync {
    /// Write corp + system admin role + permissions + admin user (+
    /// org profile) in a single transaction. Partial state is never
    /// observable: any failure rolls back every prior write.
    fn provision_corp(
        &self,
        input: CorpProvisioning,
    ) -> impl Future<Output = KontorResult<ProvisionedCorp>> + Send;

    /// Delete the corp and cascade to its org, users, roles, and
    /// permission rows in a single transaction.
    fn delete_corp_cascade(&self, corp_id: Uuid)
    -> impl Future<Output = KontorResult<()>> + Send;
}
