//! Multi-tenant authorization services.
//!
//! The services here are generic over the repository traits in
//! `kontor-core` and enforce the tenancy rules: the corp allow-list
//! ceiling, system-role immutability, sub-resource reconciliation
//! against the catalog, and read-time permission evaluation.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod guard;
pub mod password;
pub mod reconcile;
pub mod roles;
pub mod tenant;
pub mod view;

pub use config::RbacConfig;
pub use error::RbacError;
pub use evaluator::Evaluator;
pub use roles::RoleService;
pub use tenant::{NewCorp, OrgDirectory, OrgDirectoryError, RegisterOrganization, TenantService};
pub use view::{Action, EffectivePermissions, ResourceView, RoleWithPermissions};
