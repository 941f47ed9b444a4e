//! SurrealDB repository implementations.

mod corp;
mod org;
mod permission;
mod provisioning;
mod resource;
mod role;
mod user;

pub use corp::SurrealCorpRepository;
pub use org::SurrealOrgRepository;
pub use permission::SurrealPermissionRepository;
pub use provisioning::SurrealProvisioningRepository;
pub use resource::SurrealResourceCatalog;
pub use role::SurrealRoleRepository;
pub use user::SurrealUserRepository;
