//! Integration tests for the tenant lifecycle service against
//! in-memory SurrealDB, with a stubbed organization directory.

use kontor_core::error::KontorError;
use kontor_core::models::corp::{CreateCorp, UpdateCorp};
use kontor_core::models::org::{OrgAddress, OrgProfile};
use kontor_core::models::permission::CrudFlags;
use kontor_core::models::resource::{CreateResource, Subresource};
use kontor_core::repository::{
    CorpRepository, OrgRepository, PermissionRepository, ResourceCatalog, RoleRepository,
    UserRepository,
};
use kontor_db::repository::{
    SurrealCorpRepository, SurrealOrgRepository, SurrealPermissionRepository,
    SurrealProvisioningRepository, SurrealResourceCatalog, SurrealRoleRepository,
    SurrealUserRepository,
};
use kontor_rbac::tenant::{NewCorp, OrgDirectory, OrgDirectoryError, RegisterOrganization};
use kontor_rbac::{RbacConfig, TenantService};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Scripted directory stand-in.
#[derive(Clone)]
enum StubDirectory {
    Found(OrgProfile),
    NotFound,
    Down,
}

impl OrgDirectory for StubDirectory {
    async fn lookup(&self, legal_id: &str, _country: &str) -> Result<OrgProfile, OrgDirectoryError> {
        match self {
            StubDirectory::Found(profile) => Ok(profile.clone()),
            StubDirectory::NotFound => Err(OrgDirectoryError::NotFound {
                legal_id: legal_id.to_string(),
            }),
            StubDirectory::Down => {
                Err(OrgDirectoryError::Unavailable("connection refused".into()))
            }
        }
    }
}

fn profile() -> OrgProfile {
    OrgProfile {
        legal_id: "556677-8899".into(),
        org_name: "Nordwind Freight AB".into(),
        country: "SE".into(),
        addresses: vec![OrgAddress {
            street: "Hamngatan 4".into(),
            municipality: "Göteborg".into(),
            zip: "41101".into(),
            city: "Göteborg".into(),
        }],
        emails: vec!["info@nordwind.example".into()],
        phones: vec!["+46 31 987 654".into()],
    }
}

/// Helper: seeded catalog plus a root corp whose ceiling covers
/// VEHICLES and CUSTOMERS but not BILLING.
async fn setup() -> (Surreal<Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    kontor_db::run_migrations(&db).await.unwrap();

    let catalog = SurrealResourceCatalog::new(db.clone());
    catalog
        .create(CreateResource {
            resource_id: "VEHICLES".into(),
            title: "Vehicles".into(),
            description: "Fleet".into(),
            icon: "truck".into(),
            route: "/vehicles".into(),
            position: 1,
            is_public: true,
            subresources: vec![Subresource {
                route: "documents".into(),
                title: "Documents".into(),
                icon: "folder".into(),
            }],
        })
        .await
        .unwrap();
    catalog
        .create(CreateResource {
            resource_id: "CUSTOMERS".into(),
            title: "Customers".into(),
            description: "CRM".into(),
            icon: "people".into(),
            route: "/customers".into(),
            position: 2,
            is_public: true,
            subresources: Vec::new(),
        })
        .await
        .unwrap();
    catalog
        .create(CreateResource {
            resource_id: "BILLING".into(),
            title: "Billing".into(),
            description: "Internal".into(),
            icon: "receipt".into(),
            route: "/billing".into(),
            position: 3,
            is_public: false,
            subresources: Vec::new(),
        })
        .await
        .unwrap();

    let root = SurrealCorpRepository::new(db.clone())
        .create(CreateCorp {
            corp_name: "Root Corp".into(),
            allowed_resources: vec!["VEHICLES".into(), "CUSTOMERS".into()],
        })
        .await
        .unwrap();

    (db, root.id)
}

fn service(
    db: &Surreal<Db>,
    directory: StubDirectory,
) -> TenantService<
    SurrealProvisioningRepository<Db>,
    SurrealCorpRepository<Db>,
    SurrealUserRepository<Db>,
    SurrealOrgRepository<Db>,
    SurrealResourceCatalog<Db>,
    StubDirectory,
> {
    TenantService::new(
        RbacConfig::default(),
        SurrealProvisioningRepository::new(db.clone()),
        SurrealCorpRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealOrgRepository::new(db.clone()),
        SurrealResourceCatalog::new(db.clone()),
        directory,
    )
}

fn new_corp(name: &str, allowed: Vec<String>, email: &str) -> NewCorp {
    NewCorp {
        corp_name: name.into(),
        allowed_resources: allowed,
        admin_first_name: "Ada".into(),
        admin_last_name: "Lovelace".into(),
        admin_email: email.into(),
        admin_password: "correct horse battery".into(),
    }
}

fn registration(legal_id: &str, corp_name: &str, email: &str) -> RegisterOrganization {
    RegisterOrganization {
        legal_id: legal_id.into(),
        country: "SE".into(),
        corp_name: corp_name.into(),
        allowed_resources: vec!["VEHICLES".into()],
        admin_first_name: "Grace".into(),
        admin_last_name: "Hopper".into(),
        admin_email: email.into(),
        admin_password: "correct horse battery".into(),
    }
}

// ---------------------------------------------------------------------------
// Corp creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_corp_provisions_admin_with_full_crud() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::NotFound);

    let provisioned = svc
        .create_corp(
            root_id,
            new_corp(
                "Acme",
                vec!["VEHICLES".into(), "CUSTOMERS".into()],
                "ada@acme.example",
            ),
        )
        .await
        .unwrap();

    assert!(provisioned.admin_role.is_system);
    assert_eq!(provisioned.admin_role.name, "Admin");
    assert_eq!(
        provisioned.admin_role.description,
        "Corporation Acme administrator"
    );
    assert_eq!(
        provisioned.admin_user.role_id,
        Some(provisioned.admin_role.id)
    );
    assert!(provisioned.admin_user.password_hash.starts_with("$argon2"));
    assert!(provisioned.org.is_none());

    // Exactly one system role, full CRUD everywhere including the
    // declared sub-route.
    let system = SurrealRoleRepository::new(db.clone())
        .find_system_role(provisioned.corp.id)
        .await
        .unwrap();
    assert!(system.is_some());

    let rows = SurrealPermissionRepository::new(db)
        .list_by_role(provisioned.admin_role.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|p| p.flags == CrudFlags::ALL));

    let vehicles = rows.iter().find(|p| p.resource_id == "VEHICLES").unwrap();
    assert_eq!(vehicles.subresource_permissions.len(), 1);
    assert_eq!(vehicles.subresource_permissions[0].flags, CrudFlags::ALL);
}

#[tokio::test]
async fn peppered_admin_hash_verifies_with_the_same_config() {
    let (db, root_id) = setup().await;
    let svc = TenantService::new(
        RbacConfig {
            pepper: Some("corp-wide-pepper".into()),
            ..Default::default()
        },
        SurrealProvisioningRepository::new(db.clone()),
        SurrealCorpRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealOrgRepository::new(db.clone()),
        SurrealResourceCatalog::new(db.clone()),
        StubDirectory::NotFound,
    );

    let provisioned = svc
        .create_corp(root_id, new_corp("Acme", vec![], "ada@acme.example"))
        .await
        .unwrap();

    // The stored hash came out of the one configured hashing path, so
    // the login check with the same pepper must accept the password
    // and reject it without the pepper.
    let hash = &provisioned.admin_user.password_hash;
    assert!(
        kontor_rbac::password::verify_password(
            "correct horse battery",
            hash,
            Some("corp-wide-pepper"),
        )
        .unwrap()
    );
    assert!(
        !kontor_rbac::password::verify_password("correct horse battery", hash, None).unwrap()
    );
}

#[tokio::test]
async fn create_corp_enforces_the_requesting_corps_ceiling() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::NotFound);

    let err = svc
        .create_corp(
            root_id,
            new_corp(
                "Overreach",
                vec!["VEHICLES".into(), "BILLING".into()],
                "x@overreach.example",
            ),
        )
        .await
        .unwrap_err();

    match err {
        KontorError::DisallowedResources { resource_ids } => {
            assert_eq!(resource_ids, vec!["BILLING".to_string()]);
        }
        other => panic!("expected DisallowedResources, got {other:?}"),
    }

    let lookup = SurrealCorpRepository::new(db).get_by_name("Overreach").await;
    assert!(lookup.is_err(), "no corp row after a rejected request");
}

#[tokio::test]
async fn create_corp_rejects_duplicate_admin_email() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::NotFound);

    svc.create_corp(root_id, new_corp("First", vec![], "shared@example.com"))
        .await
        .unwrap();

    let err = svc
        .create_corp(root_id, new_corp("Second", vec![], "shared@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, KontorError::Conflict { .. }));
}

#[tokio::test]
async fn create_corp_rejects_short_password() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::NotFound);

    let mut input = new_corp("Weak", vec![], "weak@example.com");
    input.admin_password = "short".into();

    let err = svc.create_corp(root_id, input).await.unwrap_err();
    assert!(matches!(err, KontorError::Validation { .. }));
}

#[tokio::test]
async fn create_corp_names_missing_fields() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::NotFound);

    let mut input = new_corp("", vec![], "ok@example.com");
    input.admin_first_name = String::new();

    let err = svc.create_corp(root_id, input).await.unwrap_err();
    match err {
        KontorError::Validation { message } => {
            assert!(message.contains("corp_name"));
            assert!(message.contains("admin_first_name"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Organization onboarding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_organization_attaches_the_directory_profile() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::Found(profile()));

    let provisioned = svc
        .register_organization(
            root_id,
            registration("556677-8899", "Nordwind", "grace@nordwind.example"),
        )
        .await
        .unwrap();

    let org = provisioned.org.expect("org row attached");
    assert_eq!(org.legal_id, "556677-8899");
    assert_eq!(org.org_name, "Nordwind Freight AB");
    assert_eq!(org.corp_id, provisioned.corp.id);
    assert!(provisioned.admin_role.is_system);
}

#[tokio::test]
async fn failed_directory_lookup_leaves_no_rows_behind() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::Down);

    let err = svc
        .register_organization(
            root_id,
            registration("556677-8899", "Nordwind", "grace@nordwind.example"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, KontorError::Internal(_)));

    // Observable state is a full rollback: the corp name resolves to
    // nothing and the admin email stays free.
    let corp = SurrealCorpRepository::new(db.clone()).get_by_name("Nordwind").await;
    assert!(corp.is_err());

    let user = SurrealUserRepository::new(db)
        .get_by_email("grace@nordwind.example")
        .await
        .unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn unknown_legal_id_is_a_validation_error() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::NotFound);

    let err = svc
        .register_organization(
            root_id,
            registration("000000-0000", "Ghost", "ghost@example.com"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, KontorError::Validation { .. }));
}

#[tokio::test]
async fn duplicate_legal_id_is_a_conflict() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::Found(profile()));

    svc.register_organization(
        root_id,
        registration("556677-8899", "Nordwind", "grace@nordwind.example"),
    )
    .await
    .unwrap();

    let err = svc
        .register_organization(
            root_id,
            registration("556677-8899", "Nordwind Again", "other@nordwind.example"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, KontorError::Conflict { .. }));
}

// ---------------------------------------------------------------------------
// Update and teardown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_corp_guards_a_new_allow_list() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::NotFound);

    let provisioned = svc
        .create_corp(
            root_id,
            new_corp("Acme", vec!["VEHICLES".into()], "ada@acme.example"),
        )
        .await
        .unwrap();

    let err = svc
        .update_corp(
            root_id,
            provisioned.corp.id,
            UpdateCorp {
                allowed_resources: Some(vec!["BILLING".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, KontorError::DisallowedResources { .. }));

    // Deactivation alone needs no guard.
    let updated = svc
        .update_corp(
            root_id,
            provisioned.corp.id,
            UpdateCorp {
                corp_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.corp_active);
}

#[tokio::test]
async fn delete_corp_cascades_the_whole_tenant() {
    let (db, root_id) = setup().await;
    let svc = service(&db, StubDirectory::Found(profile()));

    let provisioned = svc
        .register_organization(
            root_id,
            registration("556677-8899", "Nordwind", "grace@nordwind.example"),
        )
        .await
        .unwrap();
    let corp_id = provisioned.corp.id;

    svc.delete_corp(corp_id).await.unwrap();

    assert!(SurrealCorpRepository::new(db.clone()).get_by_id(corp_id).await.is_err());
    assert!(
        SurrealRoleRepository::new(db.clone())
            .list_by_corp(corp_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        SurrealOrgRepository::new(db)
            .get_by_corp(corp_id)
            .await
            .unwrap()
            .is_none()
    );

    let missing = svc.delete_corp(corp_id).await;
    assert!(matches!(missing, Err(KontorError::NotFound { .. })));
}
