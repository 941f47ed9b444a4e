//! Integration tests for the role service against in-memory SurrealDB.

use kontor_core::error::KontorError;
use kontor_core::models::corp::CreateCorp;
use kontor_core::models::permission::{CrudFlags, PermissionGrant, SubresourceGrant};
use kontor_core::models::resource::{CreateResource, Subresource};
use kontor_core::models::role::{CreateRole, UpdateRole};
use kontor_core::repository::{CorpRepository, PermissionRepository, ResourceCatalog, RoleRepository};
use kontor_db::repository::{
    SurrealCorpRepository, SurrealPermissionRepository, SurrealResourceCatalog,
    SurrealRoleRepository,
};
use kontor_rbac::RoleService;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: in-memory DB, migrations, seeded catalog, one corp allowed
/// VEHICLES + CUSTOMERS + BILLING (BILLING is non-public).
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
            subresources: vec![
                Subresource {
                    route: "documents".into(),
                    title: "Documents".into(),
                    icon: "folder".into(),
                },
                Subresource {
                    route: "notes".into(),
                    title: "Notes".into(),
                    icon: "note".into(),
                },
            ],
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
            description: "Internal billing".into(),
            icon: "receipt".into(),
            route: "/billing".into(),
            position: 3,
            is_public: false,
            subresources: Vec::new(),
        })
        .await
        .unwrap();

    let corps = SurrealCorpRepository::new(db.clone());
    let corp = corps
        .create(CreateCorp {
            corp_name: "Acme".into(),
            allowed_resources: vec!["VEHICLES".into(), "CUSTOMERS".into(), "BILLING".into()],
        })
        .await
        .unwrap();

    (db, corp.id)
}

fn service(
    db: &Surreal<Db>,
) -> RoleService<
    SurrealRoleRepository<Db>,
    SurrealPermissionRepository<Db>,
    SurrealCorpRepository<Db>,
    SurrealResourceCatalog<Db>,
> {
    RoleService::new(
        SurrealRoleRepository::new(db.clone()),
        SurrealPermissionRepository::new(db.clone()),
        SurrealCorpRepository::new(db.clone()),
        SurrealResourceCatalog::new(db.clone()),
    )
}

async fn system_role(db: &Surreal<Db>, corp_id: Uuid) -> Uuid {
    SurrealRoleRepository::new(db.clone())
        .create(CreateRole {
            corp_id,
            name: "Admin".into(),
            description: "Corp admin".into(),
            is_system: true,
        })
        .await
        .unwrap()
        .id
}

// ---------------------------------------------------------------------------
// Role creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_role_seeds_all_false_rows_for_every_allowed_resource() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);

    let (role, seeded) = svc.create_role(corp_id, "Dispatcher", "Fleet dispatch").await.unwrap();

    assert!(!role.is_system);
    assert_eq!(seeded.len(), 3, "one row per allow-listed resource");
    assert!(seeded.iter().all(|p| p.flags == CrudFlags::NONE));

    // Sub-resource-bearing resources enumerate every declared route,
    // all false.
    let vehicles = seeded.iter().find(|p| p.resource_id == "VEHICLES").unwrap();
    let mut routes: Vec<&str> = vehicles
        .subresource_permissions
        .iter()
        .map(|s| s.subresource_route.as_str())
        .collect();
    routes.sort_unstable();
    assert_eq!(routes, vec!["documents", "notes"]);
    assert!(
        vehicles
            .subresource_permissions
            .iter()
            .all(|s| s.flags == CrudFlags::NONE)
    );

    let customers = seeded.iter().find(|p| p.resource_id == "CUSTOMERS").unwrap();
    assert!(customers.subresource_permissions.is_empty());
}

#[tokio::test]
async fn create_role_rejects_blank_name() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);

    let err = svc.create_role(corp_id, "  ", "whatever").await.unwrap_err();
    assert!(matches!(err, KontorError::Validation { .. }));
}

// ---------------------------------------------------------------------------
// System role immutability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn system_role_rejects_every_mutation() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);
    let admin_id = system_role(&db, corp_id).await;

    let update = svc
        .update_role(
            admin_id,
            UpdateRole {
                name: Some("Renamed".into()),
                description: None,
            },
        )
        .await;
    assert!(matches!(update, Err(KontorError::Forbidden { .. })));

    let delete = svc.delete_role(admin_id).await;
    assert!(matches!(delete, Err(KontorError::Forbidden { .. })));

    let replace = svc.replace_permissions(admin_id, vec![]).await;
    assert!(matches!(replace, Err(KontorError::Forbidden { .. })));

    let upsert = svc
        .upsert_permissions(
            admin_id,
            vec![PermissionGrant::uniform("VEHICLES", CrudFlags::ALL)],
        )
        .await;
    assert!(matches!(upsert, Err(KontorError::Forbidden { .. })));
}

#[tokio::test]
async fn missing_role_is_not_found_before_any_guard() {
    let (db, _) = setup().await;
    let svc = service(&db);

    let err = svc.delete_role(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, KontorError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Allow-list guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn grant_outside_allow_list_names_the_offenders() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);

    let (role, _) = svc.create_role(corp_id, "Ops", "ops").await.unwrap();

    let err = svc
        .replace_permissions(
            role.id,
            vec![
                PermissionGrant::uniform("VEHICLES", CrudFlags::ALL),
                PermissionGrant::uniform("PAYROLL", CrudFlags::ALL),
                PermissionGrant::uniform("PAYROLL", CrudFlags::NONE),
                PermissionGrant::uniform("HR", CrudFlags::ALL),
            ],
        )
        .await
        .unwrap_err();

    match err {
        KontorError::DisallowedResources { resource_ids } => {
            // Deduplicated, first-seen order.
            assert_eq!(resource_ids, vec!["PAYROLL".to_string(), "HR".to_string()]);
        }
        other => panic!("expected DisallowedResources, got {other:?}"),
    }

    // The rejected request must not have altered the seeded rows.
    let rows = SurrealPermissionRepository::new(db)
        .list_by_role(role.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|p| p.flags == CrudFlags::NONE));
}

// ---------------------------------------------------------------------------
// Bulk replace
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replace_permissions_is_idempotent() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);

    let (role, _) = svc.create_role(corp_id, "Viewer", "view only").await.unwrap();

    let grants = vec![
        PermissionGrant {
            resource_id: "VEHICLES".into(),
            can_read: true,
            can_create: false,
            can_update: true,
            can_delete: false,
            subresources: vec![SubresourceGrant {
                route: "documents".into(),
                can_read: true,
                can_create: false,
                can_update: false,
                can_delete: false,
            }],
        },
        PermissionGrant::uniform("CUSTOMERS", CrudFlags::ALL),
    ];

    let first = svc.replace_permissions(role.id, grants.clone()).await.unwrap();
    let second = svc.replace_permissions(role.id, grants).await.unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.resource_id, b.resource_id);
        assert_eq!(a.flags, b.flags);
        assert_eq!(
            a.subresource_permissions.len(),
            b.subresource_permissions.len()
        );
    }
}

#[tokio::test]
async fn replace_reconciles_subresources_against_the_catalog() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);

    let (role, _) = svc.create_role(corp_id, "Clerk", "paperwork").await.unwrap();

    // Grant names "documents" plus an undeclared "attachments" route,
    // and omits "notes".
    let replaced = svc
        .replace_permissions(
            role.id,
            vec![PermissionGrant {
                resource_id: "VEHICLES".into(),
                can_read: true,
                can_create: true,
                can_update: false,
                can_delete: false,
                subresources: vec![
                    SubresourceGrant {
                        route: "documents".into(),
                        can_read: true,
                        can_create: true,
                        can_update: true,
                        can_delete: false,
                    },
                    SubresourceGrant {
                        route: "attachments".into(),
                        can_read: true,
                        can_create: true,
                        can_update: true,
                        can_delete: true,
                    },
                ],
            }],
        )
        .await
        .unwrap();

    assert_eq!(replaced.len(), 1);
    let subs = &replaced[0].subresource_permissions;

    // Catalog routes are authoritative: documents as granted, notes
    // defaulted to all-false, attachments dropped.
    assert_eq!(subs.len(), 2);
    let docs = subs.iter().find(|s| s.subresource_route == "documents").unwrap();
    assert!(docs.flags.can_update);
    assert!(!docs.flags.can_delete);
    let notes = subs.iter().find(|s| s.subresource_route == "notes").unwrap();
    assert_eq!(notes.flags, CrudFlags::NONE);
    assert!(!subs.iter().any(|s| s.subresource_route == "attachments"));
}

#[tokio::test]
async fn replace_drops_rows_for_omitted_resources() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);

    let (role, seeded) = svc.create_role(corp_id, "Slim", "narrow").await.unwrap();
    assert_eq!(seeded.len(), 3);

    let replaced = svc
        .replace_permissions(
            role.id,
            vec![PermissionGrant::uniform("CUSTOMERS", CrudFlags::ALL)],
        )
        .await
        .unwrap();

    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].resource_id, "CUSTOMERS");
}

// ---------------------------------------------------------------------------
// Incremental upsert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upsert_leaves_unnamed_resources_untouched() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);

    let (role, _) = svc.create_role(corp_id, "Mixed", "mixed").await.unwrap();

    svc.replace_permissions(
        role.id,
        vec![
            PermissionGrant::uniform("VEHICLES", CrudFlags::ALL),
            PermissionGrant::uniform("CUSTOMERS", CrudFlags::ALL),
        ],
    )
    .await
    .unwrap();

    // Flip only CUSTOMERS down to read-only.
    let after = svc
        .upsert_permissions(
            role.id,
            vec![PermissionGrant {
                resource_id: "CUSTOMERS".into(),
                can_read: true,
                can_create: false,
                can_update: false,
                can_delete: false,
                subresources: Vec::new(),
            }],
        )
        .await
        .unwrap();

    let vehicles = after.iter().find(|p| p.resource_id == "VEHICLES").unwrap();
    assert_eq!(vehicles.flags, CrudFlags::ALL, "unnamed resource untouched");

    let customers = after.iter().find(|p| p.resource_id == "CUSTOMERS").unwrap();
    assert!(customers.flags.can_read);
    assert!(!customers.flags.can_create);
}

#[tokio::test]
async fn upsert_skips_codes_missing_from_the_catalog() {
    let (db, corp_id) = setup().await;

    // Allow a code the catalog no longer carries.
    SurrealCorpRepository::new(db.clone())
        .update(
            corp_id,
            kontor_core::models::corp::UpdateCorp {
                allowed_resources: Some(vec!["VEHICLES".into(), "RETIRED".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let svc = service(&db);
    let (role, _) = svc.create_role(corp_id, "Stale", "stale ceiling").await.unwrap();

    let after = svc
        .upsert_permissions(
            role.id,
            vec![
                PermissionGrant::uniform("VEHICLES", CrudFlags::ALL),
                PermissionGrant::uniform("RETIRED", CrudFlags::ALL),
            ],
        )
        .await
        .unwrap();

    assert!(after.iter().any(|p| p.resource_id == "VEHICLES"));
    assert!(
        !after.iter().any(|p| p.resource_id == "RETIRED"),
        "codes the catalog cannot resolve are dropped, not stored"
    );
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_roles_shows_public_resources_in_catalog_order() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);

    let (role, _) = svc.create_role(corp_id, "Everything", "all three").await.unwrap();
    svc.replace_permissions(
        role.id,
        vec![
            PermissionGrant::uniform("CUSTOMERS", CrudFlags::ALL),
            PermissionGrant::uniform("VEHICLES", CrudFlags::ALL),
            PermissionGrant::uniform("BILLING", CrudFlags::ALL),
        ],
    )
    .await
    .unwrap();

    let listed = svc.list_roles(corp_id).await.unwrap();
    assert_eq!(listed.len(), 1);

    let entry = &listed[0];
    assert_eq!(entry.name, "Everything");
    assert!(!entry.is_system);

    // BILLING is non-public and must not surface.
    let ids: Vec<&str> = entry.resources.iter().map(|r| r.resource_id.as_str()).collect();
    assert_eq!(ids, vec!["VEHICLES", "CUSTOMERS"], "position order, public only");
    assert_eq!(entry.permissions_count, 2);
}

#[tokio::test]
async fn deleting_a_custom_role_cascades_its_rows() {
    let (db, corp_id) = setup().await;
    let svc = service(&db);

    let (role, _) = svc.create_role(corp_id, "Doomed", "short lived").await.unwrap();
    svc.delete_role(role.id).await.unwrap();

    let rows = SurrealPermissionRepository::new(db.clone())
        .list_by_role(role.id)
        .await
        .unwrap();
    assert!(rows.is_empty());

    let result = SurrealRoleRepository::new(db).get_by_id(role.id).await;
    assert!(result.is_err());
}
