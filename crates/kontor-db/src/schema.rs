//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings; resource record ids are the catalog
//! codes themselves. Permission record ids are the composite
//! `"{role_id}:{resource_id}"`, making the one-row-per-pair invariant
//! structural rather than merely indexed.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Resource catalog (global scope, admin-seeded)
-- =======================================================================
DEFINE TABLE resource SCHEMAFULL;
DEFINE FIELD title ON TABLE resource TYPE string;
DEFINE FIELD description ON TABLE resource TYPE string;
DEFINE FIELD icon ON TABLE resource TYPE string;
DEFINE FIELD route ON TABLE resource TYPE string;
DEFINE FIELD position ON TABLE resource TYPE int DEFAULT 0;
DEFINE FIELD is_public ON TABLE resource TYPE bool DEFAULT true;
DEFINE FIELD has_subresources ON TABLE resource TYPE bool DEFAULT false;
DEFINE FIELD subresources ON TABLE resource TYPE array DEFAULT [];
DEFINE FIELD subresources.* ON TABLE resource TYPE object;
DEFINE FIELD subresources.*.route ON TABLE resource TYPE string;
DEFINE FIELD subresources.*.title ON TABLE resource TYPE string;
DEFINE FIELD subresources.*.icon ON TABLE resource TYPE string;

-- =======================================================================
-- Corporations (tenants)
-- =======================================================================
DEFINE TABLE corp SCHEMAFULL;
DEFINE FIELD corp_name ON TABLE corp TYPE string;
DEFINE FIELD corp_active ON TABLE corp TYPE bool DEFAULT true;
DEFINE FIELD allowed_resources ON TABLE corp TYPE array DEFAULT [];
DEFINE FIELD allowed_resources.* ON TABLE corp TYPE string;
DEFINE FIELD created_at ON TABLE corp TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE corp TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_corp_name ON TABLE corp COLUMNS corp_name UNIQUE;

-- =======================================================================
-- Roles (corp scope)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD corp_id ON TABLE role TYPE string;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string;
DEFINE FIELD is_system ON TABLE role TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_corp_name ON TABLE role \
    COLUMNS corp_id, name UNIQUE;

-- =======================================================================
-- Permissions (role scope, one row per (role, resource))
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD permission_id ON TABLE permission TYPE string;
DEFINE FIELD role_id ON TABLE permission TYPE string;
DEFINE FIELD resource_id ON TABLE permission TYPE string;
DEFINE FIELD can_read ON TABLE permission TYPE bool DEFAULT false;
DEFINE FIELD can_create ON TABLE permission TYPE bool DEFAULT false;
DEFINE FIELD can_update ON TABLE permission TYPE bool DEFAULT false;
DEFINE FIELD can_delete ON TABLE permission TYPE bool DEFAULT false;
DEFINE FIELD subresource_permissions ON TABLE permission TYPE array \
    DEFAULT [];
DEFINE FIELD subresource_permissions.* ON TABLE permission TYPE object;
DEFINE FIELD subresource_permissions.*.subresource_route \
    ON TABLE permission TYPE string;
DEFINE FIELD subresource_permissions.*.can_read ON TABLE permission \
    TYPE bool;
DEFINE FIELD subresource_permissions.*.can_create ON TABLE permission \
    TYPE bool;
DEFINE FIELD subresource_permissions.*.can_update ON TABLE permission \
    TYPE bool;
DEFINE FIELD subresource_permissions.*.can_delete ON TABLE permission \
    TYPE bool;
DEFINE INDEX idx_permission_role_resource ON TABLE permission \
    COLUMNS role_id, resource_id UNIQUE;

-- =======================================================================
-- Users (corp scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD corp_id ON TABLE user TYPE string;
DEFINE FIELD role_id ON TABLE user TYPE option<string>;
DEFINE FIELD first_name ON TABLE user TYPE string;
DEFINE FIELD last_name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_corp ON TABLE user COLUMNS corp_id;

-- =======================================================================
-- Organization profiles (corp scope, from the external directory)
-- =======================================================================
DEFINE TABLE org SCHEMAFULL;
DEFINE FIELD corp_id ON TABLE org TYPE string;
DEFINE FIELD legal_id ON TABLE org TYPE string;
DEFINE FIELD org_name ON TABLE org TYPE string;
DEFINE FIELD country ON TABLE org TYPE string;
DEFINE FIELD addresses ON TABLE org TYPE array DEFAULT [];
DEFINE FIELD addresses.* ON TABLE org TYPE object;
DEFINE FIELD addresses.*.street ON TABLE org TYPE string;
DEFINE FIELD addresses.*.municipality ON TABLE org TYPE string;
DEFINE FIELD addresses.*.zip ON TABLE org TYPE string;
DEFINE FIELD addresses.*.city ON TABLE org TYPE string;
DEFINE FIELD emails ON TABLE org TYPE array DEFAULT [];
DEFINE FIELD emails.* ON TABLE org TYPE string;
DEFINE FIELD phones ON TABLE org TYPE array DEFAULT [];
DEFINE FIELD phones.* ON TABLE org TYPE string;
DEFINE FIELD created_at ON TABLE org TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE org TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_org_legal_id ON TABLE org COLUMNS legal_id UNIQUE;
DEFINE INDEX idx_org_corp ON TABLE org COLUMNS corp_id UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
