//! SurrealDB implementation of [`UserRepository`].
//!
//! Stores the PHC-format hash the service layer produced; this crate
//! never sees a raw password.

use chrono::{DateTime, Utc};
use kontor_core::error::KontorResult;
use kontor_core::models::user::{CreateUser, User};
use kontor_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserRow {
    corp_id: String,
    role_id: Option<String>,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    corp_id: String,
    role_id: Option<String>,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role_id(role_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    role_id
        .map(|r| {
            Uuid::parse_str(&r).map_err(|e| DbError::Migration(format!("invalid role UUID: {e}")))
        })
        .transpose()
}

impl UserRow {
    fn try_into_user(self, id: Uuid) -> Result<User, DbError> {
        let corp_id = Uuid::parse_str(&self.corp_id)
            .map_err(|e| DbError::Migration(format!("invalid corp UUID: {e}")))?;
        Ok(User {
            id,
            corp_id,
            role_id: parse_role_id(self.role_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        let corp_id = Uuid::parse_str(&self.corp_id)
            .map_err(|e| DbError::Migration(format!("invalid corp UUID: {e}")))?;
        Ok(User {
            id,
            corp_id,
            role_id: parse_role_id(self.role_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> KontorResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 corp_id = $corp_id, role_id = $role_id, \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, password_hash = $password_hash, \
                 active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("corp_id", input.corp_id.to_string()))
            .bind(("role_id", input.role_id.map(|r| r.to_string())))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email.to_lowercase()))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> KontorResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user(id)?)
    }

    async fn get_by_email(&self, email: &str) -> KontorResult<Option<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_lowercase()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user()?)),
            None => Ok(None),
        }
    }

    async fn list_by_corp(&self, corp_id: Uuid) -> KontorResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE corp_id = $corp_id \
                 ORDER BY created_at ASC",
            )
            .bind(("corp_id", corp_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }

    async fn assign_role(&self, id: Uuid, role_id: Option<Uuid>) -> KontorResult<User> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 role_id = $role_id, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("role_id", role_id.map(|r| r.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user(id)?)
    }
}
