//! SurrealDB implementation of [`CorpRepository`].

use chrono::{DateTime, Utc};
use kontor_core::error::KontorResult;
use kontor_core::models::corp::{Corp, CreateCorp, UpdateCorp};
use kontor_core::repository::{CorpRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CorpRow {
    corp_name: String,
    corp_active: bool,
    allowed_resources: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CorpRowWithId {
    record_id: String,
    corp_name: String,
    corp_active: bool,
    allowed_resources: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CorpRow {
    fn into_corp(self, id: Uuid) -> Corp {
        Corp {
            id,
            corp_name: self.corp_name,
            corp_active: self.corp_active,
            allowed_resources: self.allowed_resources,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl CorpRowWithId {
    fn try_into_corp(self) -> Result<Corp, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid corp UUID: {e}")))?;
        Ok(Corp {
            id,
            corp_name: self.corp_name,
            corp_active: self.corp_active,
            allowed_resources: self.allowed_resources,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Corp repository.
#[derive(Clone)]
pub struct SurrealCorpRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCorpRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CorpRepository for SurrealCorpRepository<C> {
    async fn create(&self, input: CreateCorp) -> KontorResult<Corp> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('corp', $id) SET \
                 corp_name = $corp_name, corp_active = true, \
                 allowed_resources = $allowed_resources",
            )
            .bind(("id", id_str.clone()))
            .bind(("corp_name", input.corp_name))
            .bind(("allowed_resources", input.allowed_resources))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<CorpRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "corp".into(),
            id: id_str,
        })?;

        Ok(row.into_corp(id))
    }

    async fn get_by_id(&self, id: Uuid) -> KontorResult<Corp> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('corp', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CorpRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "corp".into(),
            id: id_str,
        })?;

        Ok(row.into_corp(id))
    }

    async fn get_by_name(&self, corp_name: &str) -> KontorResult<Corp> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM corp \
                 WHERE corp_name = $corp_name",
            )
            .bind(("corp_name", corp_name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CorpRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "corp".into(),
            id: corp_name.to_string(),
        })?;

        Ok(row.try_into_corp()?)
    }

    async fn update(&self, id: Uuid, input: UpdateCorp) -> KontorResult<Corp> {
        let id_str = id.to_string();

        // Only fields present in the input are written; `Some(false)`
        // and an empty allow-list are applied as given.
        let mut sets = Vec::new();
        if input.corp_name.is_some() {
            sets.push("corp_name = $corp_name");
        }
        if input.corp_active.is_some() {
            sets.push("corp_active = $corp_active");
        }
        if input.allowed_resources.is_some() {
            sets.push("allowed_resources = $allowed_resources");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('corp', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(corp_name) = input.corp_name {
            builder = builder.bind(("corp_name", corp_name));
        }
        if let Some(corp_active) = input.corp_active {
            builder = builder.bind(("corp_active", corp_active));
        }
        if let Some(allowed_resources) = input.allowed_resources {
            builder = builder.bind(("allowed_resources", allowed_resources));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<CorpRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "corp".into(),
            id: id_str,
        })?;

        Ok(row.into_corp(id))
    }

    async fn list(&self, pagination: Pagination) -> KontorResult<PaginatedResult<Corp>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM corp GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM corp \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CorpRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_corp())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
