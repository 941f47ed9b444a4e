//! SurrealDB implementation of [`ResourceCatalog`].
//!
//! Catalog records use the catalog code itself as the record id, so
//! lookups are direct record fetches and permission joins never need
//! a secondary index.

use kontor_core::error::KontorResult;
use kontor_core::models::resource::{CreateResource, Resource, Subresource};
use kontor_core::repository::ResourceCatalog;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SubresourceRow {
    route: String,
    title: String,
    icon: String,
}

#[derive(Debug, SurrealValue)]
struct ResourceRow {
    title: String,
    description: String,
    icon: String,
    route: String,
    position: i64,
    is_public: bool,
    has_subresources: bool,
    subresources: Vec<SubresourceRow>,
}

#[derive(Debug, SurrealValue)]
struct ResourceRowWithId {
    record_id: String,
    title: String,
    description: String,
    icon: String,
    route: String,
    position: i64,
    is_public: bool,
    has_subresources: bool,
    subresources: Vec<SubresourceRow>,
}

impl SubresourceRow {
    fn into_subresource(self) -> Subresource {
        Subresource {
            route: self.route,
            title: self.title,
            icon: self.icon,
        }
    }
}

impl ResourceRow {
    fn into_resource(self, resource_id: String) -> Resource {
        Resource {
            resource_id,
            title: self.title,
            description: self.description,
            icon: self.icon,
            route: self.route,
            position: self.position,
            is_public: self.is_public,
            has_subresources: self.has_subresources,
            subresources: self
                .subresources
                .into_iter()
                .map(SubresourceRow::into_subresource)
                .collect(),
        }
    }
}

impl ResourceRowWithId {
    fn into_resource(self) -> Resource {
        Resource {
            resource_id: self.record_id,
            title: self.title,
            description: self.description,
            icon: self.icon,
            route: self.route,
            position: self.position,
            is_public: self.is_public,
            has_subresources: self.has_subresources,
            subresources: self
                .subresources
                .into_iter()
                .map(SubresourceRow::into_subresource)
                .collect(),
        }
    }
}

/// SurrealDB implementation of the resource catalog.
#[derive(Clone)]
pub struct SurrealResourceCatalog<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealResourceCatalog<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ResourceCatalog for SurrealResourceCatalog<C> {
    async fn create(&self, input: CreateResource) -> KontorResult<Resource> {
        let id = input.resource_id.clone();
        let subresources: Vec<SubresourceRow> = input
            .subresources
            .iter()
            .map(|s| SubresourceRow {
                route: s.route.clone(),
                title: s.title.clone(),
                icon: s.icon.clone(),
            })
            .collect();
        let has_subresources = !subresources.is_empty();

        let result = self
            .db
            .query(
                "CREATE type::record('resource', $id) SET \
                 title = $title, description = $description, \
                 icon = $icon, route = $route, position = $position, \
                 is_public = $is_public, \
                 has_subresources = $has_subresources, \
                 subresources = $subresources",
            )
            .bind(("id", id.clone()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("icon", input.icon))
            .bind(("route", input.route))
            .bind(("position", input.position))
            .bind(("is_public", input.is_public))
            .bind(("has_subresources", has_subresources))
            .bind(("subresources", subresources))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "resource".into(),
            id: id.clone(),
        })?;

        Ok(row.into_resource(id))
    }

    async fn get(&self, resource_id: &str) -> KontorResult<Resource> {
        let id = resource_id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('resource', $id)")
            .bind(("id", id.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "resource".into(),
            id: id.clone(),
        })?;

        Ok(row.into_resource(id))
    }

    async fn list_public(&self) -> KontorResult<Vec<Resource>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM resource \
                 WHERE is_public = true \
                 ORDER BY position ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ResourceRowWithId::into_resource)
            .collect())
    }

    async fn list_all(&self) -> KontorResult<Vec<Resource>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM resource \
                 ORDER BY position ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ResourceRowWithId::into_resource)
            .collect())
    }

    async fn find_by_ids(&self, resource_ids: &[String]) -> KontorResult<Vec<Resource>> {
        if resource_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM resource \
                 WHERE meta::id(id) IN $ids \
                 ORDER BY position ASC",
            )
            .bind(("ids", resource_ids.to_vec()))
            .await
            .map_err(DbError::from)?;

        // Unknown ids simply produce no row; stale allow-lists are
        // tolerated by contract.
        let rows: Vec<ResourceRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ResourceRowWithId::into_resource)
            .collect())
    }
}
