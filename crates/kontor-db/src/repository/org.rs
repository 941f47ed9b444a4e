//! SurrealDB implementation of [`OrgRepository`].
//!
//! Org profiles are only ever written inside the provisioning
//! transaction; this repository covers the read paths.

use chrono::{DateTime, Utc};
use kontor_core::error::KontorResult;
use kontor_core::models::org::{Org, OrgAddress};
use kontor_core::repository::OrgRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct OrgAddressRow {
    pub street: String,
    pub municipality: String,
    pub zip: String,
    pub city: String,
}

impl OrgAddressRow {
    pub(crate) fn from_model(a: &OrgAddress) -> Self {
        Self {
            street: a.street.clone(),
            municipality: a.municipality.clone(),
            zip: a.zip.clone(),
            city: a.city.clone(),
        }
    }

    fn into_model(self) -> OrgAddress {
        OrgAddress {
            street: self.street,
            municipality: self.municipality,
            zip: self.zip,
            city: self.city,
        }
    }
}

#[derive(Debug, SurrealValue)]
pub(crate) struct OrgRowWithId {
    record_id: String,
    corp_id: String,
    legal_id: String,
    org_name: String,
    country: String,
    addresses: Vec<OrgAddressRow>,
    emails: Vec<String>,
    phones: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrgRowWithId {
    pub(crate) fn try_into_org(self) -> Result<Org, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid org UUID: {e}")))?;
        let corp_id = Uuid::parse_str(&self.corp_id)
            .map_err(|e| DbError::Migration(format!("invalid corp UUID: {e}")))?;
        Ok(Org {
            id,
            corp_id,
            legal_id: self.legal_id,
            org_name: self.org_name,
            country: self.country,
            addresses: self
                .addresses
                .into_iter()
                .map(OrgAddressRow::into_model)
                .collect(),
            emails: self.emails,
            phones: self.phones,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Org repository.
#[derive(Clone)]
pub struct SurrealOrgRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrgRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrgRepository for SurrealOrgRepository<C> {
    async fn get_by_corp(&self, corp_id: Uuid) -> KontorResult<Option<Org>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM org \
                 WHERE corp_id = $corp_id",
            )
            .bind(("corp_id", corp_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrgRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_org()?)),
            None => Ok(None),
        }
    }

    async fn get_by_legal_id(&self, legal_id: &str) -> KontorResult<Option<Org>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM org \
                 WHERE legal_id = $legal_id",
            )
            .bind(("legal_id", legal_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrgRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_org()?)),
            None => Ok(None),
        }
    }
}
