//! Resource catalog domain model.
//!
//! Resources are the protectable top-level entities of the system
//! (Vehicles, Customers, Invoices, ...). The catalog is global,
//! long-lived, and written only by seed/admin tooling — tenants never
//! create or modify entries. A resource is identified by its catalog
//! code (e.g. `VEHICLES`), not by a UUID.

use serde::{Deserialize, Serialize};

/// A named sub-section of a resource carrying its own CRUD flags.
///
/// Sub-resources are embedded in their parent and identified by
/// `route` within it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subresource {
    pub route: String,
    pub title: String,
    pub icon: String,
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Catalog code, unique across the system (e.g. `VEHICLES`).
    pub resource_id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub route: String,
    /// Menu ordering hint; list-shaped views sort by this.
    pub position: i64,
    /// Only public resources may be requested by any corp.
    pub is_public: bool,
    pub has_subresources: bool,
    pub subresources: Vec<Subresource>,
}

/// Fields required to seed a new catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateResource {
    pub resource_id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub route: String,
    pub position: i64,
    pub is_public: bool,
    pub subresources: Vec<Subresource>,
}

impl Resource {
    /// Whether `route` is one of this resource's declared sub-resource
    /// routes.
    pub fn declares_subresource(&self, route: &str) -> bool {
        self.subresources.iter().any(|s| s.route == route)
    }
}
