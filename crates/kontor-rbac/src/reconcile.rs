//! Sub-resource permission reconciliation.
//!
//! The catalog's declared sub-resource routes are authoritative: a
//! stored or returned permission always enumerates every declared
//! route, and caller-supplied routes the catalog does not declare are
//! dropped without error. Grant paths, provisioning, and the
//! evaluator all go through these two functions.

use kontor_core::models::permission::{CrudFlags, SubresourceGrant, SubresourcePermission};
use kontor_core::models::resource::Resource;

/// Merge caller-supplied sub-resource grants against the resource's
/// declared routes. Declared routes without a supplied entry default
/// to all-false; supplied routes the resource does not declare are
/// ignored.
pub fn reconcile_subresources(
    resource: &Resource,
    supplied: &[SubresourceGrant],
) -> Vec<SubresourcePermission> {
    if !resource.has_subresources {
        return Vec::new();
    }

    resource
        .subresources
        .iter()
        .map(|sub| SubresourcePermission {
            subresource_route: sub.route.clone(),
            flags: supplied
                .iter()
                .find(|g| g.route == sub.route)
                .map(SubresourceGrant::flags)
                .unwrap_or(CrudFlags::NONE),
        })
        .collect()
}

/// One all-true entry per declared route, for the system admin role.
pub fn full_subresources(resource: &Resource) -> Vec<SubresourcePermission> {
    resource
        .subresources
        .iter()
        .map(|sub| SubresourcePermission {
            subresource_route: sub.route.clone(),
            flags: CrudFlags::ALL,
        })
        .collect()
}
