//! Corp allow-list guard.
//!
//! The allow-list is the ceiling on what a corp may ever grant to its
//! roles. This single check backs every entry point that introduces
//! resource ids into a tenant — role permission grants, corp
//! allow-list changes, and organization registration — so the rule
//! cannot drift between call sites.

use kontor_core::models::corp::Corp;

use crate::error::RbacError;

/// Validate that every requested resource id is inside the corp's
/// allow-list.
///
/// On rejection, `RbacError::DisallowedResources` names exactly the
/// ids in `requested − corp.allowed_resources` (first occurrence
/// order, duplicates reported once) so the caller can surface them
/// all at once.
pub fn validate_grant(corp: &Corp, requested: &[String]) -> Result<(), RbacError> {
    let mut invalid: Vec<String> = Vec::new();
    for id in requested {
        if !corp.allowed_resources.contains(id) && !invalid.contains(id) {
            invalid.push(id.clone());
        }
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(RbacError::DisallowedResources(invalid))
    }
}
