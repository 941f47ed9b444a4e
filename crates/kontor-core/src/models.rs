//! Domain models for KONTOR.
//!
//! These are the core types shared across all crates.

pub mod corp;
pub mod org;
pub mod permission;
pub mod resource;
pub mod role;
pub mod user;
