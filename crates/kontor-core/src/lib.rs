//! KONTOR Core — domain models, error taxonomy, and repository traits
//! shared across the workspace.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{KontorError, KontorResult};
