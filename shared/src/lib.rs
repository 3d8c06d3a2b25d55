//! Shared types and models for the brasserie stock platform
//!
//! This crate contains the domain entities and the pure unit/quantity rules
//! used by the backend services and their tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
