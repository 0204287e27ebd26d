//! Shared types and domain logic for the Bakery Back-Office Platform
//!
//! This crate contains the database-free core: measurement units and
//! conversion, recipe requirement planning, entity models, and validation
//! helpers shared by the backend services.

pub mod models;
pub mod requirements;
pub mod types;
pub mod units;
pub mod validation;

pub use models::*;
pub use requirements::*;
pub use types::*;
pub use units::*;
pub use validation::*;
