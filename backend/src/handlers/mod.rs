//! HTTP handlers for the Bakery Back-Office Platform

pub mod auth;
pub mod health;
pub mod inflow;
pub mod material;
pub mod production;
pub mod recipe;
pub mod sale;

pub use auth::*;
pub use health::*;
pub use inflow::*;
pub use material::*;
pub use production::*;
pub use recipe::*;
pub use sale::*;
