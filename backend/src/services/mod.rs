//! Business logic services for the Bakery Back-Office Platform

pub mod auth;
pub mod inflow;
pub mod material;
pub mod production;
pub mod recipe;
pub mod sale;

pub use auth::AuthService;
pub use inflow::InflowService;
pub use material::MaterialService;
pub use production::ProductionService;
pub use recipe::RecipeService;
pub use sale::SaleService;
