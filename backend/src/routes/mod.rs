//! Route definitions for the Bakery Back-Office Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - user profile
        .nest("/users", user_routes())
        // Protected routes - raw materials and stock
        .nest("/materials", material_routes())
        // Protected routes - recipes and their derived balances
        .nest("/recipes", recipe_routes())
        // Protected routes - production runs
        .nest("/production", production_routes())
        // Protected routes - sales
        .nest("/sales", sale_routes())
        // Protected routes - ingredient inflows
        .nest("/inflows", inflow_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// User profile routes (protected)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Raw material routes (protected)
fn material_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_materials).post(handlers::create_material),
        )
        .route("/low-stock", get(handlers::list_low_stock))
        .route(
            "/:material_id",
            get(handlers::get_material).put(handlers::update_material),
        )
        .route("/:material_id/inflows", get(handlers::get_material_inflows))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Recipe routes (protected)
fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_recipes).post(handlers::create_recipe))
        .route(
            "/:recipe_id",
            get(handlers::get_recipe)
                .put(handlers::update_recipe)
                .delete(handlers::delete_recipe),
        )
        .route("/:recipe_id/requirements", get(handlers::get_requirements))
        .route("/:recipe_id/availability", get(handlers::check_availability))
        .route(
            "/:recipe_id/available-to-sell",
            get(handlers::get_available_to_sell),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Production routes (protected)
fn production_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_production).post(handlers::record_production),
        )
        .route("/:run_id", get(handlers::get_production))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sale routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/:sale_id", get(handlers::get_sale))
        .route("/:sale_id/void", post(handlers::void_sale))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Ingredient inflow routes (protected)
fn inflow_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inflows).post(handlers::record_inflow))
        .route(
            "/:inflow_id",
            get(handlers::get_inflow)
                .put(handlers::update_inflow)
                .delete(handlers::delete_inflow),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
