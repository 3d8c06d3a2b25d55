//! Route definitions for the brasserie stock platform

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Stock management
        .nest("/stock", stock_routes())
        // Recipe management
        .nest("/recipes", recipe_routes())
        // Production lot management
        .nest("/lots", lot_routes())
        // Sales
        .nest("/sales", sale_routes())
}

/// Stock management routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock).post(handlers::create_stock_item))
        .route("/alerts", get(handlers::list_stock_alerts))
        .route("/:item_id", delete(handlers::delete_stock_item))
        .route("/:item_id/credit", post(handlers::credit_stock))
        .route("/:item_id/debit", post(handlers::debit_stock))
}

/// Recipe management routes
fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_recipes).post(handlers::create_recipe))
        .route(
            "/:recipe_id",
            put(handlers::update_recipe).delete(handlers::delete_recipe),
        )
        .route("/:recipe_id/apply", post(handlers::apply_recipe))
}

/// Production lot routes
fn lot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_lots).post(handlers::create_lot))
        .route("/open", get(handlers::list_open_lots))
        .route("/:lot_id", delete(handlers::delete_lot))
}

/// Sale routes
fn sale_routes() -> Router<AppState> {
    Router::new().route("/", get(handlers::list_sales).post(handlers::record_sale))
}
