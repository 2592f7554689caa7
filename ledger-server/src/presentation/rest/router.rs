use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::application::TradingService;

/// Application state shared across handlers
pub struct AppState<T: TradingService> {
    pub service: Arc<T>,
}

impl<T: TradingService> AppState<T> {
    pub fn new(service: Arc<T>) -> Self {
        AppState { service }
    }
}

/// Create the REST API router
pub fn create_router<T: TradingService>(state: Arc<AppState<T>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Account queries
        .route(
            "/api/v1/accounts/{account_id}/balance",
            get(handlers::get_account_balance::<T>),
        )
        .route(
            "/api/v1/accounts/{account_id}/holdings",
            get(handlers::get_account_holdings::<T>),
        )
        // Order lifecycle
        .route("/api/v1/orders", post(handlers::create_order::<T>))
        .route(
            "/api/v1/orders/{order_id}",
            delete(handlers::cancel_order::<T>),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
