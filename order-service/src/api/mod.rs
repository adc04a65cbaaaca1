//! HTTP API for the order service

pub mod analytics;
pub mod auth;
pub mod health;
pub mod orders;
pub mod query;

use axum::Router;
use axum::routing::{get, patch, post};
use http::HeaderName;
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Route table without middleware
pub fn build_router() -> Router<AppState> {
    let orders = Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/free", get(orders::list_free))
        .route("/{id}", get(orders::get_by_id))
        .route("/{id}/assign", post(orders::assign))
        .route("/{id}/cancel", post(orders::cancel))
        .route("/{id}/status", patch(orders::advance_status));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/orders", orders)
        .route("/api/analytics/orders", get(analytics::order_analytics))
}

/// Fully layered application
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}
