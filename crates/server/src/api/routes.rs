use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::middleware::{auth_middleware, concurrency_middleware, rate_middleware};
use super::{handlers, search};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Admin routes require a bearer token.
    let admin = Router::new()
        .route("/api/db/update", post(handlers::update))
        .route("/api/db", delete(handlers::drop_db))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // The database-backed search runs behind the concurrency cap, the
    // index-backed search behind the rate limiter.
    let search_route = Router::new()
        .route("/api/search", get(search::search))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            concurrency_middleware,
        ));
    let isearch_route = Router::new()
        .route("/api/isearch", get(search::isearch))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_middleware,
        ));

    Router::new()
        .route("/api/ping", get(handlers::ping))
        .route("/api/db/stats", get(handlers::db_stats))
        .route("/api/db/status", get(handlers::db_status))
        .route("/api/login", post(handlers::login))
        .merge(admin)
        .merge(search_route)
        .merge(isearch_route)
        .with_state(state)
}
