//! Gateway handlers: health, catalog administration, login.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::error;

use comicdex_core::UpdateError;

use crate::state::AppState;

#[derive(Serialize)]
pub struct PingReply {
    pub replies: HashMap<&'static str, &'static str>,
}

#[derive(Serialize)]
pub struct StatsReply {
    pub words_total: u64,
    pub words_unique: u64,
    pub comics_fetched: u64,
    pub comics_total: i64,
}

#[derive(Serialize)]
pub struct StatusReply {
    pub status: &'static str,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

/// GET /api/ping
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingReply> {
    let mut replies = HashMap::new();

    replies.insert(
        "db",
        match state.catalog().ping() {
            Ok(()) => "ok",
            Err(_) => "unavailable",
        },
    );
    replies.insert(
        "words",
        match state.normalizer().normalize("ping").await {
            Ok(_) => "ok",
            Err(_) => "unavailable",
        },
    );

    Json(PingReply { replies })
}

/// GET /api/db/stats
pub async fn db_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsReply>, StatusCode> {
    let cancel = CancellationToken::new();
    match state.updater().stats(&cancel).await {
        Ok(stats) => Ok(Json(StatsReply {
            words_total: stats.db.words_total,
            words_unique: stats.db.words_unique,
            comics_fetched: stats.db.comics_fetched,
            comics_total: stats.comics_total,
        })),
        Err(e) => {
            error!("stats failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/db/status
pub async fn db_status(State(state): State<Arc<AppState>>) -> Json<StatusReply> {
    Json(StatusReply {
        status: state.updater().status().as_str(),
    })
}

/// POST /api/db/update
pub async fn update(State(state): State<Arc<AppState>>) -> Response {
    let cancel = CancellationToken::new();
    match state.updater().update(&cancel).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))).into_response(),
        Err(UpdateError::AlreadyRunning) => (
            StatusCode::ACCEPTED,
            Json(json!({"status": "already_running"})),
        )
            .into_response(),
        Err(e) => {
            error!("update failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// DELETE /api/db
pub async fn drop_db(State(state): State<Arc<AppState>>) -> Response {
    match state.updater().drop_catalog().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))).into_response(),
        Err(e) => {
            error!("drop failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Ok(Json(req)) = body else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    if !state.tokens().verify_credentials(&req.name, &req.password) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let token = state.tokens().issue_token();
    (StatusCode::OK, token).into_response()
}
