//! Search API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use comicdex_core::{ComicRef, SearchError};

use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub phrase: String,
    #[serde(default)]
    pub limit: String,
}

#[derive(Debug, Serialize)]
pub struct SearchReply {
    pub comics: Vec<ComicRef>,
    pub total: u64,
}

/// Parse the `limit` query parameter: empty means the default, anything
/// non-numeric or non-positive is a caller error.
fn parse_limit(s: &str) -> Result<i64, ()> {
    if s.is_empty() {
        return Ok(DEFAULT_LIMIT);
    }
    match s.parse::<i64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(()),
    }
}

fn map_search_error(e: SearchError) -> StatusCode {
    match e {
        SearchError::BadArguments | SearchError::RequestTooLarge => StatusCode::BAD_REQUEST,
        SearchError::Catalog(e) => {
            error!("search failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// GET /api/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchReply>, StatusCode> {
    let limit = parse_limit(&params.limit).map_err(|_| StatusCode::BAD_REQUEST)?;
    if params.phrase.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let result = state
        .search()
        .search(&params.phrase, limit)
        .await
        .map_err(map_search_error)?;

    Ok(Json(SearchReply {
        comics: result.comics,
        total: result.total,
    }))
}

/// GET /api/isearch
pub async fn isearch(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchReply>, StatusCode> {
    let limit = parse_limit(&params.limit).map_err(|_| StatusCode::BAD_REQUEST)?;
    if params.phrase.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let result = state
        .search()
        .isearch(&params.phrase, limit)
        .await
        .map_err(map_search_error)?;

    Ok(Json(SearchReply {
        comics: result.comics,
        total: result.total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit_empty_is_default() {
        assert_eq!(parse_limit("").unwrap(), 10);
    }

    #[test]
    fn test_parse_limit_positive() {
        assert_eq!(parse_limit("3").unwrap(), 3);
    }

    #[test]
    fn test_parse_limit_rejects_zero_and_negative() {
        assert!(parse_limit("0").is_err());
        assert!(parse_limit("-5").is_err());
    }

    #[test]
    fn test_parse_limit_rejects_garbage() {
        assert!(parse_limit("ten").is_err());
        assert!(parse_limit("3.5").is_err());
    }
}
