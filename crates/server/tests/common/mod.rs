//! Common test utilities: an in-process gateway with mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use comicdex_core::testing::{MockComicSource, MockNormalizer};
use comicdex_core::{
    ComicCatalog, EventBus, Normalizer, SearchService, SqliteCatalog, TokenService, UpdateService,
};
use comicdex_server::api::create_router;
use comicdex_server::api::middleware::{ConcurrencyLimiter, RateLimiter};
use comicdex_server::state::AppState;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "hunter2";

/// Knobs for the gateway limits under test.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub search_concurrency: usize,
    pub rate_rps: u32,
    pub rate_wait: Duration,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            search_concurrency: 4,
            // Generous enough that ordinary tests never hit the bucket.
            rate_rps: 1000,
            rate_wait: Duration::from_secs(1),
        }
    }
}

/// In-process server with a scriptable upstream and an in-memory catalog.
pub struct TestFixture {
    pub router: Router,
    pub state: Arc<AppState>,
    pub source: Arc<MockComicSource>,
    pub catalog: Arc<SqliteCatalog>,
    pub search: Arc<SearchService>,
    pub events: EventBus,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub json: Value,
    pub text: String,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    pub fn with_config(test_config: TestConfig) -> Self {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let source = Arc::new(MockComicSource::new());
        let normalizer: Arc<dyn Normalizer> = Arc::new(MockNormalizer::new());
        let events = EventBus::new();

        let updater = Arc::new(
            UpdateService::new(
                Arc::clone(&catalog) as Arc<dyn ComicCatalog>,
                Arc::clone(&source) as Arc<dyn comicdex_core::ComicSource>,
                Arc::clone(&normalizer),
                events.clone(),
                2,
            )
            .unwrap(),
        );
        let search = Arc::new(SearchService::new(
            Arc::clone(&catalog) as Arc<dyn ComicCatalog>,
            Arc::clone(&normalizer),
        ));
        let tokens = Arc::new(TokenService::new(
            ADMIN_USER,
            ADMIN_PASS,
            Duration::from_secs(60),
        ));

        let state = Arc::new(AppState::new(
            updater,
            Arc::clone(&search),
            tokens,
            Arc::clone(&catalog) as Arc<dyn ComicCatalog>,
            normalizer,
            ConcurrencyLimiter::new(test_config.search_concurrency),
            RateLimiter::new(test_config.rate_rps, test_config.rate_wait),
        ));

        let router = create_router(Arc::clone(&state));

        Self {
            router,
            state,
            source,
            catalog,
            search,
            events,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    pub async fn post_with_token(&self, path: &str, token: &str) -> TestResponse {
        self.request("POST", path, None, Some(token)).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        self.request("DELETE", path, None, Some(token)).await
    }

    /// Log in with the fixture's admin credentials and return the token.
    pub async fn login(&self) -> String {
        let response = self
            .post(
                "/api/login",
                serde_json::json!({"name": ADMIN_USER, "password": ADMIN_PASS}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed");
        response.text
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }

        let body = if let Some(json_body) = body {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = builder.body(body).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&bytes).to_string();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, json, text }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
