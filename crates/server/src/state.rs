use std::sync::Arc;

use comicdex_core::{ComicCatalog, Normalizer, SearchService, TokenService, UpdateService};

use crate::api::middleware::{ConcurrencyLimiter, RateLimiter};

/// Shared application state
pub struct AppState {
    updater: Arc<UpdateService>,
    search: Arc<SearchService>,
    tokens: Arc<TokenService>,
    catalog: Arc<dyn ComicCatalog>,
    normalizer: Arc<dyn Normalizer>,
    search_limiter: ConcurrencyLimiter,
    isearch_limiter: RateLimiter,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        updater: Arc<UpdateService>,
        search: Arc<SearchService>,
        tokens: Arc<TokenService>,
        catalog: Arc<dyn ComicCatalog>,
        normalizer: Arc<dyn Normalizer>,
        search_limiter: ConcurrencyLimiter,
        isearch_limiter: RateLimiter,
    ) -> Self {
        Self {
            updater,
            search,
            tokens,
            catalog,
            normalizer,
            search_limiter,
            isearch_limiter,
        }
    }

    pub fn updater(&self) -> &Arc<UpdateService> {
        &self.updater
    }

    pub fn search(&self) -> &Arc<SearchService> {
        &self.search
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    pub fn catalog(&self) -> &Arc<dyn ComicCatalog> {
        &self.catalog
    }

    pub fn normalizer(&self) -> &Arc<dyn Normalizer> {
        &self.normalizer
    }

    pub fn search_limiter(&self) -> &ConcurrencyLimiter {
        &self.search_limiter
    }

    pub fn isearch_limiter(&self) -> &RateLimiter {
        &self.isearch_limiter
    }
}
