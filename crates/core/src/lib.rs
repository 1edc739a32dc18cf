//! comicdex core: catalog storage, the update pipeline, phrase
//! normalization, and the two search modes behind the gateway.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod events;
pub mod normalizer;
pub mod search;
pub mod testing;
pub mod updater;
pub mod upstream;

pub use auth::{AuthError, TokenService};
pub use catalog::{CatalogError, CatalogStats, Comic, ComicCatalog, ComicRef, SqliteCatalog};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogLevel,
};
pub use events::{Event, EventBus};
pub use normalizer::{EnglishNormalizer, NormalizeError, Normalizer, MAX_PHRASE_BYTES};
pub use search::indexer::{spawn_event_indexer, spawn_timer_indexer, DEFAULT_DEBOUNCE};
pub use search::{SearchError, SearchResult, SearchService};
pub use updater::{UpdateError, UpdateService, UpdateStats, UpdateStatus};
pub use upstream::{ComicInfo, ComicSource, SourceError, XkcdClient};
