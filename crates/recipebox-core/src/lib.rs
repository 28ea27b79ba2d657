//! recipebox-core - Core library for recipebox
//!
//! Provides the source list, record fetcher, key-value storage and the
//! cache-or-aggregate `RecipeRepository`.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod repository;
pub mod sources;
pub mod storage;

pub use config::{Config, MalformedCachePolicy, OutstandingFetches};
pub use error::{CoreError, FetchError};
pub use fetcher::{HttpFetcher, RecordFetcher};
pub use recipebox_types::Record;
pub use repository::{HttpRepository, RecipeRepository, RepositoryOptions};
pub use sources::{Locator, SourceList, RECIPE_URLS};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
