//! Recipe repository: cache-or-aggregate loading
//!
//! `get_all` returns the cached record list when the cache slot holds one.
//! Otherwise every source is fetched concurrently, records are collected in
//! completion order, and the full list is written to the slot in one step.
//! The first failing fetch fails the whole call and nothing is written.
//!
//! Calls on one repository are single-flight: a second caller waits for the
//! first aggregation and then sees a cache hit.

use crate::config::{Config, MalformedCachePolicy, OutstandingFetches, DEFAULT_CACHE_KEY};
use crate::error::{CoreError, FetchError};
use crate::fetcher::{HttpFetcher, RecordFetcher};
use crate::sources::{Locator, SourceList};
use crate::storage::{FileStore, KeyValueStore};
use recipebox_types::Record;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Repository behaviour knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOptions {
    /// Cache slot name
    pub cache_key: String,

    pub malformed_cache: MalformedCachePolicy,

    pub outstanding_fetches: OutstandingFetches,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            malformed_cache: MalformedCachePolicy::default(),
            outstanding_fetches: OutstandingFetches::default(),
        }
    }
}

/// Repository wired to the network and the on-disk store
pub type HttpRepository = RecipeRepository<HttpFetcher, FileStore>;

type FetchOutcome = (Locator, Result<Record, FetchError>);

/// Loads the recipe collection from cache or from its sources
pub struct RecipeRepository<F, S> {
    sources: SourceList,
    fetcher: Arc<F>,
    store: S,
    options: RepositoryOptions,
    /// Held for the whole of `get_all` / `clear_cache`
    flight: Mutex<()>,
}

impl HttpRepository {
    /// Build the network-backed repository described by `config`
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        config.validate()?;
        let store = FileStore::open(config.resolve_storage_dir()?)?;
        let fetcher = HttpFetcher::new(config.user_agent.as_deref())?;
        Ok(Self::with_options(
            config.source_list()?,
            fetcher,
            store,
            config.repository_options(),
        ))
    }
}

impl<F, S> RecipeRepository<F, S>
where
    F: RecordFetcher,
    S: KeyValueStore,
{
    pub fn new(sources: SourceList, fetcher: F, store: S) -> Self {
        Self::with_options(sources, fetcher, store, RepositoryOptions::default())
    }

    pub fn with_options(
        sources: SourceList,
        fetcher: F,
        store: S,
        options: RepositoryOptions,
    ) -> Self {
        Self {
            sources,
            fetcher: Arc::new(fetcher),
            store,
            options,
            flight: Mutex::new(()),
        }
    }

    pub fn sources(&self) -> &SourceList {
        &self.sources
    }

    pub fn cache_key(&self) -> &str {
        &self.options.cache_key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return the recipe collection, aggregating from the sources on a miss
    pub async fn get_all(&self) -> Result<Vec<Record>, CoreError> {
        let _flight = self.flight.lock().await;

        if let Some(records) = self.read_cache(self.options.malformed_cache)? {
            info!(
                key = %self.options.cache_key,
                records = records.len(),
                "Cache hit"
            );
            return Ok(records);
        }

        info!(
            key = %self.options.cache_key,
            sources = self.sources.len(),
            "Cache miss, fetching all sources"
        );

        let records = self.aggregate().await?;
        self.persist(&records)?;
        Ok(records)
    }

    /// Peek at the cache slot without touching the network.
    ///
    /// Malformed content is always an error here, whatever the policy.
    pub fn cached(&self) -> Result<Option<Vec<Record>>, CoreError> {
        self.read_cache(MalformedCachePolicy::Fail)
    }

    /// Remove the cache slot. Returns whether there was anything to remove.
    pub async fn clear_cache(&self) -> Result<bool, CoreError> {
        let _flight = self.flight.lock().await;
        let removed = self.store.remove(&self.options.cache_key)?;
        if removed {
            info!(key = %self.options.cache_key, "Cache cleared");
        }
        Ok(removed)
    }

    /// `Ok(None)` means miss: absent, empty, or malformed under `Refetch`
    fn read_cache(&self, policy: MalformedCachePolicy) -> Result<Option<Vec<Record>>, CoreError> {
        let key = &self.options.cache_key;

        let Some(raw) = self.store.get(key)? else {
            debug!(key = %key, "Cache slot absent");
            return Ok(None);
        };

        if raw.is_empty() {
            debug!(key = %key, "Cache slot empty");
            return Ok(None);
        }

        match serde_json::from_str::<Vec<Record>>(&raw) {
            Ok(records) => Ok(Some(records)),
            Err(source) => match policy {
                MalformedCachePolicy::Fail => Err(CoreError::CacheReadFailure {
                    key: key.clone(),
                    source,
                }),
                MalformedCachePolicy::Refetch => {
                    warn!(key = %key, error = %source, "Cached value is malformed, refetching");
                    Ok(None)
                }
            },
        }
    }

    /// Fetch every source concurrently; first failure wins
    async fn aggregate(&self) -> Result<Vec<Record>, CoreError> {
        let mut tasks: JoinSet<FetchOutcome> = JoinSet::new();
        let mut task_locators = HashMap::with_capacity(self.sources.len());

        for locator in &self.sources {
            let fetcher = Arc::clone(&self.fetcher);
            let locator = locator.clone();
            let handle = tasks.spawn({
                let locator = locator.clone();
                async move {
                    let result = fetcher.fetch(&locator).await;
                    (locator, result)
                }
            });
            task_locators.insert(handle.id(), locator);
        }

        let mut records = Vec::with_capacity(self.sources.len());

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((locator, Ok(record))) => {
                    debug!(
                        %locator,
                        collected = records.len() + 1,
                        total = self.sources.len(),
                        "Record collected"
                    );
                    records.push(record);
                }
                Ok((locator, Err(source))) => {
                    warn!(%locator, error = ?source, "Fetch failed, abandoning aggregation");
                    self.abandon(tasks);
                    return Err(CoreError::FetchFailure {
                        locator: locator.to_string(),
                        source,
                    });
                }
                Err(join_error) => {
                    let locator = task_locators
                        .get(&join_error.id())
                        .map(Locator::to_string)
                        .unwrap_or_else(|| "<unknown>".to_string());
                    warn!(%locator, error = %join_error, "Fetch task died, abandoning aggregation");
                    self.abandon(tasks);
                    return Err(CoreError::TaskFailed {
                        locator,
                        message: join_error.to_string(),
                    });
                }
            }
        }

        Ok(records)
    }

    fn abandon(&self, mut tasks: JoinSet<FetchOutcome>) {
        let outstanding = tasks.len();
        match self.options.outstanding_fetches {
            OutstandingFetches::Cancel => tasks.abort_all(),
            OutstandingFetches::Detach => tasks.detach_all(),
        }
        debug!(
            outstanding,
            policy = ?self.options.outstanding_fetches,
            "Outstanding fetches abandoned"
        );
    }

    fn persist(&self, records: &[Record]) -> Result<(), CoreError> {
        let key = &self.options.cache_key;
        let serialized =
            serde_json::to_string(records).map_err(|source| CoreError::CacheWriteFailure {
                key: key.clone(),
                source,
            })?;

        self.store.set(key, &serialized)?;
        info!(key = %key, records = records.len(), "Records cached");
        Ok(())
    }
}
