//! Record fetching
//!
//! `RecordFetcher` turns one locator into one record. `HttpFetcher` is the
//! network implementation: a single GET, body parsed as JSON. No retry and no
//! timeout are applied here.

use crate::error::{CoreError, FetchError};
use crate::sources::Locator;
use recipebox_types::Record;
use std::future::Future;
use tracing::debug;

/// Fetches a single record for a locator
pub trait RecordFetcher: Send + Sync + 'static {
    fn fetch(&self, locator: &Locator) -> impl Future<Output = Result<Record, FetchError>> + Send;
}

/// HTTP GET fetcher backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher, optionally overriding the `User-Agent` header
    pub fn new(user_agent: Option<&str>) -> Result<Self, CoreError> {
        let mut builder = reqwest::Client::builder();
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }

        let client = builder.build().map_err(|e| CoreError::InvalidConfig {
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self { client })
    }
}

impl RecordFetcher for HttpFetcher {
    async fn fetch(&self, locator: &Locator) -> Result<Record, FetchError> {
        let response = self
            .client
            .get(locator.url().clone())
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;
        let record: Record = serde_json::from_slice(&body).map_err(FetchError::Parse)?;

        debug!(%locator, bytes = body.len(), "Fetched record");
        Ok(record)
    }
}
