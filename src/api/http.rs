//! Implements the `Source` trait with `reqwest` against the configured remote service.

use crate::api::{Backoff, Collection, SchemaError, Source};
use crate::error::Res;
use crate::Config;
use anyhow::{bail, Context};
use reqwest::header::ACCEPT;
use url::Url;
use tracing::{debug, trace};

/// Fetches collections over HTTP. Each request is retried according to the configured `Backoff`
/// when it cannot be sent, times out or gets a non-success status.
pub struct HttpSource {
    client: reqwest::Client,
    config: Config,
    backoff: Backoff,
}

impl HttpSource {
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(Self {
            client,
            config: config.clone(),
            backoff: config.backoff(),
        })
    }

    async fn send(&self, url: &Url, attempt: u32) -> Res<reqwest::Response> {
        trace!("GET {url} (attempt {})", attempt + 1);
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("Request to {url} returned {status}");
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Source for HttpSource {
    async fn get(&self, collection: Collection) -> Res<serde_json::Value> {
        let url = self.config.endpoint(collection)?;
        let what = format!("Fetching {collection}");
        let response = self
            .backoff
            .retry(&what, |attempt| self.send(&url, attempt))
            .await?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read the {collection} response body"))?;
        debug!("Received {} bytes of {collection}", body.len());
        let value = serde_json::from_slice(&body).map_err(|e| {
            SchemaError::new(collection, None, format!("body is not valid JSON: {e}"))
        })?;
        Ok(value)
    }
}
