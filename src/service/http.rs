use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::AnalyzerConfig;
use crate::domain::probes::PageFetch;
use crate::error::{AppError, Result};
use crate::service::probe::PageFetcher;

/// Build the HTTP client used for the top-level page fetch.
pub fn create_client(config: &AnalyzerConfig) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.as_str())
        .cookie_store(true)
        .build()
        .context("Failed to build HTTP client")
}

/// Plain HTTP page fetcher. Any status code is accepted; only transport
/// failures are errors.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &AnalyzerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<PageFetch> {
        let parsed = Url::parse(url).map_err(|e| AppError::InvalidUrl(format!("{} ({})", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::InvalidUrl(url.to_string()));
        }

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| AppError::network(e.to_string()))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::network(e.to_string()))?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "Fetched {} -> {} ({}, {} bytes, {}ms)",
            url,
            final_url,
            status_code,
            body.len(),
            elapsed_ms
        );

        Ok(PageFetch {
            url: url.to_string(),
            final_url,
            status_code,
            headers,
            body,
            elapsed_ms,
        })
    }
}
