use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

use crate::error::{ConvError, Result};

/// Minimal GET transport shared by the catalog and rate clients.
#[async_trait]
pub trait HttpFetch: Send + Sync + Debug {
    /// Fetch `url` and return the response body. Transport failures and
    /// non-success statuses are reported as [`ConvError::Network`].
    async fn get(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    http: Client,
}

impl ReqwestFetch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("conv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConvError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get(&self, url: &str) -> Result<String> {
        tracing::debug!(%url, "GET");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ConvError::Network(format!("request to {url} failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ConvError::Network(format!("failed to read body from {url}: {e}")))?;

        if !status.is_success() {
            return Err(ConvError::Network(format!(
                "{url} responded with status {status}: {}",
                truncate_body(&body)
            )));
        }

        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
