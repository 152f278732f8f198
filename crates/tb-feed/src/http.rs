//! HTTP transport for provider adapters.
//!
//! Adapters only need "GET this URL, give me JSON". [`JsonFetcher`] is that
//! capability; [`ReqwestFetcher`] is the production implementation and tests
//! substitute canned responses.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tb_core::TbError;
use tracing::trace;

/// GET a URL and decode the body as JSON.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, TbError>;
}

/// [`JsonFetcher`] backed by a shared `reqwest::Client`.
///
/// The timeout applies to every request, from connect to end of body.
pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tickerbar/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;
        Ok(Self { http })
    }
}

fn classify(url: &str, err: reqwest::Error) -> TbError {
    if err.is_timeout() {
        TbError::Timeout(url.to_string())
    } else if err.is_decode() {
        TbError::Parse(format!("{url}: {err}"))
    } else {
        TbError::Transport(format!("{url}: {err}"))
    }
}

#[async_trait]
impl JsonFetcher for ReqwestFetcher {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, TbError> {
        trace!("GET {url}");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TbError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| classify(url, e))
    }
}
