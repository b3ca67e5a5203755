//! Outbound HTTP: the reqwest transport and the paced wrapper every source
//! calls upstream through.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use eventcast_core::source::{check_status, HttpFetch, HttpResponse, Result, SourceError};

use crate::cache::RateGate;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`HttpFetch`] over a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(HttpResponse::new(status, body))
    }
}

/// Wraps a transport with the shared rate gate.
///
/// Every call waits for the gate, closes it, calls upstream and closes it
/// again so the interval also covers the call's own latency.
#[derive(Clone)]
pub struct PacedFetcher {
    http: Arc<dyn HttpFetch>,
    gate: Option<RateGate>,
    interval_secs: u64,
}

impl PacedFetcher {
    pub fn new(http: Arc<dyn HttpFetch>) -> Self {
        Self {
            http,
            gate: None,
            interval_secs: 0,
        }
    }

    pub fn with_rate_gate(mut self, gate: RateGate, interval_secs: u64) -> Self {
        self.gate = Some(gate);
        self.interval_secs = interval_secs;
        self
    }

    /// GETs `url` and returns the body of a 2xx response.
    pub async fn get(&self, url: &str, query: &[(String, String)]) -> Result<String> {
        if let Some(gate) = &self.gate {
            gate.wait_until_open().await;
            gate.mark_busy(self.interval_secs).await;
        }

        tracing::debug!(url, "Calling upstream");
        let response = self.http.get(url, query).await;

        if let Some(gate) = &self.gate {
            gate.mark_busy(self.interval_secs).await;
        }

        let response = response?;
        tracing::debug!(url, status = response.status, "Upstream responded");
        check_status(response)
    }
}
