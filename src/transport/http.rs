//! Blocking HTTPS client for the fiscal API.

use reqwest::header::CONTENT_TYPE;

use super::{Transport, TransportError, TransportResponse};
use crate::config::FiscalConfig;

/// `reqwest` transport: bearer token, JSON body, per-profile timeout.
///
/// Blocks the calling thread for at most the profile's timeout. Must not be
/// called from inside an async runtime worker; use `spawn_blocking` there.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    user_agent: Option<String>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        config: &FiscalConfig,
        endpoint: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError> {
        let url = config
            .endpoint_url(endpoint)
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let mut builder = reqwest::blocking::Client::builder().timeout(config.timeout());
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let resp = client
            .post(url)
            .bearer_auth(&config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .map_err(|e| classify(e, config.timeout_secs))?;

        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| classify(e, config.timeout_secs))?;

        Ok(TransportResponse { status, body })
    }
}

fn classify(err: reqwest::Error, timeout_secs: u64) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            seconds: timeout_secs,
        }
    } else {
        TransportError::Network(err.to_string())
    }
}
