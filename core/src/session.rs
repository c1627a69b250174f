//! Transport sessions that execute [`HttpRequest`] values.
//!
//! # Design
//! `Session` is the only network boundary of the crate. A session is a cheap,
//! cloneable handle to a long-lived client shared by every outstanding call,
//! so a `DataTask` can own its own copy and run on any tokio worker.
//! Non-2xx statuses are data, not errors: interpreting them is the job of the
//! request configuration's response processor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CACHE_CONTROL};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RestKitError;
use crate::http::{CachePolicy, HttpMethod, HttpRequest, HttpResponse};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Executes requests. Implementations must tolerate any number of concurrent calls.
#[async_trait]
pub trait Session: Clone + Send + Sync + 'static {
    /// Perform one round-trip. Only transport failures are errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RestKitError>;
}

/// Tunables for [`ReqwestSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            user_agent: concat!("restkit/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A [`Session`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestSession {
    client: Client,
}

impl ReqwestSession {
    /// Build a session with [`SessionConfig::default`].
    pub fn new() -> Result<Self, RestKitError> {
        Self::with_config(&SessionConfig::default())
    }

    pub fn with_config(config: &SessionConfig) -> Result<Self, RestKitError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(RestKitError::transport)?;
        Ok(Self::from_client(client))
    }

    /// Reuse an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn to_reqwest(&self, request: HttpRequest) -> Result<reqwest::Request, RestKitError> {
        let mut builder = self.client.request(method(request.method), request.url);
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(RestKitError::transport)?;
            let value = HeaderValue::from_str(value).map_err(RestKitError::transport)?;
            builder = builder.header(name, value);
        }
        if request.cache_policy == CachePolicy::ReloadIgnoringLocalCache {
            builder = builder.header(CACHE_CONTROL, "no-cache");
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        builder.build().map_err(RestKitError::transport)
    }
}

#[async_trait]
impl Session for ReqwestSession {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RestKitError> {
        let request = self.to_reqwest(request)?;
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.client.execute(request).await.map_err(RestKitError::transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let bytes = response.bytes().await.map_err(RestKitError::transport)?;
        debug!(status, bytes = bytes.len(), "received response");

        Ok(HttpResponse {
            status,
            headers,
            body: (!bytes.is_empty()).then(|| bytes.to_vec()),
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}
