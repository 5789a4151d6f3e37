//! Document store client.
//!
//! The core only depends on [`SearchClient::search`]; connection lifecycle
//! belongs to the implementation. Transport failures, timeouts and 5xx
//! answers surface as [`Error::StoreUnavailable`]; a rejected request (4xx)
//! or an undecodable body surfaces as [`Error::MalformedResponse`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::storage::queries::SearchRequest;
use crate::{log_debug, log_error, log_info, log_warn};

/// Longest slice of an error body carried into the error message.
const ERROR_BODY_LIMIT: usize = 512;

/// Executes a compiled request and returns the raw response tree.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Value>;
}

/// HTTP client for an Elasticsearch-compatible `_search` endpoint.
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    http: reqwest::Client,
    host: String,
}

impl HttpSearchClient {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            host: config.host.clone(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Check the cluster answers on its root endpoint.
    pub async fn ping(&self) -> bool {
        match self.http.head(&self.host).send().await {
            Ok(response) if response.status().is_success() => {
                log_info!("STORE_PING_OK", host = self.host);
                true
            }
            Ok(response) => {
                log_warn!(
                    "STORE_PING_FAILED",
                    host = self.host,
                    status = response.status().as_u16()
                );
                false
            }
            Err(e) => {
                log_warn!("STORE_PING_FAILED", host = self.host, error = e.to_string());
                false
            }
        }
    }
}

#[async_trait]
impl SearchClient for HttpSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<Value> {
        let url = search_url(&self.host, &request.index);
        log_debug!("STORE_SEARCH", url = url);

        let transport_error = |e: reqwest::Error| {
            log_error!("STORE_UNAVAILABLE", url = url, error = e.to_string());
            Error::StoreUnavailable(format!("search on '{}' failed: {}", request.index, e))
        };

        let response = self
            .http
            .post(&url)
            .json(&request.body)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            let error = status_error(status, &request.index, &body);
            match error {
                Error::StoreUnavailable(_) => {
                    log_error!("STORE_UNAVAILABLE", url = url, status = status.as_u16())
                }
                _ => log_warn!("STORE_REJECTED", url = url, status = status.as_u16()),
            }
            return Err(error);
        }

        decode_body(&request.index, &body)
    }
}

fn search_url(host: &str, index: &str) -> String {
    format!("{}/{}/_search", host.trim_end_matches('/'), index)
}

/// Classify a non-success answer.
///
/// Server-side trouble (5xx, 408, 429) means the store is unavailable; any
/// other status means it refused the request as compiled.
fn status_error(status: StatusCode, index: &str, body: &[u8]) -> Error {
    let text: String = String::from_utf8_lossy(body)
        .chars()
        .take(ERROR_BODY_LIMIT)
        .collect();
    let detail = format!("search on '{}' returned {}: {}", index, status, text);

    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        Error::StoreUnavailable(detail)
    } else {
        Error::MalformedResponse(detail)
    }
}

fn decode_body(index: &str, body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| {
        Error::MalformedResponse(format!(
            "search on '{}' returned an undecodable body: {}",
            index, e
        ))
    })
}
