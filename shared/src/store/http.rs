//! HTTP store implementation for Firebase-style realtime databases

use super::traits::RemoteStore;
use super::StoreError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Store client speaking the `<base-url>/<path>.json` REST convention
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Create a client for `base_url`; every request is bounded by `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| StoreError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StoreError::InvalidUrl(format!(
                "{base_url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::Client)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the document at `path`
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    /// Send a request and decode its JSON body (`Value::Null` when empty)
    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Value, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| classify_error(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(path, e))?;
        debug!("store {} -> {} ({} bytes)", path, status, body.len());

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Map a reqwest failure to the store error taxonomy
fn classify_error(path: &str, err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout {
            path: path.to_string(),
        }
    } else {
        StoreError::Transport {
            path: path.to_string(),
            source: err,
        }
    }
}

fn non_null(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        other => Some(other),
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let request = self.client.get(self.url_for(path));
        self.send(path, request).await.map(non_null)
    }

    async fn write(&self, path: &str, value: &Value) -> Result<Option<Value>, StoreError> {
        let request = self.client.put(self.url_for(path)).json(value);
        self.send(path, request).await.map(non_null)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let request = self.client.delete(self.url_for(path));
        self.send(path, request).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "HTTP"
    }
}
