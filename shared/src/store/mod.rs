//! Remote store access
//!
//! The store is a path-addressed JSON document tree reached over HTTP:
//! every path maps to `<base-url>/<path>.json`.

mod http;
mod traits;

pub use http::HttpStore;
pub use traits::RemoteStore;

use thiserror::Error;

/// Errors that can occur while talking to the remote store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {path} timed out")]
    Timeout { path: String },

    #[error("Transport error on {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Store returned HTTP {status} for {path}")]
    Status { path: String, status: u16 },

    #[error("Invalid JSON from {path}: {message}")]
    Decode { path: String, message: String },
}

