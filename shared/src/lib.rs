//! Athena Shared Types
//!
//! This crate provides the record types, store addresses and the remote
//! store client shared by the polling agent and the operator CLI.

pub mod paths;
pub mod records;
pub mod store;

use std::time::{SystemTime, UNIX_EPOCH};

// Re-export commonly used types at crate root
pub use paths::AgentAddress;
pub use records::{Command, MemoryRecord, StatusRecord};
pub use store::{HttpStore, RemoteStore, StoreError};

/// Default base URL of the Athena realtime database
pub const DEFAULT_BASE_URL: &str = "https://athenaai-memory-default-rtdb.firebaseio.com";

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Get current timestamp in fractional seconds since Unix epoch
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Timing parameters for the agent
pub mod timing {
    /// Delay between two polling ticks in milliseconds
    pub const POLL_INTERVAL_MS: u64 = 3000;

    /// Upper bound for a single store request in milliseconds
    pub const REQUEST_TIMEOUT_MS: u64 = 5000;
}
