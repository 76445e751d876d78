//! Agent configuration

use athena_shared::{timing, AgentAddress, DEFAULT_BASE_URL};
use std::time::Duration;

/// Configuration for a polling agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Agent kind, first path segment under `agents/`
    pub agent_kind: String,
    /// Agent ID, also stamped on memory records
    pub agent_id: String,
    /// Base URL of the remote store
    pub base_url: String,
    /// Delay between two ticks
    pub poll_interval: Duration,
    /// Upper bound for a single store request
    pub request_timeout: Duration,
    /// Record brain input/output pairs in the store
    pub memory_enabled: bool,
    /// Delete a command address once its command has been executed
    pub clear_after_execute: bool,
}

impl AgentConfig {
    pub fn address(&self) -> AgentAddress {
        AgentAddress::new(self.agent_kind.clone(), self.agent_id.clone())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_kind: "mobile".into(),
            agent_id: "mobile".into(),
            base_url: DEFAULT_BASE_URL.into(),
            poll_interval: Duration::from_millis(timing::POLL_INTERVAL_MS),
            request_timeout: Duration::from_millis(timing::REQUEST_TIMEOUT_MS),
            memory_enabled: true,
            clear_after_execute: false,
        }
    }
}
