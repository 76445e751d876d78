//! Brain command handler

use super::{CommandHandler, HandlerError};
use async_trait::async_trait;
use anyhow::Context;
use athena_shared::{paths, MemoryRecord, RemoteStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Echoing handler that records every input/output pair in the store
pub struct Brain {
    agent_id: String,
    memory: Option<Arc<dyn RemoteStore>>,
}

impl Brain {
    /// Create a brain that records memory through `store`
    pub fn new(agent_id: impl Into<String>, store: Arc<dyn RemoteStore>) -> Self {
        Self {
            agent_id: agent_id.into(),
            memory: Some(store),
        }
    }

    /// Create a brain with no store to record memory into
    pub fn without_memory(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            memory: None,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn think(&self, prompt: &str) -> String {
        format!("Athena processed: {}", prompt)
    }

    /// Write a memory record under `memory/<epoch_ms>_<agent_id>`
    async fn remember(&self, store: &dyn RemoteStore, record: &MemoryRecord) -> anyhow::Result<()> {
        let path = paths::memory_path(record.epoch_ms(), &self.agent_id);
        let value = serde_json::to_value(record).context("Failed to encode memory record")?;
        store
            .write(&path, &value)
            .await
            .with_context(|| format!("Failed to write memory record {}", path))?;
        debug!("[BRAIN] Memory stored at {}", path);
        Ok(())
    }
}

#[async_trait]
impl CommandHandler for Brain {
    async fn process(&self, input: &str) -> Result<String, HandlerError> {
        let response = self.think(input);

        if let Some(store) = &self.memory {
            let record = MemoryRecord::new(input, response.as_str(), self.agent_id.as_str());
            if let Err(e) = self.remember(store.as_ref(), &record).await {
                warn!("[BRAIN] Memory store failed: {:#}", e);
            }
        }

        Ok(response)
    }

    fn name(&self) -> &'static str {
        "brain"
    }
}
