//! Memory record listing

use athena_shared::MemoryRecord;
use serde_json::Value;
use tracing::warn;

/// A memory record with the key it is stored under
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    pub key: String,
    pub record: MemoryRecord,
}

/// Pick records from the `memory` tree, newest first.
///
/// Keys are `<epoch_ms>_<agent_id>`; entries that do not decode as memory
/// records are skipped.
pub fn select(tree: Value, agent: Option<&str>, limit: usize) -> Vec<MemoryEntry> {
    let Value::Object(map) = tree else {
        return Vec::new();
    };

    let mut entries: Vec<MemoryEntry> = map
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<MemoryRecord>(value) {
            Ok(record) => Some(MemoryEntry { key, record }),
            Err(e) => {
                warn!("Skipping malformed memory record {}: {}", key, e);
                None
            }
        })
        .filter(|entry| agent.map_or(true, |id| entry.record.agent_id == id))
        .collect();

    entries.sort_by(|a, b| key_millis(&b.key).cmp(&key_millis(&a.key)).then_with(|| b.key.cmp(&a.key)));
    entries.truncate(limit);
    entries
}

/// Millisecond prefix of a memory key, 0 when missing
fn key_millis(key: &str) -> u64 {
    key.split('_')
        .next()
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(0)
}
