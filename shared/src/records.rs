//! Records exchanged through the remote store

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{now_ms, now_secs};

/// A command fetched from a command address.
///
/// The stored value is opaque: usually a string, but any JSON value is
/// accepted and echoed back unchanged in the status record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command(Value);

impl Command {
    /// Wrap a stored value, returning `None` when it does not count as a command.
    ///
    /// `null`, `false`, `0`, `""`, `[]` and `{}` all mean "nothing pending".
    pub fn from_value(value: Value) -> Option<Self> {
        let present = match &value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        };
        present.then_some(Self(value))
    }

    /// Text handed to a command handler
    pub fn as_text(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self(Value::String(text.to_string()))
    }
}

/// Outcome of the last executed command, overwritten on every execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub last_executed: Command,
    /// Seconds since Unix epoch
    pub timestamp: f64,
    pub success: bool,
}

impl StatusRecord {
    /// Create a status record stamped with the current time
    pub fn new(command: Command, success: bool) -> Self {
        Self {
            last_executed: command,
            timestamp: now_secs(),
            success,
        }
    }
}

/// Input/output pair recorded by the brain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub input: String,
    pub output: String,
    #[serde(rename = "agentID")]
    pub agent_id: String,
    /// Seconds since Unix epoch
    pub timestamp: f64,
}

impl MemoryRecord {
    pub fn new(input: impl Into<String>, output: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            agent_id: agent_id.into(),
            timestamp: now_secs(),
        }
    }

    /// Key suffix for this record, derived from its own timestamp
    pub fn epoch_ms(&self) -> u64 {
        if self.timestamp > 0.0 {
            (self.timestamp * 1000.0) as u64
        } else {
            now_ms()
        }
    }
}
