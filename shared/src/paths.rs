//! Store addresses used by agents
//!
//! ```text
//! agents/<kind>/<id>/command    targeted command (read)
//! agents/all/command            broadcast command (read)
//! agents/<kind>/<id>/status     last status record (write)
//! memory/<epoch_ms>_<agent_id>  brain memory record (write)
//! ```

use std::fmt;

/// Address shared by every agent kind for broadcast commands
pub const BROADCAST_COMMAND: &str = "agents/all/command";

/// Root under which memory records are written
pub const MEMORY_ROOT: &str = "memory";

/// Identifies one agent instance in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentAddress {
    pub kind: String,
    pub id: String,
}

impl AgentAddress {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Address of the command targeted at this agent
    pub fn command_path(&self) -> String {
        format!("agents/{}/{}/command", self.kind, self.id)
    }

    /// Address of this agent's status record
    pub fn status_path(&self) -> String {
        format!("agents/{}/{}/status", self.kind, self.id)
    }
}

impl fmt::Display for AgentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Address of a memory record written at `epoch_ms` by `agent_id`
pub fn memory_path(epoch_ms: u64, agent_id: &str) -> String {
    format!("{}/{}_{}", MEMORY_ROOT, epoch_ms, agent_id)
}
