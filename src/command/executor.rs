//! Command executor - dispatches fetched commands to the handler

use super::handlers::CommandHandler;
use athena_shared::{now_ms, Command, StatusRecord};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of command execution
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Handler returned an output
    Completed { output: String },
    /// Handler reported a failure
    Failed { message: String },
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Completed { .. })
    }
}

/// Address a command was fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// The agent's own command address
    Targeted,
    /// The address shared by all agents
    Broadcast,
}

impl fmt::Display for CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandSource::Targeted => write!(f, "targeted"),
            CommandSource::Broadcast => write!(f, "broadcast"),
        }
    }
}

/// One finished execution
#[derive(Debug, Clone)]
pub struct Execution {
    pub command: Command,
    pub source: CommandSource,
    pub result: CommandResult,
    pub status: StatusRecord,
    pub processing_time_ms: u64,
}

/// Executes commands through a single handler
pub struct CommandExecutor {
    handler: Arc<dyn CommandHandler>,
    executed: AtomicU64,
}

impl CommandExecutor {
    /// Create a new command executor
    pub fn new(handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            handler,
            executed: AtomicU64::new(0),
        }
    }

    /// Number of commands executed so far
    pub fn executed_count(&self) -> u64 {
        self.executed.load(Ordering::SeqCst)
    }

    /// Execute a command and build the status record to publish
    pub async fn execute(&self, command: &Command, source: CommandSource) -> Execution {
        let start_time = now_ms();
        let input = command.as_text();

        info!(
            "[EXECUTOR] Received {} command for {}: {}",
            source,
            self.handler.name(),
            input
        );

        let result = match self.handler.process(&input).await {
            Ok(output) => {
                info!("[EXECUTOR] Result: {}", output);
                CommandResult::Completed { output }
            }
            Err(e) => {
                warn!("[EXECUTOR] {} failed: {}", self.handler.name(), e);
                CommandResult::Failed {
                    message: e.to_string(),
                }
            }
        };

        self.executed.fetch_add(1, Ordering::SeqCst);

        // Stamped once the handler has returned
        let status = StatusRecord::new(command.clone(), result.is_success());

        Execution {
            command: command.clone(),
            source,
            result,
            status,
            processing_time_ms: now_ms().saturating_sub(start_time),
        }
    }
}
