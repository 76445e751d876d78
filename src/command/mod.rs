//! Command execution infrastructure for the agent
//!
//! This module handles:
//! - Turning fetched commands into handler input
//! - Dispatching to the configured command handler
//! - Producing the status record published after each execution

mod executor;
pub mod handlers;

pub use executor::{CommandExecutor, CommandResult, CommandSource, Execution};
