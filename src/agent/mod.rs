//! Command polling for a single agent
//!
//! This module handles:
//! - Reading the targeted and broadcast command addresses each tick
//! - Executing present commands and publishing status records
//! - Sleeping between ticks until a shutdown signal arrives

mod config;
mod poller;

pub use config::AgentConfig;
pub use poller::{CommandPoller, SlotOutcome, TickReport};
