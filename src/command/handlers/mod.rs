//! Command handlers

mod brain;

pub use brain::Brain;

use async_trait::async_trait;
use thiserror::Error;

/// Failure raised while processing a command
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HandlerError {
    #[error("Command failed: {0}")]
    Failed(String),
}

/// Processes the text of a command into a result
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn process(&self, input: &str) -> Result<String, HandlerError>;

    /// Human-readable name for this handler
    fn name(&self) -> &'static str;
}
