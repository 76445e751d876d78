mod agent;
mod command;
#[cfg(test)]
mod testing;

use agent::{AgentConfig, CommandPoller};
use anyhow::Context;
use athena_shared::{HttpStore, RemoteStore};
use command::handlers::Brain;
use command::CommandExecutor;
use std::sync::Arc;
use tokio::sync::watch;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AgentConfig {
        agent_kind: "mobile".into(),
        agent_id: "mobile".into(),
        ..Default::default()
    };

    info!("Agent starting: {}", config.address());
    info!("  Store: {}", config.base_url);

    let store: Arc<dyn RemoteStore> = Arc::new(
        HttpStore::new(&config.base_url, config.request_timeout)
            .context("Failed to create store client")?,
    );

    let brain = if config.memory_enabled {
        Brain::new(config.agent_id.clone(), store.clone())
    } else {
        Brain::without_memory(config.agent_id.clone())
    };
    info!("Brain ready for agent {}", brain.agent_id());

    let executor = CommandExecutor::new(Arc::new(brain));
    let poller = CommandPoller::new(config, store, executor);
    info!("Watching {} and {}", poller.address().command_path(), athena_shared::paths::BROADCAST_COMMAND);

    // Stop polling on Ctrl-C
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Keep the sender alive so polling continues without a shutdown hook
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    let ticks = poller.run(shutdown_rx).await;
    info!("Agent stopped after {} tick(s)", ticks);

    Ok(())
}
