mod memory;

use anyhow::{bail, Context, Result};
use athena_shared::{paths, timing, AgentAddress, HttpStore, RemoteStore, StatusRecord, DEFAULT_BASE_URL};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "athenactl")]
#[command(about = "Send commands to Athena agents and inspect their status", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the remote store
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = timing::REQUEST_TIMEOUT_MS / 1000)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a command to one agent
    Send {
        /// Agent kind (e.g. "mobile")
        kind: String,
        /// Agent ID
        id: String,
        /// Command text
        command: String,
        /// Parse the command text as a JSON value
        #[arg(long)]
        json: bool,
    },

    /// Send a command to every agent
    Broadcast {
        /// Command text
        command: String,
        /// Parse the command text as a JSON value
        #[arg(long)]
        json: bool,
    },

    /// Show the last status record of an agent
    Status {
        kind: String,
        id: String,
    },

    /// Remove a pending command
    Clear {
        kind: Option<String>,
        id: Option<String>,
        /// Clear the broadcast command instead
        #[arg(long, conflicts_with_all = ["kind", "id"])]
        broadcast: bool,
    },

    /// List brain memory records, newest first
    Memory {
        /// Only show records from this agent ID
        #[arg(long)]
        agent: Option<String>,
        /// Maximum number of records to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let cli = Cli::parse();
    let store = HttpStore::new(&cli.base_url, Duration::from_secs(cli.timeout_secs))
        .context("Failed to create store client")?;
    debug!("Using store {}", store.base_url());

    match cli.command {
        Commands::Send { kind, id, command, json } => {
            let agent = AgentAddress::new(kind, id);
            let value = command_value(&command, json)?;
            store
                .write(&agent.command_path(), &value)
                .await
                .with_context(|| format!("Failed to send command to {}", agent))?;
            info!("Command sent to {}", agent);
            println!("Sent {} to {}", value, agent.command_path());
        }
        Commands::Broadcast { command, json } => {
            let value = command_value(&command, json)?;
            store
                .write(paths::BROADCAST_COMMAND, &value)
                .await
                .context("Failed to broadcast command")?;
            println!("Sent {} to {}", value, paths::BROADCAST_COMMAND);
        }
        Commands::Status { kind, id } => {
            let agent = AgentAddress::new(kind, id);
            let value = store
                .read(&agent.status_path())
                .await
                .with_context(|| format!("Failed to read status of {}", agent))?;
            match value {
                Some(value) => {
                    let status: StatusRecord = serde_json::from_value(value)
                        .with_context(|| format!("Malformed status record for {}", agent))?;
                    print_status(&agent, &status);
                }
                None => println!("{}: no status recorded", agent),
            }
        }
        Commands::Clear { kind, id, broadcast } => {
            let path = match (broadcast, kind, id) {
                (true, _, _) => paths::BROADCAST_COMMAND.to_string(),
                (false, Some(kind), Some(id)) => AgentAddress::new(kind, id).command_path(),
                _ => bail!("clear needs <KIND> <ID> or --broadcast"),
            };
            store
                .delete(&path)
                .await
                .with_context(|| format!("Failed to clear {}", path))?;
            println!("Cleared {}", path);
        }
        Commands::Memory { agent, limit } => {
            let value = store
                .read(paths::MEMORY_ROOT)
                .await
                .context("Failed to read memory records")?;
            let entries = memory::select(value.unwrap_or(Value::Null), agent.as_deref(), limit);
            if entries.is_empty() {
                println!("No memory records");
            }
            for entry in entries {
                println!(
                    "{} [{}] {} -> {}",
                    entry.key, entry.record.agent_id, entry.record.input, entry.record.output
                );
            }
        }
    }

    Ok(())
}

/// Build the stored value for command text
fn command_value(text: &str, json: bool) -> Result<Value> {
    if text.is_empty() {
        bail!("command must not be empty");
    }
    if json {
        serde_json::from_str(text).with_context(|| format!("Invalid JSON command: {}", text))
    } else {
        Ok(Value::String(text.to_string()))
    }
}

fn print_status(agent: &AgentAddress, status: &StatusRecord) {
    println!("Agent:         {}", agent);
    println!("Last executed: {}", status.last_executed.value());
    println!("Timestamp:     {:.3}", status.timestamp);
    println!("Success:       {}", status.success);
}
