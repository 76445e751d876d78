//! Command poller - the fetch, execute, report loop

use super::AgentConfig;
use crate::command::{CommandExecutor, CommandResult, CommandSource, Execution};
use athena_shared::{paths, AgentAddress, Command, RemoteStore, StatusRecord};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What happened at one command address during a tick
#[derive(Debug, Clone)]
pub enum SlotOutcome {
    /// Nothing pending
    Idle,
    /// The command address could not be read
    ReadFailed { reason: String },
    /// A command was executed
    Executed {
        command: Command,
        result: CommandResult,
        status_written: bool,
    },
}

impl SlotOutcome {
    pub fn is_executed(&self) -> bool {
        matches!(self, SlotOutcome::Executed { .. })
    }
}

/// Outcome of one polling tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub targeted: SlotOutcome,
    pub broadcast: SlotOutcome,
}

impl TickReport {
    /// Number of commands executed during the tick
    pub fn executed(&self) -> usize {
        [&self.targeted, &self.broadcast]
            .iter()
            .filter(|slot| slot.is_executed())
            .count()
    }

    /// Number of status records written during the tick
    pub fn status_writes(&self) -> usize {
        [&self.targeted, &self.broadcast]
            .iter()
            .filter(|slot| matches!(slot, SlotOutcome::Executed { status_written: true, .. }))
            .count()
    }

    /// True when no read or status write failed
    pub fn is_clean(&self) -> bool {
        [&self.targeted, &self.broadcast].iter().all(|slot| match slot {
            SlotOutcome::Idle => true,
            SlotOutcome::ReadFailed { .. } => false,
            SlotOutcome::Executed { status_written, .. } => *status_written,
        })
    }
}

/// Polls the store for commands addressed to one agent
pub struct CommandPoller {
    config: AgentConfig,
    address: AgentAddress,
    store: Arc<dyn RemoteStore>,
    executor: CommandExecutor,
}

impl CommandPoller {
    /// Create a new command poller
    pub fn new(config: AgentConfig, store: Arc<dyn RemoteStore>, executor: CommandExecutor) -> Self {
        let address = config.address();
        Self {
            config,
            address,
            store,
            executor,
        }
    }

    pub fn address(&self) -> &AgentAddress {
        &self.address
    }

    /// Run one tick: targeted command first, then the broadcast command.
    ///
    /// Failures are logged and reported, never propagated.
    pub async fn tick(&self) -> TickReport {
        let targeted = self
            .poll_slot(&self.address.command_path(), CommandSource::Targeted)
            .await;
        let broadcast = self
            .poll_slot(paths::BROADCAST_COMMAND, CommandSource::Broadcast)
            .await;

        TickReport { targeted, broadcast }
    }

    async fn poll_slot(&self, path: &str, source: CommandSource) -> SlotOutcome {
        let value = match self.store.read(path).await {
            Ok(value) => value,
            Err(e) => {
                error!("[AGENT] Failed to read {} command: {}", source, e);
                return SlotOutcome::ReadFailed {
                    reason: e.to_string(),
                };
            }
        };

        let Some(command) = value.and_then(Command::from_value) else {
            debug!("[AGENT] No {} command at {}", source, path);
            return SlotOutcome::Idle;
        };

        let execution = self.executor.execute(&command, source).await;
        debug!(
            "[AGENT] {} command finished in {} ms",
            execution.source, execution.processing_time_ms
        );

        let Execution { command, result, status, .. } = execution;
        let status_written = self.publish_status(&status).await;

        // Left in place unless clearing is enabled, so a stable command runs every tick.
        // The broadcast address is shared by every agent and is never cleared here.
        if self.config.clear_after_execute && source == CommandSource::Targeted {
            match self.store.delete(path).await {
                Ok(()) => debug!("[AGENT] Cleared {} command at {}", source, path),
                Err(e) => warn!("[AGENT] Failed to clear {} command: {}", source, e),
            }
        }

        SlotOutcome::Executed {
            command,
            result,
            status_written,
        }
    }

    async fn publish_status(&self, status: &StatusRecord) -> bool {
        let path = self.address.status_path();
        let value = match serde_json::to_value(status) {
            Ok(value) => value,
            Err(e) => {
                error!("[AGENT] Failed to encode status record: {}", e);
                return false;
            }
        };

        match self.store.write(&path, &value).await {
            Ok(_) => true,
            Err(e) => {
                error!("[AGENT] Failed to write status: {}", e);
                false
            }
        }
    }

    /// Poll until `shutdown` turns true (or its sender is dropped).
    ///
    /// Returns the number of ticks run.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        info!(
            "[AGENT] Polling as {} via {} every {:?}",
            self.address,
            self.store.name(),
            self.config.poll_interval
        );

        let mut ticks = 0u64;

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            let report = self.tick().await;
            ticks += 1;
            debug!(
                "[AGENT] Tick {} done: {} executed, {} status write(s), clean={}",
                ticks,
                report.executed(),
                report.status_writes(),
                report.is_clean()
            );

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!(
            "[AGENT] Polling stopped after {} tick(s), {} command(s) executed",
            ticks,
            self.executor.executed_count()
        );
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handlers::Brain;
    use crate::testing::FakeStore;
    use athena_shared::now_secs;
    use serde_json::{json, Value};
    use std::time::Duration;

    const TARGETED: &str = "agents/mobile/mobile/command";
    const STATUS: &str = "agents/mobile/mobile/status";

    fn poller_with(store: Arc<FakeStore>, config: AgentConfig) -> CommandPoller {
        let brain = Brain::new(config.agent_id.clone(), store.clone());
        CommandPoller::new(config, store, CommandExecutor::new(Arc::new(brain)))
    }

    fn poller(store: Arc<FakeStore>) -> CommandPoller {
        poller_with(store, AgentConfig::default())
    }

    fn status_of(value: &Value) -> StatusRecord {
        serde_json::from_value(value.clone()).expect("status record")
    }

    #[tokio::test]
    async fn test_idle_tick_writes_nothing() {
        let store = Arc::new(FakeStore::new());
        let report = poller(store.clone()).tick().await;

        assert!(matches!(report.targeted, SlotOutcome::Idle));
        assert!(matches!(report.broadcast, SlotOutcome::Idle));
        assert!(report.is_clean());
        assert!(store.writes_under("").is_empty());
    }

    #[tokio::test]
    async fn test_ping_scenario() {
        let store = Arc::new(FakeStore::new());
        store.set(TARGETED, json!("ping"));
        let poller = poller(store.clone());

        let started = now_secs();
        let report = poller.tick().await;
        let finished = now_secs();

        match &report.targeted {
            SlotOutcome::Executed { command, result, status_written } => {
                assert_eq!(command, &Command::from("ping"));
                assert_eq!(
                    result,
                    &CommandResult::Completed {
                        output: "Athena processed: ping".into()
                    }
                );
                assert!(*status_written);
            }
            other => panic!("expected execution, got {other:?}"),
        }

        let status = status_of(&store.get(STATUS).expect("status written"));
        assert_eq!(status.last_executed, Command::from("ping"));
        assert!(status.success);
        assert!(status.timestamp >= started && status.timestamp <= finished);

        assert_eq!(store.writes_under("memory/").len(), 1);
    }

    #[tokio::test]
    async fn test_structured_command_is_echoed_in_status() {
        let store = Arc::new(FakeStore::new());
        let command = json!({"action": "open", "target": "camera"});
        store.set(TARGETED, command.clone());

        poller(store.clone()).tick().await;

        let status = store.get(STATUS).unwrap();
        assert_eq!(status["lastExecuted"], command);
    }

    #[tokio::test]
    async fn test_stable_command_is_re_executed() {
        let store = Arc::new(FakeStore::new());
        store.set(TARGETED, json!("ping"));
        let poller = poller(store.clone());

        for _ in 0..3 {
            assert!(poller.tick().await.targeted.is_executed());
        }

        assert_eq!(poller.executor.executed_count(), 3);
        assert_eq!(store.writes_under(STATUS).len(), 3);
        assert_eq!(store.get(TARGETED), Some(json!("ping")));
        assert!(store.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_targeted_and_broadcast_in_same_tick() {
        let store = Arc::new(FakeStore::new());
        store.set(TARGETED, json!("ping"));
        store.set(paths::BROADCAST_COMMAND, json!("sync"));

        let report = poller(store.clone()).tick().await;
        assert_eq!(report.executed(), 2);
        assert_eq!(report.status_writes(), 2);

        let writes = store.writes_under(STATUS);
        assert_eq!(writes.len(), 2);
        assert_eq!(status_of(&writes[0].1).last_executed, Command::from("ping"));
        assert_eq!(status_of(&writes[1].1).last_executed, Command::from("sync"));

        let final_status = status_of(&store.get(STATUS).unwrap());
        assert_eq!(final_status.last_executed, Command::from("sync"));
    }

    #[tokio::test]
    async fn test_read_failure_does_not_escape_tick() {
        let store = Arc::new(FakeStore::new());
        store.fail_reads_under(TARGETED);
        store.set(paths::BROADCAST_COMMAND, json!("sync"));

        let report = poller(store.clone()).tick().await;

        assert!(matches!(report.targeted, SlotOutcome::ReadFailed { .. }));
        assert!(report.broadcast.is_executed());
        assert!(!report.is_clean());
        assert_eq!(store.writes_under(STATUS).len(), 1);
    }

    #[tokio::test]
    async fn test_status_write_failure_is_reported() {
        let store = Arc::new(FakeStore::new());
        store.set(TARGETED, json!("ping"));
        store.fail_writes_under(STATUS);

        let report = poller(store.clone()).tick().await;

        match &report.targeted {
            SlotOutcome::Executed { status_written, .. } => assert!(!*status_written),
            other => panic!("expected execution, got {other:?}"),
        }
        assert_eq!(report.status_writes(), 0);
    }

    #[tokio::test]
    async fn test_memory_failure_keeps_success_status() {
        let store = Arc::new(FakeStore::new());
        store.set(TARGETED, json!("ping"));
        store.fail_writes_under("memory/");

        poller(store.clone()).tick().await;

        let status = status_of(&store.get(STATUS).unwrap());
        assert!(status.success);
    }

    #[tokio::test]
    async fn test_clear_after_execute() {
        let store = Arc::new(FakeStore::new());
        store.set(TARGETED, json!("ping"));
        let config = AgentConfig {
            clear_after_execute: true,
            ..Default::default()
        };
        let poller = poller_with(store.clone(), config);

        assert!(poller.tick().await.targeted.is_executed());
        assert_eq!(store.deletes(), vec![TARGETED.to_string()]);

        assert!(matches!(poller.tick().await.targeted, SlotOutcome::Idle));
        assert_eq!(poller.executor.executed_count(), 1);
    }

    #[tokio::test]
    async fn test_clearing_leaves_broadcast_for_other_agents() {
        let store = Arc::new(FakeStore::new());
        store.set(paths::BROADCAST_COMMAND, json!("sync"));

        let first = poller_with(
            store.clone(),
            AgentConfig {
                agent_id: "phone-a".into(),
                clear_after_execute: true,
                ..Default::default()
            },
        );
        let second = poller_with(
            store.clone(),
            AgentConfig {
                agent_id: "phone-b".into(),
                clear_after_execute: true,
                ..Default::default()
            },
        );

        assert!(first.tick().await.broadcast.is_executed());
        assert!(second.tick().await.broadcast.is_executed());

        assert!(store.deletes().is_empty());
        assert_eq!(store.get(paths::BROADCAST_COMMAND), Some(json!("sync")));
        assert_eq!(store.writes_under("agents/mobile/phone-a/status").len(), 1);
        assert_eq!(store.writes_under("agents/mobile/phone-b/status").len(), 1);
    }

    #[tokio::test]
    async fn test_run_retries_after_read_failure() {
        let store = Arc::new(FakeStore::new());
        store.set(TARGETED, json!("ping"));
        store.fail_reads_under(TARGETED);
        let config = AgentConfig {
            poll_interval: Duration::from_millis(10),
            ..Default::default()
        };
        let poller = Arc::new(poller_with(store.clone(), config));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let runner = poller.clone();
        let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

        // Let a few ticks fail before the store recovers
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.writes_under(STATUS).is_empty());
        store.clear_faults();

        let recovered = tokio::time::timeout(Duration::from_secs(2), async {
            while store.writes_under(STATUS).is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        shutdown_tx.send(true).unwrap();

        let ticks = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("poller stops after shutdown")
            .unwrap();
        assert!(recovered.is_ok(), "command never executed after the store recovered");
        assert!(ticks as usize > store.writes_under(STATUS).len());

        let status = status_of(&store.get(STATUS).unwrap());
        assert_eq!(status.last_executed, Command::from("ping"));
        assert!(status.success);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store = Arc::new(FakeStore::new());
        store.set(TARGETED, json!("ping"));
        let config = AgentConfig {
            poll_interval: Duration::from_millis(10),
            ..Default::default()
        };
        let poller = Arc::new(poller_with(store.clone(), config));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let runner = poller.clone();
        let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(60)).await;
        shutdown_tx.send(true).unwrap();

        let ticks = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("poller stops after shutdown")
            .unwrap();
        assert!(ticks >= 1);
        assert_eq!(store.writes_under(STATUS).len() as u64, ticks);
    }

    #[tokio::test]
    async fn test_run_with_shutdown_already_set() {
        let store = Arc::new(FakeStore::new());
        store.set(TARGETED, json!("ping"));
        let poller = poller(store.clone());

        let (_shutdown_tx, shutdown_rx) = watch::channel(true);
        assert_eq!(poller.run(shutdown_rx).await, 0);
        assert!(store.writes_under("").is_empty());
    }
}
