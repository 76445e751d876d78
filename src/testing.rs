//! In-memory store used by the unit tests

use async_trait::async_trait;
use athena_shared::{RemoteStore, StoreError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Map-backed store that logs writes and fails on configured path prefixes
#[derive(Default)]
pub struct FakeStore {
    values: Mutex<HashMap<String, Value>>,
    writes: Mutex<Vec<(String, Value)>>,
    deletes: Mutex<Vec<String>>,
    failing_reads: Mutex<Vec<String>>,
    failing_writes: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, path: &str, value: Value) {
        self.values.lock().unwrap().insert(path.to_string(), value);
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.values.lock().unwrap().get(path).cloned()
    }

    pub fn fail_reads_under(&self, prefix: &str) {
        self.failing_reads.lock().unwrap().push(prefix.to_string());
    }

    pub fn fail_writes_under(&self, prefix: &str) {
        self.failing_writes.lock().unwrap().push(prefix.to_string());
    }

    pub fn clear_faults(&self) {
        self.failing_reads.lock().unwrap().clear();
        self.failing_writes.lock().unwrap().clear();
    }

    /// Successful writes whose path starts with `prefix`, in order
    pub fn writes_under(&self, prefix: &str) -> Vec<(String, Value)> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    fn fails(list: &Mutex<Vec<String>>, path: &str) -> bool {
        list.lock().unwrap().iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    fn unavailable(path: &str) -> StoreError {
        StoreError::Status {
            path: path.to_string(),
            status: 503,
        }
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        if Self::fails(&self.failing_reads, path) {
            return Err(Self::unavailable(path));
        }
        Ok(self.get(path))
    }

    async fn write(&self, path: &str, value: &Value) -> Result<Option<Value>, StoreError> {
        if Self::fails(&self.failing_writes, path) {
            return Err(Self::unavailable(path));
        }
        self.set(path, value.clone());
        self.writes.lock().unwrap().push((path.to_string(), value.clone()));
        Ok(Some(value.clone()))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        if Self::fails(&self.failing_writes, path) {
            return Err(Self::unavailable(path));
        }
        self.values.lock().unwrap().remove(path);
        self.deletes.lock().unwrap().push(path.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
