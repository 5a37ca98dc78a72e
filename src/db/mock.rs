//! Mock database client for testing.
//!
//! Provides an in-memory client so runner behavior can be tested without a
//! replica. Exported from the crate because integration tests drive the
//! runner with it.

use super::{ColumnInfo, Command, DatabaseClient, Table, Value};
use crate::config::ReplicaConfig;
use crate::error::{ReplicaError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A mock client that returns scripted or derived results.
///
/// With an empty script, behavior is derived from the statement text:
/// `SELECT`-ish statements yield a one-row table echoing the statement,
/// statements containing `fail` yield a query error, and everything else
/// produces no result set. Scripted responses, when pushed, are consumed in
/// FIFO order instead.
pub struct MockClient {
    script: VecDeque<Result<Option<Table>>>,
    executed: Arc<Mutex<Vec<Command>>>,
    close_calls: Arc<AtomicUsize>,
    fail_on: Option<String>,
}

impl MockClient {
    /// Creates a new mock client with an empty script.
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            executed: Arc::new(Mutex::new(Vec::new())),
            close_calls: Arc::new(AtomicUsize::new(0)),
            fail_on: None,
        }
    }

    /// Queues a tabular result for the next executed statement.
    pub fn push_result(&mut self, table: Table) {
        self.script.push_back(Ok(Some(table)));
    }

    /// Queues a "no result set" response (DDL/DML statements).
    pub fn push_no_result(&mut self) {
        self.script.push_back(Ok(None));
    }

    /// Queues an error response.
    pub fn push_error(&mut self, error: ReplicaError) {
        self.script.push_back(Err(error));
    }

    /// Makes any statement containing `pattern` fail with a query error.
    pub fn with_failure_on(mut self, pattern: impl Into<String>) -> Self {
        self.fail_on = Some(pattern.into());
        self
    }

    /// Returns a handle to the statements executed so far.
    pub fn executed(&self) -> Arc<Mutex<Vec<Command>>> {
        Arc::clone(&self.executed)
    }

    /// Returns a handle to the close-call counter.
    pub fn close_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.close_calls)
    }

    fn derived_response(&self, command: &Command) -> Result<Option<Table>> {
        let sql = command.sql.trim().to_lowercase();

        if sql.contains("fail") {
            return Err(ReplicaError::query(format!("mock failure for: {}", command.sql)));
        }

        if sql.starts_with("select") || sql.starts_with("show") {
            let columns = vec![ColumnInfo::new("result", "VARBINARY")];
            let rows = vec![vec![Value::String(command.sql.clone())]];
            return Ok(Some(
                Table::with_data(columns, rows).with_execution_time(Duration::from_millis(1)),
            ));
        }

        Ok(None)
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockClient {
    async fn connect(_config: &ReplicaConfig) -> Result<Self> {
        Ok(Self::new())
    }

    async fn execute(&mut self, command: &Command) -> Result<Option<Table>> {
        self.executed
            .lock()
            .expect("executed log poisoned")
            .push(command.clone());

        if let Some(pattern) = &self.fail_on {
            if command.sql.contains(pattern.as_str()) {
                return Err(ReplicaError::query(format!(
                    "mock failure for: {}",
                    command.sql
                )));
            }
        }

        match self.script.pop_front() {
            Some(response) => response,
            None => self.derived_response(command),
        }
    }

    async fn close(self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
