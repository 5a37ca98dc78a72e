//! Multi-database runner integration tests.
//!
//! Drive `multirun_with` through hand-written clients that record every
//! statement, to check the database-switch prepending, row concatenation,
//! and abort-on-first-failure behavior end to end.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Mutex;
use wmf_replica::db::DatabaseClient;
use wmf_replica::multirun::multirun_with;
use wmf_replica::{ColumnInfo, Command, ReplicaConfig, ReplicaError, Table, Value};

/// Client that records every statement from every connection.
struct RecordingClient;

static RECORDED: Mutex<Vec<String>> = Mutex::new(Vec::new());

#[async_trait]
impl DatabaseClient for RecordingClient {
    async fn connect(_config: &ReplicaConfig) -> wmf_replica::Result<Self> {
        Ok(Self)
    }

    async fn execute(&mut self, command: &Command) -> wmf_replica::Result<Option<Table>> {
        RECORDED.lock().unwrap().push(command.sql.clone());

        if command.sql.starts_with("select") {
            Ok(Some(Table::with_data(
                vec![ColumnInfo::new("result", "VARBINARY")],
                vec![vec![Value::String(command.sql.clone())]],
            )))
        } else {
            Ok(None)
        }
    }

    async fn close(self) -> wmf_replica::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_multirun_prepends_database_switch_per_wiki() {
    let config = ReplicaConfig::default();
    let wikis = vec!["enwiki".to_string(), "dewiki".to_string()];

    let result = multirun_with::<RecordingClient>(&config, &[Command::new("select 1")], &wikis)
        .await
        .unwrap()
        .unwrap();

    // Combined row count is the sum of the per-wiki row counts, with the
    // first result's column schema.
    assert_eq!(result.row_count, 2);
    assert_eq!(result.columns[0].name, "result");

    let recorded = RECORDED.lock().unwrap();
    assert_eq!(
        *recorded,
        vec![
            "use `enwiki`".to_string(),
            "select 1".to_string(),
            "use `dewiki`".to_string(),
            "select 1".to_string(),
        ]
    );
}

/// Client that fails when switching to one specific wiki.
struct AbortClient;

static ATTEMPTED: Mutex<Vec<String>> = Mutex::new(Vec::new());

#[async_trait]
impl DatabaseClient for AbortClient {
    async fn connect(_config: &ReplicaConfig) -> wmf_replica::Result<Self> {
        Ok(Self)
    }

    async fn execute(&mut self, command: &Command) -> wmf_replica::Result<Option<Table>> {
        if let Some(wiki) = command.sql.strip_prefix("use `") {
            ATTEMPTED
                .lock()
                .unwrap()
                .push(wiki.trim_end_matches('`').to_string());
        }

        if command.sql == "use `brokenwiki`" {
            return Err(ReplicaError::query("ERROR 1049: Unknown database"));
        }

        Ok(None)
    }

    async fn close(self) -> wmf_replica::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_multirun_aborts_after_first_failure() {
    let config = ReplicaConfig::default();
    let wikis = vec![
        "enwiki".to_string(),
        "brokenwiki".to_string(),
        "dewiki".to_string(),
    ];

    let result = multirun_with::<AbortClient>(&config, &[Command::new("select 1")], &wikis).await;

    assert!(matches!(result, Err(ReplicaError::Query(_))));

    // The failing wiki was attempted; the one after it never was.
    let attempted = ATTEMPTED.lock().unwrap();
    assert_eq!(
        *attempted,
        vec!["enwiki".to_string(), "brokenwiki".to_string()]
    );
}
