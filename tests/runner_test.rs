//! Query runner integration tests.
//!
//! Exercise the public crate surface end to end against the mock client.

use pretty_assertions::assert_eq;
use wmf_replica::db::MockClient;
use wmf_replica::runner::{run_with, run_with_client};
use wmf_replica::{Command, OutputFormat, ReplicaConfig, ReplicaError, Value};

#[tokio::test]
async fn test_run_returns_last_producing_command() {
    let config = ReplicaConfig::default();

    // The mock treats non-select statements as result-less, so the final
    // select's echo is the output.
    let commands = [
        Command::new("create table staging.t (n int)"),
        Command::new("insert into staging.t values (1)"),
        Command::new("select n from staging.t"),
    ];

    let output = run_with::<MockClient>(&config, &commands, OutputFormat::Tabular)
        .await
        .unwrap()
        .unwrap();

    let table = output.into_table().unwrap();
    assert_eq!(table.row_count, 1);
    assert_eq!(
        table.rows[0][0],
        Value::String("select n from staging.t".to_string())
    );
}

#[tokio::test]
async fn test_format_parsed_from_string_input() {
    let config = ReplicaConfig::default();
    let format: OutputFormat = "raw".parse().unwrap();

    let output = run_with::<MockClient>(&config, &[Command::new("select 1")], format)
        .await
        .unwrap()
        .unwrap();

    assert!(output.into_rows().is_some());
}

#[tokio::test]
async fn test_unrecognized_format_fails_before_any_io() {
    let err = "json".parse::<OutputFormat>().unwrap_err();
    assert!(matches!(err, ReplicaError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_command_error_closes_connection_and_propagates() {
    let client = MockClient::new().with_failure_on("boom");
    let close_calls = client.close_calls();

    let commands = [Command::new("select 1"), Command::new("select boom")];
    let result = run_with_client(client, &commands, OutputFormat::Raw).await;

    assert!(matches!(result, Err(ReplicaError::Query(_))));
    assert_eq!(close_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}
