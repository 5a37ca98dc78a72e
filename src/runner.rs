//! Query runner for the replica.
//!
//! Opens one connection, executes an ordered sequence of statements on it,
//! and returns only the last result-producing statement's output. The
//! connection is always closed, on success and on every error path.

use crate::config::ReplicaConfig;
use crate::db::{decode_rows, Command, DatabaseClient, MariaDbClient, Row, Table};
use crate::error::{ReplicaError, Result};
use std::str::FromStr;

/// The shape query results are returned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// A table with named columns.
    #[default]
    Tabular,

    /// Plain row tuples.
    Raw,
}

impl OutputFormat {
    /// Returns the format name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::Raw => "raw",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ReplicaError;

    /// Parses a format name, rejecting anything unrecognized before any
    /// connection is attempted.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tabular" => Ok(Self::Tabular),
            "raw" => Ok(Self::Raw),
            other => Err(ReplicaError::invalid_argument(format!(
                "The format should be either `tabular` or `raw`, not `{other}`."
            ))),
        }
    }
}

/// Output of a runner invocation, in the requested shape.
#[derive(Debug, Clone)]
pub enum RunOutput {
    /// Tabular result from the last result-producing statement.
    Tabular(Table),

    /// Raw decoded rows from the last result-producing statement.
    Raw(Vec<Row>),
}

impl RunOutput {
    /// Unwraps the tabular variant.
    pub fn into_table(self) -> Option<Table> {
        match self {
            Self::Tabular(table) => Some(table),
            Self::Raw(_) => None,
        }
    }

    /// Unwraps the raw variant.
    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            Self::Raw(rows) => Some(rows),
            Self::Tabular(_) => None,
        }
    }
}

/// Runs a sequence of statements against the replica.
///
/// Returns only the result of the final result-producing statement, or
/// `None` if no statement produced one.
pub async fn run(
    config: &ReplicaConfig,
    commands: &[Command],
    format: OutputFormat,
) -> Result<Option<RunOutput>> {
    run_with::<MariaDbClient>(config, commands, format).await
}

/// Like [`run`], but generic over the client implementation.
pub async fn run_with<C: DatabaseClient>(
    config: &ReplicaConfig,
    commands: &[Command],
    format: OutputFormat,
) -> Result<Option<RunOutput>> {
    let client = C::connect(config).await?;
    run_with_client(client, commands, format).await
}

/// Runs a sequence of statements on an already-open client.
///
/// The client is closed exactly once on every exit path; a statement error
/// is propagated after the close and takes precedence over any close error.
pub async fn run_with_client<C: DatabaseClient>(
    mut client: C,
    commands: &[Command],
    format: OutputFormat,
) -> Result<Option<RunOutput>> {
    let outcome = execute_all(&mut client, commands, format).await;
    let close_result = client.close().await;
    let output = outcome?;
    close_result?;
    Ok(output)
}

/// Executes every statement in order, keeping the last produced result.
async fn execute_all<C: DatabaseClient>(
    client: &mut C,
    commands: &[Command],
    format: OutputFormat,
) -> Result<Option<RunOutput>> {
    let mut result = None;

    for command in commands {
        let table = client.execute(command).await?;

        // Statements with no result set (DDL/DML) leave the accumulator
        // unchanged in both shapes, so the last result-producing
        // statement's output survives to the end of the sequence.
        let Some(mut table) = table else {
            continue;
        };

        match format {
            OutputFormat::Tabular => {
                table.rows = decode_rows(std::mem::take(&mut table.rows));
                result = Some(RunOutput::Tabular(table));
            }
            OutputFormat::Raw => {
                result = Some(RunOutput::Raw(decode_rows(table.rows)));
            }
        }
    }

    Ok(result)
}
