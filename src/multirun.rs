//! Multi-database query iteration.
//!
//! Repeats a statement sequence across many wiki databases, switching the
//! active database before each run and concatenating the tabular results.
//! Iteration is strictly sequential; each wiki gets its own connection.

use crate::config::ReplicaConfig;
use crate::db::{Command, DatabaseClient, MariaDbClient, Table};
use crate::error::Result;
use crate::runner::{run_with, OutputFormat, RunOutput};
use crate::wikis::list_all_wikis;
use std::time::Instant;
use tracing::info;

/// Runs `commands` against each wiki database in turn, concatenating the
/// tabular results row-wise.
///
/// When `wikis` is `None`, all wikis in the known project groups are used.
/// The first per-wiki failure propagates immediately; later wikis are not
/// attempted.
pub async fn multirun(
    config: &ReplicaConfig,
    commands: &[Command],
    wikis: Option<Vec<String>>,
) -> Result<Option<Table>> {
    let wikis = match wikis {
        Some(wikis) => wikis,
        None => list_all_wikis(config).await?,
    };

    multirun_with::<MariaDbClient>(config, commands, &wikis).await
}

/// Like [`multirun`], but generic over the client implementation.
pub async fn multirun_with<C: DatabaseClient>(
    config: &ReplicaConfig,
    commands: &[Command],
    wikis: &[String],
) -> Result<Option<Table>> {
    let mut result: Option<Table> = None;

    for wiki in wikis {
        let start = Instant::now();

        let scoped = with_database_switch(wiki, commands);
        let output = run_with::<C>(config, &scoped, OutputFormat::Tabular).await?;

        if let Some(part) = output.and_then(RunOutput::into_table) {
            match result.as_mut() {
                Some(acc) => acc.append(part),
                None => result = Some(part),
            }
        }

        let elapsed = start.elapsed();
        info!("{wiki} completed in {:.0} s", elapsed.as_secs_f64());
    }

    Ok(result)
}

/// Prepends the database-switch statement for `wiki` to `commands`.
fn with_database_switch(wiki: &str, commands: &[Command]) -> Vec<Command> {
    let mut scoped = Vec::with_capacity(commands.len() + 1);
    scoped.push(Command::new(format!("use `{wiki}`")));
    scoped.extend_from_slice(commands);
    scoped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MockClient, Value};
    use crate::error::ReplicaError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_database_switch_is_prepended() {
        let commands = [Command::new("select 1"), Command::new("select 2")];
        let scoped = with_database_switch("enwiki", &commands);

        assert_eq!(scoped.len(), 3);
        assert_eq!(scoped[0], Command::new("use `enwiki`"));
        assert_eq!(scoped[1], Command::new("select 1"));
        assert_eq!(scoped[2], Command::new("select 2"));
    }

    #[tokio::test]
    async fn test_multirun_concatenates_per_wiki_rows() {
        // The mock echoes each select as a one-row table, so two wikis
        // yield two rows total.
        let config = ReplicaConfig::default();
        let wikis = vec!["enwiki".to_string(), "dewiki".to_string()];

        let result = multirun_with::<MockClient>(&config, &[Command::new("select 1")], &wikis)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.row_count, 2);
        assert_eq!(result.columns.len(), 1);
        assert_eq!(result.columns[0].name, "result");
        assert_eq!(
            result.rows,
            vec![
                vec![Value::String("select 1".to_string())],
                vec![Value::String("select 1".to_string())],
            ]
        );
    }

    #[tokio::test]
    async fn test_multirun_empty_wiki_list_yields_none() {
        let config = ReplicaConfig::default();

        let result = multirun_with::<MockClient>(&config, &[Command::new("select 1")], &[])
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_multirun_propagates_first_failure() {
        // The mock fails any statement containing "fail", so switching to
        // this wiki errors out.
        let config = ReplicaConfig::default();
        let wikis = vec!["enwiki".to_string(), "failwiki".to_string()];

        let result =
            multirun_with::<MockClient>(&config, &[Command::new("select 1")], &wikis).await;

        assert!(matches!(result, Err(ReplicaError::Query(_))));
    }
}
