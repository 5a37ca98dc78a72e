//! Wiki database enumeration.
//!
//! Enumerates wiki database names from the `enwiki.sites` catalog table,
//! either across all known Wikimedia project groups or restricted to a
//! caller-supplied set of groups. Group names are always bound as query
//! parameters, never interpolated into the statement text. Symbolic group
//! names like `group0` resolve from on-disk dblist files instead of the
//! catalog.

use crate::config::ReplicaConfig;
use crate::db::{Command, DatabaseClient, MariaDbClient, Value};
use crate::error::{ReplicaError, Result};
use crate::runner::{run_with_client, OutputFormat, RunOutput};
use std::path::Path;

/// The known Wikimedia project groups.
pub const WIKI_GROUPS: [&str; 16] = [
    "commons",
    "incubator",
    "foundation",
    "mediawiki",
    "meta",
    "sources",
    "species",
    "wikibooks",
    "wikidata",
    "wikinews",
    "wikipedia",
    "wikiquote",
    "wikisource",
    "wikiversity",
    "wikivoyage",
    "wiktionary",
];

/// Lists the database names of all wikis in the known project groups,
/// sorted ascending.
pub async fn list_all_wikis(config: &ReplicaConfig) -> Result<Vec<String>> {
    let client = MariaDbClient::connect(config).await?;
    list_all_wikis_with_client(client).await
}

/// Like [`list_all_wikis`], but on an already-open client.
pub async fn list_all_wikis_with_client<C: DatabaseClient>(client: C) -> Result<Vec<String>> {
    fetch_wiki_keys(client, &WIKI_GROUPS[..]).await
}

/// Lists the database names of all wikis in the given project groups,
/// sorted ascending.
///
/// An empty group set yields an empty list without touching the network.
pub async fn list_wikis_by_group<S>(config: &ReplicaConfig, groups: &[S]) -> Result<Vec<String>>
where
    S: AsRef<str> + Sync,
{
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let client = MariaDbClient::connect(config).await?;
    list_wikis_by_group_with_client(client, groups).await
}

/// Like [`list_wikis_by_group`], but on an already-open client.
pub async fn list_wikis_by_group_with_client<C, S>(client: C, groups: &[S]) -> Result<Vec<String>>
where
    C: DatabaseClient,
    S: AsRef<str> + Sync,
{
    if groups.is_empty() {
        client.close().await?;
        return Ok(Vec::new());
    }

    fetch_wiki_keys(client, groups).await
}

/// Runs the catalog query and extracts the first column of each row.
async fn fetch_wiki_keys<C, S>(client: C, groups: &[S]) -> Result<Vec<String>>
where
    C: DatabaseClient,
    S: AsRef<str> + Sync,
{
    let command = sites_command(groups);
    let output = run_with_client(client, &[command], OutputFormat::Raw).await?;
    let rows = output.and_then(RunOutput::into_rows).unwrap_or_default();

    // A key that is still raw bytes after decoding is not a usable
    // database name; such rows are dropped.
    Ok(rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .filter_map(|value| match value {
            Value::String(key) => Some(key),
            _ => None,
        })
        .collect())
}

/// Default location of the MediaWiki configuration dblists.
pub const DEFAULT_DBLIST_PATH: &str = "/srv/mediawiki-config/dblists";

/// Resolves a symbolic group name (e.g. `group0`) to the wiki database
/// names listed in `<dblist_path>/<group_name>.dblist`.
///
/// Comment lines and the test-only `labtestwiki` entry are excluded.
pub fn resolve_group(group_name: &str, dblist_path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = dblist_path
        .as_ref()
        .join(format!("{group_name}.dblist"));

    let content = std::fs::read_to_string(&path).map_err(|e| {
        ReplicaError::config(format!("Failed to read dblist {}: {e}", path.display()))
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| *line != "labtestwiki")
        .map(String::from)
        .collect())
}

/// Builds the catalog query with one placeholder per group.
fn sites_command<S: AsRef<str>>(groups: &[S]) -> Command {
    let placeholders = vec!["?"; groups.len()].join(", ");
    let sql = format!(
        "select site_global_key from enwiki.sites \
         where site_group in ({placeholders}) \
         order by site_global_key asc"
    );
    let params = groups
        .iter()
        .map(|group| Value::from(group.as_ref()))
        .collect();

    Command::with_params(sql, params)
}
