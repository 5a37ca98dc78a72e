//! wmf-replica - a convenience layer for querying Wikimedia MariaDB
//! analytics replicas.
//!
//! Runs SQL statement sequences on a replica and returns the last
//! result-producing statement's output as a table or as raw row tuples,
//! enumerates wiki database names by project group, and repeats a query
//! across many wiki databases.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod multirun;
pub mod runner;
pub mod wikis;

pub use config::{Credentials, ReplicaConfig};
pub use db::{ColumnInfo, Command, DatabaseClient, MariaDbClient, Row, Table, Value};
pub use error::{ReplicaError, Result};
pub use multirun::multirun;
pub use runner::{run, OutputFormat, RunOutput};
pub use wikis::{
    list_all_wikis, list_wikis_by_group, resolve_group, DEFAULT_DBLIST_PATH, WIKI_GROUPS,
};
