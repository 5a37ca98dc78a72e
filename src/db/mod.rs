//! Database abstraction layer for wmf-replica.
//!
//! Provides a trait-based interface for replica connections, allowing the
//! real MariaDB client and the in-memory mock to be used interchangeably.

mod decode;
mod mariadb;
mod mock;
mod types;

pub use decode::{decode_row, decode_rows, try_decode};
pub use mariadb::MariaDbClient;
pub use mock::MockClient;
pub use types::{ColumnInfo, Row, Table, Value};

use crate::config::ReplicaConfig;
use crate::error::Result;
use async_trait::async_trait;

/// A single SQL statement plus optional bind parameters.
///
/// Parameters are bound server-side rather than interpolated into the
/// statement text, so caller-supplied values can never change the shape of
/// the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// The SQL text, with `?` placeholders for any parameters.
    pub sql: String,

    /// Values bound to the placeholders, in order.
    pub params: Vec<Value>,
}

impl Command {
    /// Creates a command with no bind parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a command with bind parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

impl From<&str> for Command {
    fn from(sql: &str) -> Self {
        Command::new(sql)
    }
}

impl From<String> for Command {
    fn from(sql: String) -> Self {
        Command::new(sql)
    }
}

/// Trait defining the interface for replica connections.
///
/// Each client owns exactly one connection for its lifetime. `execute`
/// returns `None` when the statement produced no result set (DDL/DML), which
/// lets callers distinguish "no result" from "empty result".
#[async_trait]
pub trait DatabaseClient: Send + Sized {
    /// Opens a connection using the given configuration.
    async fn connect(config: &ReplicaConfig) -> Result<Self>;

    /// Executes one statement, returning its result set if it produced one.
    async fn execute(&mut self, command: &Command) -> Result<Option<Table>>;

    /// Closes the connection.
    async fn close(self) -> Result<()>;
}
