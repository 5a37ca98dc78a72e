//! MariaDB replica client implementation.
//!
//! Provides the `MariaDbClient` struct that implements the `DatabaseClient`
//! trait for the analytics replicas using sqlx.

use crate::config::ReplicaConfig;
use crate::db::{ColumnInfo, Command, DatabaseClient, Row, Table, Value};
use crate::error::{ReplicaError, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column as SqlxColumn, ConnectOptions, Executor, Row as SqlxRow, TypeInfo};
use std::time::Instant;
use tracing::debug;

/// MariaDB replica client owning a single connection.
#[derive(Debug)]
pub struct MariaDbClient {
    conn: MySqlConnection,
}

#[async_trait]
impl DatabaseClient for MariaDbClient {
    async fn connect(config: &ReplicaConfig) -> Result<Self> {
        let credentials = config.credentials()?;

        // Strings live in BINARY columns on the replicas, so the connection
        // charset must be binary-safe.
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&credentials.user)
            .charset("binary");

        if let Some(password) = &credentials.password {
            options = options.password(password);
        }

        debug!("Connecting to {}", config.display_string());

        let mut conn = options
            .connect()
            .await
            .map_err(|e| map_connection_error(e, config))?;

        conn.execute("SET autocommit = 1")
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Connected to {}", config.display_string());

        Ok(Self { conn })
    }

    async fn execute(&mut self, command: &Command) -> Result<Option<Table>> {
        let start = Instant::now();

        // Statements without parameters go through the text protocol, which
        // also accepts statements the prepared protocol rejects (USE, SET).
        let rows: Vec<MySqlRow> = if command.params.is_empty() {
            self.conn.fetch_all(command.sql.as_str()).await
        } else {
            let mut query = sqlx::query(&command.sql);
            for param in &command.params {
                query = bind_value(query, param);
            }
            query.fetch_all(&mut self.conn).await
        }
        .map_err(|e| ReplicaError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        if let Some(first_row) = rows.first() {
            let columns = column_info(first_row.columns());
            let converted: Vec<Row> = rows.iter().map(convert_row).collect();
            return Ok(Some(
                Table::with_data(columns, converted).with_execution_time(execution_time),
            ));
        }

        // No rows came back. A prepare tells an empty result set apart from a
        // statement that produces none at all; statements the prepared
        // protocol rejects cannot have a result set either way.
        match self.conn.describe(&command.sql).await {
            Ok(describe) if !describe.columns().is_empty() => {
                let columns = column_info(describe.columns());
                Ok(Some(
                    Table::with_data(columns, Vec::new()).with_execution_time(execution_time),
                ))
            }
            _ => Ok(None),
        }
    }

    async fn close(self) -> Result<()> {
        use sqlx::Connection;
        self.conn
            .close()
            .await
            .map_err(|e| ReplicaError::connection(e.to_string()))
    }
}

/// Extracts column metadata from sqlx columns.
fn column_info<C: SqlxColumn>(columns: &[C]) -> Vec<ColumnInfo> {
    columns
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect()
}

/// Binds a single value onto a query.
fn bind_value<'q>(
    query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
    value: &Value,
) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::String(s) => query.bind(s.clone()),
        Value::Bytes(b) => query.bind(b.clone()),
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a MySqlRow to our Value type.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row
            .try_get::<Option<u64>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "FLOAT" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "DOUBLE" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // For all other types, try string first and fall back to raw bytes.
        _ => {
            if let Ok(Some(s)) = row.try_get::<Option<String>, _>(index) {
                Value::String(s)
            } else if let Ok(Some(b)) = row.try_get::<Option<Vec<u8>>, _>(index) {
                Value::Bytes(b)
            } else {
                Value::Null
            }
        }
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ReplicaConfig) -> ReplicaError {
    let host = &config.host;
    let port = config.port;
    let database = &config.database;

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ReplicaError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the replica is reachable."
        ))
    } else if error_str.contains("access denied") {
        ReplicaError::connection(
            "Access denied by the replica. Check your credentials file.".to_string(),
        )
    } else if error_str.contains("unknown database") {
        ReplicaError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ReplicaError::connection(format!(
            "Connection to {host}:{port} timed out. The replica may be overloaded or unreachable."
        ))
    } else {
        ReplicaError::connection(error.to_string())
    }
}

/// Formats a query error with server-side detail if available.
fn format_query_error(error: sqlx::Error) -> String {
    if let Some(db_error) = error.as_database_error() {
        let mut result = String::from("ERROR");
        if let Some(code) = db_error.code() {
            result.push(' ');
            result.push_str(&code);
        }
        result.push_str(": ");
        result.push_str(db_error.message());
        result
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_query_error_non_database() {
        let formatted = format_query_error(sqlx::Error::RowNotFound);
        assert!(formatted.contains("no rows"));
    }

    #[test]
    fn test_map_connection_error_preserves_kind() {
        let config = ReplicaConfig::default();
        let mapped = map_connection_error(sqlx::Error::PoolClosed, &config);
        assert!(matches!(mapped, ReplicaError::Connection(_)));
    }
}
