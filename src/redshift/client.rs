//! Warehouse connection and SQL execution
//!
//! Redshift speaks the Postgres wire protocol, so connections go through
//! sqlx's Postgres driver with TLS required. Each call opens its own
//! connection and releases it on every exit path; no pooling or retries
//! happen at this layer.

use std::path::Path;

use sqlx::postgres::{PgConnectOptions, PgRow, PgSslMode};
use sqlx::{Column, Connection, Executor, PgConnection, Row};

use super::creds::creds_from_env;
use crate::error::{FlowError, Result};

/// Rows in engine order plus their column names
pub struct QueryOutput {
    pub data: Vec<PgRow>,
    pub columns: Vec<String>,
}

/// Open an encrypted warehouse connection from the credential string held
/// in the named environment variable.
///
/// The argument must be the *name* of the variable; a literal credential
/// string is rejected before any connection attempt.
pub async fn get_connection(env_var: &str) -> Result<PgConnection> {
    let creds = creds_from_env(env_var)?;
    let options = PgConnectOptions::new()
        .host(&creds.host)
        .port(creds.port)
        .database(&creds.database)
        .username(&creds.user)
        .password(&creds.password)
        .ssl_mode(PgSslMode::Require);

    tracing::debug!("Connecting to warehouse at {}:{}", creds.host, creds.port);
    Ok(PgConnection::connect_with(&options).await?)
}

/// Read a SQL file into a single string: the file's lines, with their line
/// terminators, joined by single spaces.
pub async fn read_sql(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FlowError::io(path, e))?;
    Ok(content.split_inclusive('\n').collect::<Vec<_>>().join(" "))
}

/// Execute one SQL statement against the warehouse.
///
/// Returns `None` when `return_data` is false. Otherwise all rows are
/// collected along with their column names; a statement yielding zero rows
/// still reports its column names. The connection is closed on every exit
/// path, including errors, before the error propagates.
pub async fn execute_sql(
    sql: &str,
    env_var: &str,
    return_data: bool,
) -> Result<Option<QueryOutput>> {
    let mut conn = get_connection(env_var).await?;
    let result = run_statement(&mut conn, sql, return_data).await;
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close warehouse connection: {}", e);
    }
    result
}

async fn run_statement(
    conn: &mut PgConnection,
    sql: &str,
    return_data: bool,
) -> Result<Option<QueryOutput>> {
    if !return_data {
        sqlx::query(sql).execute(&mut *conn).await?;
        return Ok(None);
    }

    let rows = sqlx::query(sql).fetch_all(&mut *conn).await?;
    let columns = match rows.first() {
        Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
        // Zero rows: the statement still describes its result shape
        None => conn
            .describe(sql)
            .await?
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
    };

    Ok(Some(QueryOutput {
        data: rows,
        columns,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_CREDS: &str =
        "host=my_hostname database=my_database user=my_user password=my_password port=1234";

    #[tokio::test]
    async fn test_get_connection_rejects_literal_creds() {
        // The credential string itself is not a variable name
        let result = get_connection(TEST_CREDS).await;
        assert!(matches!(result, Err(FlowError::Config(_))));
    }

    #[tokio::test]
    async fn test_execute_sql_rejects_missing_env_var() {
        let result = execute_sql("select 1", "AWSFLOW_NO_SUCH_VAR", false).await;
        assert!(matches!(result, Err(FlowError::Config(_))));
    }

    #[tokio::test]
    async fn test_read_sql_missing_file() {
        let result = read_sql("/definitely/not/a/file.sql").await;
        assert!(matches!(result, Err(FlowError::Io { .. })));
    }

    #[tokio::test]
    async fn test_read_sql_joins_lines_with_spaces() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "select\n    col1\n    col2\nfrom\n    pretend.first_table\nlimit\n    1000;"
        )
        .unwrap();

        let sql = read_sql(file.path()).await.unwrap();
        assert_eq!(
            sql,
            "select\n     col1\n     col2\n from\n     pretend.first_table\n limit\n     1000;"
        );
    }

    #[tokio::test]
    async fn test_read_sql_single_line_unchanged() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "select 1;").unwrap();

        let sql = read_sql(file.path()).await.unwrap();
        assert_eq!(sql, "select 1;");
    }
}
