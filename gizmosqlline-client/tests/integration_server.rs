//! Runs against a live GizmoSQL server.
//!
//! Start one with
//! `docker run -p 31337:31337 -e GIZMOSQL_USERNAME=gizmosql_username -e GIZMOSQL_PASSWORD=gizmosql_password -e TLS_ENABLED=1 gizmosql/gizmosql:latest`
//! and point `GIZMOSQL_TEST_URL` at it, e.g.
//! `jdbc:gizmosql://localhost:31337?useEncryption=true&disableCertificateVerification=true&user=gizmosql_username&password=gizmosql_password`.
//! Every test is skipped when the variable is unset.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use gizmosqlline_client::arrow::{value_as_i64, value_as_string};
use gizmosqlline_client::{
    bundled_driver_path, load_driver, ConnectionUrl, Credentials, FlightSQLClient, FlightSqlDriver,
    QueryResult, StatementResult,
};

fn test_url() -> Option<ConnectionUrl> {
    let raw = std::env::var("GIZMOSQL_TEST_URL").ok()?;
    match ConnectionUrl::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => panic!("GIZMOSQL_TEST_URL is not a valid connection URL: {e:#}"),
    }
}

fn driver() -> Result<Arc<FlightSqlDriver>> {
    load_driver(bundled_driver_path())
}

fn connect(url: &ConnectionUrl) -> Result<FlightSQLClient> {
    let driver = driver()?;
    FlightSQLClient::connect(&driver, url, &Credentials::default())
}

fn unique_table_name(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{prefix}_{nanos}")
}

fn column_index(result: &QueryResult, name: &str) -> Result<usize> {
    result
        .schema
        .index_of(name)
        .map_err(|e| anyhow!("column {name} missing: {e}"))
}

fn first_i64(result: &QueryResult, name: &str) -> Result<i64> {
    let idx = column_index(result, name)?;
    let batch = result
        .batches
        .iter()
        .find(|b| b.num_rows() > 0)
        .ok_or_else(|| anyhow!("missing result batch"))?;
    value_as_i64(batch.column(idx).as_ref(), 0)
}

macro_rules! require_server {
    () => {
        match test_url() {
            Some(url) => url,
            None => {
                eprintln!("GIZMOSQL_TEST_URL not set, skipping");
                return Ok(());
            }
        }
    };
}

#[test]
fn driver_loads() -> Result<()> {
    let _url = require_server!();
    let driver = driver()?;
    assert_eq!(driver.path(), bundled_driver_path().as_path());
    Ok(())
}

#[test]
fn simple_query() -> Result<()> {
    let url = require_server!();
    let mut client = connect(&url)?;
    let result = client.query("SELECT 1 AS value")?;
    assert_eq!(result.total_rows, 1);
    assert_eq!(first_i64(&result, "value")?, 1);
    Ok(())
}

#[test]
fn arithmetic_expression() -> Result<()> {
    let url = require_server!();
    let mut client = connect(&url)?;
    let result = client.query("SELECT 2 + 3 AS sum, 10 * 5 AS product")?;
    assert_eq!(first_i64(&result, "sum")?, 5);
    assert_eq!(first_i64(&result, "product")?, 50);
    Ok(())
}

#[test]
fn string_functions() -> Result<()> {
    let url = require_server!();
    let mut client = connect(&url)?;
    let result = client.query("SELECT 'Hello' || ' ' || 'GizmoSQL' AS greeting")?;
    let idx = column_index(&result, "greeting")?;
    let greeting = value_as_string(result.batches[0].column(idx).as_ref(), 0)?;
    assert_eq!(greeting, "Hello GizmoSQL");
    Ok(())
}

#[test]
fn show_tables() -> Result<()> {
    let url = require_server!();
    let mut client = connect(&url)?;
    match client.run_statement("SHOW TABLES")? {
        StatementResult::Query(_) => Ok(()),
        StatementResult::Update(_) => Err(anyhow!("SHOW TABLES should return rows")),
    }
}

#[test]
fn create_and_query_table() -> Result<()> {
    let url = require_server!();
    let mut client = connect(&url)?;
    let table = unique_table_name("gizmosqlline_it");

    client.run_statement(&format!("CREATE TABLE {table} (id INT, name VARCHAR)"))?;
    client.run_statement(&format!(
        "INSERT INTO {table} VALUES (1, 'Alice'), (2, 'Bob'), (3, 'Charlie')"
    ))?;

    let rows = client.query(&format!("SELECT * FROM {table} ORDER BY id"))?;
    assert_eq!(rows.total_rows, 3);
    let name_idx = column_index(&rows, "name")?;
    let names = rows
        .batches
        .iter()
        .flat_map(|batch| {
            (0..batch.num_rows()).map(move |row| value_as_string(batch.column(name_idx).as_ref(), row))
        })
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(names, vec!["Alice", "Bob", "Charlie"]);

    let count = client.query(&format!("SELECT COUNT(*) AS cnt FROM {table}"))?;
    assert_eq!(first_i64(&count, "cnt")?, 3);

    client.run_statement(&format!("DROP TABLE {table}"))?;
    Ok(())
}

#[test]
fn multiple_connections() -> Result<()> {
    let url = require_server!();
    let mut first = connect(&url)?;
    let mut second = connect(&url)?;

    let one = first.query("SELECT 1 AS v")?;
    let two = second.query("SELECT 2 AS v")?;
    assert_eq!(first_i64(&one, "v")?, 1);
    assert_eq!(first_i64(&two, "v")?, 2);
    Ok(())
}
