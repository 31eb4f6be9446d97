use adbc_core::{Connection, Statement};
use adbc_driver_manager::ManagedConnection;
use anyhow::{Context, Result};
use arrow_array::{RecordBatch, RecordBatchReader};
use arrow_schema::SchemaRef;
use tracing::debug;

use crate::driver::FlightSqlDriver;
use crate::url::{ConnectionUrl, Credentials};

/// An open connection to a Flight SQL server.
///
/// # Example
///
/// ```rust,ignore
/// use gizmosqlline_client::{load_driver, bundled_driver_path, ConnectionUrl, Credentials, FlightSQLClient};
///
/// let driver = load_driver(bundled_driver_path())?;
/// let url = ConnectionUrl::parse("jdbc:gizmosql://localhost:31337")?;
/// let mut client = FlightSQLClient::connect(&driver, &url, &Credentials::default())?;
/// let result = client.query("SELECT 1 AS value")?;
/// println!("Rows: {}", result.total_rows);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct FlightSQLClient {
    conn: ManagedConnection,
}

/// Result of executing a query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
    /// Total number of rows across all batches.
    pub total_rows: usize,
}

impl QueryResult {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        let total_rows = batches.iter().map(|b| b.num_rows()).sum();
        Self {
            schema,
            batches,
            total_rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }
}

/// Result of executing an update/DDL statement.
#[derive(Debug, Clone)]
pub struct UpdateResult {
    /// Number of rows affected (if reported by the server).
    pub rows_affected: Option<i64>,
}

/// Outcome of [`FlightSQLClient::run_statement`].
#[derive(Debug, Clone)]
pub enum StatementResult {
    Query(QueryResult),
    Update(UpdateResult),
}

impl FlightSQLClient {
    /// Open a connection and check it with `SELECT 1`.
    pub fn connect(
        driver: &FlightSqlDriver,
        url: &ConnectionUrl,
        credentials: &Credentials,
    ) -> Result<Self> {
        let options = url.database_options(credentials)?;
        let mut conn = driver
            .new_connection(options)
            .with_context(|| format!("failed to connect to {url}"))?;
        {
            let mut stmt = conn.new_statement()?;
            stmt.set_sql_query("SELECT 1")?;
            let reader = stmt
                .execute()
                .with_context(|| format!("connection check against {url} failed"))?;
            for batch in reader {
                batch?;
            }
        }
        debug!(endpoint = %url, "connected");
        Ok(Self { conn })
    }

    /// Execute a statement that returns rows.
    pub fn query(&mut self, sql: &str) -> Result<QueryResult> {
        let mut stmt = self.conn.new_statement()?;
        stmt.set_sql_query(sql)?;
        let reader = stmt.execute()?;
        let schema = reader.schema();
        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }
        Ok(QueryResult::new(schema, batches))
    }

    /// Execute an update/DDL statement (INSERT, UPDATE, DELETE, CREATE, etc.).
    pub fn update(&mut self, sql: &str) -> Result<UpdateResult> {
        let mut stmt = self.conn.new_statement()?;
        stmt.set_sql_query(sql)?;
        let rows_affected = stmt.execute_update()?;
        Ok(UpdateResult { rows_affected })
    }

    /// Run a statement, choosing between [`query`](Self::query) and
    /// [`update`](Self::update) from its leading keyword.
    pub fn run_statement(&mut self, sql: &str) -> Result<StatementResult> {
        if is_query_statement(sql) {
            Ok(StatementResult::Query(self.query(sql)?))
        } else {
            Ok(StatementResult::Update(self.update(sql)?))
        }
    }
}

const QUERY_KEYWORDS: &[&str] = &[
    "SELECT", "WITH", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "VALUES", "FROM", "TABLE", "PRAGMA",
    "SUMMARIZE", "CALL",
];

/// Data-modifying statements that return rows when they carry `RETURNING`.
const DML_KEYWORDS: &[&str] = &["INSERT", "UPDATE", "DELETE", "MERGE"];

/// Whether `sql` is expected to produce a result set.
pub fn is_query_statement(sql: &str) -> bool {
    let skeleton = keyword_skeleton(sql);
    let mut words = skeleton
        .split(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ',' | ';'))
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_uppercase);
    match words.next() {
        Some(first) if QUERY_KEYWORDS.contains(&first.as_str()) => true,
        Some(first) if DML_KEYWORDS.contains(&first.as_str()) => {
            words.any(|word| word == "RETURNING")
        }
        _ => false,
    }
}

/// `sql` with comments removed and string literals emptied, so keywords can
/// be read off it.
fn keyword_skeleton(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                out.push(' ');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            '\'' => {
                for c in chars.by_ref() {
                    if c == '\'' {
                        break;
                    }
                }
                out.push_str("''");
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow_schema::Schema;

    use super::*;

    #[test]
    fn test_query_result_empty() {
        let result = QueryResult::new(Arc::new(Schema::empty()), vec![]);
        assert!(result.is_empty());
        assert_eq!(result.total_rows, 0);
    }

    #[test]
    fn detects_queries() {
        assert!(is_query_statement("SELECT 1"));
        assert!(is_query_statement("  select * from t"));
        assert!(is_query_statement("-- leading comment\nSELECT 1"));
        assert!(is_query_statement("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(is_query_statement("SHOW TABLES"));
        assert!(is_query_statement("(SELECT 1) UNION (SELECT 2)"));
        assert!(is_query_statement("describe t"));
    }

    #[test]
    fn comments_before_keyword_are_skipped() {
        assert!(is_query_statement("/* hint */ SELECT 1"));
        assert!(is_query_statement("/* multi\nline */\n-- note\nselect 1"));
        assert!(is_query_statement("/**/SELECT 1"));
        assert!(!is_query_statement("/* SELECT */ CREATE TABLE t (id INT)"));
    }

    #[test]
    fn returning_clause_makes_dml_a_query() {
        assert!(is_query_statement("INSERT INTO t VALUES (1) RETURNING id"));
        assert!(is_query_statement("update t set a = 1 returning *"));
        assert!(is_query_statement("DELETE FROM t WHERE id = 1 RETURNING (id)"));
        assert!(!is_query_statement("DELETE FROM t WHERE note = 'returning'"));
        assert!(!is_query_statement("INSERT INTO t VALUES (1) -- RETURNING id"));
    }

    #[test]
    fn detects_updates() {
        assert!(!is_query_statement("CREATE TABLE t (id INT)"));
        assert!(!is_query_statement("INSERT INTO t VALUES (1)"));
        assert!(!is_query_statement("DROP TABLE t"));
        assert!(!is_query_statement("SELECTED_NOTHING"));
        assert!(!is_query_statement(""));
    }
}
