//! Flight SQL access for gizmosqlline.
//!
//! This crate wraps the dynamic ADBC Flight SQL driver loading logic, turns
//! JDBC-style connection URLs into driver options, and runs statements
//! against the resulting `ManagedConnection`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use gizmosqlline_client::{bundled_driver_path, load_driver, ConnectionUrl, Credentials, FlightSQLClient};
//!
//! let driver = load_driver(bundled_driver_path())?;
//! let url: ConnectionUrl = "jdbc:gizmosql://localhost:31337?useEncryption=false".parse()?;
//! let mut client = FlightSQLClient::connect(&driver, &url, &Credentials::default())?;
//! let result = client.query("SELECT 1")?;
//! println!("Rows: {}", result.total_rows);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod arrow;
pub mod client;
pub mod driver;
pub mod url;

pub use client::{is_query_statement, FlightSQLClient, QueryResult, StatementResult, UpdateResult};
pub use driver::{bundled_driver_path, load_driver, FlightSqlDriver};
pub use url::{AuthType, ConnectionUrl, Credentials};
