use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("{driver} driver not found at {}", path.display())]
    DriverUnavailable {
        driver: String,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl BootstrapError {
    /// The two lines printed to stderr before the process exits.
    pub fn diagnostic(&self) -> [String; 2] {
        match self {
            BootstrapError::DriverUnavailable { driver, path, .. } => [
                format!("Error: {} driver not found.", single_line(driver)),
                format!(
                    "Please ensure the driver library is installed at {} (override with GIZMOSQLLINE_DRIVER_PATH).",
                    single_line(&path.display().to_string())
                ),
            ],
        }
    }
}

/// Control characters (newlines included) as escapes, so the text stays on
/// one line.
fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() {
                c.escape_default().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("no current connection; use !connect first")]
    NotConnected,
    #[error("unknown command: !{0} (type !help for a list)")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unterminated quote in `{0}`")]
    UnterminatedQuote(String),
    #[error("unknown output format `{0}` (expected table, csv or tsv)")]
    OutputFormat(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0:#}")]
    Client(#[from] anyhow::Error),
}

pub type ShellResult<T> = Result<T, ShellError>;
