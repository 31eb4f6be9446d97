use std::path::{Path, PathBuf};
use std::sync::Arc;

use gizmosqlline_client::{load_driver, FlightSqlDriver};
use tracing::debug;

use crate::config::LauncherConfig;
use crate::error::BootstrapError;

/// Something that can bring a database driver into the process.
pub trait DriverLoader {
    type Driver;

    /// Name used in diagnostics.
    fn driver_label(&self) -> &str;

    fn location(&self) -> &Path;

    fn load(&self) -> anyhow::Result<Self::Driver>;
}

/// Loads the ADBC Flight SQL driver library.
#[derive(Debug, Clone)]
pub struct FlightSqlLoader {
    label: String,
    path: PathBuf,
}

impl FlightSqlLoader {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    pub fn from_config(config: &LauncherConfig) -> Self {
        Self::new(config.flavor.driver_label(), config.driver_path())
    }
}

impl DriverLoader for FlightSqlLoader {
    type Driver = Arc<FlightSqlDriver>;

    fn driver_label(&self) -> &str {
        &self.label
    }

    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> anyhow::Result<Self::Driver> {
        load_driver(&self.path)
    }
}

/// Make sure the driver loads before anything else happens. No retries.
pub fn bootstrap<L: DriverLoader>(loader: &L) -> Result<L::Driver, BootstrapError> {
    loader.load().map_err(|source| {
        debug!(error = %format!("{source:#}"), "driver load failed");
        BootstrapError::DriverUnavailable {
            driver: loader.driver_label().to_string(),
            path: loader.location().to_path_buf(),
            source,
        }
    })
}
