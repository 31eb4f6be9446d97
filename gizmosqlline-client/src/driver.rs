use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use adbc_core::{
    options::{AdbcVersion, OptionDatabase, OptionValue},
    Database, Driver,
};
use adbc_driver_flightsql::DRIVER_PATH;
use adbc_driver_manager::{ManagedConnection, ManagedDriver};
use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Location of the Flight SQL driver library fetched at build time.
pub fn bundled_driver_path() -> PathBuf {
    PathBuf::from(DRIVER_PATH)
}

/// A loaded ADBC Flight SQL driver.
///
/// One instance exists per library path; every connection the process opens
/// goes through it.
pub struct FlightSqlDriver {
    path: PathBuf,
    driver: Mutex<ManagedDriver>,
}

impl std::fmt::Debug for FlightSqlDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightSqlDriver")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FlightSqlDriver {
    fn new(path: PathBuf, driver: ManagedDriver) -> Self {
        Self {
            path,
            driver: Mutex::new(driver),
        }
    }

    /// The shared library this driver was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn new_connection(
        &self,
        options: Vec<(OptionDatabase, OptionValue)>,
    ) -> Result<ManagedConnection> {
        let mut driver = self
            .driver
            .lock()
            .map_err(|e| anyhow!("Flight SQL driver mutex poisoned: {}", e))?;
        let database = driver
            .new_database_with_opts(options)
            .with_context(|| "failed to create database handle")?;
        drop(driver);
        let connection = database
            .new_connection()
            .with_context(|| "failed to create Flight SQL connection")?;
        Ok(connection)
    }
}

static DRIVER_CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<FlightSqlDriver>>>> = OnceLock::new();

/// Load the driver library at `path`, reusing an earlier load of the same path.
pub fn load_driver(path: impl AsRef<Path>) -> Result<Arc<FlightSqlDriver>> {
    let path = path.as_ref();
    let cache = DRIVER_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache
        .lock()
        .map_err(|e| anyhow!("Flight SQL driver cache mutex poisoned: {}", e))?;

    if let Some(entry) = guard.get(path) {
        return Ok(entry.clone());
    }

    let driver = ManagedDriver::load_dynamic_from_filename(path, None, AdbcVersion::default())
        .with_context(|| format!("failed to load Flight SQL driver from {}", path.display()))?;
    debug!(path = %path.display(), "loaded Flight SQL driver");
    let entry = Arc::new(FlightSqlDriver::new(path.to_path_buf(), driver));
    guard.insert(path.to_path_buf(), entry.clone());
    Ok(entry)
}
