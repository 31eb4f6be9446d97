use std::path::PathBuf;

use anyhow::{bail, Context};
use gizmosqlline_client::bundled_driver_path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const HISTORY_FILE_NAME: &str = ".gizmosqlline_history";

/// Branding of the launcher. Both variants drive the same Flight SQL driver;
/// they differ in the text they show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Flavor {
    #[serde(rename = "flight-sql", alias = "flightsql")]
    FlightSql,
    #[serde(rename = "gizmosql")]
    GizmoSql,
}

impl Flavor {
    /// Driver name used in diagnostics.
    pub fn driver_label(self) -> &'static str {
        match self {
            Flavor::FlightSql => "Arrow Flight SQL ADBC",
            Flavor::GizmoSql => "GizmoSQL ADBC",
        }
    }

    /// URL prefix shown in help and examples.
    pub fn url_prefix(self) -> &'static str {
        match self {
            Flavor::FlightSql => "jdbc:arrow-flight-sql://",
            Flavor::GizmoSql => "jdbc:gizmosql://",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LauncherConfig {
    pub flavor: Flavor,
    /// Overrides the driver library bundled at build time.
    pub driver_path: Option<String>,
    /// Overrides `~/.gizmosqlline_history`.
    pub history_file: Option<String>,
    /// Log format: "compact" or "json".
    pub log_format: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            flavor: Flavor::GizmoSql,
            driver_path: None,
            history_file: None,
            log_format: "compact".to_string(),
        }
    }
}

impl LauncherConfig {
    /// Defaults overlaid with `GIZMOSQLLINE_*` environment variables.
    ///
    /// A value that cannot be used keeps its default and is returned in the
    /// second element instead of failing the whole load.
    pub fn load() -> anyhow::Result<(Self, Vec<anyhow::Error>)> {
        Self::load_from(config::Environment::with_prefix("GIZMOSQLLINE"))
    }

    fn load_from(env: config::Environment) -> anyhow::Result<(Self, Vec<anyhow::Error>)> {
        let defaults_json = serde_json::to_string(&Self::default())
            .with_context(|| "failed to serialize defaults")?;
        let settings = config::Config::builder()
            .add_source(
                config::File::from_str(&defaults_json, config::FileFormat::Json).required(false),
            )
            .add_source(env)
            .build()
            .with_context(|| "failed to load configuration")?;

        let defaults = Self::default();
        let mut rejected = Vec::new();
        let mut cfg = LauncherConfig {
            flavor: setting(&settings, "flavor", defaults.flavor, &mut rejected),
            driver_path: setting(&settings, "driver_path", None, &mut rejected),
            history_file: setting(&settings, "history_file", None, &mut rejected),
            log_format: setting(
                &settings,
                "log_format",
                defaults.log_format.clone(),
                &mut rejected,
            ),
        };
        if let Err(e) = cfg.validate() {
            rejected.push(e);
            cfg.log_format = defaults.log_format;
        }
        Ok((cfg, rejected))
    }

    pub fn driver_path(&self) -> PathBuf {
        match &self.driver_path {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => bundled_driver_path(),
        }
    }

    /// `None` when no home directory can be found and no override is set.
    pub fn history_path(&self) -> Option<PathBuf> {
        match &self.history_file {
            Some(path) if !path.trim().is_empty() => Some(PathBuf::from(path.trim())),
            _ => dirs::home_dir().map(|home| home.join(HISTORY_FILE_NAME)),
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        match self.log_format.as_str() {
            "compact" | "json" => Ok(()),
            other => bail!("unsupported log format `{other}` (expected compact or json)"),
        }
    }
}

fn setting<T: DeserializeOwned>(
    settings: &config::Config,
    key: &str,
    default: T,
    rejected: &mut Vec<anyhow::Error>,
) -> T {
    match settings.get::<T>(key) {
        Ok(value) => value,
        Err(config::ConfigError::NotFound(_)) => default,
        Err(e) => {
            rejected.push(anyhow::Error::new(e).context(format!("invalid {key}")));
            default
        }
    }
}
