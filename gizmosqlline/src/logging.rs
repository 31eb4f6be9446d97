use tracing_subscriber::EnvFilter;

use crate::config::LauncherConfig;

/// Used when `RUST_LOG` is not set. The shell prints its own results, so
/// library chatter stays at `warn`.
pub const DEFAULT_FILTER: &str =
    "warn,gizmosqlline=info,adbc_driver_manager=warn,h2=warn,tonic=warn,hyper=warn,tower=warn";

/// Logs go to stderr so they never mix with query output.
pub fn init_tracing(config: &LauncherConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
