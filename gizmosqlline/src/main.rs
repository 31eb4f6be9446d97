use std::ffi::OsString;
use std::io;

use gizmosqlline::banner::Banner;
use gizmosqlline::bootstrap::FlightSqlLoader;
use gizmosqlline::config::LauncherConfig;
use gizmosqlline::launcher::launch;
use gizmosqlline::logging::init_tracing;
use gizmosqlline::shell::{ShellSettings, SqlShell};
use tracing::{debug, warn};

fn main() {
    dotenvy::dotenv().ok();

    let (config, rejected) = match LauncherConfig::load() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    init_tracing(&config);
    for e in &rejected {
        warn!("{e:#}; using the default");
    }
    debug!(?config, "launcher config");

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();

    let loader = FlightSqlLoader::from_config(&config);
    let banner = Banner::current(config.flavor);
    let settings = ShellSettings::from_config(&config);

    let code = launch(
        &loader,
        |driver| SqlShell::new(driver, settings),
        &args,
        &banner,
        &mut io::stdout(),
        &mut io::stderr(),
    );
    std::process::exit(code);
}
