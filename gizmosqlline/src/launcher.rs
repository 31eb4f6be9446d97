use std::ffi::OsString;
use std::io::Write;

use tracing::{debug, warn};

use crate::banner::{wants_banner, Banner};
use crate::bootstrap::{bootstrap, DriverLoader};
use crate::shell::Shell;

/// Exit code used when the driver cannot be loaded.
pub const DRIVER_UNAVAILABLE: i32 = 1;

/// Bootstrap the driver, show the banner when asked for, then hand the
/// arguments to the shell. Returns the process exit code; the caller decides
/// when to exit.
pub fn launch<L, S, F>(
    loader: &L,
    make_shell: F,
    args: &[OsString],
    banner: &Banner,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    L: DriverLoader,
    S: Shell,
    F: FnOnce(L::Driver) -> S,
{
    let driver = match bootstrap(loader) {
        Ok(driver) => driver,
        Err(e) => {
            for line in e.diagnostic() {
                let _ = writeln!(err, "{line}");
            }
            let _ = err.flush();
            return DRIVER_UNAVAILABLE;
        }
    };

    if wants_banner(args) {
        if let Err(e) = banner.write_to(out) {
            warn!(error = %e, "failed to print banner");
        }
    }

    let mut shell = make_shell(driver);
    let status = shell.begin(args, None, true);
    debug!(?status, "shell finished");
    status.ordinal()
}
