//! Launcher for the GizmoSQL command line shell.
//!
//! Startup is two steps: make sure the Flight SQL driver library can be
//! loaded ([`bootstrap`]), then hand the command line to the interactive
//! [`shell`]. [`launcher::launch`] ties them together and returns the exit
//! code.

pub mod banner;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod shell;
