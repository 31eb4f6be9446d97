use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser};

use super::render::OutputFormat;

/// Command line accepted by the shell.
#[derive(Parser, Debug)]
#[command(
    name = "gizmosqlline",
    version,
    about = "Interactive SQL shell for GizmoSQL and other Arrow Flight SQL servers",
    disable_help_flag = true
)]
pub struct ShellArgs {
    /// Connection URL to open on startup
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Username for the startup connection
    #[arg(short = 'n', long)]
    pub user: Option<String>,

    /// Password for the startup connection
    #[arg(short = 'p', long)]
    pub password: Option<String>,

    /// Run a command or SQL statement, then exit (repeatable)
    #[arg(short = 'e', long = "execute", value_name = "COMMAND")]
    pub execute: Vec<String>,

    /// Run a script file, then exit
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// How query results are printed
    #[arg(long = "outputformat", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,

    /// Print usage
    #[arg(short = 'h', long = "help", short_alias = '?', action = ArgAction::SetTrue)]
    pub help: bool,
}

impl ShellArgs {
    /// Whether the shell runs commands and exits instead of prompting.
    pub fn is_batch(&self) -> bool {
        !self.execute.is_empty() || self.file.is_some()
    }

    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    fn parse(args: &[&str]) -> Result<ShellArgs, clap::Error> {
        ShellArgs::try_parse_from(std::iter::once("gizmosqlline").chain(args.iter().copied()))
    }

    #[test]
    fn parses_connection_options() {
        let args = parse(&[
            "-u",
            "jdbc:gizmosql://localhost:31337",
            "-n",
            "gizmosql_username",
            "-p",
            "secret",
        ])
        .unwrap();
        assert_eq!(args.url.as_deref(), Some("jdbc:gizmosql://localhost:31337"));
        assert_eq!(args.user.as_deref(), Some("gizmosql_username"));
        assert_eq!(args.password.as_deref(), Some("secret"));
        assert!(!args.is_batch());
        assert_eq!(args.output_format, OutputFormat::Table);
    }

    #[test]
    fn execute_is_repeatable() {
        let args = parse(&["-e", "SELECT 1", "-e", "SELECT 2", "--outputformat", "csv"]).unwrap();
        assert_eq!(args.execute, vec!["SELECT 1", "SELECT 2"]);
        assert_eq!(args.output_format, OutputFormat::Csv);
        assert!(args.is_batch());
    }

    #[test]
    fn help_flags_are_recognized() {
        for flag in ["-h", "--help", "-?"] {
            assert!(parse(&[flag]).unwrap().help, "flag {flag}");
        }
    }

    #[test]
    fn version_and_errors() {
        assert_eq!(
            parse(&["--version"]).unwrap_err().kind(),
            ErrorKind::DisplayVersion
        );
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--outputformat", "xml"]).is_err());
    }

    #[test]
    fn usage_lists_options() {
        let usage = ShellArgs::usage();
        assert!(usage.contains("--url"));
        assert!(usage.contains("--execute"));
    }
}
