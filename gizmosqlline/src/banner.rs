use std::ffi::OsString;
use std::fmt;
use std::io::{self, Write};

use chrono::{Datelike, Utc};

use crate::config::Flavor;

/// Arguments that make the launcher print the banner.
pub const HELP_FLAGS: [&str; 3] = ["--help", "-h", "-?"];

const LOGO: [&str; 5] = [
    r"  ____  _                      ____   ___  _     _     _            ",
    r" / ___|(_)___  _ __ ___   ___ / ___| / _ \| |   | |   (_)_ __   ___ ",
    r"| |  _ | |_  /| '_ ` _ \ / _ \\___ \| | | | |   | |   | | '_ \ / _ \",
    r"| |_| || |/ / | | | | | | (_) |___) | |_| | |___| |___| | | | |  __/",
    r" \____||_/___||_| |_| |_|\___/|____/ \__\_\_____|_____|_|_| |_|\___|",
];

const COPYRIGHT_OWNER: &str = "GizmoData LLC";

/// True when there are no arguments or any of them is a help flag.
pub fn wants_banner(args: &[OsString]) -> bool {
    args.is_empty()
        || args
            .iter()
            .any(|arg| HELP_FLAGS.iter().any(|flag| arg.as_os_str() == *flag))
}

/// Introductory text shown before the shell starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    flavor: Flavor,
    version: String,
    year: i32,
}

impl Banner {
    pub fn new(flavor: Flavor, version: impl Into<String>, year: i32) -> Self {
        Self {
            flavor,
            version: version.into(),
            year,
        }
    }

    /// Banner for this build, dated with the current year.
    pub fn current(flavor: Flavor) -> Self {
        Self::new(flavor, env!("CARGO_PKG_VERSION"), Utc::now().year())
    }

    pub fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{self}")?;
        out.flush()
    }

    fn title(&self) -> String {
        match self.flavor {
            Flavor::FlightSql => format!(
                "GizmoSQLLine v{} - Flight SQL Client for GizmoSQL",
                self.version
            ),
            Flavor::GizmoSql => format!("GizmoSQLLine {} - SQL Client for GizmoSQL", self.version),
        }
    }

    fn built_with(&self) -> &'static str {
        match self.flavor {
            Flavor::FlightSql => "Apache Arrow Flight SQL ADBC",
            Flavor::GizmoSql => "GizmoSQL ADBC",
        }
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.flavor.url_prefix();

        writeln!(f)?;
        for line in LOGO {
            writeln!(f, "{line}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.title())?;
        writeln!(f, "Copyright (c) {} {COPYRIGHT_OWNER}", self.year)?;
        writeln!(f, "Built with {} Driver", self.built_with())?;
        writeln!(f)?;
        writeln!(f, "Quick Start:")?;
        writeln!(f, "  !connect {prefix}localhost:31337 user password")?;
        if self.flavor == Flavor::GizmoSql {
            writeln!(f)?;
            writeln!(f, "  OAuth/SSO:")?;
            writeln!(f, "  !connect {prefix}host:port?authType=external \"\" \"\"")?;
        }
        writeln!(f)?;
        writeln!(f, "Connection URL format:")?;
        writeln!(f, "  {prefix}host:port[?param1=value1&param2=value2]")?;
        writeln!(f)?;
        writeln!(f, "Common parameters:")?;
        writeln!(f, "  useEncryption=true/false    Enable/disable TLS encryption")?;
        writeln!(
            f,
            "  disableCertificateVerification=true  Skip certificate verification"
        )?;
        writeln!(f, "  token=<bearer_token>        Use bearer token authentication")?;
        if self.flavor == Flavor::GizmoSql {
            writeln!(f, "  authType=external           Enable server-side OAuth/SSO")?;
            writeln!(
                f,
                "  oauthServerPort=<port>      Custom OAuth server port (default: {})",
                gizmosqlline_client::url::DEFAULT_OAUTH_SERVER_PORT
            )?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[test]
    fn banner_for_empty_args_and_help_flags() {
        assert!(wants_banner(&[]));
        assert!(wants_banner(&args(&["--help"])));
        assert!(wants_banner(&args(&["-h"])));
        assert!(wants_banner(&args(&["-?"])));
        assert!(wants_banner(&args(&["-u", "jdbc:gizmosql://h:1", "-h"])));
    }

    #[test]
    fn no_banner_for_other_args() {
        assert!(!wants_banner(&args(&["-u", "jdbc:gizmosql://h:1"])));
        assert!(!wants_banner(&args(&["--helpme"])));
        assert!(!wants_banner(&args(&["-H"])));
        assert!(!wants_banner(&args(&[""])));
    }

    #[cfg(unix)]
    #[test]
    fn help_flag_found_next_to_non_utf8_arguments() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"\xff\xfe".to_vec());
        assert!(wants_banner(&[raw.clone(), OsString::from("-?")]));
        assert!(!wants_banner(&[raw]));
    }

    #[test]
    fn gizmosql_banner_snapshot() {
        let banner = Banner::new(Flavor::GizmoSql, "1.2.3", 2026).to_string();
        let expected = [
            "",
            LOGO[0],
            LOGO[1],
            LOGO[2],
            LOGO[3],
            LOGO[4],
            "",
            "GizmoSQLLine 1.2.3 - SQL Client for GizmoSQL",
            "Copyright (c) 2026 GizmoData LLC",
            "Built with GizmoSQL ADBC Driver",
            "",
            "Quick Start:",
            "  !connect jdbc:gizmosql://localhost:31337 user password",
            "",
            "  OAuth/SSO:",
            "  !connect jdbc:gizmosql://host:port?authType=external \"\" \"\"",
            "",
            "Connection URL format:",
            "  jdbc:gizmosql://host:port[?param1=value1&param2=value2]",
            "",
            "Common parameters:",
            "  useEncryption=true/false    Enable/disable TLS encryption",
            "  disableCertificateVerification=true  Skip certificate verification",
            "  token=<bearer_token>        Use bearer token authentication",
            "  authType=external           Enable server-side OAuth/SSO",
            "  oauthServerPort=<port>      Custom OAuth server port (default: 31339)",
            "",
        ]
        .map(|line| format!("{line}\n"))
        .concat();
        assert_eq!(banner, expected);
    }

    #[test]
    fn flight_sql_banner_has_no_oauth_section() {
        let banner = Banner::new(Flavor::FlightSql, "1.0.0", 2025).to_string();
        assert!(banner.contains("GizmoSQLLine v1.0.0 - Flight SQL Client for GizmoSQL\n"));
        assert!(banner.contains("Built with Apache Arrow Flight SQL ADBC Driver\n"));
        assert!(banner.contains("  !connect jdbc:arrow-flight-sql://localhost:31337 user password\n"));
        assert!(!banner.contains("OAuth"));
    }

    #[test]
    fn banner_is_stable_across_renders() {
        let banner = Banner::new(Flavor::GizmoSql, "1.0.0", 2026);
        let mut first = Vec::new();
        let mut second = Vec::new();
        banner.write_to(&mut first).unwrap();
        banner.write_to(&mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap(), banner.to_string());
    }
}
