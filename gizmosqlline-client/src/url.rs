//! Connection URL handling.
//!
//! Users type the same URLs they would give the JDBC driver, e.g.
//! `jdbc:gizmosql://host:31337?useEncryption=true&token=...`. The ADBC Flight
//! SQL driver only understands `grpc://` / `grpc+tls://` plus database
//! options, so the URL is split into those pieces here.

use std::fmt;
use std::str::FromStr;

use adbc_core::options::{OptionDatabase, OptionValue};
use anyhow::{anyhow, bail, Context, Result};
use tracing::warn;
use ::url::form_urlencoded;

/// Port the GizmoSQL server listens on for browser based OAuth/SSO.
pub const DEFAULT_OAUTH_SERVER_PORT: u16 = 31339;

const OPTION_TLS_SKIP_VERIFY: &str = "adbc.flight.sql.client_option.tls_skip_verify";
const OPTION_AUTHORIZATION_HEADER: &str = "adbc.flight.sql.authorization_header";

/// `(prefix, encrypted by default)`
const SCHEMES: &[(&str, bool)] = &[
    ("jdbc:arrow-flight-sql://", true),
    ("jdbc:gizmosql://", true),
    ("grpc+tls://", true),
    ("grpc://", false),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthType {
    /// Username/password or bearer token, sent by the driver itself.
    Password,
    /// Server-side OAuth/SSO flow.
    External { oauth_server_port: u16 },
}

/// Username and password given outside the URL (`-n`/`-p`, `!connect`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(user: Option<String>, password: Option<String>) -> Self {
        Self {
            user: user.filter(|u| !u.is_empty()),
            password: password.filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionUrl {
    pub host: String,
    pub port: u16,
    pub use_encryption: bool,
    pub disable_certificate_verification: bool,
    pub token: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub auth_type: AuthType,
}

impl ConnectionUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let (rest, encrypted_by_default) = SCHEMES
            .iter()
            .find_map(|(prefix, tls)| url.strip_prefix(prefix).map(|rest| (rest, *tls)))
            .ok_or_else(|| {
                anyhow!(
                    "unsupported connection URL `{url}` (expected jdbc:gizmosql://, jdbc:arrow-flight-sql://, grpc:// or grpc+tls://)"
                )
            })?;

        let (authority, query) = match rest.split_once('?') {
            Some((authority, query)) => (authority, Some(query)),
            None => (rest, None),
        };
        let authority = authority.trim_end_matches('/');
        let (host, port) = authority
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("connection URL `{url}` is missing a port"))?;
        if host.is_empty() {
            bail!("connection URL `{url}` is missing a host");
        }
        let port = port
            .parse::<u16>()
            .with_context(|| format!("invalid port `{port}` in connection URL"))?;

        let mut parsed = Self {
            host: host.to_string(),
            port,
            use_encryption: encrypted_by_default,
            disable_certificate_verification: false,
            token: None,
            user: None,
            password: None,
            auth_type: AuthType::Password,
        };

        let mut external_auth = false;
        let mut oauth_server_port = DEFAULT_OAUTH_SERVER_PORT;
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "useEncryption" => parsed.use_encryption = parse_flag(key, value)?,
                "disableCertificateVerification" => {
                    parsed.disable_certificate_verification = parse_flag(key, value)?
                }
                "token" => parsed.token = non_empty(value),
                "user" => parsed.user = non_empty(value),
                "password" => parsed.password = non_empty(value),
                "authType" => match value.to_ascii_lowercase().as_str() {
                    "external" => external_auth = true,
                    "password" | "" => external_auth = false,
                    other => bail!("unknown authType `{other}`"),
                },
                "oauthServerPort" => {
                    oauth_server_port = value
                        .parse::<u16>()
                        .with_context(|| format!("invalid oauthServerPort `{value}`"))?
                }
                _ => warn!(parameter = key, "ignoring unrecognized connection parameter"),
            }
        }
        if external_auth {
            parsed.auth_type = AuthType::External { oauth_server_port };
        }
        Ok(parsed)
    }

    /// The `grpc[+tls]://host:port` URI handed to the driver.
    pub fn endpoint(&self) -> String {
        let scheme = if self.use_encryption { "grpc+tls" } else { "grpc" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// Database options for the ADBC driver. Explicit credentials win over
    /// the ones embedded in the URL.
    pub(crate) fn database_options(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<(OptionDatabase, OptionValue)>> {
        if let AuthType::External { oauth_server_port } = self.auth_type {
            bail!(
                "authType=external (OAuth/SSO via port {oauth_server_port}) is not supported by the ADBC Flight SQL driver; use user/password or token"
            );
        }

        let mut options = vec![(OptionDatabase::Uri, OptionValue::from(self.endpoint()))];
        if self.use_encryption && self.disable_certificate_verification {
            options.push((
                OptionDatabase::Other(OPTION_TLS_SKIP_VERIFY.into()),
                OptionValue::from("true"),
            ));
        }
        if let Some(token) = &self.token {
            options.push((
                OptionDatabase::Other(OPTION_AUTHORIZATION_HEADER.into()),
                OptionValue::from(format!("Bearer {token}")),
            ));
        }
        let user = credentials.user.as_ref().or(self.user.as_ref());
        let password = credentials.password.as_ref().or(self.password.as_ref());
        if let Some(user) = user {
            options.push((OptionDatabase::Username, OptionValue::from(user.as_str())));
        }
        if let Some(password) = password {
            options.push((
                OptionDatabase::Password,
                OptionValue::from(password.as_str()),
            ));
        }
        Ok(options)
    }
}

impl FromStr for ConnectionUrl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.endpoint())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(anyhow!("invalid value `{value}` for {key} (expected true or false)")),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
