//! Provider connection configuration.
//!
//! [`ProviderConfig`] is the provider block as the host hands it over, with
//! every field optional. [`ProviderConfig::resolve`] applies environment
//! fallbacks and defaults, validates, and produces the immutable
//! [`ConnectionConfig`] the connection manager works from.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tfmysql_core::{Error, Result};

use crate::retry::RetryPolicy;

pub const DEFAULT_PORT: u16 = 3306;

pub const ENDPOINT_ENV: &str = "MYSQL_ENDPOINT";
pub const USERNAME_ENV: &str = "MYSQL_USERNAME";
pub const PASSWORD_ENV: &str = "MYSQL_PASSWORD";
pub const TLS_ENV: &str = "MYSQL_TLS_CONFIG";

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
}

impl Endpoint {
    /// Parse `host[:port]`, `[v6addr][:port]` or an absolute socket path.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::config("endpoint", "Endpoint must not be an empty string"));
        }
        if raw.starts_with('/') {
            return Ok(Endpoint::Unix(PathBuf::from(raw)));
        }

        let (host, port) = if let Some(rest) = raw.strip_prefix('[') {
            let end = rest
                .find(']')
                .ok_or_else(|| Error::config("endpoint", format!("unterminated '[' in '{raw}'")))?;
            let after = &rest[end + 1..];
            let port = match after.strip_prefix(':') {
                Some(p) => Some(p),
                None if after.is_empty() => None,
                None => {
                    return Err(Error::config(
                        "endpoint",
                        format!("unexpected '{after}' after IPv6 address"),
                    ));
                }
            };
            (&rest[..end], port)
        } else {
            match raw.rsplit_once(':') {
                Some((host, port)) if !host.contains(':') => (host, Some(port)),
                Some(_) => (raw, None),
                None => (raw, None),
            }
        };

        if host.is_empty() {
            return Err(Error::config("endpoint", format!("no host in '{raw}'")));
        }
        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| Error::config("endpoint", format!("invalid port '{p}'")))?,
            None => DEFAULT_PORT,
        };

        Ok(Endpoint::Tcp {
            host: host.to_string(),
            port,
        })
    }

    /// `tcp` or `unix`.
    pub fn protocol(&self) -> &'static str {
        match self {
            Endpoint::Tcp { .. } => "tcp",
            Endpoint::Unix(_) => "unix",
        }
    }
}

/// Transport security requested by the provider block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// `tls = "false"`
    Disabled,
    /// `tls = "true"`: verify against the system trust roots
    Verify,
    /// `tls = "skip-verify"`: encrypt, trust any certificate
    SkipVerify,
    /// `tls = "true"` with `ssl_ca`: verify against the supplied bundle
    Custom { ca_pem: String },
}

impl TlsMode {
    fn parse(tls: &str, ssl_ca: Option<&str>) -> Result<Self> {
        let ca = ssl_ca.filter(|s| !s.trim().is_empty());
        match (tls.trim(), ca) {
            ("false", _) => Ok(TlsMode::Disabled),
            ("true", Some(ca)) => Ok(TlsMode::Custom {
                ca_pem: ca.to_string(),
            }),
            ("true", None) => Ok(TlsMode::Verify),
            ("skip-verify", _) => Ok(TlsMode::SkipVerify),
            (other, _) => Err(Error::config(
                "tls",
                format!("expected one of true, false, skip-verify, got '{other}'"),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TlsMode::Disabled => "false",
            TlsMode::Verify => "true",
            TlsMode::SkipVerify => "skip-verify",
            TlsMode::Custom { .. } => "custom",
        }
    }
}

/// The provider block as received from the host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls: Option<String>,
    pub ssl_ca: Option<String>,
    pub max_conn_lifetime_sec: Option<u64>,
    pub max_open_conns: Option<u32>,
}

impl ProviderConfig {
    /// Resolve against the process environment.
    pub fn resolve(self) -> Result<ConnectionConfig> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with(self, env: impl Fn(&str) -> Option<String>) -> Result<ConnectionConfig> {
        let pick = |value: Option<String>, key: &str| value.or_else(|| env(key));

        let endpoint = pick(self.endpoint, ENDPOINT_ENV)
            .ok_or_else(|| Error::config("endpoint", "required (or set MYSQL_ENDPOINT)"))?;
        let endpoint = Endpoint::parse(&endpoint)?;

        let username = pick(self.username, USERNAME_ENV)
            .ok_or_else(|| Error::config("username", "required (or set MYSQL_USERNAME)"))?;
        let password = pick(self.password, PASSWORD_ENV).unwrap_or_default();
        let tls = pick(self.tls, TLS_ENV).unwrap_or_else(|| "false".to_string());
        let tls = TlsMode::parse(&tls, self.ssl_ca.as_deref())?;

        let mut config = ConnectionConfig::new(endpoint, username)
            .password(password)
            .tls(tls);
        if let Some(secs) = self.max_conn_lifetime_sec.filter(|s| *s > 0) {
            config = config.max_conn_lifetime(Duration::from_secs(secs));
        }
        if let Some(max) = self.max_open_conns.filter(|m| *m > 0) {
            config = config.max_open_conns(max);
        }
        Ok(config)
    }
}

/// Everything needed to open the server connection.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub endpoint: Endpoint,
    pub username: String,
    pub password: String,
    pub tls: TlsMode,
    /// Maximum lifetime of a pooled connection
    pub max_conn_lifetime: Option<Duration>,
    /// Maximum number of open connections
    pub max_open_conns: Option<u32>,
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tls", &self.tls.name())
            .field("max_conn_lifetime", &self.max_conn_lifetime)
            .field("max_open_conns", &self.max_open_conns)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new(endpoint: Endpoint, username: impl Into<String>) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password: String::new(),
            tls: TlsMode::Disabled,
            max_conn_lifetime: None,
            max_open_conns: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    pub fn max_conn_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_conn_lifetime = Some(lifetime);
        self
    }

    pub fn max_open_conns(mut self, max: u32) -> Self {
        self.max_open_conns = Some(max);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_endpoint_tcp() {
        assert_eq!(
            Endpoint::parse("db.example.com:3307").unwrap(),
            Endpoint::Tcp {
                host: "db.example.com".to_string(),
                port: 3307
            }
        );
        assert_eq!(
            Endpoint::parse("localhost").unwrap(),
            Endpoint::Tcp {
                host: "localhost".to_string(),
                port: 3306
            }
        );
    }

    #[test]
    fn test_endpoint_ipv6() {
        assert_eq!(
            Endpoint::parse("[::1]:3310").unwrap(),
            Endpoint::Tcp {
                host: "::1".to_string(),
                port: 3310
            }
        );
        assert_eq!(
            Endpoint::parse("[fe80::1]").unwrap(),
            Endpoint::Tcp {
                host: "fe80::1".to_string(),
                port: 3306
            }
        );
        assert!(Endpoint::parse("[::1").is_err());
    }

    #[test]
    fn test_endpoint_unix_socket() {
        let ep = Endpoint::parse("/var/run/mysqld/mysqld.sock").unwrap();
        assert_eq!(ep, Endpoint::Unix(PathBuf::from("/var/run/mysqld/mysqld.sock")));
        assert_eq!(ep.protocol(), "unix");
    }

    #[test]
    fn test_endpoint_rejects_empty_and_bad_port() {
        let err = Endpoint::parse("").unwrap_err();
        assert!(err.to_string().contains("endpoint"));
        assert!(Endpoint::parse("host:notaport").is_err());
        assert!(Endpoint::parse(":3306").is_err());
    }

    #[test]
    fn test_resolve_from_block() {
        let block = ProviderConfig {
            endpoint: Some("db:3306".to_string()),
            username: Some("root".to_string()),
            password: Some("pw".to_string()),
            tls: Some("skip-verify".to_string()),
            max_conn_lifetime_sec: Some(60),
            max_open_conns: Some(4),
            ..ProviderConfig::default()
        };
        let cfg = block.resolve_with(env(&[])).unwrap();
        assert_eq!(cfg.username, "root");
        assert_eq!(cfg.password, "pw");
        assert_eq!(cfg.tls, TlsMode::SkipVerify);
        assert_eq!(cfg.max_conn_lifetime, Some(Duration::from_secs(60)));
        assert_eq!(cfg.max_open_conns, Some(4));
    }

    #[test]
    fn test_resolve_env_fallback_and_defaults() {
        let cfg = ProviderConfig::default()
            .resolve_with(env(&[
                (ENDPOINT_ENV, "/tmp/mysql.sock"),
                (USERNAME_ENV, "admin"),
            ]))
            .unwrap();
        assert_eq!(cfg.endpoint.protocol(), "unix");
        assert_eq!(cfg.username, "admin");
        assert_eq!(cfg.password, "");
        assert_eq!(cfg.tls, TlsMode::Disabled);
        assert_eq!(cfg.max_open_conns, None);
    }

    #[test]
    fn test_block_wins_over_env() {
        let block = ProviderConfig {
            endpoint: Some("block-host".to_string()),
            ..ProviderConfig::default()
        };
        let cfg = block
            .resolve_with(env(&[
                (ENDPOINT_ENV, "env-host"),
                (USERNAME_ENV, "u"),
                (TLS_ENV, "true"),
            ]))
            .unwrap();
        assert_eq!(
            cfg.endpoint,
            Endpoint::Tcp {
                host: "block-host".to_string(),
                port: 3306
            }
        );
        assert_eq!(cfg.tls, TlsMode::Verify);
    }

    #[test]
    fn test_missing_required_fields() {
        let err = ProviderConfig::default().resolve_with(env(&[])).unwrap_err();
        assert!(err.to_string().contains("endpoint"));

        let err = ProviderConfig::default()
            .resolve_with(env(&[(ENDPOINT_ENV, "db")]))
            .unwrap_err();
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_tls_modes() {
        assert_eq!(TlsMode::parse("false", Some("PEM")).unwrap(), TlsMode::Disabled);
        assert_eq!(
            TlsMode::parse("true", Some("PEM")).unwrap(),
            TlsMode::Custom {
                ca_pem: "PEM".to_string()
            }
        );
        assert_eq!(TlsMode::parse("true", Some("  ")).unwrap(), TlsMode::Verify);
        assert_eq!(TlsMode::parse("skip-verify", Some("PEM")).unwrap(), TlsMode::SkipVerify);
        let err = TlsMode::parse("preferred", None).unwrap_err();
        assert!(err.to_string().contains("tls"));
    }

    #[test]
    fn test_deserialize_provider_block() {
        let block: ProviderConfig = serde_json::from_value(serde_json::json!({
            "endpoint": "db:3306",
            "username": "root",
            "max_open_conns": 8
        }))
        .unwrap();
        assert_eq!(block.endpoint.as_deref(), Some("db:3306"));
        assert_eq!(block.max_open_conns, Some(8));
        assert!(block.password.is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let cfg = ConnectionConfig::new(Endpoint::parse("db").unwrap(), "root").password("hunter2");
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
