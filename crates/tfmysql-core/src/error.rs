//! Error types for tfmysql operations.

use std::fmt;

/// MySQL `ER_BAD_DB_ERROR`: unknown database.
pub const ER_BAD_DB_ERROR: u16 = 1049;
/// MySQL `ER_NONEXISTING_GRANT`: no such grant defined for user on host.
pub const ER_NONEXISTING_GRANT: u16 = 1141;
/// MySQL `ER_NONEXISTING_TABLE_GRANT`: no such grant defined on a table.
pub const ER_NONEXISTING_TABLE_GRANT: u16 = 1147;
/// MySQL `ER_ACCESS_DENIED_ERROR`: access denied for user (bad credentials).
pub const ER_ACCESS_DENIED_ERROR: u16 = 1045;
/// MySQL `ER_DBACCESS_DENIED_ERROR`: access denied to database at connect.
pub const ER_DBACCESS_DENIED_ERROR: u16 = 1044;

/// The primary error type for all tfmysql operations.
#[derive(Debug)]
pub enum Error {
    /// Invalid or conflicting configuration, or a feature the server lacks
    Config(ConfigError),
    /// Cannot reach or authenticate to the server
    Connection(ConnectionError),
    /// A statement was rejected by the server
    Statement(StatementError),
    /// The first phase of a two-phase revoke succeeded, the second did not
    PartialRevoke(PartialRevokeError),
    /// Both phases of a two-phase revoke failed
    Revoke(RevokeError),
    /// The server reported a version string that could not be parsed
    Version(VersionError),
    /// Public-key parsing or encryption failed
    Crypto(String),
    /// I/O errors
    Io(std::io::Error),
}

#[derive(Debug)]
pub struct ConfigError {
    /// The offending attribute or feature, when one can be named
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to establish connection
    Connect,
    /// Connection refused
    Refused,
    /// Authentication failed
    Authentication,
    /// SSL/TLS negotiation or certificate trust failed
    Ssl,
    /// Gave up after the retry ceiling
    Timeout,
    /// Connection pool exhausted
    PoolExhausted,
    /// Connection lost during operation
    Disconnected,
}

#[derive(Debug)]
pub struct StatementError {
    /// Statement text, with credentials redacted
    pub sql: Option<String>,
    /// MySQL numeric error code
    pub code: Option<u16>,
    pub sqlstate: Option<String>,
    pub message: String,
}

#[derive(Debug)]
pub struct PartialRevokeError {
    /// The statement that did complete
    pub completed: String,
    /// The statement that failed afterwards
    pub failed: StatementError,
}

#[derive(Debug)]
pub struct RevokeError {
    /// Failure revoking `GRANT OPTION`
    pub grant_option: StatementError,
    /// Failure revoking the privileges or roles themselves
    pub revoke: StatementError,
}

#[derive(Debug)]
pub struct VersionError {
    /// The raw `@@GLOBAL.version` string
    pub raw: String,
}

impl Error {
    /// Build a configuration error naming the offending field.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            field: Some(field.into()),
            message: message.into(),
        })
    }

    /// Build a configuration error that is not tied to a single field.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::Config(ConfigError {
            field: None,
            message: message.into(),
        })
    }

    /// Should connection establishment try again after this error?
    ///
    /// Authentication and certificate-trust failures never heal by waiting.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Connection(c) => !matches!(
                c.kind,
                ConnectionErrorKind::Authentication | ConnectionErrorKind::Ssl
            ),
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// The server-side statement error, if this is one.
    pub fn as_statement(&self) -> Option<&StatementError> {
        match self {
            Error::Statement(s) => Some(s),
            _ => None,
        }
    }

    /// MySQL error code if available (e.g., 1049 for unknown database)
    pub fn code(&self) -> Option<u16> {
        self.as_statement().and_then(|s| s.code)
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Statement(s) => s.sql.as_deref(),
            Error::PartialRevoke(p) => p.failed.sql.as_deref(),
            Error::Revoke(r) => r.grant_option.sql.as_deref(),
            _ => None,
        }
    }

    /// Attach statement text to a statement error that does not carry one yet.
    #[must_use]
    pub fn with_sql(mut self, sql: &str) -> Self {
        if let Error::Statement(s) = &mut self {
            if s.sql.is_none() {
                s.sql = Some(sql.to_string());
            }
        }
        self
    }
}

impl StatementError {
    /// The database named in the statement does not exist.
    pub fn is_unknown_database(&self) -> bool {
        self.code == Some(ER_BAD_DB_ERROR)
    }

    /// The grant being revoked or shown does not exist.
    pub fn is_nonexisting_grant(&self) -> bool {
        matches!(
            self.code,
            Some(ER_NONEXISTING_GRANT | ER_NONEXISTING_TABLE_GRANT)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
            Error::Statement(e) => write!(f, "Statement error: {}", e),
            Error::PartialRevoke(e) => write!(f, "Partial revoke: {}", e),
            Error::Revoke(e) => write!(f, "Revoke failed: {}", e),
            Error::Version(e) => write!(f, "Version error: {}", e),
            Error::Crypto(msg) => write!(f, "Encryption error: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for StatementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "Error {}: {}", code, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(sql) = &self.sql {
            write!(f, " (running SQL: {})", sql)?;
        }
        Ok(())
    }
}

impl fmt::Display for PartialRevokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' succeeded but the following revoke failed, cleanup is incomplete: {}",
            self.completed, self.failed
        )
    }
}

impl fmt::Display for RevokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "revoking the grant option failed: {}; revoking the grant failed: {}",
            self.grant_option, self.revoke
        )
    }
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not parse server version '{}' (expected <major>.<minor>.<patch>[-suffix])",
            self.raw
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<StatementError> for Error {
    fn from(err: StatementError) -> Self {
        Error::Statement(err)
    }
}

impl From<VersionError> for Error {
    fn from(err: VersionError) -> Self {
        Error::Version(err)
    }
}

/// Result type alias for tfmysql operations.
pub type Result<T> = std::result::Result<T, Error>;
