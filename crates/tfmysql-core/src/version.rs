//! Server vendor/version detection and the capability table.
//!
//! Syntax differences between MySQL and MariaDB releases are expressed once,
//! as a table of [`Feature`] thresholds per [`Vendor`]. A [`Capabilities`]
//! value is computed from a detected [`ServerIdentity`] and consulted by the
//! statement synthesizer and the reconcilers; nothing else compares versions.

use crate::connection::Connection;
use crate::error::{Error, Result, VersionError};
use std::fmt;

/// Server vendor, inferred from the version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    MySql,
    MariaDb,
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::MySql => f.write_str("MySQL"),
            Vendor::MariaDb => f.write_str("MariaDB"),
        }
    }
}

/// A `major.minor.patch` triple. Ordering is lexicographic on the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted numeric core such as `8.0.34` or `10.5`.
    ///
    /// Missing segments are zero. Segments past the third must still be
    /// numeric but are ignored, so `5.5.5.10` reads as 5.5.5.
    fn parse_core(core: &str) -> Option<Self> {
        let mut parts = [0_u32; 3];
        for (i, segment) in core.split('.').enumerate() {
            if segment.is_empty() {
                return None;
            }
            let n: u32 = segment.parse().ok()?;
            if let Some(slot) = parts.get_mut(i) {
                *slot = n;
            }
        }
        Some(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Vendor and version of the connected server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub vendor: Vendor,
    pub version: ServerVersion,
    /// The `@@GLOBAL.version` string as reported
    pub raw: String,
}

impl ServerIdentity {
    /// Classify a raw `@@GLOBAL.version` string.
    ///
    /// The text before the first `-` is the numeric core. Any suffix after it
    /// marks the server as MariaDB (`10.6.12-MariaDB-log`); a bare core is
    /// MySQL. A MySQL build with a hyphenated tag (`8.0.34-debug`) is
    /// therefore classified as MariaDB.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (core, vendor) = match trimmed.split_once('-') {
            Some((core, _suffix)) => (core, Vendor::MariaDb),
            None => (trimmed, Vendor::MySql),
        };
        let version = ServerVersion::parse_core(core).ok_or_else(|| {
            Error::Version(VersionError {
                raw: raw.to_string(),
            })
        })?;

        Ok(Self {
            vendor,
            version,
            raw: raw.to_string(),
        })
    }

    /// Capabilities of this server.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(self.vendor, self.version)
    }
}

/// A vendor/version-gated piece of SQL syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// `CREATE ROLE`, role grants, `GRANT ... TO <role>`
    Roles,
    /// `ALTER USER ... IDENTIFIED BY` supersedes `SET PASSWORD ... = PASSWORD()`
    AlterUserPassword,
    /// `REQUIRE <tls-option>` on `CREATE USER` / `ALTER USER`
    TlsOption,
    /// `CREATE USER` without a password still needs `IDENTIFIED BY ''`
    ExplicitPassword,
    /// `SHOW COLLATION` returns a seventh `Pad_attribute` column
    ExtraCollationColumn,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Roles,
        Feature::AlterUserPassword,
        Feature::TlsOption,
        Feature::ExplicitPassword,
        Feature::ExtraCollationColumn,
    ];

    const fn index(self) -> usize {
        match self {
            Feature::Roles => 0,
            Feature::AlterUserPassword => 1,
            Feature::TlsOption => 2,
            Feature::ExplicitPassword => 3,
            Feature::ExtraCollationColumn => 4,
        }
    }

    fn gate(self, vendor: Vendor) -> Gate {
        match (self, vendor) {
            (Feature::Roles, Vendor::MySql) => Gate::AtLeast(ServerVersion::new(8, 0, 0)),
            (Feature::Roles, Vendor::MariaDb) => Gate::AtLeast(ServerVersion::new(10, 0, 5)),
            (Feature::AlterUserPassword, Vendor::MySql) => {
                Gate::AtLeast(ServerVersion::new(5, 7, 6))
            }
            (Feature::AlterUserPassword, Vendor::MariaDb) => {
                Gate::AtLeast(ServerVersion::new(10, 2, 0))
            }
            (Feature::TlsOption, Vendor::MySql) => Gate::AtLeast(ServerVersion::new(5, 7, 0)),
            (Feature::TlsOption, Vendor::MariaDb) => Gate::Always,
            (Feature::ExplicitPassword, Vendor::MySql) => Gate::Below(ServerVersion::new(8, 0, 0)),
            (Feature::ExplicitPassword, Vendor::MariaDb) => Gate::Always,
            (Feature::ExtraCollationColumn, Vendor::MySql) => {
                Gate::AtLeast(ServerVersion::new(8, 0, 0))
            }
            (Feature::ExtraCollationColumn, Vendor::MariaDb) => Gate::Never,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Roles => "roles",
            Feature::AlterUserPassword => "ALTER USER password syntax",
            Feature::TlsOption => "REQUIRE tls_option",
            Feature::ExplicitPassword => "explicit empty password",
            Feature::ExtraCollationColumn => "SHOW COLLATION Pad_attribute column",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
enum Gate {
    Always,
    Never,
    AtLeast(ServerVersion),
    Below(ServerVersion),
}

impl Gate {
    fn admits(self, version: ServerVersion) -> bool {
        match self {
            Gate::Always => true,
            Gate::Never => false,
            Gate::AtLeast(min) => version >= min,
            Gate::Below(max) => version < max,
        }
    }
}

/// Feature support of one server, evaluated once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    vendor: Vendor,
    version: ServerVersion,
    supported: [bool; Feature::ALL.len()],
}

impl Capabilities {
    pub fn new(vendor: Vendor, version: ServerVersion) -> Self {
        let mut supported = [false; Feature::ALL.len()];
        for feature in Feature::ALL {
            supported[feature.index()] = feature.gate(vendor).admits(version);
        }
        Self {
            vendor,
            version,
            supported,
        }
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.supported[feature.index()]
    }

    /// Fail with a configuration error when `feature` is unavailable.
    pub fn require(&self, feature: Feature) -> Result<()> {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(Error::unsupported(format!(
                "{} is not supported by {} {}",
                feature, self.vendor, self.version
            )))
        }
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn version(&self) -> ServerVersion {
        self.version
    }

    /// Number of columns `SHOW COLLATION` returns on this server.
    pub fn collation_columns(&self) -> usize {
        if self.supports(Feature::ExtraCollationColumn) {
            7
        } else {
            6
        }
    }
}

/// Query `@@GLOBAL.version` and classify the server.
#[tracing::instrument(level = "debug", skip(conn))]
pub async fn detect<C: Connection>(conn: &C) -> Result<ServerIdentity> {
    let row = conn.query_one("SELECT @@GLOBAL.version", &[]).await?;
    let raw = row
        .as_ref()
        .and_then(|r| r.get_str(0))
        .unwrap_or_default()
        .to_string();

    let identity = ServerIdentity::parse(&raw)?;
    tracing::debug!(
        vendor = %identity.vendor,
        version = %identity.version,
        raw = %identity.raw,
        "Detected server version"
    );
    Ok(identity)
}
