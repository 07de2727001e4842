//! Grantees: a host-scoped account or a role.

use std::fmt;

use tfmysql_core::{Capabilities, Error, Feature, Result, quote_literal};

/// Something privileges can be granted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// `'user'@'host'`
    User { user: String, host: String },
    /// `'role'`
    Role(String),
}

impl Principal {
    pub fn user(user: impl Into<String>, host: impl Into<String>) -> Self {
        Principal::User {
            user: user.into(),
            host: host.into(),
        }
    }

    pub fn role(name: impl Into<String>) -> Self {
        Principal::Role(name.into())
    }

    /// Pick a grantee from optional user/host/role attributes.
    ///
    /// A non-empty user and host win; otherwise a non-empty role is used,
    /// which the server must support.
    pub fn resolve(user: &str, host: &str, role: &str, caps: &Capabilities) -> Result<Self> {
        if !user.is_empty() && !host.is_empty() {
            Ok(Principal::user(user, host))
        } else if !role.is_empty() {
            caps.require(Feature::Roles)?;
            Ok(Principal::role(role))
        } else {
            Err(Error::unsupported("user with host or a role is required"))
        }
    }

    pub fn is_role(&self) -> bool {
        matches!(self, Principal::Role(_))
    }

    /// Quoted account or role name as it appears after `TO`/`FROM`/`FOR`.
    pub fn to_sql(&self) -> String {
        match self {
            Principal::User { user, host } => {
                format!("{}@{}", quote_literal(user), quote_literal(host))
            }
            Principal::Role(name) => quote_literal(name),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
