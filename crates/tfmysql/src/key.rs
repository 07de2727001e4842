//! Composite identities persisted by the host.
//!
//! The host stores one string per resource. Users are `user@host`; grants
//! are `user@host:database` or `role:database`. These types are the only
//! place those strings are built or taken apart.

use std::fmt;
use std::str::FromStr;

use tfmysql_core::{Error, Result};
use tfmysql_ddl::Principal;

/// `user@host`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserKey {
    pub user: String,
    pub host: String,
}

impl UserKey {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
        }
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}

impl FromStr for UserKey {
    type Err = Error;

    /// Split at the last `@`; user names may contain `@`, host names may not.
    fn from_str(s: &str) -> Result<Self> {
        match s.rsplit_once('@') {
            Some((user, host)) if !user.is_empty() && !host.is_empty() => {
                Ok(UserKey::new(user, host))
            }
            _ => Err(Error::config(
                "id",
                format!("'{s}' is not a valid user identity, expected <user>@<host>"),
            )),
        }
    }
}

/// `user@host:database` or `role:database`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GrantKey {
    pub principal: Principal,
    pub database: String,
}

impl GrantKey {
    pub fn new(principal: Principal, database: impl Into<String>) -> Self {
        Self {
            principal,
            database: database.into(),
        }
    }
}

impl fmt::Display for GrantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.principal {
            Principal::User { user, host } => write!(f, "{}@{}:{}", user, host, self.database),
            Principal::Role(role) => write!(f, "{}:{}", role, self.database),
        }
    }
}

impl FromStr for GrantKey {
    type Err = Error;

    /// Split at the first `:`; a principal containing `@` is a user.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            Error::config(
                "id",
                format!(
                    "'{s}' is not a valid grant identity, expected <user>@<host>:<database> or <role>:<database>"
                ),
            )
        };

        let (principal, database) = s.split_once(':').ok_or_else(invalid)?;
        if principal.is_empty() || database.is_empty() {
            return Err(invalid());
        }
        let principal = if principal.contains('@') {
            let user = principal.parse::<UserKey>().map_err(|_| invalid())?;
            Principal::user(user.user, user.host)
        } else {
            Principal::role(principal)
        };
        Ok(GrantKey::new(principal, database))
    }
}
