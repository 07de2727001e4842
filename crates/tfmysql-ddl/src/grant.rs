//! `GRANT` / `REVOKE` / `SHOW GRANTS`.

use tfmysql_core::{Capabilities, Error, Feature, Result, flatten_list, format_database_name, quote_literal};

use crate::principal::Principal;
use crate::statement::Statement;

/// What is being granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grantable {
    /// Privilege keywords, e.g. `SELECT`, `UPDATE (col)`, `ALL`
    Privileges(Vec<String>),
    /// Role names
    Roles(Vec<String>),
}

impl Grantable {
    /// Exactly one of the two sets must be non-empty.
    pub fn from_sets(privileges: Vec<String>, roles: Vec<String>) -> Result<Self> {
        match (privileges.is_empty(), roles.is_empty()) {
            (false, true) => Ok(Grantable::Privileges(privileges)),
            (true, false) => Ok(Grantable::Roles(roles)),
            (false, false) => Err(Error::config(
                "roles",
                "conflicts with privileges; only one may be set",
            )),
            (true, true) => Err(Error::unsupported("One of privileges or roles is required")),
        }
    }

    pub fn is_roles(&self) -> bool {
        matches!(self, Grantable::Roles(_))
    }

    fn to_sql(&self) -> String {
        match self {
            Grantable::Privileges(privs) => flatten_list(privs, str::to_string),
            Grantable::Roles(roles) => flatten_list(roles, quote_literal),
        }
    }
}

/// A fully resolved grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub principal: Principal,
    /// Raw database name, `*` for all
    pub database: String,
    /// Raw table name, `*` for all
    pub table: String,
    pub what: Grantable,
    pub grant_option: bool,
    pub tls_option: String,
}

impl Grant {
    /// `<db>.<table>`, each part quoted unless `*` or already quoted.
    pub fn target(&self) -> String {
        format!(
            "{}.{}",
            format_database_name(&self.database),
            format_database_name(&self.table)
        )
    }
}

/// `GRANT ...`, shaped for the connected server.
///
/// Role lists are granted without an `ON` clause. `REQUIRE` is attached
/// only on servers without role support, which still accept it on `GRANT`.
pub fn grant(g: &Grant, caps: &Capabilities) -> Result<Statement> {
    if g.principal.is_role() || g.what.is_roles() {
        caps.require(Feature::Roles)?;
    }

    let mut sql = format!("GRANT {}", g.what.to_sql());
    if !g.what.is_roles() {
        sql.push_str(" ON ");
        sql.push_str(&g.target());
    }
    sql.push_str(" TO ");
    sql.push_str(&g.principal.to_sql());

    if !caps.supports(Feature::Roles) && !g.tls_option.is_empty() {
        sql.push_str(" REQUIRE ");
        sql.push_str(&g.tls_option);
    }
    if g.grant_option && !g.what.is_roles() {
        sql.push_str(" WITH GRANT OPTION");
    }

    Ok(Statement::new(sql))
}

/// First revoke phase: strip the grant option. Role-list grants have none.
pub fn revoke_grant_option(g: &Grant) -> Option<Statement> {
    if g.what.is_roles() {
        return None;
    }
    Some(Statement::new(format!(
        "REVOKE GRANT OPTION ON {} FROM {}",
        g.target(),
        g.principal.to_sql()
    )))
}

/// Second revoke phase: everything on the target, or the granted roles.
pub fn revoke(g: &Grant) -> Statement {
    let what = match &g.what {
        Grantable::Privileges(_) => format!("ALL ON {}", g.target()),
        Grantable::Roles(_) => g.what.to_sql(),
    };
    Statement::new(format!("REVOKE {} FROM {}", what, g.principal.to_sql()))
}

pub fn show_grants(principal: &Principal) -> Statement {
    Statement::new(format!("SHOW GRANTS FOR {}", principal.to_sql()))
}
