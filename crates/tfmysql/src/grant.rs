//! `mysql_grant`.

use tfmysql_core::error::{PartialRevokeError, RevokeError, StatementError};
use tfmysql_core::{Capabilities, Connection, Error, Result, detect};
use tfmysql_ddl::grant::{grant, revoke, revoke_grant_option, show_grants};
use tfmysql_ddl::{Grant, Grantable, Principal};

use crate::key::GrantKey;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::user::DEFAULT_HOST;

pub fn schema() -> Schema {
    Schema::new()
        .with(
            Attribute::optional("user", AttributeType::String)
                .force_new()
                .conflicts_with(&["role"]),
        )
        .with(
            Attribute::optional("role", AttributeType::String)
                .force_new()
                .conflicts_with(&["user", "host"]),
        )
        .with(
            Attribute::optional("host", AttributeType::String)
                .default(DEFAULT_HOST)
                .force_new(),
        )
        .with(Attribute::required("database", AttributeType::String).force_new())
        .with(
            Attribute::optional("table", AttributeType::String)
                .default("*")
                .force_new(),
        )
        .with(Attribute::optional("privileges", AttributeType::Set).force_new())
        .with(
            Attribute::optional("roles", AttributeType::Set)
                .force_new()
                .conflicts_with(&["privileges"]),
        )
        .with(
            Attribute::optional("grant", AttributeType::Bool)
                .default(false)
                .force_new(),
        )
        .with(
            Attribute::optional("tls_option", AttributeType::String)
                .default("NONE")
                .force_new(),
        )
}

fn grant_of(d: &ResourceData, caps: &Capabilities) -> Result<Grant> {
    let principal = Principal::resolve(
        d.get_str("user"),
        d.get_str("host"),
        d.get_str("role"),
        caps,
    )?;
    let what = Grantable::from_sets(d.get_set("privileges"), d.get_set("roles"))?;
    Ok(Grant {
        principal,
        database: d.get_str("database").to_string(),
        table: d.get_str("table").to_string(),
        what,
        grant_option: d.get_bool("grant"),
        tls_option: d.get_str("tls_option").to_string(),
    })
}

#[tracing::instrument(level = "debug", skip_all, fields(database = d.get_str("database")))]
pub async fn create<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let caps = detect(conn).await?.capabilities();
    let g = grant_of(d, &caps)?;
    grant(&g, &caps)?.execute(conn).await?;

    let key = GrantKey::new(g.principal, g.database);
    d.set_id(key.to_string());
    read(conn, d).await
}

/// Principal from configured attributes, or from the id after an import.
fn principal_of(d: &ResourceData) -> Result<Principal> {
    let (user, host, role) = (d.get_str("user"), d.get_str("host"), d.get_str("role"));
    if !user.is_empty() && !host.is_empty() {
        return Ok(Principal::user(user, host));
    }
    if !role.is_empty() {
        return Ok(Principal::role(role));
    }
    let id = d.id().unwrap_or_default();
    Ok(id.parse::<GrantKey>()?.principal)
}

/// Existence probe: the principal's grants can still be listed.
#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn read<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    if d.id().is_none() {
        return Ok(());
    }
    let principal = principal_of(d)?;
    match show_grants(&principal).query(conn).await {
        Ok(_) => Ok(()),
        Err(Error::Statement(e)) => {
            tracing::warn!(principal = %principal, error = %e.message, "Grants not found, removing from state");
            d.clear_id();
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// How the first revoke phase ended.
enum GrantOptionRevoke {
    /// Nothing to revoke for a role list
    Skipped,
    /// Server had no such grant
    Absent,
    Done(String),
    Failed(StatementError),
}

/// Revoke in two phases: the grant option, then the grant itself.
///
/// Missing grants are not errors in either phase. When both phases fail, or
/// the second fails after the first succeeded, the error reports both.
#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn delete<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let caps = detect(conn).await?.capabilities();
    let g = grant_of(d, &caps)?;

    let phase_one = match revoke_grant_option(&g) {
        None => GrantOptionRevoke::Skipped,
        Some(stmt) => match stmt.execute(conn).await {
            Ok(_) => GrantOptionRevoke::Done(stmt.display_sql().to_string()),
            Err(Error::Statement(e)) if e.is_nonexisting_grant() => {
                tracing::debug!("No grant option to revoke");
                GrantOptionRevoke::Absent
            }
            Err(Error::Statement(e)) => GrantOptionRevoke::Failed(e),
            Err(e) => return Err(e),
        },
    };

    let phase_two = match revoke(&g).execute(conn).await {
        Ok(_) => None,
        Err(Error::Statement(e)) if e.is_nonexisting_grant() => {
            tracing::debug!("Grant already gone");
            None
        }
        Err(Error::Statement(e)) => Some(e),
        Err(e) => return Err(e),
    };

    match (phase_one, phase_two) {
        (GrantOptionRevoke::Failed(grant_option), Some(revoke)) => {
            Err(Error::Revoke(RevokeError { grant_option, revoke }))
        }
        (GrantOptionRevoke::Failed(first), None) => Err(Error::Statement(first)),
        (GrantOptionRevoke::Done(completed), Some(failed)) => {
            Err(Error::PartialRevoke(PartialRevokeError { completed, failed }))
        }
        (_, Some(failed)) => Err(Error::Statement(failed)),
        (_, None) => {
            d.clear_id();
            Ok(())
        }
    }
}
