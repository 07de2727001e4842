//! `mysql_user`.

use tfmysql_core::{Capabilities, Connection, Error, Feature, Result, detect};
use tfmysql_ddl::user::{
    alter_user_tls, create_user, drop_user, set_password, user_exists,
};
use tfmysql_ddl::{Authentication, NewUser};

use crate::key::UserKey;
use crate::resource_data::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_TLS_OPTION: &str = "NONE";

pub fn schema() -> Schema {
    Schema::new()
        .with(Attribute::required("user", AttributeType::String).force_new())
        .with(
            Attribute::optional("host", AttributeType::String)
                .default(DEFAULT_HOST)
                .force_new(),
        )
        .with(Attribute::optional("plaintext_password", AttributeType::String).sensitive())
        .with(
            Attribute::optional("password", AttributeType::String)
                .sensitive()
                .conflicts_with(&["plaintext_password"])
                .deprecated("Please use plaintext_password instead"),
        )
        .with(
            Attribute::optional("auth_plugin", AttributeType::String)
                .force_new()
                .conflicts_with(&["plaintext_password", "password"]),
        )
        .with(
            Attribute::optional("auth_string_hashed", AttributeType::String)
                .sensitive()
                .force_new()
                .conflicts_with(&["plaintext_password", "password"]),
        )
        .with(Attribute::optional("tls_option", AttributeType::String).default(DEFAULT_TLS_OPTION))
}

fn configured_password(d: &ResourceData) -> &str {
    match d.get_str("plaintext_password") {
        "" => d.get_str("password"),
        pw => pw,
    }
}

fn authentication(d: &ResourceData) -> Result<Authentication<'_>> {
    let plugin = d.get_str("auth_plugin");
    let hashed = d.get_str("auth_string_hashed");
    if plugin.is_empty() {
        if !hashed.is_empty() {
            return Err(Error::config(
                "auth_string_hashed",
                "can only be used together with auth_plugin",
            ));
        }
        return Ok(match configured_password(d) {
            "" => Authentication::None,
            pw => Authentication::Password(pw),
        });
    }
    Ok(Authentication::Plugin {
        name: plugin,
        auth_string: Some(hashed).filter(|h| !h.is_empty()),
    })
}

fn key_of(d: &ResourceData) -> Result<UserKey> {
    match d.id() {
        Some(id) => id.parse(),
        None => Ok(UserKey::new(d.get_str("user"), d.get_str("host"))),
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(user = d.get_str("user"), host = d.get_str("host")))]
pub async fn create<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let caps = detect(conn).await?.capabilities();
    let stmt = create_user(
        &NewUser {
            user: d.get_str("user"),
            host: d.get_str("host"),
            auth: authentication(d)?,
            tls_option: d.get_str("tls_option"),
        },
        &caps,
    )?;
    stmt.execute(conn).await?;

    let key = UserKey::new(d.get_str("user"), d.get_str("host"));
    d.set_id(key.to_string());
    Ok(())
}

/// Apply password and TLS requirement changes.
///
/// Accounts authenticated by a plugin have nothing to update in place.
#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn update<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    if !d.get_str("auth_plugin").is_empty() {
        return Ok(());
    }

    let caps = detect(conn).await?.capabilities();
    let key = key_of(d)?;

    let new_password = if d.has_change("plaintext_password") {
        Some(d.get_str("plaintext_password"))
    } else if d.has_change("password") {
        Some(d.get_str("password"))
    } else {
        None
    };
    if let Some(password) = new_password {
        set_password(&key.user, &key.host, password, &caps)
            .execute(conn)
            .await?;
    }

    update_tls(conn, d, &key, &caps).await
}

async fn update_tls<C: Connection>(
    conn: &C,
    d: &ResourceData,
    key: &UserKey,
    caps: &Capabilities,
) -> Result<()> {
    if !d.has_change("tls_option") {
        return Ok(());
    }
    if !caps.supports(Feature::TlsOption) {
        tracing::debug!("Server does not accept REQUIRE on ALTER USER, skipping tls_option change");
        return Ok(());
    }
    alter_user_tls(&key.user, &key.host, d.get_str("tls_option"))
        .execute(conn)
        .await?;
    Ok(())
}

/// Existence check against `mysql.user`.
#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn read<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    if d.id().is_none() {
        return Ok(());
    }
    let key = key_of(d)?;
    let rows = user_exists(&key.user, &key.host).query(conn).await?;
    if rows.is_empty() {
        tracing::warn!(user = %key, "User not found, removing from state");
        d.clear_id();
        return Ok(());
    }
    d.set("user", key.user);
    d.set("host", key.host);
    Ok(())
}

/// `DROP USER`; the identity is only cleared when the drop succeeds.
#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn delete<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let key = key_of(d)?;
    drop_user(&key.user, &key.host).execute(conn).await?;
    d.clear_id();
    Ok(())
}

/// Import `user@host`, failing when the account does not exist.
pub async fn import<C: Connection>(conn: &C, id: &str) -> Result<ResourceData> {
    let key: UserKey = id.parse()?;
    let rows = user_exists(&key.user, &key.host).query(conn).await?;
    if rows.is_empty() {
        return Err(Error::config("id", format!("user '{key}' not found")));
    }

    let mut d = ResourceData::for_import(&schema(), key.to_string());
    d.set("user", key.user);
    d.set("host", key.host);
    d.set("tls_option", DEFAULT_TLS_OPTION);
    Ok(d)
}
