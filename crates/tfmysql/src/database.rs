//! `mysql_database`.

use tfmysql_core::{Connection, Error, Result, Value, detect, extract_ident_after};
use tfmysql_ddl::database::{
    CHARACTER_SET_KEYWORD, COLLATE_KEYWORD, alter_database, create_database, default_collation,
    drop_database, show_create_database,
};

use crate::resource_data::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};

pub const DEFAULT_CHARACTER_SET: &str = "utf8";
pub const DEFAULT_COLLATION: &str = "utf8_general_ci";

const CREATE_DATABASE_COLUMN: &str = "Create Database";

pub fn schema() -> Schema {
    Schema::new()
        .with(Attribute::required("name", AttributeType::String).force_new())
        .with(
            Attribute::optional("default_character_set", AttributeType::String)
                .default(DEFAULT_CHARACTER_SET),
        )
        .with(
            Attribute::optional("default_collation", AttributeType::String)
                .default(DEFAULT_COLLATION),
        )
}

#[tracing::instrument(level = "debug", skip_all, fields(name = d.get_str("name")))]
pub async fn create<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let name = d.get_str("name").to_string();
    create_database(
        &name,
        d.get_str("default_character_set"),
        d.get_str("default_collation"),
    )
    .execute(conn)
    .await?;

    d.set_id(name);
    read(conn, d).await
}

#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn update<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    alter_database(
        d.get_str("name"),
        d.get_str("default_character_set"),
        d.get_str("default_collation"),
    )
    .execute(conn)
    .await?;

    read(conn, d).await
}

/// Refresh charset and collation from `SHOW CREATE DATABASE`.
///
/// The server omits `COLLATE` when the collation is the charset default;
/// that default is then looked up separately.
#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn read<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let Some(name) = d.id().map(str::to_string) else {
        return Ok(());
    };

    let row = match show_create_database(&name).query_one(conn).await {
        Ok(row) => row,
        Err(Error::Statement(e)) if e.is_unknown_database() => {
            tracing::warn!(database = %name, "Database not found, removing from state");
            d.clear_id();
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    let create_sql = row
        .as_ref()
        .and_then(|r| r.get_by_name(CREATE_DATABASE_COLUMN))
        .and_then(Value::as_str)
        .map(str::to_string);
    let Some(create_sql) = create_sql else {
        tracing::warn!(database = %name, "SHOW CREATE DATABASE returned nothing, removing from state");
        d.clear_id();
        return Ok(());
    };

    let charset = extract_ident_after(&create_sql, CHARACTER_SET_KEYWORD).to_string();
    let mut collation = extract_ident_after(&create_sql, COLLATE_KEYWORD).to_string();
    if collation.is_empty() && !charset.is_empty() {
        collation = charset_default_collation(conn, &charset).await?;
    }

    d.set("name", name);
    d.set("default_character_set", charset);
    d.set("default_collation", collation);
    Ok(())
}

async fn charset_default_collation<C: Connection>(conn: &C, charset: &str) -> Result<String> {
    let caps = detect(conn).await?.capabilities();
    let row = default_collation(charset).query_one(conn).await?;
    let Some(row) = row else {
        return Err(Error::unsupported(format!(
            "Charset {charset} has no default collation"
        )));
    };

    if row.len() != caps.collation_columns() {
        tracing::warn!(
            expected = caps.collation_columns(),
            actual = row.len(),
            "Unexpected SHOW COLLATION row shape"
        );
    }
    row.get_str(0).map(str::to_string).ok_or_else(|| {
        Error::unsupported(format!("Charset {charset} has no default collation"))
    })
}

/// `DROP DATABASE`; on failure the database is still considered present.
#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn delete<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let name = d.id().unwrap_or_else(|| d.get_str("name")).to_string();
    drop_database(&name).execute(conn).await?;
    d.clear_id();
    Ok(())
}

/// Import by bare database name.
pub async fn import<C: Connection>(conn: &C, id: &str) -> Result<ResourceData> {
    let mut d = ResourceData::for_import(&schema(), id);
    read(conn, &mut d).await?;
    Ok(d)
}
