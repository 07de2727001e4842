//! `mysql_role`.

use tfmysql_core::{Connection, Error, Result, detect};
use tfmysql_ddl::Principal;
use tfmysql_ddl::grant::show_grants;
use tfmysql_ddl::role::{create_role, drop_role};

use crate::resource_data::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};

pub fn schema() -> Schema {
    Schema::new().with(Attribute::required("name", AttributeType::String).force_new())
}

#[tracing::instrument(level = "debug", skip_all, fields(name = d.get_str("name")))]
pub async fn create<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let caps = detect(conn).await?.capabilities();
    let name = d.get_str("name").to_string();
    create_role(&name, &caps)?.execute(conn).await?;
    d.set_id(name);
    Ok(())
}

/// A role exists while `SHOW GRANTS FOR` accepts it.
#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn read<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let Some(name) = d.id().map(str::to_string) else {
        return Ok(());
    };
    match show_grants(&Principal::role(name.as_str())).query(conn).await {
        Ok(_) => {
            d.set("name", name);
            Ok(())
        }
        Err(Error::Statement(e)) => {
            tracing::warn!(role = %name, error = %e.message, "Role not found, removing from state");
            d.clear_id();
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(id = d.id()))]
pub async fn delete<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let name = d.id().unwrap_or_else(|| d.get_str("name")).to_string();
    drop_role(&name).execute(conn).await?;
    d.clear_id();
    Ok(())
}
