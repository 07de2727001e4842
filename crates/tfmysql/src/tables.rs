//! `mysql_tables` data source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tfmysql_core::{Connection, Result};
use tfmysql_ddl::tables::show_tables;

use crate::resource_data::ResourceData;
use crate::schema::{Attribute, AttributeType, Schema};

static READ_SEQ: AtomicU64 = AtomicU64::new(0);

pub fn schema() -> Schema {
    Schema::new()
        .with(Attribute::required("database", AttributeType::String))
        .with(Attribute::optional("pattern", AttributeType::String))
        .with(Attribute::computed("tables", AttributeType::List))
}

/// A fresh id for every read; the listing has no natural identity.
fn read_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let seq = READ_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("tables-{nanos:x}-{seq:x}")
}

#[tracing::instrument(level = "debug", skip_all, fields(database = d.get_str("database")))]
pub async fn read<C: Connection>(conn: &C, d: &mut ResourceData) -> Result<()> {
    let rows = show_tables(d.get_str("database"), d.get_str("pattern"))
        .query(conn)
        .await?;
    let tables: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get_str(0))
        .map(str::to_string)
        .collect();

    tracing::debug!(count = tables.len(), "Listed tables");
    d.set("tables", tables);
    d.set_id(read_id());
    Ok(())
}
