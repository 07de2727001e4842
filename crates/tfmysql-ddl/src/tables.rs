//! `SHOW TABLES`.

use tfmysql_core::{quote_ident_mysql, quote_literal};

use crate::statement::Statement;

/// `SHOW TABLES FROM <db> [LIKE '<pattern>']`; an empty pattern lists all.
pub fn show_tables(database: &str, pattern: &str) -> Statement {
    let mut sql = format!("SHOW TABLES FROM {}", quote_ident_mysql(database));
    if !pattern.is_empty() {
        sql.push_str(" LIKE ");
        sql.push_str(&quote_literal(pattern));
    }
    Statement::new(sql)
}
