//! `CREATE ROLE` / `DROP ROLE`.

use tfmysql_core::{Capabilities, Feature, Result, quote_literal};

use crate::statement::Statement;

pub fn create_role(name: &str, caps: &Capabilities) -> Result<Statement> {
    caps.require(Feature::Roles)?;
    Ok(Statement::new(format!("CREATE ROLE {}", quote_literal(name))))
}

pub fn drop_role(name: &str) -> Statement {
    Statement::new(format!("DROP ROLE {}", quote_literal(name)))
}
