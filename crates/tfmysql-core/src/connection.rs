//! Database connection trait.
//!
//! The reconcilers only ever need two things from a server: run a statement,
//! and read rows back. [`Connection`] is that seam. The live implementation
//! is a pooled sqlx handle in `tfmysql-client`; tests substitute a scripted
//! in-memory connection.
//!
//! Implementations must be safe to share between concurrently running
//! reconcilers (`Send + Sync`). Each call is a single attempt: retries
//! happen only while the connection is being established.

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// A database connection capable of executing statements.
///
/// When `params` is empty the statement is sent as plain text; MySQL does
/// not accept placeholders in most DDL/DCL, so only probes with literal
/// arguments (e.g. `SHOW COLLATION WHERE Charset = ?`) bind parameters.
pub trait Connection: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<u64>> + Send;

    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Execute a query and return the first row, if any.
    fn query_one(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Option<Row>>> + Send {
        async move { Ok(self.query(sql, params).await?.into_iter().next()) }
    }
}

impl<C: Connection> Connection for &C {
    fn execute(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<u64>> + Send {
        (**self).execute(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }
}

impl<C: Connection> Connection for std::sync::Arc<C> {
    fn execute(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<u64>> + Send {
        (**self).execute(sql, params)
    }

    fn query(&self, sql: &str, params: &[Value]) -> impl Future<Output = Result<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }
}
