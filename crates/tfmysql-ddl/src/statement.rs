//! A synthesized statement and its execution against a [`Connection`].

use std::fmt;

use tfmysql_core::{Connection, Error, Result, Row, Value};

/// Placeholder substituted for credentials in logged statement text.
pub const REDACTED: &str = "'******'";

/// SQL text plus bound parameters, ready to send to the server.
///
/// Statements that embed a credential carry a redacted rendering; that
/// rendering is what appears in logs and in [`Error::Statement`] payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
    redacted: Option<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            redacted: None,
        }
    }

    /// A statement whose text contains a secret; `redacted` is shown instead.
    pub fn sensitive(sql: impl Into<String>, redacted: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            redacted: Some(redacted.into()),
        }
    }

    /// Bind one positional (`?`) parameter.
    #[must_use]
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    /// The text sent to the server.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// The text safe to log.
    pub fn display_sql(&self) -> &str {
        self.redacted.as_deref().unwrap_or(&self.sql)
    }

    pub fn is_sensitive(&self) -> bool {
        self.redacted.is_some()
    }

    /// Execute once, returning affected rows.
    pub async fn execute<C: Connection>(&self, conn: &C) -> Result<u64> {
        tracing::debug!(sql = %self.display_sql(), params = self.params.len(), "Executing statement");
        conn.execute(&self.sql, &self.params)
            .await
            .map_err(|e| self.annotate(e))
    }

    /// Run once, returning every row.
    pub async fn query<C: Connection>(&self, conn: &C) -> Result<Vec<Row>> {
        tracing::debug!(sql = %self.display_sql(), params = self.params.len(), "Executing query");
        conn.query(&self.sql, &self.params)
            .await
            .map_err(|e| self.annotate(e))
    }

    /// Run once, returning the first row.
    pub async fn query_one<C: Connection>(&self, conn: &C) -> Result<Option<Row>> {
        tracing::debug!(sql = %self.display_sql(), params = self.params.len(), "Executing query");
        conn.query_one(&self.sql, &self.params)
            .await
            .map_err(|e| self.annotate(e))
    }

    /// Stamp the loggable text onto a server-side error.
    fn annotate(&self, err: Error) -> Error {
        match err {
            Error::Statement(mut s) => {
                s.sql = Some(self.display_sql().to_string());
                Error::Statement(s)
            }
            other => other,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_sql())
    }
}
