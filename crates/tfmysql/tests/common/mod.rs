//! Scripted in-memory connection shared by the reconciler suites.
#![allow(dead_code)]

use std::sync::Mutex;

use tfmysql_core::error::StatementError;
use tfmysql_core::{Connection, Error, Result, Row, Value};

const VERSION_QUERY: &str = "SELECT @@GLOBAL.version";

/// What a scripted statement answers.
#[derive(Debug, Clone)]
pub enum Reply {
    Rows(Vec<Row>),
    Fail { code: u16, message: String },
}

/// Records every statement and replays scripted replies.
///
/// Replies are matched by SQL prefix and consumed in order. Unscripted
/// statements succeed with no rows. The version query is answered from
/// `version` and not recorded.
pub struct MockConnection {
    version: String,
    script: Mutex<Vec<(String, Reply)>>,
    log: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockConnection {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            script: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn mysql8() -> Self {
        Self::new("8.0.34")
    }

    pub fn mysql57() -> Self {
        Self::new("5.7.44")
    }

    /// Answer the next statement starting with `prefix` with `rows`.
    pub fn on_rows(self, prefix: &str, rows: Vec<Row>) -> Self {
        self.push(prefix, Reply::Rows(rows))
    }

    /// Fail the next statement starting with `prefix` with a server error.
    pub fn on_error(self, prefix: &str, code: u16, message: &str) -> Self {
        self.push(
            prefix,
            Reply::Fail {
                code,
                message: message.to_string(),
            },
        )
    }

    fn push(self, prefix: &str, reply: Reply) -> Self {
        self.script
            .lock()
            .unwrap()
            .push((prefix.to_string(), reply));
        self
    }

    /// Every statement text received, in order.
    pub fn statements(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    /// Bound parameters of the `n`th statement.
    pub fn params(&self, n: usize) -> Vec<Value> {
        self.log.lock().unwrap()[n].1.clone()
    }

    fn reply(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        if sql == VERSION_QUERY {
            return Ok(vec![row(&["@@GLOBAL.version"], &[self.version.as_str()])]);
        }
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));

        let mut script = self.script.lock().unwrap();
        let Some(pos) = script.iter().position(|(prefix, _)| sql.starts_with(prefix)) else {
            return Ok(Vec::new());
        };
        match script.remove(pos).1 {
            Reply::Rows(rows) => Ok(rows),
            Reply::Fail { code, message } => Err(Error::Statement(StatementError {
                sql: Some(sql.to_string()),
                code: Some(code),
                sqlstate: None,
                message,
            })),
        }
    }
}

impl Connection for MockConnection {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        self.reply(sql, params).map(|rows| rows.len() as u64)
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.reply(sql, params)
    }
}

/// One text row.
pub fn row(columns: &[&str], values: &[&str]) -> Row {
    Row::new(
        columns.iter().map(|c| (*c).to_string()).collect(),
        values.iter().map(|v| Value::from(*v)).collect(),
    )
}
