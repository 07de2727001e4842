//! The live, pooled server connection.

use std::sync::Arc;

use sqlx::mysql::{
    MySql, MySqlArguments, MySqlConnectOptions, MySqlDatabaseError, MySqlPool, MySqlPoolOptions,
    MySqlRow,
};
use sqlx::query::Query;
use sqlx::{Column as _, Executor as _, Row as _};
use tfmysql_core::error::{
    ConfigError, ConnectionError, ConnectionErrorKind, ER_ACCESS_DENIED_ERROR,
    ER_DBACCESS_DENIED_ERROR, StatementError,
};
use tfmysql_core::row::ColumnInfo;
use tfmysql_core::{Connection, Error, Result, Row, Value};

use crate::config::{ConnectionConfig, Endpoint, TlsMode};
use crate::tls::{ssl_mode, validate_ca_pem};

const PROXY_ENV_VARS: [&str; 4] = ["ALL_PROXY", "all_proxy", "HTTPS_PROXY", "https_proxy"];

/// A pooled MySQL/MariaDB connection, shareable between reconcilers.
#[derive(Debug, Clone)]
pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Driver connect options for `config`, validating any custom CA first.
pub fn connect_options(config: &ConnectionConfig) -> Result<MySqlConnectOptions> {
    let mut options = MySqlConnectOptions::new()
        .username(&config.username)
        .ssl_mode(ssl_mode(&config.tls));

    if !config.password.is_empty() {
        options = options.password(&config.password);
    }

    options = match &config.endpoint {
        Endpoint::Tcp { host, port } => options.host(host).port(*port),
        Endpoint::Unix(path) => options.socket(path),
    };

    if let TlsMode::Custom { ca_pem } = &config.tls {
        options = options.ssl_ca_from_pem(validate_ca_pem(ca_pem)?);
    }

    Ok(options)
}

/// Open a verified connection pool, retrying while the server is unreachable.
#[tracing::instrument(level = "info", skip(config), fields(protocol = config.endpoint.protocol(), tls = config.tls.name()))]
pub async fn connect(config: &ConnectionConfig) -> Result<MySqlClient> {
    let options = connect_options(config)?;
    warn_on_proxy_env();

    let pool = config
        .retry
        .run(|attempt| {
            let options = options.clone();
            async move {
                tracing::debug!(attempt, "Opening connection");
                open_and_ping(config, options).await
            }
        })
        .await?;

    tracing::info!(
        max_open_conns = ?config.max_open_conns,
        max_conn_lifetime = ?config.max_conn_lifetime,
        "Connected to MySQL server"
    );
    Ok(MySqlClient { pool })
}

async fn open_and_ping(config: &ConnectionConfig, options: MySqlConnectOptions) -> Result<MySqlPool> {
    let mut pool_options = MySqlPoolOptions::new();
    if let Some(max) = config.max_open_conns {
        pool_options = pool_options.max_connections(max);
    }
    if let Some(lifetime) = config.max_conn_lifetime {
        pool_options = pool_options.max_lifetime(lifetime);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| connect_failure(map_sqlx_error(e)))?;

    // The handshake alone does not prove the server answers queries.
    if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
        pool.close().await;
        return Err(connect_failure(map_sqlx_error(e)));
    }
    Ok(pool)
}

/// Reclassify a server error raised while opening the pool.
///
/// Access denied is final. Any other server error at this stage (too many
/// connections, server shutting down) is a connectivity failure and is
/// retried.
pub(crate) fn connect_failure(err: Error) -> Error {
    match err {
        Error::Statement(e)
            if matches!(e.code, Some(ER_ACCESS_DENIED_ERROR | ER_DBACCESS_DENIED_ERROR)) =>
        {
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Authentication,
                message: e.message,
                source: None,
            })
        }
        Error::Statement(e) => Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Connect,
            message: e.to_string(),
            source: None,
        }),
        other => other,
    }
}

fn warn_on_proxy_env() {
    for var in PROXY_ENV_VARS {
        if std::env::var_os(var).is_some() {
            tracing::warn!(
                variable = var,
                "Proxy environment variable is set but proxied MySQL connections are not supported; connecting directly"
            );
            return;
        }
    }
}

impl Connection for MySqlClient {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let result = if params.is_empty() {
            self.pool.execute(sql).await
        } else {
            bind_all(sqlx::query(sql), params)
                .execute(&self.pool)
                .await
        };
        result
            .map(|done| done.rows_affected())
            .map_err(map_sqlx_error)
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let rows = if params.is_empty() {
            self.pool.fetch_all(sql).await
        } else {
            bind_all(sqlx::query(sql), params)
                .fetch_all(&self.pool)
                .await
        };
        rows.map(|rows| convert_rows(&rows)).map_err(map_sqlx_error)
    }
}

fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [Value],
) -> Query<'q, MySql, MySqlArguments> {
    for value in params {
        query = match value {
            Value::Null => query.bind(Option::<String>::None),
            Value::Bool(b) => query.bind(*b),
            Value::BigInt(i) => query.bind(*i),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Bytes(b) => query.bind(b.as_slice()),
        };
    }
    query
}

fn convert_rows(rows: &[MySqlRow]) -> Vec<Row> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let columns = Arc::new(ColumnInfo::new(
        first
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
    ));

    rows.iter()
        .map(|row| {
            let values = (0..row.len()).map(|idx| decode_cell(row, idx)).collect();
            Row::with_columns(Arc::clone(&columns), values)
        })
        .collect()
}

/// `SHOW` output mixes VARCHAR, binary-collated text and integers.
fn decode_cell(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map_or(Value::Null, Value::Text);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map_or(Value::Null, Value::BigInt);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(idx) {
        return v.map_or(Value::Null, |u| {
            i64::try_from(u).map_or_else(|_| Value::Text(u.to_string()), Value::BigInt)
        });
    }
    if let Ok(v) = row.try_get_unchecked::<Option<Vec<u8>>, _>(idx) {
        return v.map_or(Value::Null, Value::Bytes);
    }
    Value::Null
}

/// Classify a driver error into the tfmysql taxonomy.
pub fn map_sqlx_error(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::Database(db) => {
            let code = db
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(MySqlDatabaseError::number);
            Error::Statement(StatementError {
                sql: None,
                code,
                sqlstate: db.code().map(|c| c.into_owned()),
                message: db.message().to_string(),
            })
        }
        sqlx::Error::Tls(e) => Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Ssl,
            message: format!("TLS error: {e}"),
            source: Some(e),
        }),
        sqlx::Error::Io(e) => {
            let text = e.to_string();
            let kind = if e.kind() == std::io::ErrorKind::ConnectionRefused {
                ConnectionErrorKind::Refused
            } else if text.contains("certificate") || text.contains("UnknownIssuer") {
                ConnectionErrorKind::Ssl
            } else {
                ConnectionErrorKind::Connect
            };
            Error::Connection(ConnectionError {
                kind,
                message: text,
                source: Some(Box::new(e)),
            })
        }
        sqlx::Error::PoolTimedOut => Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::PoolExhausted,
            message: "timed out waiting for a pooled connection".to_string(),
            source: None,
        }),
        sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Disconnected,
                message: err.to_string(),
                source: None,
            })
        }
        sqlx::Error::Configuration(e) => Error::Config(ConfigError {
            field: None,
            message: e.to_string(),
        }),
        sqlx::Error::Protocol(message) => Error::Connection(ConnectionError {
            kind: ConnectionErrorKind::Connect,
            message,
            source: None,
        }),
        other => Error::Statement(StatementError {
            sql: None,
            code: None,
            sqlstate: None,
            message: other.to_string(),
        }),
    }
}
