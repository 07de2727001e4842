//! TLS mode mapping and custom CA validation.

use sqlx::mysql::MySqlSslMode;
use tfmysql_core::{Error, Result};

use crate::config::TlsMode;

/// Driver SSL mode for a provider TLS mode.
pub fn ssl_mode(mode: &TlsMode) -> MySqlSslMode {
    match mode {
        TlsMode::Disabled => MySqlSslMode::Disabled,
        TlsMode::SkipVerify => MySqlSslMode::Required,
        TlsMode::Verify | TlsMode::Custom { .. } => MySqlSslMode::VerifyIdentity,
    }
}

/// Check that `pem` holds at least one certificate and return its bytes.
///
/// A bundle that does not parse is a configuration error; it is reported
/// before any connection attempt and never retried.
pub fn validate_ca_pem(pem: &str) -> Result<Vec<u8>> {
    let mut reader = pem.as_bytes();
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            Error::config(
                "ssl_ca",
                format!("Could not read a valid PEM certificate: {e}"),
            )
        })?;

    if certs.is_empty() {
        return Err(Error::config(
            "ssl_ca",
            "Could not read a valid PEM certificate",
        ));
    }

    tracing::debug!(certificates = certs.len(), "Loaded custom CA bundle");
    Ok(pem.as_bytes().to_vec())
}
