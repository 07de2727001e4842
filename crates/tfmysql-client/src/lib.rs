//! Connection manager for tfmysql.
//!
//! Turns the provider block into a [`ConnectionConfig`], validates any custom
//! CA bundle up front, and opens a pooled sqlx connection, retrying with
//! backoff while the server is not yet reachable. The resulting
//! [`MySqlClient`] implements [`tfmysql_core::Connection`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tfmysql_client::{ProviderConfig, connect};
//!
//! let config = ProviderConfig {
//!     endpoint: Some("db.internal:3306".into()),
//!     username: Some("root".into()),
//!     ..Default::default()
//! }
//! .resolve()?;
//! let client = connect(&config).await?;
//! ```

pub mod client;
pub mod config;
pub mod retry;
pub mod tls;

pub use client::{MySqlClient, connect, connect_options};
pub use config::{ConnectionConfig, Endpoint, ProviderConfig, TlsMode};
pub use retry::RetryPolicy;
