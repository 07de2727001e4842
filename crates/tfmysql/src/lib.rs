//! Declarative management of MySQL and MariaDB databases, users, roles and
//! grants.
//!
//! `tfmysql` is the host-facing half of the provider. Each managed object
//! type has a reconciler with `create`/`read`/`update`/`delete` verbs over a
//! [`ResourceData`]; [`Provider`] dispatches on the Terraform type name and
//! owns the connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use tfmysql::{Provider, ProviderConfig, ResourceData, ResourceKind};
//!
//! let provider = Provider::connect(ProviderConfig {
//!     endpoint: Some("localhost:3306".into()),
//!     username: Some("root".into()),
//!     ..Default::default()
//! })
//! .await?;
//!
//! let kind: ResourceKind = "mysql_database".parse()?;
//! let mut d = ResourceData::from_config(&kind.schema(), json!({"name": "app"}))?;
//! provider.create(kind, &mut d).await?;
//! assert_eq!(d.id(), Some("app"));
//! ```
//!
//! Server-side absence is never an error on `read`: the identity is
//! cleared and the host drops the object from state.

pub mod crypto;
pub mod database;
pub mod grant;
pub mod key;
pub mod provider;
pub mod resource_data;
pub mod role;
pub mod schema;
pub mod tables;
pub mod user;
pub mod user_password;

pub use key::{GrantKey, UserKey};
pub use provider::{DataSourceKind, Provider, ResourceKind};
pub use resource_data::ResourceData;
pub use schema::{Attribute, AttributeType, Schema};

pub use tfmysql_client::{ConnectionConfig, MySqlClient, ProviderConfig};
pub use tfmysql_core::{Capabilities, Connection, Error, Feature, Result, ServerIdentity, Vendor};
