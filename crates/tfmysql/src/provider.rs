//! Dispatch from Terraform type names to reconcilers.

use std::fmt;
use std::str::FromStr;

use serde_json::Value as Json;
use tfmysql_client::{MySqlClient, ProviderConfig};
use tfmysql_core::{Connection, Error, Result};

use crate::resource_data::ResourceData;
use crate::schema::Schema;
use crate::{database, grant, role, tables, user, user_password};

/// Managed resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Database,
    User,
    UserPassword,
    Grant,
    Role,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Database,
        ResourceKind::User,
        ResourceKind::UserPassword,
        ResourceKind::Grant,
        ResourceKind::Role,
    ];

    pub const fn type_name(self) -> &'static str {
        match self {
            ResourceKind::Database => "mysql_database",
            ResourceKind::User => "mysql_user",
            ResourceKind::UserPassword => "mysql_user_password",
            ResourceKind::Grant => "mysql_grant",
            ResourceKind::Role => "mysql_role",
        }
    }

    pub fn schema(self) -> Schema {
        match self {
            ResourceKind::Database => database::schema(),
            ResourceKind::User => user::schema(),
            ResourceKind::UserPassword => user_password::schema(),
            ResourceKind::Grant => grant::schema(),
            ResourceKind::Role => role::schema(),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.type_name() == s)
            .ok_or_else(|| Error::unsupported(format!("unknown resource type '{s}'")))
    }
}

/// Read-only data source types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceKind {
    Tables,
}

impl DataSourceKind {
    pub const fn type_name(self) -> &'static str {
        match self {
            DataSourceKind::Tables => "mysql_tables",
        }
    }

    pub fn schema(self) -> Schema {
        match self {
            DataSourceKind::Tables => tables::schema(),
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for DataSourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mysql_tables" => Ok(DataSourceKind::Tables),
            _ => Err(Error::unsupported(format!("unknown data source type '{s}'"))),
        }
    }
}

/// The provider: one connection handle shared by every verb.
#[derive(Debug)]
pub struct Provider<C> {
    conn: C,
}

impl Provider<MySqlClient> {
    /// Resolve the provider block and connect, retrying while the server
    /// is unreachable.
    pub async fn connect(config: ProviderConfig) -> Result<Self> {
        let config = config.resolve()?;
        let client = tfmysql_client::connect(&config).await?;
        Ok(Self::new(client))
    }
}

impl<C: Connection> Provider<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn schema(&self, kind: ResourceKind) -> Schema {
        kind.schema()
    }

    pub async fn create(&self, kind: ResourceKind, d: &mut ResourceData) -> Result<()> {
        let conn = &self.conn;
        match kind {
            ResourceKind::Database => database::create(conn, d).await,
            ResourceKind::User => user::create(conn, d).await,
            ResourceKind::UserPassword => user_password::create(conn, d).await,
            ResourceKind::Grant => grant::create(conn, d).await,
            ResourceKind::Role => role::create(conn, d).await,
        }
    }

    pub async fn read(&self, kind: ResourceKind, d: &mut ResourceData) -> Result<()> {
        let conn = &self.conn;
        match kind {
            ResourceKind::Database => database::read(conn, d).await,
            ResourceKind::User => user::read(conn, d).await,
            ResourceKind::UserPassword => user_password::read(conn, d).await,
            ResourceKind::Grant => grant::read(conn, d).await,
            ResourceKind::Role => role::read(conn, d).await,
        }
    }

    /// In-place update. Grants, roles and generated passwords only change
    /// by replacement.
    pub async fn update(&self, kind: ResourceKind, d: &mut ResourceData) -> Result<()> {
        let conn = &self.conn;
        match kind {
            ResourceKind::Database => database::update(conn, d).await,
            ResourceKind::User => user::update(conn, d).await,
            ResourceKind::UserPassword | ResourceKind::Grant | ResourceKind::Role => Err(
                Error::unsupported(format!("{kind} does not support in-place update")),
            ),
        }
    }

    pub async fn delete(&self, kind: ResourceKind, d: &mut ResourceData) -> Result<()> {
        let conn = &self.conn;
        match kind {
            ResourceKind::Database => database::delete(conn, d).await,
            ResourceKind::User => user::delete(conn, d).await,
            ResourceKind::UserPassword => user_password::delete(conn, d).await,
            ResourceKind::Grant => grant::delete(conn, d).await,
            ResourceKind::Role => role::delete(conn, d).await,
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn import(&self, kind: ResourceKind, id: &str) -> Result<ResourceData> {
        match kind {
            ResourceKind::Database => database::import(&self.conn, id).await,
            ResourceKind::User => user::import(&self.conn, id).await,
            ResourceKind::UserPassword | ResourceKind::Grant | ResourceKind::Role => {
                Err(Error::unsupported(format!("{kind} does not support import")))
            }
        }
    }

    pub async fn read_data_source(&self, kind: DataSourceKind, config: Json) -> Result<ResourceData> {
        let mut d = ResourceData::from_config(&kind.schema(), config)?;
        match kind {
            DataSourceKind::Tables => tables::read(&self.conn, &mut d).await?,
        }
        Ok(d)
    }
}
