//! Statement synthesis for MySQL and MariaDB account and schema objects.
//!
//! Every function here is pure: it takes typed inputs (plus the server's
//! [`Capabilities`](tfmysql_core::Capabilities) where syntax differs between
//! releases) and returns a [`Statement`]. Identifiers are backtick-quoted,
//! literals single-quoted, and values that MySQL allows to be bound are
//! bound as parameters instead of interpolated.

pub mod database;
pub mod grant;
pub mod principal;
pub mod role;
pub mod statement;
pub mod tables;
pub mod user;

pub use grant::{Grant, Grantable};
pub use principal::Principal;
pub use statement::Statement;
pub use user::{Authentication, NewUser};
