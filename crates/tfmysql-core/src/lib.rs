//! Core types and traits for tfmysql.
//!
//! This crate provides the foundations shared by the statement synthesizer,
//! the connection manager and the resource reconcilers:
//!
//! - `Connection` trait: the only surface the reconcilers need from a server
//! - `Error` taxonomy with MySQL error-code predicates
//! - `Row` / `Value` for bound parameters and result rows
//! - `ServerIdentity` and the capability table derived from it
//! - Identifier quoting and `SHOW CREATE DATABASE` text extraction

pub mod connection;
pub mod error;
pub mod identifiers;
pub mod row;
pub mod value;
pub mod version;

pub use connection::Connection;
pub use error::{Error, Result};
pub use identifiers::{
    extract_ident_after, flatten_list, format_database_name, quote_ident_mysql, quote_literal,
};
pub use row::Row;
pub use value::Value;
pub use version::{Capabilities, Feature, ServerIdentity, ServerVersion, Vendor, detect};
