//! DynamoDB integration for axum applications.
//!
//! This crate provides:
//! - Settings resolution and validation when the extension is attached
//! - One lazily-built, memoized connection per application
//! - A registry of configured tables with bulk create and destroy
//! - An axum extractor handing the per-application state to handlers
//!
//! Pure configuration and planning logic lives in `axum_dynamo_core`.

pub mod backend;
mod connection;
mod error;
mod extension;
mod extractors;
mod registry;
mod session;

pub use axum_dynamo_core::config::{ConfigError, SessionParams, Settings};
pub use axum_dynamo_core::table::{AttributeType, RegistryError, TableDescriptor, TableStatus};
pub use backend::{AttributeValue, Item, TableService};
pub use connection::{Connection, ConnectionFactory, ConnectionProvider};
pub use error::{BoxError, DynamoError, Result};
pub use extension::{AppConfig, Application, Dynamo, DynamoState, EXTENSION_KEY};
pub use extractors::Tables;
pub use registry::{Table, TableRegistry};
pub use session::Session;
