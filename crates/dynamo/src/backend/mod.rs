//! The DynamoDB collaborator seam.
//!
//! [`TableService`] is the only surface the extension calls. [`aws`] backs it
//! with `aws-sdk-dynamodb`; [`memory`] keeps tables in process for tests and
//! local development.

pub mod aws;
pub mod memory;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use axum_dynamo_core::table::{TableDescriptor, TableStatus};

use crate::error::Result;

pub use aws_sdk_dynamodb::types::AttributeValue;

/// A DynamoDB item (or key): attribute name to value.
pub type Item = HashMap<String, AttributeValue>;

/// Operations the extension issues against DynamoDB.
///
/// Errors are returned as [`crate::DynamoError::Service`] carrying the
/// collaborator's own error; implementations never retry.
#[async_trait]
pub trait TableService: Send + Sync {
    /// Names of all tables visible to the connection.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Creates a table from its descriptor.
    async fn create_table(&self, descriptor: &TableDescriptor) -> Result<()>;

    /// Deletes a table by name.
    async fn delete_table(&self, table_name: &str) -> Result<()>;

    /// Current status of a table.
    async fn describe_table(&self, table_name: &str) -> Result<TableStatus>;

    /// Blocks until the table exists and is active, or `max_wait` elapses.
    async fn wait_until_exists(&self, table_name: &str, max_wait: Duration) -> Result<()>;

    /// Blocks until the table is gone, or `max_wait` elapses.
    async fn wait_until_not_exists(&self, table_name: &str, max_wait: Duration) -> Result<()>;

    /// Writes an item, replacing any item with the same key.
    async fn put_item(&self, table_name: &str, item: Item) -> Result<()>;

    /// Reads the item with the given key.
    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>>;

    /// Deletes the item with the given key.
    async fn delete_item(&self, table_name: &str, key: Item) -> Result<()>;
}
