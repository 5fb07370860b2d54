//! In-memory collaborator for testing and local development.
//!
//! Tables live in a `BTreeMap` wrapped in `Arc<RwLock<_>>`. Tables become
//! active immediately, so waits return as soon as the table exists (or is
//! gone). Errors mimic the service's own: creating an existing table fails
//! with `ResourceInUse`, touching a missing one with `ResourceNotFound`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use thiserror::Error;
use tokio::sync::RwLock;

use axum_dynamo_core::config::SessionParams;
use axum_dynamo_core::table::{TableDescriptor, TableStatus};

use super::{Item, TableService};
use crate::connection::{Connection, ConnectionFactory};
use crate::error::{DynamoError, Result};
use crate::session::Session;

/// Errors raised by the in-memory backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryBackendError {
    #[error("Requested resource not found: Table: {0} not found")]
    ResourceNotFound(String),

    #[error("Table already exists: {0}")]
    ResourceInUse(String),

    #[error("One or more parameter values were invalid: {0}")]
    Validation(String),
}

#[derive(Debug, Clone)]
struct MemoryTable {
    descriptor: TableDescriptor,
    items: Vec<Item>,
}

impl MemoryTable {
    fn key_names(&self) -> Vec<&str> {
        self.descriptor
            .key_schema
            .iter()
            .map(|k| k.attribute_name.as_str())
            .collect()
    }

    /// Extracts the primary key of `item`, failing if any key attribute is missing.
    fn key_of(&self, item: &Item) -> std::result::Result<Item, MemoryBackendError> {
        self.key_names()
            .into_iter()
            .map(|name| {
                item.get(name)
                    .map(|value| (name.to_string(), value.clone()))
                    .ok_or_else(|| {
                        MemoryBackendError::Validation(format!(
                            "Missing the key {} in the item",
                            name
                        ))
                    })
            })
            .collect()
    }

    fn position(&self, key: &Item) -> Option<usize> {
        let names = self.key_names();
        self.items
            .iter()
            .position(|item| names.iter().all(|name| item.get(*name) == key.get(*name)))
    }
}

/// In-memory [`TableService`].
///
/// Clones share the same tables, like two clients pointed at one database.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<RwLock<BTreeMap<String, MemoryTable>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items stored in `table_name`, if the table exists.
    pub async fn item_count(&self, table_name: &str) -> Option<usize> {
        let tables = self.tables.read().await;
        tables.get(table_name).map(|t| t.items.len())
    }
}

fn not_found(operation: &'static str, table_name: &str) -> DynamoError {
    DynamoError::service(
        operation,
        MemoryBackendError::ResourceNotFound(table_name.to_string()),
    )
}

#[async_trait]
impl TableService for MemoryBackend {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables.keys().cloned().collect())
    }

    async fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        if descriptor.hash_key_name().is_none() {
            return Err(DynamoError::service(
                "CreateTable",
                MemoryBackendError::Validation(format!(
                    "Table {} has no HASH key",
                    descriptor.table_name
                )),
            ));
        }

        let mut tables = self.tables.write().await;
        if tables.contains_key(&descriptor.table_name) {
            return Err(DynamoError::service(
                "CreateTable",
                MemoryBackendError::ResourceInUse(descriptor.table_name.clone()),
            ));
        }

        tables.insert(
            descriptor.table_name.clone(),
            MemoryTable {
                descriptor: descriptor.clone(),
                items: Vec::new(),
            },
        );
        Ok(())
    }

    async fn delete_table(&self, table_name: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .remove(table_name)
            .map(|_| ())
            .ok_or_else(|| not_found("DeleteTable", table_name))
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableStatus> {
        let tables = self.tables.read().await;
        tables
            .get(table_name)
            .map(|_| TableStatus::Active)
            .ok_or_else(|| not_found("DescribeTable", table_name))
    }

    async fn wait_until_exists(&self, table_name: &str, _max_wait: Duration) -> Result<()> {
        let tables = self.tables.read().await;
        if tables.contains_key(table_name) {
            Ok(())
        } else {
            Err(not_found("WaitUntilTableExists", table_name))
        }
    }

    async fn wait_until_not_exists(&self, table_name: &str, _max_wait: Duration) -> Result<()> {
        let tables = self.tables.read().await;
        if tables.contains_key(table_name) {
            Err(DynamoError::service(
                "WaitUntilTableNotExists",
                MemoryBackendError::ResourceInUse(table_name.to_string()),
            ))
        } else {
            Ok(())
        }
    }

    async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| not_found("PutItem", table_name))?;

        let key = table
            .key_of(&item)
            .map_err(|e| DynamoError::service("PutItem", e))?;

        match table.position(&key) {
            Some(index) => table.items[index] = item,
            None => table.items.push(item),
        }
        Ok(())
    }

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let tables = self.tables.read().await;
        let table = tables
            .get(table_name)
            .ok_or_else(|| not_found("GetItem", table_name))?;

        let key = table
            .key_of(&key)
            .map_err(|e| DynamoError::service("GetItem", e))?;

        Ok(table.position(&key).map(|index| table.items[index].clone()))
    }

    async fn delete_item(&self, table_name: &str, key: Item) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| not_found("DeleteItem", table_name))?;

        let key = table
            .key_of(&key)
            .map_err(|e| DynamoError::service("DeleteItem", e))?;

        if let Some(index) = table.position(&key) {
            table.items.remove(index);
        }
        Ok(())
    }
}

/// [`ConnectionFactory`] handing out connections to a shared [`MemoryBackend`].
///
/// Every session and endpoint it is asked for is recorded, so callers can
/// check what a real connector would have received.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    backend: MemoryBackend,
    sessions: Arc<Mutex<Vec<SessionParams>>>,
    endpoints: Arc<Mutex<Vec<Option<String>>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector over an existing backend.
    pub fn with_backend(backend: MemoryBackend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }

    /// Parameters of every session built so far.
    pub fn sessions_built(&self) -> Vec<SessionParams> {
        self.sessions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Endpoint override of every connection built so far.
    pub fn endpoints(&self) -> Vec<Option<String>> {
        self.endpoints
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConnectionFactory for MemoryConnector {
    async fn build_session(&self, params: &SessionParams) -> Result<Session> {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.push(params.clone());
        }

        let config = SdkConfig::builder()
            .region(params.region.clone().map(aws_config::Region::new))
            .build();
        Ok(Session::new(config))
    }

    fn connect(&self, _session: &Session, endpoint_url: Option<&str>) -> Result<Connection> {
        if let Ok(mut endpoints) = self.endpoints.lock() {
            endpoints.push(endpoint_url.map(str::to_string));
        }

        Ok(Connection::new(self.backend.clone()))
    }
}
