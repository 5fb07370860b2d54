//! Table registry and table handles (Imperative Shell).
//!
//! The registry maps configured table names to handles bound to one
//! connection. Planning lives in `axum_dynamo_core::table::planning`; this
//! module only executes the plans against the [`TableService`].

use std::time::Duration;

use axum_dynamo_core::config::DEFAULT_WAIT_TIMEOUT_SECS;
use axum_dynamo_core::table::{
    calculate_create_plan, calculate_destroy_plan, duplicate_names, find_descriptor,
    format_create_plan, table_names, CreatePlan, RegistryError, TableDescriptor, TableStatus,
};

use crate::backend::{Item, TableService};
use crate::connection::Connection;
use crate::error::Result;

/// Handle to a single table on a connection.
///
/// Handles are plain values: building one never touches the network.
#[derive(Debug, Clone)]
pub struct Table {
    connection: Connection,
    name: String,
}

impl Table {
    pub fn new(connection: Connection, name: impl Into<String>) -> Self {
        Self {
            connection,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    fn service(&self) -> &dyn TableService {
        self.connection.service()
    }

    /// Writes `item`, replacing any item with the same key.
    pub async fn put_item(&self, item: Item) -> Result<()> {
        self.service().put_item(&self.name, item).await
    }

    /// Reads the item with the given key, if present.
    pub async fn get_item(&self, key: Item) -> Result<Option<Item>> {
        self.service().get_item(&self.name, key).await
    }

    pub async fn delete_item(&self, key: Item) -> Result<()> {
        self.service().delete_item(&self.name, key).await
    }

    /// Current status of the table as reported by the service.
    pub async fn describe(&self) -> Result<TableStatus> {
        self.service().describe_table(&self.name).await
    }
}

/// Configured tables bound to one connection.
#[derive(Debug, Clone)]
pub struct TableRegistry {
    connection: Connection,
    descriptors: Vec<TableDescriptor>,
    wait_timeout: Duration,
}

impl TableRegistry {
    /// Creates a registry for `descriptors` on `connection`.
    ///
    /// Duplicate names are kept as configured; lookups resolve to the first.
    pub fn new(connection: Connection, descriptors: Vec<TableDescriptor>) -> Self {
        let duplicates = duplicate_names(&descriptors);
        if !duplicates.is_empty() {
            tracing::warn!(
                tables = ?duplicates,
                "DynamoDB tables configured more than once; the first descriptor wins"
            );
        }

        Self {
            connection,
            descriptors,
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
        }
    }

    /// Sets the maximum time `create_all` and `destroy_all` wait per table.
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// Configured table names, in configuration order.
    pub fn keys(&self) -> Vec<&str> {
        table_names(&self.descriptors)
    }

    /// Returns a fresh handle for a configured table.
    pub fn lookup(&self, name: &str) -> std::result::Result<Table, RegistryError> {
        let descriptor = find_descriptor(&self.descriptors, name)?;
        Ok(self.connection.table(descriptor.table_name.as_str()))
    }

    /// The descriptor a lookup of `name` resolves to.
    pub fn descriptor(&self, name: &str) -> std::result::Result<&TableDescriptor, RegistryError> {
        find_descriptor(&self.descriptors, name)
    }

    /// Lazily yields `(name, handle)` for each configured table.
    pub fn items(&self) -> impl Iterator<Item = (&str, Table)> + '_ {
        self.descriptors.iter().map(|d| {
            let name = d.table_name.as_str();
            (name, self.connection.table(name))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.table_name == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptors(&self) -> &[TableDescriptor] {
        &self.descriptors
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Creates every configured table that does not exist yet.
    ///
    /// With `wait`, blocks until each created table is active, in order.
    /// Returns the names of the tables created by this call.
    pub async fn create_all(&self, wait: bool) -> Result<Vec<String>> {
        let service = self.connection.service();
        let existing = service.list_tables().await?;
        let plans = calculate_create_plan(&existing, &self.descriptors);

        let mut created = Vec::new();
        for plan in &plans {
            match plan {
                CreatePlan::CreateTable { descriptor } => {
                    service.create_table(descriptor).await?;
                    tracing::info!("{}", format_create_plan(plan));
                    created.push(descriptor.table_name.clone());
                }
                CreatePlan::AlreadyExists { .. } | CreatePlan::Duplicate { .. } => {
                    tracing::debug!("{}", format_create_plan(plan));
                }
            }
        }

        if wait {
            for name in &created {
                service.wait_until_exists(name, self.wait_timeout).await?;
                tracing::debug!(table = %name, "Table is active");
            }
        }

        Ok(created)
    }

    /// Deletes every configured table without checking that it exists.
    ///
    /// With `wait`, blocks until each table is gone, in order. Returns the
    /// names of the deleted tables.
    pub async fn destroy_all(&self, wait: bool) -> Result<Vec<String>> {
        let service = self.connection.service();
        let names = calculate_destroy_plan(&self.descriptors);

        for name in &names {
            service.delete_table(name).await?;
            tracing::info!("- Delete table: {}", name);
        }

        if wait {
            for name in &names {
                service.wait_until_not_exists(name, self.wait_timeout).await?;
                tracing::debug!(table = %name, "Table is gone");
            }
        }

        Ok(names)
    }
}
