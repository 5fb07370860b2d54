//! AWS SDK backed collaborator (Imperative Shell).

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::client::Waiters;
use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::error::BuildError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType,
    LocalSecondaryIndex, Projection, ProjectionType, ProvisionedThroughput, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;

use axum_dynamo_core::config::SessionParams;
use axum_dynamo_core::table::{self as desc, TableDescriptor, TableStatus};

use super::{Item, TableService};
use crate::connection::{Connection, ConnectionFactory};
use crate::error::{DynamoError, Result};
use crate::session::Session;

/// Provider name reported for credentials taken from the extension settings.
const CREDENTIALS_PROVIDER: &str = "axum_dynamo";

/// Builds sessions with `aws-config` and connections with `aws-sdk-dynamodb`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsConnector;

#[async_trait]
impl ConnectionFactory for AwsConnector {
    async fn build_session(&self, params: &SessionParams) -> Result<Session> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &params.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some((access_key_id, secret_access_key)) = params.static_credentials() {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                params.session_token.clone(),
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        Ok(Session::new(loader.load().await))
    }

    fn connect(&self, session: &Session, endpoint_url: Option<&str>) -> Result<Connection> {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(session.sdk_config());

        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());
        Ok(Connection::new(AwsTableService::new(client)))
    }
}

/// [`TableService`] over an `aws_sdk_dynamodb::Client`.
#[derive(Debug, Clone)]
pub struct AwsTableService {
    client: Client,
}

impl AwsTableService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The underlying SDK client, for operations the extension doesn't wrap.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl TableService for AwsTableService {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut pages = self.client.list_tables().into_paginator().send();
        let mut names = Vec::new();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| DynamoError::service("ListTables", e))?;
            names.extend(page.table_names().iter().cloned());
        }

        Ok(names)
    }

    async fn create_table(&self, descriptor: &TableDescriptor) -> Result<()> {
        let table = descriptor.table_name.as_str();

        let global_indexes = descriptor
            .global_secondary_indexes
            .iter()
            .map(|index| to_global_index(table, index))
            .collect::<Result<Vec<_>>>()?;

        let local_indexes = descriptor
            .local_secondary_indexes
            .iter()
            .map(|index| to_local_index(table, index))
            .collect::<Result<Vec<_>>>()?;

        self.client
            .create_table()
            .table_name(table)
            .set_key_schema(Some(to_key_schema(table, &descriptor.key_schema)?))
            .set_attribute_definitions(Some(to_attribute_definitions(
                table,
                &descriptor.attribute_definitions,
            )?))
            .billing_mode(to_billing_mode(descriptor.effective_billing_mode()))
            .set_provisioned_throughput(
                descriptor
                    .provisioned_throughput
                    .as_ref()
                    .map(|t| to_throughput(table, t))
                    .transpose()?,
            )
            .set_global_secondary_indexes(non_empty(global_indexes))
            .set_local_secondary_indexes(non_empty(local_indexes))
            .send()
            .await
            .map_err(|e| DynamoError::service("CreateTable", e))?;

        Ok(())
    }

    async fn delete_table(&self, table_name: &str) -> Result<()> {
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| DynamoError::service("DeleteTable", e))?;
        Ok(())
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableStatus> {
        let response = self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| DynamoError::service("DescribeTable", e))?;

        let status = match response.table().and_then(|t| t.table_status()) {
            Some(aws_sdk_dynamodb::types::TableStatus::Active) => TableStatus::Active,
            Some(aws_sdk_dynamodb::types::TableStatus::Creating) => TableStatus::Creating,
            Some(aws_sdk_dynamodb::types::TableStatus::Updating) => TableStatus::Updating,
            Some(aws_sdk_dynamodb::types::TableStatus::Deleting) => TableStatus::Deleting,
            _ => TableStatus::Unknown,
        };

        Ok(status)
    }

    async fn wait_until_exists(&self, table_name: &str, max_wait: Duration) -> Result<()> {
        self.client
            .wait_until_table_exists()
            .table_name(table_name)
            .wait(max_wait)
            .await
            .map_err(|e| DynamoError::service("WaitUntilTableExists", e))?;
        Ok(())
    }

    async fn wait_until_not_exists(&self, table_name: &str, max_wait: Duration) -> Result<()> {
        self.client
            .wait_until_table_not_exists()
            .table_name(table_name)
            .wait(max_wait)
            .await
            .map_err(|e| DynamoError::service("WaitUntilTableNotExists", e))?;
        Ok(())
    }

    async fn put_item(&self, table_name: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| DynamoError::service("PutItem", e))?;
        Ok(())
    }

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| DynamoError::service("GetItem", e))?;

        Ok(result.item)
    }

    async fn delete_item(&self, table_name: &str, key: Item) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| DynamoError::service("DeleteItem", e))?;
        Ok(())
    }
}

// ============================================================================
// Descriptor to SDK request conversions
// ============================================================================

fn invalid(table: &str) -> impl Fn(BuildError) -> DynamoError + '_ {
    move |e| DynamoError::InvalidDescriptor {
        table: table.to_string(),
        reason: e.to_string(),
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn to_key_schema(table: &str, elements: &[desc::KeySchemaElement]) -> Result<Vec<KeySchemaElement>> {
    elements
        .iter()
        .map(|element| {
            KeySchemaElement::builder()
                .attribute_name(&element.attribute_name)
                .key_type(match element.key_type {
                    desc::KeyType::Hash => KeyType::Hash,
                    desc::KeyType::Range => KeyType::Range,
                })
                .build()
                .map_err(invalid(table))
        })
        .collect()
}

fn to_attribute_definitions(
    table: &str,
    definitions: &[desc::AttributeDefinition],
) -> Result<Vec<AttributeDefinition>> {
    definitions
        .iter()
        .map(|definition| {
            AttributeDefinition::builder()
                .attribute_name(&definition.attribute_name)
                .attribute_type(to_scalar_type(definition.attribute_type))
                .build()
                .map_err(invalid(table))
        })
        .collect()
}

fn to_scalar_type(attribute_type: desc::AttributeType) -> ScalarAttributeType {
    match attribute_type {
        desc::AttributeType::S => ScalarAttributeType::S,
        desc::AttributeType::N => ScalarAttributeType::N,
        desc::AttributeType::B => ScalarAttributeType::B,
    }
}

fn to_billing_mode(mode: desc::BillingMode) -> BillingMode {
    match mode {
        desc::BillingMode::Provisioned => BillingMode::Provisioned,
        desc::BillingMode::PayPerRequest => BillingMode::PayPerRequest,
    }
}

fn to_throughput(
    table: &str,
    throughput: &desc::ProvisionedThroughput,
) -> Result<ProvisionedThroughput> {
    ProvisionedThroughput::builder()
        .read_capacity_units(throughput.read_capacity_units)
        .write_capacity_units(throughput.write_capacity_units)
        .build()
        .map_err(invalid(table))
}

fn to_projection(projection: &desc::Projection) -> Projection {
    Projection::builder()
        .projection_type(match projection.projection_type {
            desc::ProjectionType::All => ProjectionType::All,
            desc::ProjectionType::KeysOnly => ProjectionType::KeysOnly,
            desc::ProjectionType::Include => ProjectionType::Include,
        })
        .set_non_key_attributes(non_empty(projection.non_key_attributes.clone()))
        .build()
}

fn to_global_index(table: &str, index: &desc::SecondaryIndex) -> Result<GlobalSecondaryIndex> {
    GlobalSecondaryIndex::builder()
        .index_name(&index.index_name)
        .set_key_schema(Some(to_key_schema(table, &index.key_schema)?))
        .projection(to_projection(&index.projection))
        .set_provisioned_throughput(
            index
                .provisioned_throughput
                .as_ref()
                .map(|t| to_throughput(table, t))
                .transpose()?,
        )
        .build()
        .map_err(invalid(table))
}

fn to_local_index(table: &str, index: &desc::SecondaryIndex) -> Result<LocalSecondaryIndex> {
    LocalSecondaryIndex::builder()
        .index_name(&index.index_name)
        .set_key_schema(Some(to_key_schema(table, &index.key_schema)?))
        .projection(to_projection(&index.projection))
        .build()
        .map_err(invalid(table))
}
