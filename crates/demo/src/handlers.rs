//! HTTP handlers exposing the configured tables.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use axum_dynamo::{AttributeType, AttributeValue, Item, TableDescriptor, TableStatus, Tables};
use serde::Serialize;
use serde_json::Value;

use crate::convert::{item_from_json, item_to_json};
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub status: Option<TableStatus>,
}

/// List configured tables (GET /tables).
///
/// Tables that do not exist yet on the service are reported without a status.
/// Any other service error fails the request.
pub async fn list_tables(tables: Tables) -> Result<Json<Vec<TableSummary>>, ApiError> {
    let mut summaries = Vec::new();
    for (name, table) in tables.tables().items() {
        let status = match table.describe().await {
            Ok(status) => Some(status),
            Err(err) if err.is_resource_not_found() => None,
            Err(err) => return Err(err.into()),
        };
        summaries.push(TableSummary {
            name: name.to_string(),
            status,
        });
    }

    Ok(Json(summaries))
}

/// Describe one configured table (GET /tables/{name}).
pub async fn describe_table(
    tables: Tables,
    Path(name): Path<String>,
) -> Result<Json<TableSummary>, ApiError> {
    let status = tables.get(&name)?.describe().await?;

    Ok(Json(TableSummary {
        name,
        status: Some(status),
    }))
}

/// Write an item (POST /tables/{name}/items).
pub async fn put_item(
    tables: Tables,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let table = tables.get(&name)?;
    let item = item_from_json(body)?;
    table.put_item(item).await?;

    tracing::info!(table = %name, "Stored item");
    Ok(StatusCode::CREATED)
}

/// Read an item by partition key (GET /tables/{name}/items/{key}).
///
/// Tables with a sort key take its value from the `sort` query parameter.
pub async fn get_item(
    tables: Tables,
    Path((name, key)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let descriptor = tables.get_descriptor(&name)?;
    let key = primary_key(descriptor, key, query.get("sort").cloned())?;
    let table = tables.get(&name)?;
    let item = table.get_item(key).await?.ok_or(ApiError::ItemNotFound)?;

    Ok(Json(item_to_json(&item)))
}

/// Builds the primary key of `descriptor` from raw path and query values.
fn primary_key(
    descriptor: &TableDescriptor,
    partition: String,
    sort: Option<String>,
) -> Result<Item, ApiError> {
    let mut key = Item::new();

    if let Some(name) = descriptor.hash_key_name() {
        key.insert(name.to_string(), key_value(descriptor, name, partition)?);
    }

    if let Some(name) = descriptor.range_key_name() {
        let sort = sort.ok_or_else(|| {
            ApiError::BadRequest(format!("missing `sort` query parameter for {name}"))
        })?;
        key.insert(name.to_string(), key_value(descriptor, name, sort)?);
    }

    Ok(key)
}

fn key_value(
    descriptor: &TableDescriptor,
    attribute: &str,
    raw: String,
) -> Result<AttributeValue, ApiError> {
    let attribute_type = descriptor
        .attribute_definitions
        .iter()
        .find(|a| a.attribute_name == attribute)
        .map(|a| a.attribute_type);

    match attribute_type {
        Some(AttributeType::N) => match raw.parse::<f64>() {
            // DynamoDB numbers have no NaN or infinity.
            Ok(n) if n.is_finite() => Ok(AttributeValue::N(raw)),
            _ => Err(ApiError::BadRequest(format!(
                "{attribute} must be a finite number"
            ))),
        },
        Some(AttributeType::B) => Err(ApiError::BadRequest(format!(
            "binary key {attribute} is not supported"
        ))),
        Some(AttributeType::S) | None => Ok(AttributeValue::S(raw)),
    }
}
