//! JSON <-> DynamoDB attribute conversion for the HTTP API.

use axum_dynamo::{AttributeValue, Item};
use serde_json::{Map, Number, Value};

use crate::error::ApiError;

/// Converts a JSON object into an item.
pub fn item_from_json(value: Value) -> Result<Item, ApiError> {
    match value {
        Value::Object(fields) => fields
            .into_iter()
            .map(|(name, value)| Ok((name, attribute_from_json(value)?)))
            .collect(),
        _ => Err(ApiError::BadRequest(
            "item must be a JSON object".to_string(),
        )),
    }
}

fn attribute_from_json(value: Value) -> Result<AttributeValue, ApiError> {
    Ok(match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => AttributeValue::L(
            values
                .into_iter()
                .map(attribute_from_json)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(fields) => AttributeValue::M(
            fields
                .into_iter()
                .map(|(name, value)| Ok((name, attribute_from_json(value)?)))
                .collect::<Result<_, ApiError>>()?,
        ),
    })
}

/// Converts an item into a JSON object.
pub fn item_to_json(item: &Item) -> Value {
    let mut fields: Vec<_> = item.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    Value::Object(
        fields
            .into_iter()
            .map(|(name, value)| (name.clone(), attribute_to_json(value)))
            .collect::<Map<_, _>>(),
    )
}

fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => n
            .parse::<Number>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(n.clone())),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(values.iter().map(attribute_to_json).collect()),
        AttributeValue::M(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), attribute_to_json(value)))
                .collect(),
        ),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| attribute_to_json(&AttributeValue::N(n.clone())))
                .collect(),
        ),
        // Binary values are not representable in JSON without an encoding.
        _ => Value::Null,
    }
}
