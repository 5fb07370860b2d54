//! Table descriptor types (Functional Core - pure data).
//!
//! The serde representation mirrors the DynamoDB `CreateTable` request shape
//! (`TableName`, `KeySchema`, ...), so descriptors can be supplied as JSON
//! through configuration and are passed to the service unchanged.

use serde::{Deserialize, Serialize};

/// A host-declared table: name, keys, attribute types and capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableDescriptor {
    pub table_name: String,
    pub key_schema: Vec<KeySchemaElement>,
    #[serde(default)]
    pub attribute_definitions: Vec<AttributeDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ProvisionedThroughput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_mode: Option<BillingMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_indexes: Vec<SecondaryIndex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_secondary_indexes: Vec<SecondaryIndex>,
}

/// One element of a primary or index key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    pub attribute_name: String,
    pub key_type: KeyType,
}

/// Role of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    Hash,
    Range,
}

/// Type declaration for an attribute used in a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub attribute_type: AttributeType,
}

/// DynamoDB scalar attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    /// String
    S,
    /// Number
    N,
    /// Binary
    B,
}

/// Provisioned read/write capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedThroughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingMode {
    Provisioned,
    PayPerRequest,
}

/// A global or local secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecondaryIndex {
    pub index_name: String,
    pub key_schema: Vec<KeySchemaElement>,
    #[serde(default)]
    pub projection: Projection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ProvisionedThroughput>,
}

/// Attributes copied into an index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Projection {
    pub projection_type: ProjectionType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_key_attributes: Vec<String>,
}

/// Index projection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectionType {
    #[default]
    All,
    KeysOnly,
    Include,
}

/// Table status as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
    Unknown,
}

impl TableDescriptor {
    /// Creates a descriptor with no keys, attributes or capacity.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            key_schema: Vec::new(),
            attribute_definitions: Vec::new(),
            provisioned_throughput: None,
            billing_mode: None,
            global_secondary_indexes: Vec::new(),
            local_secondary_indexes: Vec::new(),
        }
    }

    /// Adds the partition key and its attribute definition.
    pub fn hash_key(self, name: &str, attribute_type: AttributeType) -> Self {
        self.key(name, KeyType::Hash, attribute_type)
    }

    /// Adds the sort key and its attribute definition.
    pub fn range_key(self, name: &str, attribute_type: AttributeType) -> Self {
        self.key(name, KeyType::Range, attribute_type)
    }

    fn key(mut self, name: &str, key_type: KeyType, attribute_type: AttributeType) -> Self {
        self.key_schema.push(KeySchemaElement {
            attribute_name: name.to_string(),
            key_type,
        });
        self.attribute(name, attribute_type)
    }

    /// Declares an attribute type, typically for an index key.
    ///
    /// Declaring the same attribute twice keeps the first declaration.
    pub fn attribute(mut self, name: &str, attribute_type: AttributeType) -> Self {
        if !self
            .attribute_definitions
            .iter()
            .any(|a| a.attribute_name == name)
        {
            self.attribute_definitions.push(AttributeDefinition {
                attribute_name: name.to_string(),
                attribute_type,
            });
        }
        self
    }

    /// Sets provisioned capacity (and provisioned billing).
    pub fn throughput(mut self, read_capacity_units: i64, write_capacity_units: i64) -> Self {
        self.provisioned_throughput = Some(ProvisionedThroughput {
            read_capacity_units,
            write_capacity_units,
        });
        self.billing_mode = Some(BillingMode::Provisioned);
        self
    }

    /// Adds a global secondary index.
    pub fn global_index(mut self, index: SecondaryIndex) -> Self {
        self.global_secondary_indexes.push(index);
        self
    }

    /// Adds a local secondary index.
    pub fn local_index(mut self, index: SecondaryIndex) -> Self {
        self.local_secondary_indexes.push(index);
        self
    }

    /// Billing mode sent to the service: explicit if set, otherwise
    /// provisioned when throughput is given and on-demand when it is not.
    pub fn effective_billing_mode(&self) -> BillingMode {
        match (self.billing_mode, &self.provisioned_throughput) {
            (Some(mode), _) => mode,
            (None, Some(_)) => BillingMode::Provisioned,
            (None, None) => BillingMode::PayPerRequest,
        }
    }

    /// Name of the partition key attribute.
    pub fn hash_key_name(&self) -> Option<&str> {
        self.key_name(KeyType::Hash)
    }

    /// Name of the sort key attribute.
    pub fn range_key_name(&self) -> Option<&str> {
        self.key_name(KeyType::Range)
    }

    fn key_name(&self, key_type: KeyType) -> Option<&str> {
        self.key_schema
            .iter()
            .find(|k| k.key_type == key_type)
            .map(|k| k.attribute_name.as_str())
    }
}

impl SecondaryIndex {
    /// Creates an index projecting all attributes.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            key_schema: Vec::new(),
            projection: Projection::default(),
            provisioned_throughput: None,
        }
    }

    /// Sets the index partition key.
    pub fn hash_key(mut self, name: &str) -> Self {
        self.key_schema.push(KeySchemaElement {
            attribute_name: name.to_string(),
            key_type: KeyType::Hash,
        });
        self
    }

    /// Sets the index sort key.
    pub fn range_key(mut self, name: &str) -> Self {
        self.key_schema.push(KeySchemaElement {
            attribute_name: name.to_string(),
            key_type: KeyType::Range,
        });
        self
    }

    /// Sets the projection.
    pub fn projection(mut self, projection_type: ProjectionType, non_key_attributes: &[&str]) -> Self {
        self.projection = Projection {
            projection_type,
            non_key_attributes: non_key_attributes.iter().map(|s| s.to_string()).collect(),
        };
        self
    }

    /// Sets provisioned capacity for the index.
    pub fn throughput(mut self, read_capacity_units: i64, write_capacity_units: i64) -> Self {
        self.provisioned_throughput = Some(ProvisionedThroughput {
            read_capacity_units,
            write_capacity_units,
        });
        self
    }
}
