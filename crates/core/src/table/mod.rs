mod error;
mod planning;
mod types;

pub use error::RegistryError;
pub use planning::{
    calculate_create_plan, calculate_destroy_plan, duplicate_names, find_descriptor,
    format_create_plan, table_names, CreatePlan,
};
pub use types::{
    AttributeDefinition, AttributeType, BillingMode, KeySchemaElement, KeyType, Projection,
    ProjectionType, ProvisionedThroughput, SecondaryIndex, TableDescriptor, TableStatus,
};
