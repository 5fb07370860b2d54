//! Pure functions for planning bulk table operations (Functional Core).

use std::collections::HashSet;

use super::error::RegistryError;
use super::types::TableDescriptor;

/// What `create_all` will do for one configured descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatePlan {
    /// Table doesn't exist, needs to be created.
    CreateTable { descriptor: TableDescriptor },
    /// Table already exists on the service, left untouched.
    AlreadyExists { table_name: String },
    /// Name configured more than once; only the first descriptor is used.
    Duplicate { table_name: String },
}

/// Pure function: decide which configured tables need creating.
///
/// `existing` is the list of table names reported by the service. The result
/// has one entry per configured descriptor, in configuration order.
pub fn calculate_create_plan(existing: &[String], desired: &[TableDescriptor]) -> Vec<CreatePlan> {
    let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    desired
        .iter()
        .map(|descriptor| {
            let name = descriptor.table_name.as_str();
            if !seen.insert(name) {
                CreatePlan::Duplicate {
                    table_name: name.to_string(),
                }
            } else if existing.contains(name) {
                CreatePlan::AlreadyExists {
                    table_name: name.to_string(),
                }
            } else {
                CreatePlan::CreateTable {
                    descriptor: descriptor.clone(),
                }
            }
        })
        .collect()
}

/// Pure function: names `destroy_all` will delete, in configuration order,
/// each at most once.
pub fn calculate_destroy_plan(desired: &[TableDescriptor]) -> Vec<String> {
    let mut seen = HashSet::new();
    desired
        .iter()
        .filter(|d| seen.insert(d.table_name.as_str()))
        .map(|d| d.table_name.clone())
        .collect()
}

/// Pure function: format a create plan entry for display.
pub fn format_create_plan(plan: &CreatePlan) -> String {
    match plan {
        CreatePlan::CreateTable { descriptor } => {
            let mut line = format!("+ Create table: {}", descriptor.table_name);
            if let Some(pk) = descriptor.hash_key_name() {
                line.push_str(&format!(" (partition key: {pk}"));
                if let Some(sk) = descriptor.range_key_name() {
                    line.push_str(&format!(", sort key: {sk}"));
                }
                line.push(')');
            }
            line
        }
        CreatePlan::AlreadyExists { table_name } => {
            format!("= Table '{}' already exists", table_name)
        }
        CreatePlan::Duplicate { table_name } => {
            format!("! Table '{}' is configured more than once", table_name)
        }
    }
}

/// Names of the configured tables, in configuration order.
pub fn table_names(desired: &[TableDescriptor]) -> Vec<&str> {
    desired.iter().map(|d| d.table_name.as_str()).collect()
}

/// Finds the first descriptor configured under `name`.
pub fn find_descriptor<'a>(
    desired: &'a [TableDescriptor],
    name: &str,
) -> Result<&'a TableDescriptor, RegistryError> {
    desired
        .iter()
        .find(|d| d.table_name == name)
        .ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })
}

/// Names configured more than once, each reported once.
pub fn duplicate_names(desired: &[TableDescriptor]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    desired
        .iter()
        .map(|d| d.table_name.as_str())
        .filter(|name| !seen.insert(*name) && reported.insert(*name))
        .collect()
}
