use thiserror::Error;

/// Errors raised by table registry lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("table not configured: {name}")]
    NotFound { name: String },
}
