use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_table::DeleteTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use axum_dynamo_core::config::ConfigError;

use crate::backend::memory::MemoryBackendError;

/// Boxed collaborator error, kept intact so callers can downcast it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for the extension.
pub type Result<T> = std::result::Result<T, DynamoError>;

/// Errors surfaced by the extension.
#[derive(Debug, Error)]
pub enum DynamoError {
    /// The extension settings are inconsistent; raised when attaching.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The application never ran `Dynamo::init_app`.
    #[error("Dynamo is not registered on application '{app}'; call Dynamo::init_app first")]
    NotRegistered { app: String },

    /// No application was supplied to resolve the extension state from.
    #[error("no application in context")]
    NoApplication,

    /// Lookup of a table name that is not configured.
    #[error("No table named {0} found")]
    NoSuchTable(String),

    /// A descriptor that cannot be expressed as a service request.
    #[error("invalid descriptor for table '{table}': {reason}")]
    InvalidDescriptor { table: String, reason: String },

    /// Error returned by the DynamoDB client, passed through unmodified.
    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        #[source]
        source: BoxError,
    },
}

impl DynamoError {
    /// Wraps a collaborator error for `operation`.
    pub fn service(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Service {
            operation,
            source: source.into(),
        }
    }

    /// Returns the collaborator error, if this is one.
    pub fn service_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Service { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Returns true if the service reported that the table does not exist.
    ///
    /// Covers DescribeTable and DeleteTable on the AWS backend and every
    /// operation on the in-memory backend. The error itself is left as is.
    pub fn is_resource_not_found(&self) -> bool {
        let Some(source) = self.service_error() else {
            return false;
        };

        if let Some(err) = source.downcast_ref::<SdkError<DescribeTableError>>() {
            return err
                .as_service_error()
                .is_some_and(|e| e.is_resource_not_found_exception());
        }

        if let Some(err) = source.downcast_ref::<SdkError<DeleteTableError>>() {
            return err
                .as_service_error()
                .is_some_and(|e| e.is_resource_not_found_exception());
        }

        matches!(
            source.downcast_ref::<MemoryBackendError>(),
            Some(MemoryBackendError::ResourceNotFound(_))
        )
    }
}

impl IntoResponse for DynamoError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            DynamoError::NoSuchTable(_) => (StatusCode::NOT_FOUND, self.to_string()),
            _ => {
                tracing::error!(error = %self, "DynamoDB error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
