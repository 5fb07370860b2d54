use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_dynamo::DynamoError;
use thiserror::Error;

/// Errors returned by the demo handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Dynamo(#[from] DynamoError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Item not found")]
    ItemNotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Dynamo(err) => err.into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::ItemNotFound => (StatusCode::NOT_FOUND, "Item not found").into_response(),
        }
    }
}
