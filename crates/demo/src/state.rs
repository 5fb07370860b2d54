//! Shared state passed to every request handler.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_dynamo::DynamoState;

#[derive(Clone)]
pub struct AppState {
    pub dynamo: Arc<DynamoState>,
}

impl AppState {
    pub fn new(dynamo: Arc<DynamoState>) -> Self {
        Self { dynamo }
    }
}

// Lets handlers use the `Tables` extractor directly.
impl FromRef<AppState> for Arc<DynamoState> {
    fn from_ref(state: &AppState) -> Self {
        state.dynamo.clone()
    }
}
