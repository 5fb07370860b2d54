//! Axum extractors for the extension state.

use std::convert::Infallible;
use std::ops::Deref;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::error::Result;
use crate::extension::DynamoState;
use crate::registry::Table;

/// Extractor for the application's Dynamo state.
///
/// Works in any router whose state exposes `Arc<DynamoState>` through
/// [`FromRef`]. Never rejects.
#[derive(Debug, Clone)]
pub struct Tables(pub Arc<DynamoState>);

impl Tables {
    /// Returns a handle for a configured table, 404 on unknown names when
    /// returned from a handler.
    pub fn get(&self, name: &str) -> Result<Table> {
        self.0.get_table(name)
    }
}

impl Deref for Tables {
    type Target = DynamoState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Tables
where
    Arc<DynamoState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(Tables(Arc::<DynamoState>::from_ref(state)))
    }
}
