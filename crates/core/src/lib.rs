//! Functional core for the axum DynamoDB extension.
//!
//! Pure data and pure functions only: table descriptors, extension settings
//! with their environment fallback and validation, session parameter
//! derivation, and planning for bulk table operations. All I/O lives in the
//! `axum_dynamo` crate.

pub mod config;
pub mod table;
