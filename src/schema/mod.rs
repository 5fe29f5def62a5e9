//! Schema module
//!
//! This module contains schema definitions and scalar types.

pub mod schema;
pub mod types;

pub use schema::{Column, Schema, SchemaBuilder};
pub use types::ScalarType;
