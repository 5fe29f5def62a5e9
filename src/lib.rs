//! relset - A disconnected in-memory relational dataset
//!
//! This library provides the core components for a disconnected dataset:
//! - Schemas and scalar types
//! - Value and row representation
//! - Tables with bulk loading and primary-key enforcement
//! - Named parent/child relations with bidirectional navigation
//! - A bulk-load boundary and JSON snapshots

pub mod dataset;
pub mod error;
pub mod row;
pub mod schema;

pub use error::{Error, Result};
