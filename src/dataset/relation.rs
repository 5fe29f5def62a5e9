//! Relation definitions for relset
//!
//! A relation is a named directed edge from a parent table's column to a
//! child table's column, asserting a one-to-many correspondence.

use super::dataset::TableId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A parent/child relation between two tables
///
/// Endpoints are stored as resolved handles and column positions; the names
/// are kept only for display and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Relation name (unique within the owning dataset)
    pub name: String,
    /// Parent table handle
    pub parent_table: TableId,
    /// Parent column position within the parent schema
    pub parent_column: usize,
    /// Child table handle
    pub child_table: TableId,
    /// Child column position within the child schema
    pub child_column: usize,
    /// Display name of the parent endpoint, e.g. "Customers.Id"
    pub parent_endpoint: String,
    /// Display name of the child endpoint, e.g. "Orders.CustomerId"
    pub child_endpoint: String,
}

impl Relation {
    /// Get the relation name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.name, self.parent_endpoint, self.child_endpoint
        )
    }
}
