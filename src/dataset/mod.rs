//! Dataset module
//!
//! This module contains the dataset components:
//! - Table storage
//! - Relation registry and navigation
//! - Bulk-load boundary

pub mod dataset;
pub mod loader;
pub mod relation;
pub mod table;

pub use dataset::{Children, DataSet, RelationId, TableId};
pub use loader::{DataSetLoader, RelationDecl, TableBatch};
pub use relation::Relation;
pub use table::Table;
