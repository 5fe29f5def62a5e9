//! Bulk-load boundary for relset
//!
//! This module models the contract with the data access layer that produces
//! bulk-load results: per-table batches of named rows, followed by relation
//! declarations once the endpoint tables are loaded. The access layer itself
//! (connections, commands, cursors) is out of scope.

use super::dataset::DataSet;
use crate::error::Result;
use crate::row::Value;
use crate::schema::Schema;
use tracing::{debug, info};

/// A bulk-load result for one table
///
/// Rows arrive as (column name, value) pairs; omitted columns load as NULL.
#[derive(Debug)]
pub struct TableBatch {
    /// Table name
    pub name: String,
    /// Table schema
    pub schema: Schema,
    /// Rows in load order
    pub rows: Vec<Vec<(String, Value)>>,
}

impl TableBatch {
    /// Create a new empty batch
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    /// Add a row of (column name, value) pairs
    pub fn row<I, S, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        self.rows.push(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        );
        self
    }
}

/// A relation declaration, asserted after both endpoint tables are loaded
#[derive(Debug)]
pub struct RelationDecl {
    /// Relation name
    pub name: String,
    /// Parent table name
    pub parent_table: String,
    /// Parent column name
    pub parent_column: String,
    /// Child table name
    pub child_table: String,
    /// Child column name
    pub child_column: String,
}

impl RelationDecl {
    /// Create a new relation declaration
    pub fn new(
        name: impl Into<String>,
        parent_table: impl Into<String>,
        parent_column: impl Into<String>,
        child_table: impl Into<String>,
        child_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parent_table: parent_table.into(),
            parent_column: parent_column.into(),
            child_table: child_table.into(),
            child_column: child_column.into(),
        }
    }
}

/// Assembles a dataset from bulk-load results with a fluent API
///
/// Tables load in the order they were supplied, then relations are declared,
/// then the dataset is frozen. Any failure drops the partial dataset:
/// assembly fully succeeds or yields nothing.
pub struct DataSetLoader {
    batches: Vec<TableBatch>,
    relations: Vec<RelationDecl>,
}

impl DataSetLoader {
    /// Start a new load sequence
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Add a table batch
    pub fn table(mut self, batch: TableBatch) -> Self {
        self.batches.push(batch);
        self
    }

    /// Add a relation declaration
    pub fn relation(mut self, decl: RelationDecl) -> Self {
        self.relations.push(decl);
        self
    }

    /// Build, populate, and freeze the dataset
    pub fn load(self) -> Result<DataSet> {
        let mut ds = DataSet::new();

        for batch in self.batches {
            let row_count = batch.rows.len();
            let id = ds.add_table(&batch.name, batch.schema)?;
            ds.load_named_rows(id, batch.rows)?;
            info!(table = batch.name.as_str(), rows = row_count, "table loaded");
        }

        for decl in self.relations {
            ds.add_relation(
                &decl.name,
                &decl.parent_table,
                &decl.parent_column,
                &decl.child_table,
                &decl.child_column,
            )?;
            debug!(relation = decl.name.as_str(), "relation declared");
        }

        ds.freeze();
        Ok(ds)
    }
}

impl Default for DataSetLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::{ScalarType, SchemaBuilder};

    #[test]
    fn test_loader_builds_frozen_dataset() {
        let ds = DataSetLoader::new()
            .table(
                TableBatch::new(
                    "Customers",
                    SchemaBuilder::new()
                        .primary_key("Id")
                        .column_not_null("Name", ScalarType::Text)
                        .build(),
                )
                .row([("Id", Value::from(1i64)), ("Name", Value::from("Alice"))]),
            )
            .table(
                TableBatch::new(
                    "Orders",
                    SchemaBuilder::new()
                        .primary_key("Id")
                        .column("CustomerId", ScalarType::Integer)
                        .build(),
                )
                .row([("Id", Value::from(10i64)), ("CustomerId", Value::from(1i64))]),
            )
            .relation(RelationDecl::new(
                "CustOrders",
                "Customers",
                "Id",
                "Orders",
                "CustomerId",
            ))
            .load()
            .unwrap();

        assert!(ds.is_frozen());
        assert_eq!(ds.table_names(), vec!["Customers", "Orders"]);
        assert!(ds.get_relation("CustOrders").is_some());
    }

    #[test]
    fn test_loader_fails_on_bad_relation() {
        let result = DataSetLoader::new()
            .table(TableBatch::new(
                "Customers",
                SchemaBuilder::new().primary_key("Id").build(),
            ))
            .relation(RelationDecl::new(
                "Bad",
                "Customers",
                "Id",
                "Orders", // never loaded
                "CustomerId",
            ))
            .load();

        assert!(matches!(result, Err(Error::UnknownTable(_))));
    }
}
