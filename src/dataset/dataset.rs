//! The disconnected dataset
//!
//! This module manages the tables and relations of a `DataSet` and answers
//! parent/child navigation queries.

use super::relation::Relation;
use super::table::Table;
use crate::error::{Error, Result};
use crate::row::{Row, Value};
use crate::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Handle to a table registered in a dataset
///
/// Handles are issued at registration time and index directly into the
/// owning dataset; only use a handle with the dataset that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId(pub(crate) usize);

/// Handle to a relation registered in a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationId(pub(crate) usize);

/// An in-memory, disconnected collection of tables and relations
///
/// A dataset is created empty, populated by bulk loads, optionally frozen,
/// and discarded as a unit. Navigation is mediated entirely through the
/// dataset's relation registry; tables never reference each other directly.
#[derive(Debug)]
pub struct DataSet {
    /// Tables, indexed by `TableId`
    tables: Vec<Table>,
    /// Table name to handle mapping, in registration order
    table_ids: IndexMap<String, TableId>,
    /// Relations, indexed by `RelationId`
    relations: Vec<Relation>,
    /// Relation name to handle mapping, in registration order
    relation_ids: IndexMap<String, RelationId>,
    /// Once frozen, all mutation is rejected
    frozen: bool,
}

impl DataSet {
    /// Create a new empty dataset
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            table_ids: IndexMap::new(),
            relations: Vec::new(),
            relation_ids: IndexMap::new(),
            frozen: false,
        }
    }

    // ========== Registration ==========

    /// Register a new empty table
    pub fn add_table(&mut self, name: &str, schema: Schema) -> Result<TableId> {
        self.check_mutable()?;

        if self.table_ids.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let id = TableId(self.tables.len());
        self.tables.push(Table::new(name, schema));
        self.table_ids.insert(name.to_string(), id);

        debug!(table = name, "registered table");
        Ok(id)
    }

    /// Register a navigable relation between two loaded tables
    ///
    /// Both endpoint tables and columns must already exist and the endpoint
    /// column types must be comparable for equality. The check is fail-fast
    /// and atomic: on error nothing is registered.
    pub fn add_relation(
        &mut self,
        name: &str,
        parent_table: &str,
        parent_column: &str,
        child_table: &str,
        child_column: &str,
    ) -> Result<RelationId> {
        self.check_mutable()?;

        if self.relation_ids.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let parent_id = self.resolve_table(parent_table)?;
        let child_id = self.resolve_table(child_table)?;

        let parent_col = self.resolve_column(parent_id, parent_column)?;
        let child_col = self.resolve_column(child_id, child_column)?;

        let parent_type = self.tables[parent_id.0].schema().columns()[parent_col].scalar_type;
        let child_type = self.tables[child_id.0].schema().columns()[child_col].scalar_type;
        if !parent_type.is_comparable_with(&child_type) {
            return Err(Error::TypeMismatch {
                left: format!("{}.{} ({})", parent_table, parent_column, parent_type),
                right: format!("{}.{} ({})", child_table, child_column, child_type),
            });
        }

        let id = RelationId(self.relations.len());
        self.relations.push(Relation {
            name: name.to_string(),
            parent_table: parent_id,
            parent_column: parent_col,
            child_table: child_id,
            child_column: child_col,
            parent_endpoint: format!("{}.{}", parent_table, parent_column),
            child_endpoint: format!("{}.{}", child_table, child_column),
        });
        self.relation_ids.insert(name.to_string(), id);

        debug!(relation = name, "registered relation");
        Ok(id)
    }

    // ========== Loading ==========

    /// Append rows to a table
    ///
    /// Validates the whole batch before committing any row; when the table
    /// declares a primary key, colliding key values fail the batch.
    pub fn load_rows(&mut self, table: TableId, rows: Vec<Row>) -> Result<()> {
        self.check_mutable()?;

        let count = rows.len();
        self.tables[table.0].append_rows(rows)?;

        debug!(table = self.tables[table.0].name(), rows = count, "loaded rows");
        Ok(())
    }

    /// Append rows given as (column name, value) pairs
    ///
    /// This is the shape bulk-load results arrive in from the data access
    /// layer; omitted columns load as NULL.
    pub fn load_named_rows(
        &mut self,
        table: TableId,
        rows: Vec<Vec<(String, Value)>>,
    ) -> Result<()> {
        let built: Vec<Row> = {
            let t = &self.tables[table.0];
            rows.into_iter()
                .map(|pairs| t.row_from_named(pairs))
                .collect::<Result<_>>()?
        };
        self.load_rows(table, built)
    }

    // ========== Lookup ==========

    /// Get a table handle by name
    pub fn get_table(&self, name: &str) -> Option<TableId> {
        self.table_ids.get(name).copied()
    }

    /// Get a table by handle
    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.0]
    }

    /// Get a relation handle by name
    pub fn get_relation(&self, name: &str) -> Option<RelationId> {
        self.relation_ids.get(name).copied()
    }

    /// Get a relation by handle
    pub fn relation(&self, id: RelationId) -> &Relation {
        &self.relations[id.0]
    }

    /// Table names in registration order
    pub fn table_names(&self) -> Vec<&str> {
        self.table_ids.keys().map(|s| s.as_str()).collect()
    }

    /// Relation names in registration order
    pub fn relation_names(&self) -> Vec<&str> {
        self.relation_ids.keys().map(|s| s.as_str()).collect()
    }

    /// Number of tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    // ========== Navigation ==========

    /// Iterate over the child rows of a parent row
    ///
    /// Lazy and restartable: each call re-evaluates against the current
    /// child table contents, in insertion order. No match is an empty
    /// iterator, never an error. A NULL key matches nothing.
    pub fn children(&self, relation: RelationId, parent_row: &Row) -> Children<'_> {
        let rel = &self.relations[relation.0];
        let key = parent_row
            .get(rel.parent_column)
            .cloned()
            .unwrap_or(Value::Null);
        Children {
            rows: self.tables[rel.child_table.0].rows().iter(),
            column: rel.child_column,
            key,
        }
    }

    /// Find the parent row of a child row
    ///
    /// Returns `None` when no parent matches; never an error. If several
    /// parent rows match (a data-integrity anomaly the model does not
    /// enforce away), the first by parent-table row order wins.
    pub fn parent(&self, relation: RelationId, child_row: &Row) -> Option<&Row> {
        let rel = &self.relations[relation.0];
        let key = child_row.get(rel.child_column)?;
        if key.is_null() {
            return None;
        }
        self.tables[rel.parent_table.0]
            .rows()
            .iter()
            .find(|row| {
                row.get(rel.parent_column)
                    .map(|v| v.matches(key))
                    .unwrap_or(false)
            })
    }

    // ========== Lifecycle ==========

    /// Freeze the dataset
    ///
    /// After freezing, all mutation fails with `FrozenDataSet`; a frozen
    /// dataset is safe to share for concurrent reads.
    pub fn freeze(&mut self) {
        self.frozen = true;
        debug!("dataset frozen");
    }

    /// Check if the dataset is frozen
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    // ========== Reports ==========

    /// Get dataset contents as a formatted string
    pub fn describe(&self) -> String {
        let mut info = String::new();

        for table in &self.tables {
            info.push_str(&format!(
                "Table: {} ({} rows)\n",
                table.name(),
                table.row_count()
            ));
            for col in table.schema().columns() {
                let mut flags = Vec::new();
                if col.primary_key {
                    flags.push("PRIMARY KEY");
                }
                if !col.nullable {
                    flags.push("NOT NULL");
                }

                let flags_str = if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                };

                info.push_str(&format!("  {} {}{}\n", col.name, col.scalar_type, flags_str));
            }
        }

        if !self.relations.is_empty() {
            info.push_str("Relations:\n");
            for rel in &self.relations {
                info.push_str(&format!("  {}\n", rel));
            }
        }

        info
    }

    // ========== Snapshots ==========

    /// Save the dataset to disk as a JSON snapshot
    pub fn save_to_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = DataSetData {
            tables: self.tables.clone(),
            relations: self.relations.clone(),
            frozen: self.frozen,
        };

        let json = serde_json::to_string_pretty(&data)
            .map_err(|e| Error::SnapshotError(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a dataset from a JSON snapshot
    ///
    /// The frozen flag is restored as saved.
    pub fn load_from_disk(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let data: DataSetData =
            serde_json::from_str(&json).map_err(|e| Error::SnapshotError(e.to_string()))?;

        let mut table_ids = IndexMap::new();
        for (idx, table) in data.tables.iter().enumerate() {
            table_ids.insert(table.name().to_string(), TableId(idx));
        }

        let mut relation_ids = IndexMap::new();
        for (idx, relation) in data.relations.iter().enumerate() {
            relation_ids.insert(relation.name.clone(), RelationId(idx));
        }

        Ok(Self {
            tables: data.tables,
            table_ids,
            relations: data.relations,
            relation_ids,
            frozen: data.frozen,
        })
    }

    // ========== Internal ==========

    fn check_mutable(&self) -> Result<()> {
        if self.frozen {
            return Err(Error::FrozenDataSet);
        }
        Ok(())
    }

    fn resolve_table(&self, name: &str) -> Result<TableId> {
        self.get_table(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    fn resolve_column(&self, table: TableId, column: &str) -> Result<usize> {
        self.tables[table.0]
            .schema()
            .get_column_index(column)
            .ok_or_else(|| {
                Error::UnknownColumn(column.to_string(), self.tables[table.0].name().to_string())
            })
    }
}

impl Default for DataSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable proxy for DataSet
#[derive(Serialize, Deserialize)]
struct DataSetData {
    tables: Vec<Table>,
    relations: Vec<Relation>,
    frozen: bool,
}

/// Lazy iterator over the child rows of a parent row
///
/// Produced by [`DataSet::children`]; yields rows of the child table whose
/// key column matches, in insertion order.
#[derive(Debug)]
pub struct Children<'a> {
    rows: std::slice::Iter<'a, Row>,
    column: usize,
    key: Value,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Row;

    fn next(&mut self) -> Option<Self::Item> {
        for row in self.rows.by_ref() {
            let matched = row
                .get(self.column)
                .map(|v| v.matches(&self.key))
                .unwrap_or(false);
            if matched {
                return Some(row);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ScalarType, SchemaBuilder};

    fn customer_schema() -> Schema {
        SchemaBuilder::new()
            .primary_key("Id")
            .column_not_null("Name", ScalarType::Text)
            .build()
    }

    fn order_schema() -> Schema {
        SchemaBuilder::new()
            .primary_key("Id")
            .column("CustomerId", ScalarType::Integer)
            .column("Amount", ScalarType::Decimal)
            .build()
    }

    fn sample_dataset() -> DataSet {
        let mut ds = DataSet::new();

        let customers = ds.add_table("Customers", customer_schema()).unwrap();
        ds.load_rows(
            customers,
            vec![
                Row::new(vec![1i64.into(), "Alice".into()]),
                Row::new(vec![2i64.into(), "Bob".into()]),
            ],
        )
        .unwrap();

        let orders = ds.add_table("Orders", order_schema()).unwrap();
        ds.load_rows(
            orders,
            vec![
                Row::new(vec![10i64.into(), 1i64.into(), 50.0.into()]),
                Row::new(vec![11i64.into(), 1i64.into(), 25.0.into()]),
                Row::new(vec![12i64.into(), 2i64.into(), 75.0.into()]),
            ],
        )
        .unwrap();

        ds.add_relation("CustOrders", "Customers", "Id", "Orders", "CustomerId")
            .unwrap();
        ds
    }

    #[test]
    fn test_add_table_duplicate_name() {
        let mut ds = DataSet::new();
        ds.add_table("Customers", customer_schema()).unwrap();

        let result = ds.add_table("Customers", customer_schema());
        assert!(matches!(result, Err(Error::DuplicateName(_))));
    }

    #[test]
    fn test_children_navigation() {
        let ds = sample_dataset();
        let rel = ds.get_relation("CustOrders").unwrap();
        let customers = ds.get_table("Customers").unwrap();

        let alice = ds.table(customers).get(0).unwrap();
        let orders: Vec<_> = ds.children(rel, alice).collect();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].get(0), Some(&Value::Integer(10)));
        assert_eq!(orders[1].get(0), Some(&Value::Integer(11)));
    }

    #[test]
    fn test_children_restartable() {
        let ds = sample_dataset();
        let rel = ds.get_relation("CustOrders").unwrap();
        let customers = ds.get_table("Customers").unwrap();
        let alice = ds.table(customers).get(0).unwrap();

        assert_eq!(ds.children(rel, alice).count(), 2);
        assert_eq!(ds.children(rel, alice).count(), 2);
    }

    #[test]
    fn test_children_no_match_is_empty() {
        let ds = sample_dataset();
        let rel = ds.get_relation("CustOrders").unwrap();

        // A parent row whose key matches no order.
        let ghost = Row::new(vec![99i64.into(), "Ghost".into()]);
        assert_eq!(ds.children(rel, &ghost).count(), 0);
    }

    #[test]
    fn test_parent_navigation() {
        let ds = sample_dataset();
        let rel = ds.get_relation("CustOrders").unwrap();
        let orders = ds.get_table("Orders").unwrap();

        let order_12 = ds.table(orders).get(2).unwrap();
        let parent = ds.parent(rel, order_12).unwrap();
        assert_eq!(parent.get(1), Some(&Value::Text("Bob".to_string())));
    }

    #[test]
    fn test_parent_absent_is_none() {
        let ds = sample_dataset();
        let rel = ds.get_relation("CustOrders").unwrap();

        let orphan = Row::new(vec![13i64.into(), 99i64.into(), 10.0.into()]);
        assert!(ds.parent(rel, &orphan).is_none());
    }

    #[test]
    fn test_null_foreign_key_has_no_parent() {
        let ds = sample_dataset();
        let rel = ds.get_relation("CustOrders").unwrap();

        let no_fk = Row::new(vec![14i64.into(), Value::Null, 10.0.into()]);
        assert!(ds.parent(rel, &no_fk).is_none());
    }

    #[test]
    fn test_null_parent_key_has_no_children() {
        // No primary key, so the parent key column may hold NULL.
        let mut ds = DataSet::new();
        let parents = ds
            .add_table(
                "Parents",
                SchemaBuilder::new()
                    .column("Key", ScalarType::Integer)
                    .column("Label", ScalarType::Text)
                    .build(),
            )
            .unwrap();
        ds.load_rows(
            parents,
            vec![Row::new(vec![Value::Null, "unkeyed".into()])],
        )
        .unwrap();

        let children = ds
            .add_table(
                "Children",
                SchemaBuilder::new()
                    .column("ParentKey", ScalarType::Integer)
                    .build(),
            )
            .unwrap();
        ds.load_rows(
            children,
            vec![
                Row::new(vec![1i64.into()]),
                Row::new(vec![Value::Null]),
            ],
        )
        .unwrap();

        let rel = ds
            .add_relation("NullKey", "Parents", "Key", "Children", "ParentKey")
            .unwrap();

        // A NULL key matches nothing, not even a NULL child value.
        let unkeyed = ds.table(parents).get(0).unwrap();
        assert_eq!(ds.children(rel, unkeyed).count(), 0);
    }

    #[test]
    fn test_multiple_matching_parents_first_wins() {
        // No primary key on the parent, so duplicate key values can load.
        let mut ds = DataSet::new();
        let parents = ds
            .add_table(
                "Parents",
                SchemaBuilder::new()
                    .column("Key", ScalarType::Integer)
                    .column("Label", ScalarType::Text)
                    .build(),
            )
            .unwrap();
        ds.load_rows(
            parents,
            vec![
                Row::new(vec![1i64.into(), "first".into()]),
                Row::new(vec![1i64.into(), "second".into()]),
            ],
        )
        .unwrap();

        let children = ds
            .add_table(
                "Children",
                SchemaBuilder::new()
                    .column("ParentKey", ScalarType::Integer)
                    .build(),
            )
            .unwrap();
        ds.load_rows(children, vec![Row::new(vec![1i64.into()])])
            .unwrap();

        let rel = ds
            .add_relation("Anomaly", "Parents", "Key", "Children", "ParentKey")
            .unwrap();

        let child = ds.table(children).get(0).unwrap();
        let parent = ds.parent(rel, child).unwrap();
        assert_eq!(parent.get(1), Some(&Value::Text("first".to_string())));
    }

    #[test]
    fn test_add_relation_unknown_table_is_atomic() {
        let mut ds = sample_dataset();
        let before_tables = ds.table_count();

        let result = ds.add_relation("Bad", "Nope", "Id", "Orders", "CustomerId");
        assert!(matches!(result, Err(Error::UnknownTable(_))));
        assert_eq!(ds.table_count(), before_tables);
        assert_eq!(ds.relation_names(), vec!["CustOrders"]);
    }

    #[test]
    fn test_add_relation_unknown_column() {
        let mut ds = sample_dataset();
        let result = ds.add_relation("Bad", "Customers", "Nope", "Orders", "CustomerId");
        assert!(matches!(result, Err(Error::UnknownColumn(_, _))));
    }

    #[test]
    fn test_add_relation_type_mismatch() {
        let mut ds = sample_dataset();
        let result = ds.add_relation("Bad", "Customers", "Name", "Orders", "CustomerId");
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_add_relation_duplicate_name() {
        let mut ds = sample_dataset();
        let result = ds.add_relation("CustOrders", "Customers", "Id", "Orders", "CustomerId");
        assert!(matches!(result, Err(Error::DuplicateName(_))));
    }

    #[test]
    fn test_numeric_endpoints_are_compatible() {
        let mut ds = sample_dataset();
        // INTEGER parent key against DECIMAL child column.
        ds.add_relation("ByAmount", "Customers", "Id", "Orders", "Amount")
            .unwrap();
    }

    #[test]
    fn test_frozen_rejects_mutation() {
        let mut ds = sample_dataset();
        ds.freeze();
        assert!(ds.is_frozen());

        let orders = ds.get_table("Orders").unwrap();
        let result = ds.load_rows(orders, vec![Row::new(vec![])]);
        assert!(matches!(result, Err(Error::FrozenDataSet)));

        let result = ds.add_table("More", customer_schema());
        assert!(matches!(result, Err(Error::FrozenDataSet)));

        let result = ds.add_relation("More", "Customers", "Id", "Orders", "CustomerId");
        assert!(matches!(result, Err(Error::FrozenDataSet)));
    }

    #[test]
    fn test_frozen_still_navigates() {
        let mut ds = sample_dataset();
        ds.freeze();

        let rel = ds.get_relation("CustOrders").unwrap();
        let customers = ds.get_table("Customers").unwrap();
        let alice = ds.table(customers).get(0).unwrap();
        assert_eq!(ds.children(rel, alice).count(), 2);
    }

    #[test]
    fn test_get_relation_absent() {
        let ds = sample_dataset();
        assert!(ds.get_relation("Nope").is_none());
    }

    #[test]
    fn test_load_named_rows() {
        let mut ds = DataSet::new();
        let customers = ds.add_table("Customers", customer_schema()).unwrap();

        ds.load_named_rows(
            customers,
            vec![vec![
                ("Name".to_string(), "Alice".into()),
                ("Id".to_string(), 1i64.into()),
            ]],
        )
        .unwrap();

        let table = ds.table(customers);
        assert_eq!(table.get(0).unwrap().get(0), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_describe() {
        let ds = sample_dataset();
        let info = ds.describe();
        assert!(info.contains("Table: Customers (2 rows)"));
        assert!(info.contains("Id INTEGER [PRIMARY KEY, NOT NULL]"));
        assert!(info.contains("CustOrders: Customers.Id -> Orders.CustomerId"));
    }
}
