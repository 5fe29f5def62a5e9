//! Table storage for relset
//!
//! A table pairs a schema with its owned, in-memory rows. Rows are kept in
//! insertion order; there is no index, navigation scans.

use crate::error::{Error, Result};
use crate::row::{Row, Value};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named table: schema plus ordered rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    /// Table name (unique within the owning dataset)
    name: String,
    /// Table schema
    schema: Schema,
    /// Rows in insertion order
    rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Get all rows in insertion order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get a row by position
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Get row count
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build a row from (column name, value) pairs
    ///
    /// Columns omitted from the pairs load as NULL. Unknown column names are
    /// rejected.
    pub fn row_from_named<I, S>(&self, pairs: I) -> Result<Row>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut values = vec![Value::Null; self.schema.column_count()];
        for (name, value) in pairs {
            match self.schema.get_column_index(name.as_ref()) {
                Some(idx) => values[idx] = value,
                None => {
                    return Err(Error::UnknownColumn(
                        name.as_ref().to_string(),
                        self.name.clone(),
                    ))
                }
            }
        }
        Ok(Row::new(values))
    }

    /// Append a batch of rows
    ///
    /// The whole batch is validated before any row is committed: arity,
    /// nullability, value/column type agreement, and (when a primary key is
    /// declared) key uniqueness against existing rows and within the batch.
    /// On error the table is unchanged.
    pub fn append_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        let pk_positions = self.schema.primary_key_positions();

        let mut seen_keys: HashSet<Vec<Value>> = if pk_positions.is_empty() {
            HashSet::new()
        } else {
            self.rows
                .iter()
                .map(|r| r.project(&pk_positions).into_values())
                .collect()
        };

        for row in &rows {
            self.validate_row(row)?;

            if !pk_positions.is_empty() {
                let key = row.project(&pk_positions).into_values();
                if !seen_keys.insert(key.clone()) {
                    return Err(Error::DuplicateKey {
                        table: self.name.clone(),
                        key: format_key(&key),
                    });
                }
            }
        }

        self.rows.extend(rows);
        Ok(())
    }

    /// Validate a single row against the schema
    fn validate_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.schema.column_count() {
            return Err(Error::ColumnCountMismatch {
                expected: self.schema.column_count(),
                got: row.len(),
            });
        }

        for (col, value) in self.schema.columns().iter().zip(row) {
            if value.is_null() {
                if !col.nullable {
                    return Err(Error::NullNotAllowed(col.name.clone()));
                }
                continue;
            }
            if !value.fits(&col.scalar_type) {
                return Err(Error::TypeMismatch {
                    left: value.type_name().to_string(),
                    right: format!("column '{}' ({})", col.name, col.scalar_type),
                });
            }
        }

        Ok(())
    }
}

/// Format a primary key value tuple for error messages
fn format_key(key: &[Value]) -> String {
    let parts: Vec<String> = key.iter().map(|v| v.to_string()).collect();
    format!("({})", parts.join(", "))
}
