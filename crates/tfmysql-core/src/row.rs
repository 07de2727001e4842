//! Result row representation.

use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Column metadata shared across all rows in a result set.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// Name -> index mapping for O(1) lookup
    name_to_index: HashMap<String, usize>,
}

impl ColumnInfo {
    /// Create new column info from a list of column names.
    pub fn new(names: Vec<String>) -> Self {
        let name_to_index = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        Self { name_to_index }
    }

    /// Get the index of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }
}

/// A single row returned from a query.
///
/// Most `SHOW` column names vary across server versions, so index access is
/// the primary interface. Name lookup is for the few stable headers.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<Value>,
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with the given columns and values.
    pub fn new(column_names: Vec<String>, values: Vec<Value>) -> Self {
        let columns = Arc::new(ColumnInfo::new(column_names));
        Self { values, columns }
    }

    /// Create a new row with shared column metadata.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Get the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if this row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns.index_of(name).and_then(|i| self.values.get(i))
    }

    /// Get a textual cell by index; `None` for NULL, numbers or non-UTF-8 bytes.
    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_basic_access() {
        let row = Row::new(
            vec!["Database".to_string(), "Create Database".to_string()],
            vec![
                Value::Text("t1".to_string()),
                Value::Bytes(b"CREATE DATABASE `t1`".to_vec()),
            ],
        );

        assert_eq!(row.len(), 2);
        assert!(!row.is_empty());
        assert_eq!(row.get_str(0), Some("t1"));
        assert_eq!(row.get_str(1), Some("CREATE DATABASE `t1`"));
        assert_eq!(row.get(2), None);
        assert_eq!(
            row.get_by_name("Database"),
            Some(&Value::Text("t1".to_string()))
        );
        assert_eq!(row.get_by_name("missing"), None);
    }

    #[test]
    fn test_row_shared_columns() {
        let columns = Arc::new(ColumnInfo::new(vec!["Tables_in_db".to_string()]));
        let a = Row::with_columns(Arc::clone(&columns), vec![Value::from("a")]);
        let b = Row::with_columns(Arc::clone(&columns), vec![Value::Null]);

        assert_eq!(a.get_str(0), Some("a"));
        assert_eq!(b.get_str(0), None);
        assert_eq!(b.get_by_name("Tables_in_db"), Some(&Value::Null));
        assert_eq!(columns.index_of("Tables_in_db"), Some(0));
        assert_eq!(columns.index_of("Tables"), None);
    }
}
