//! In-memory table of named columns and typed rows

use crate::error::{Error, Result};
use crate::models::Value;

/// Ordered rows of typed cells under ordered column names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with `Value::Empty`
    ///
    /// A row wider than the header is rejected.
    pub fn push_row(&mut self, mut row: Vec<Value>) -> Result<()> {
        if row.len() > self.columns.len() {
            return Err(Error::InvalidData(format!(
                "Row {} has {} fields, expected {}",
                self.rows.len() + 1,
                row.len(),
                self.columns.len()
            )));
        }
        row.resize(self.columns.len(), Value::Empty);
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// True if every name in `names` is a column
    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.has_column(n))
    }

    /// Cell lookup by row number and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Iterate over one column's cells in row order
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Replace a column's values, appending the column if it does not exist
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<usize> {
        if values.len() != self.rows.len() {
            return Err(Error::InvalidData(format!(
                "Column {} has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let idx = match self.column_index(name) {
            Some(idx) => idx,
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(Value::Empty);
                }
                self.columns.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["Product".into(), "Total".into()]);
        table
            .push_row(vec![Value::Text("A".into()), Value::Int(10)])
            .unwrap();
        table.push_row(vec![Value::Text("B".into())]).unwrap();
        table
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(1, "Total"), Some(&Value::Empty));
    }

    #[test]
    fn test_wide_row_rejected() {
        let mut table = sample();
        let err = table
            .push_row(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
            .unwrap_err();
        assert!(err.to_string().contains("Row 3 has 3 fields"));
    }

    #[test]
    fn test_set_column_appends_and_replaces() {
        let mut table = sample();
        let idx = table
            .set_column("Year", vec![Value::Int(2024), Value::Int(2025)])
            .unwrap();
        assert_eq!(idx, 2);
        assert_eq!(table.columns(), &["Product", "Total", "Year"]);

        let idx = table
            .set_column("Total", vec![Value::Int(1), Value::Int(2)])
            .unwrap();
        assert_eq!(idx, 1);
        assert_eq!(table.get(1, "Total"), Some(&Value::Int(2)));
        assert_eq!(table.columns().len(), 3);

        assert!(table.set_column("Month", vec![]).is_err());
    }

    #[test]
    fn test_has_columns() {
        let table = sample();
        assert!(table.has_columns(&["Product", "Total"]));
        assert!(!table.has_columns(&["Product", "Price"]));
        // Exact, case-sensitive names
        assert!(!table.has_column("total"));
    }
}
