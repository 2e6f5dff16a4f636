use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Declared type of a column, sampled from its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Text,
}

/// Column metadata. Declared order in `DataTable::columns` is stable;
/// visibility is a projection owned by the view, not a column attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataColumn {
    pub name: String,
    pub column_type: ColumnType,
}

impl DataColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Text,
        }
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Numeric reading of the value, if it has one. String cells that parse
    /// as finite numbers count; this is what the sort stage keys on.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::Float(f) if f.is_finite() => Some(*f),
            DataValue::String(s) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Some(n),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::String(b.to_string()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    DataValue::Float(f)
                } else {
                    DataValue::String(n.to_string())
                }
            }
            JsonValue::String(s) => DataValue::String(s.clone()),
            // Nested structures are stored opaque.
            other => DataValue::String(other.to_string()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            DataValue::String(s) => JsonValue::String(s.clone()),
            DataValue::Integer(i) => JsonValue::Number((*i).into()),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DataValue::Null => JsonValue::Null,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            // Null renders as empty string everywhere, never "null".
            DataValue::Null => Ok(()),
        }
    }
}

/// A row of cell values, positionally aligned with the table's columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRow {
    pub values: Vec<DataValue>,
}

impl DataRow {
    pub fn new(values: Vec<DataValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&DataValue> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The Row Store: one immutable column/row pair per executed query.
/// Replaced wholesale on the next execution; rows are identified by their
/// index in `rows` (the stable index) for the lifetime of the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<DataColumn>,
    pub rows: Vec<DataRow>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: DataColumn) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn add_row(&mut self, row: DataRow) -> Result<(), String> {
        if row.len() != self.columns.len() {
            return Err(format!(
                "Row has {} values but table has {} columns",
                row.len(),
                self.columns.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn get_value(&self, row: usize, col: usize) -> Option<&DataValue> {
        self.rows.get(row)?.get(col)
    }

    /// Type each column by its first non-null value in declared row order:
    /// numeric if it parses as a finite number, text otherwise.
    pub fn infer_column_types(&mut self) {
        for col_idx in 0..self.columns.len() {
            let sampled = self
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .find(|v| !v.is_null())
                .map(|v| {
                    if v.as_number().is_some() {
                        ColumnType::Numeric
                    } else {
                        ColumnType::Text
                    }
                });
            self.columns[col_idx].column_type = sampled.unwrap_or(ColumnType::Text);
        }
    }

    /// Build a Row Store from the executor's `(columns, rows)` boundary
    /// shape: column names plus one JSON object per row. Cells missing from
    /// a row object come through as Null.
    pub fn from_result_set(
        name: &str,
        columns: &[String],
        rows: &[serde_json::Map<String, JsonValue>],
    ) -> Self {
        let mut table = DataTable::new(name);
        for col in columns {
            table.add_column(DataColumn::new(col.clone()));
        }
        for row_obj in rows {
            let values = columns
                .iter()
                .map(|col| {
                    row_obj
                        .get(col)
                        .map(DataValue::from_json)
                        .unwrap_or(DataValue::Null)
                })
                .collect();
            // Width is columns.len() by construction.
            table.rows.push(DataRow::new(values));
        }
        table.infer_column_types();
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: JsonValue) -> serde_json::Map<String, JsonValue> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_datatable_creation() {
        let mut table = DataTable::new("test");
        table.add_column(DataColumn::new("id").with_type(ColumnType::Numeric));
        table.add_column(DataColumn::new("name"));

        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);

        table
            .add_row(DataRow::new(vec![
                DataValue::Integer(1),
                DataValue::String("Alice".to_string()),
            ]))
            .unwrap();

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get_value(0, 1).unwrap().to_string(), "Alice");
    }

    #[test]
    fn test_row_width_mismatch_rejected() {
        let mut table = DataTable::new("test");
        table.add_column(DataColumn::new("only"));
        let err = table
            .add_row(DataRow::new(vec![DataValue::Null, DataValue::Null]))
            .unwrap_err();
        assert!(err.contains("2 values"));
    }

    #[test]
    fn test_type_inference_first_non_null() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let rows = vec![
            obj(json!({"a": null, "b": "x"})),
            obj(json!({"a": "12.5", "b": "7"})),
        ];
        let table = DataTable::from_result_set("t", &columns, &rows);

        // First non-null in "a" is "12.5" -> numeric even though stored as a
        // string; "b" sampled "x" first -> text despite the later "7".
        assert_eq!(table.columns[0].column_type, ColumnType::Numeric);
        assert_eq!(table.columns[1].column_type, ColumnType::Text);
    }

    #[test]
    fn test_from_result_set_missing_cells_are_null() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![obj(json!({"id": 1}))];
        let table = DataTable::from_result_set("t", &columns, &rows);

        assert_eq!(table.get_value(0, 0), Some(&DataValue::Integer(1)));
        assert_eq!(table.get_value(0, 1), Some(&DataValue::Null));
        assert_eq!(table.get_value(0, 1).unwrap().to_string(), "");
    }

    #[test]
    fn test_as_number() {
        assert_eq!(DataValue::Integer(3).as_number(), Some(3.0));
        assert_eq!(DataValue::String(" 2.5 ".into()).as_number(), Some(2.5));
        assert_eq!(DataValue::String("abc".into()).as_number(), None);
        assert_eq!(DataValue::Float(f64::NAN).as_number(), None);
        assert_eq!(DataValue::Null.as_number(), None);
    }
}
