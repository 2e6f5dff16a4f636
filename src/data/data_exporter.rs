use anyhow::{anyhow, Result};
use chrono::Local;
use serde_json::Value;
use std::fs::File;
use std::path::Path;

use crate::data::datatable::DataRow;

/// Renders the displayed `(columns, rows)` pair into the export encodings.
/// Callers hand in exactly what the grid shows (post filter/sort/column
/// visibility); a selected subset arrives already in view order.
pub struct DataExporter;

impl DataExporter {
    /// CSV text: header row of column names, then one line per row. Fields
    /// containing a comma, double-quote, or newline are wrapped in double
    /// quotes with embedded quotes doubled.
    pub fn to_csv_text(columns: &[String], rows: &[DataRow]) -> String {
        let mut out = String::new();
        let header: Vec<String> = columns.iter().map(|c| Self::escape_csv_field(c)).collect();
        out.push_str(&header.join(","));
        for row in rows {
            out.push('\n');
            let fields: Vec<String> = row
                .values
                .iter()
                .map(|v| Self::escape_csv_field(&v.to_string()))
                .collect();
            out.push_str(&fields.join(","));
        }
        out
    }

    /// Tab-delimited text for clipboard copies: same projection as CSV but
    /// no quoting; embedded tabs and line breaks are flattened to spaces.
    pub fn to_tsv_text(columns: &[String], rows: &[DataRow]) -> String {
        let mut out = String::new();
        out.push_str(&columns.join("\t"));
        for row in rows {
            out.push('\n');
            let fields: Vec<String> = row
                .values
                .iter()
                .map(|v| Self::sanitize_tsv_field(&v.to_string()))
                .collect();
            out.push_str(&fields.join("\t"));
        }
        out
    }

    /// Pretty-printed JSON array of per-row objects restricted to the
    /// visible columns. Value types survive: numbers stay numbers, nulls
    /// stay nulls.
    pub fn to_json_text(columns: &[String], rows: &[DataRow]) -> Result<String> {
        let array: Vec<Value> = rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (i, col) in columns.iter().enumerate() {
                    let value = row.get(i).map(|v| v.to_json()).unwrap_or(Value::Null);
                    obj.insert(col.clone(), value);
                }
                Value::Object(obj)
            })
            .collect();
        Ok(serde_json::to_string_pretty(&array)?)
    }

    /// Header row + data rows as a 2-D string array, the projection handed
    /// to a spreadsheet writer.
    pub fn sheet_rows(columns: &[String], rows: &[DataRow]) -> Vec<Vec<String>> {
        let mut sheet = Vec::with_capacity(rows.len() + 1);
        sheet.push(columns.to_vec());
        for row in rows {
            sheet.push(row.values.iter().map(|v| v.to_string()).collect());
        }
        sheet
    }

    /// Write the displayed rows to a timestamped CSV file in `dir`.
    /// Returns a status message naming the file.
    pub fn export_to_csv_file(columns: &[String], rows: &[DataRow], dir: &Path) -> Result<String> {
        if rows.is_empty() {
            return Err(anyhow!("No data to export"));
        }
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("query_results_{}.csv", timestamp));

        let mut writer = csv::Writer::from_writer(File::create(&path)?);
        writer.write_record(columns)?;
        for row in rows {
            let record: Vec<String> = row.values.iter().map(|v| v.to_string()).collect();
            writer.write_record(&record)?;
        }
        writer.flush()?;

        Ok(format!(
            "Exported {} rows to {}",
            rows.len(),
            path.display()
        ))
    }

    /// Write the displayed rows to a timestamped JSON file in `dir`.
    pub fn export_to_json_file(columns: &[String], rows: &[DataRow], dir: &Path) -> Result<String> {
        if rows.is_empty() {
            return Err(anyhow!("No data to export"));
        }
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("query_results_{}.json", timestamp));

        let text = Self::to_json_text(columns, rows)?;
        std::fs::write(&path, text)?;

        Ok(format!(
            "Exported {} rows to {}",
            rows.len(),
            path.display()
        ))
    }

    fn escape_csv_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn sanitize_tsv_field(field: &str) -> String {
        field
            .replace('\t', " ")
            .replace('\n', " ")
            .replace('\r', "")
    }
}
