use std::collections::HashMap;

use crate::data::data_view::DataView;
use crate::data::datatable::DataValue;

/// Per-column summary over the displayed rows.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Numeric {
        count: usize,
        min: f64,
        max: f64,
        sum: f64,
        avg: f64,
        median: f64,
    },
    Categorical {
        count: usize,
        unique: usize,
        /// Up to five most frequent values, most frequent first; ties break
        /// on the value itself to keep output deterministic.
        top_values: Vec<(String, usize)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistics {
    pub column_name: String,
    pub summary: ColumnSummary,
}

/// Computes column statistics for the statistics panel. Pure transform
/// over the view's displayed rows; columns whose displayed values are all
/// null produce no entry.
pub struct DataAnalyzer;

impl DataAnalyzer {
    pub fn analyze(view: &DataView) -> Vec<ColumnStatistics> {
        let columns = view.column_names();
        let rows = view.displayed_rows();

        columns
            .iter()
            .enumerate()
            .filter_map(|(col_idx, name)| {
                let values: Vec<&DataValue> = rows
                    .iter()
                    .filter_map(|row| row.get(col_idx))
                    .filter(|v| !v.is_null())
                    .collect();
                Self::summarize(&values).map(|summary| ColumnStatistics {
                    column_name: name.clone(),
                    summary,
                })
            })
            .collect()
    }

    /// A column is numeric when at least one value has a numeric reading;
    /// the numeric stats then cover only those values. Otherwise it is
    /// categorical over the string forms.
    fn summarize(values: &[&DataValue]) -> Option<ColumnSummary> {
        if values.is_empty() {
            return None;
        }

        let mut numeric: Vec<f64> = values.iter().filter_map(|v| v.as_number()).collect();
        if !numeric.is_empty() {
            numeric.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let count = numeric.len();
            let sum: f64 = numeric.iter().sum();
            let mid = count / 2;
            let median = if count % 2 == 0 {
                (numeric[mid - 1] + numeric[mid]) / 2.0
            } else {
                numeric[mid]
            };
            return Some(ColumnSummary::Numeric {
                count,
                min: numeric[0],
                max: numeric[count - 1],
                sum,
                avg: sum / count as f64,
                median,
            });
        }

        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for value in values {
            *frequencies.entry(value.to_string()).or_insert(0) += 1;
        }
        let unique = frequencies.len();
        let mut top: Vec<(String, usize)> = frequencies.into_iter().collect();
        top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top.truncate(5);

        Some(ColumnSummary::Categorical {
            count: values.len(),
            unique,
            top_values: top,
        })
    }
}
