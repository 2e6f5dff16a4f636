use std::time::Instant;

use serde_json::{Map, Value};
use tracing::info;

use crate::query::mock_data::{dataset_for_key, DATASET_KEYS};

/// The `(columns, rows)` pair handed across the execution boundary.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

/// Result of executing a query against the mock backend.
#[derive(Debug, Clone)]
pub struct ExecuteResult {
    pub success: bool,
    pub data: ResultSet,
    /// Milliseconds spent producing the result set.
    pub execution_time: f64,
    pub rows_affected: usize,
    /// Set when `rows` is empty, for the empty-state message.
    pub message: Option<String>,
}

/// Mock query executor: a keyword lookup over the canned datasets, not a
/// SQL engine. A query matches a dataset when its uppercased text contains
/// the dataset's key; anything else gets the zero-row default.
pub struct QueryExecutor;

impl QueryExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, query: &str) -> ExecuteResult {
        let started = Instant::now();
        let normalized = query.trim().to_uppercase();

        for key in DATASET_KEYS {
            if !normalized.contains(&key.to_uppercase()) {
                continue;
            }
            if let Some(dataset) = dataset_for_key(key) {
                let rows_affected = dataset.rows.len();
                info!(target: "executor", "Matched '{}' ({} rows)", key, rows_affected);
                return ExecuteResult {
                    success: true,
                    data: ResultSet {
                        columns: dataset.columns,
                        rows: dataset.rows,
                    },
                    execution_time: started.elapsed().as_secs_f64() * 1000.0,
                    rows_affected,
                    message: None,
                };
            }
        }

        info!(target: "executor", "No dataset matched, returning default");
        ExecuteResult {
            success: true,
            data: ResultSet {
                columns: vec!["message".to_string()],
                rows: Vec::new(),
            },
            execution_time: started.elapsed().as_secs_f64() * 1000.0,
            rows_affected: 0,
            message: Some("Query executed successfully. No data returned.".to_string()),
        }
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let executor = QueryExecutor::new();
        let result = executor.execute("select * from USERS where age > 30");
        assert!(result.success);
        assert_eq!(result.data.rows.len(), 10_000);
        assert_eq!(result.rows_affected, 10_000);
        assert!(result.message.is_none());
        assert_eq!(
            result.data.columns,
            vec!["id", "name", "email", "age", "city", "created_at"]
        );
    }

    #[test]
    fn test_unmatched_query_returns_zero_row_default() {
        let executor = QueryExecutor::new();
        let result = executor.execute("DROP TABLE users");
        assert!(result.success);
        assert!(result.data.rows.is_empty());
        assert_eq!(result.data.columns, vec!["message"]);
        assert_eq!(result.rows_affected, 0);
        assert!(result.message.is_some());
    }

    #[test]
    fn test_largest_dataset() {
        let executor = QueryExecutor::new();
        let result = executor.execute("SELECT * FROM transactions");
        assert_eq!(result.data.rows.len(), 15_000);
        assert_eq!(result.data.columns.len(), 6);
    }

    #[test]
    fn test_execution_time_is_reported() {
        let executor = QueryExecutor::new();
        let result = executor.execute("SELECT * FROM products");
        assert!(result.execution_time >= 0.0);
    }
}
