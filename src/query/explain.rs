/// Heuristic explain plans for the mock backend. The plan is derived from
/// query keywords alone; row counts and costs are coarse estimates, stable
/// for a given query and row count.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Scan,
    Filter,
    Join,
    Sort,
    Aggregate,
}

#[derive(Debug, Clone)]
pub struct PlanOperation {
    pub kind: OperationKind,
    pub target: String,
    pub rows: usize,
    pub cost: f64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ExplainPlan {
    pub operations: Vec<PlanOperation>,
    pub total_cost: f64,
}

impl ExplainPlan {
    /// Build a plan for a query that produced `row_count` rows.
    pub fn for_query(query: &str, row_count: usize) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }
        let upper = query.to_uppercase();
        let mut operations = Vec::new();

        if upper.contains("SELECT") {
            let table = table_after(&upper, "FROM").unwrap_or_else(|| "table".to_string());
            operations.push(PlanOperation {
                kind: OperationKind::Scan,
                target: table,
                rows: row_count,
                cost: 50.0 + row_count as f64 * 0.01,
                description: "Full table scan".to_string(),
            });
        }

        if upper.contains("WHERE") {
            let rows = (row_count as f64 * 0.3) as usize;
            operations.push(PlanOperation {
                kind: OperationKind::Filter,
                target: "WHERE clause".to_string(),
                rows,
                cost: 20.0 + rows as f64 * 0.005,
                description: "Filtering rows based on condition".to_string(),
            });
        }

        if upper.contains("JOIN") {
            let join_type = if upper.contains("INNER JOIN") {
                "INNER"
            } else if upper.contains("LEFT JOIN") {
                "LEFT"
            } else if upper.contains("RIGHT JOIN") {
                "RIGHT"
            } else {
                "JOIN"
            };
            let table = table_after(&upper, "JOIN").unwrap_or_else(|| "table".to_string());
            let rows = (row_count as f64 * 0.5) as usize;
            operations.push(PlanOperation {
                kind: OperationKind::Join,
                target: table,
                rows,
                cost: 100.0 + rows as f64 * 0.02,
                description: format!("{} JOIN operation", join_type),
            });
        }

        if upper.contains("ORDER BY") {
            let column = word_after(&upper, "ORDER BY").unwrap_or_else(|| "column".to_string());
            operations.push(PlanOperation {
                kind: OperationKind::Sort,
                target: column,
                rows: row_count,
                cost: 50.0 + row_count as f64 * 0.015,
                description: "Sorting result set".to_string(),
            });
        }

        if upper.contains("GROUP BY") {
            let column = word_after(&upper, "GROUP BY").unwrap_or_else(|| "column".to_string());
            let rows = (row_count as f64 * 0.2) as usize;
            operations.push(PlanOperation {
                kind: OperationKind::Aggregate,
                target: column,
                rows,
                cost: 30.0 + rows as f64 * 0.01,
                description: "Grouping and aggregation".to_string(),
            });
        }

        let total_cost = operations.iter().map(|op| op.cost).sum();
        Some(Self {
            operations,
            total_cost,
        })
    }
}

/// First identifier after a keyword, e.g. the table name after FROM.
fn table_after(upper: &str, keyword: &str) -> Option<String> {
    let idx = upper.find(&format!("{} ", keyword))?;
    let rest = &upper[idx + keyword.len()..];
    let word: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if word.is_empty() {
        None
    } else {
        Some(word.to_lowercase())
    }
}

fn word_after(upper: &str, keyword: &str) -> Option<String> {
    table_after(upper, keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_select_scans() {
        let plan = ExplainPlan::for_query("SELECT * FROM users", 10_000).unwrap();
        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.operations[0].kind, OperationKind::Scan);
        assert_eq!(plan.operations[0].target, "users");
        assert_eq!(plan.operations[0].rows, 10_000);
        assert!(plan.total_cost > 0.0);
    }

    #[test]
    fn test_where_order_group_add_operations() {
        let plan = ExplainPlan::for_query(
            "SELECT city FROM users WHERE age > 30 GROUP BY city ORDER BY city",
            10_000,
        )
        .unwrap();
        let kinds: Vec<&OperationKind> = plan.operations.iter().map(|op| &op.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &OperationKind::Scan,
                &OperationKind::Filter,
                &OperationKind::Sort,
                &OperationKind::Aggregate
            ]
        );
    }

    #[test]
    fn test_join_type_detection() {
        let plan =
            ExplainPlan::for_query("SELECT * FROM a LEFT JOIN b ON a.id = b.id", 100).unwrap();
        let join = plan
            .operations
            .iter()
            .find(|op| op.kind == OperationKind::Join)
            .unwrap();
        assert!(join.description.contains("LEFT"));
    }

    #[test]
    fn test_empty_query_has_no_plan() {
        assert!(ExplainPlan::for_query("   ", 0).is_none());
    }

    #[test]
    fn test_costs_are_deterministic() {
        let a = ExplainPlan::for_query("SELECT * FROM users", 500).unwrap();
        let b = ExplainPlan::for_query("SELECT * FROM users", 500).unwrap();
        assert_eq!(a.total_cost, b.total_cost);
    }
}
