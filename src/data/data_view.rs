use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::data::datatable::{DataRow, DataTable, DataValue};
use crate::data::datavalue_compare::{compare_for_direction, SortDirection};

/// Which columns a filter term is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterScope {
    /// Match against every visible column.
    #[default]
    AllColumns,
    /// Match against a single column, by name.
    Column(String),
}

/// Active sort configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

/// A view over a DataTable that filters, sorts, and projects columns
/// without touching the underlying data.
///
/// The view holds a permutation of stable row indices (positions in the
/// source's original row order). Every derived-state change recomputes the
/// permutation from scratch: identity -> filter -> stable sort. Position `i`
/// in the view maps to stable index `visible_rows[i]`.
#[derive(Clone)]
pub struct DataView {
    source: Arc<DataTable>,

    /// Stable indices of rows surviving the filter, in display order.
    visible_rows: Vec<usize>,

    /// Source column indices that are visible, in declared order.
    visible_columns: Vec<usize>,

    filter_term: String,
    filter_scope: FilterScope,
    sort: Option<SortState>,
}

impl DataView {
    /// Create a view showing all data from the table.
    pub fn new(source: Arc<DataTable>) -> Self {
        let row_count = source.row_count();
        let col_count = source.column_count();

        Self {
            source,
            visible_rows: (0..row_count).collect(),
            visible_columns: (0..col_count).collect(),
            filter_term: String::new(),
            filter_scope: FilterScope::AllColumns,
            sort: None,
        }
    }

    // --- column visibility -------------------------------------------------

    pub fn hide_column(&mut self, column_index: usize) {
        self.visible_columns.retain(|&idx| idx != column_index);
        self.recompute();
    }

    pub fn hide_column_by_name(&mut self, column_name: &str) {
        if let Some(col_idx) = self.source.get_column_index(column_name) {
            self.hide_column(col_idx);
        }
    }

    /// Re-show a hidden column at its declared position.
    pub fn show_column(&mut self, column_index: usize) {
        if column_index >= self.source.column_count()
            || self.visible_columns.contains(&column_index)
        {
            return;
        }
        let insert_at = self
            .visible_columns
            .iter()
            .position(|&idx| idx > column_index)
            .unwrap_or(self.visible_columns.len());
        self.visible_columns.insert(insert_at, column_index);
        self.recompute();
    }

    pub fn toggle_column_by_name(&mut self, column_name: &str) {
        if let Some(col_idx) = self.source.get_column_index(column_name) {
            if self.visible_columns.contains(&col_idx) {
                self.hide_column(col_idx);
            } else {
                self.show_column(col_idx);
            }
        }
    }

    pub fn unhide_all_columns(&mut self) {
        self.visible_columns = (0..self.source.column_count()).collect();
        self.recompute();
    }

    pub fn has_hidden_columns(&self) -> bool {
        self.visible_columns.len() < self.source.column_count()
    }

    pub fn is_column_visible(&self, index: usize) -> bool {
        self.visible_columns.contains(&index)
    }

    // --- filter ------------------------------------------------------------

    /// Set the free-text filter and recompute the visible rows. An empty
    /// term is the identity.
    pub fn apply_filter(&mut self, term: &str, scope: FilterScope) {
        self.filter_term = term.to_string();
        self.filter_scope = scope;
        self.recompute();
        debug!(target: "data_view",
               "Filter '{}' -> {} of {} rows",
               self.filter_term, self.visible_rows.len(), self.source.row_count());
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter("", FilterScope::AllColumns);
    }

    pub fn filter_term(&self) -> &str {
        &self.filter_term
    }

    pub fn is_filter_active(&self) -> bool {
        !self.filter_term.is_empty()
    }

    /// True when the source has rows but the filter matched none of them.
    /// Distinct from an empty result set; the two drive different
    /// empty-state messages.
    pub fn is_empty_after_filter(&self) -> bool {
        self.visible_rows.is_empty() && !self.source.is_empty() && self.is_filter_active()
    }

    // --- sort --------------------------------------------------------------

    /// Sort by a source column index. Same column toggles direction; a new
    /// column starts ascending.
    pub fn sort_on(&mut self, column_index: usize) -> Result<()> {
        if column_index >= self.source.column_count() {
            return Err(anyhow!("Column index {} out of bounds", column_index));
        }
        let direction = match self.sort {
            Some(s) if s.column == column_index => s.direction.toggle(),
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortState {
            column: column_index,
            direction,
        });
        self.recompute();
        Ok(())
    }

    pub fn sort_on_by_name(&mut self, column_name: &str) -> Result<()> {
        let col_idx = self
            .source
            .get_column_index(column_name)
            .ok_or_else(|| anyhow!("Unknown column '{}'", column_name))?;
        self.sort_on(col_idx)
    }

    /// Sort with an explicit direction, bypassing the toggle cycle.
    pub fn apply_sort(&mut self, column_index: usize, direction: SortDirection) -> Result<()> {
        if column_index >= self.source.column_count() {
            return Err(anyhow!("Column index {} out of bounds", column_index));
        }
        self.sort = Some(SortState {
            column: column_index,
            direction,
        });
        self.recompute();
        Ok(())
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.recompute();
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    // --- pipeline ----------------------------------------------------------

    /// Rebuild the row permutation: identity -> filter -> stable sort.
    /// Starting from ascending stable indices and using a stable sort keeps
    /// equal-key rows in original row order.
    fn recompute(&mut self) {
        let mut rows: Vec<usize> = (0..self.source.row_count()).collect();

        if !self.filter_term.is_empty() {
            let needle = self.filter_term.to_lowercase();
            let scope_column = match &self.filter_scope {
                FilterScope::AllColumns => None,
                FilterScope::Column(name) => Some(self.source.get_column_index(name)),
            };
            rows.retain(|&row_idx| match scope_column {
                // Scoped to a column that no longer exists: nothing matches.
                Some(None) => false,
                Some(Some(col_idx)) => self.cell_matches(row_idx, col_idx, &needle),
                None => self
                    .visible_columns
                    .iter()
                    .any(|&col_idx| self.cell_matches(row_idx, col_idx, &needle)),
            });
        }

        if let Some(sort) = self.sort {
            let source = &self.source;
            rows.sort_by(|&a, &b| {
                let val_a = source.get_value(a, sort.column).unwrap_or(&DataValue::Null);
                let val_b = source.get_value(b, sort.column).unwrap_or(&DataValue::Null);
                compare_for_direction(val_a, val_b, sort.direction)
            });
        }

        self.visible_rows = rows;
    }

    fn cell_matches(&self, row_idx: usize, col_idx: usize, needle: &str) -> bool {
        // Nulls stringify to "" and therefore never match a non-empty term.
        let value = self
            .source
            .get_value(row_idx, col_idx)
            .unwrap_or(&DataValue::Null);
        value.to_string().to_lowercase().contains(needle)
    }

    // --- access ------------------------------------------------------------

    pub fn row_count(&self) -> usize {
        self.visible_rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.visible_columns.len()
    }

    /// Names of the visible columns, in declared order.
    pub fn column_names(&self) -> Vec<String> {
        let all = self.source.column_names();
        self.visible_columns
            .iter()
            .filter_map(|&idx| all.get(idx).cloned())
            .collect()
    }

    /// Stable (original) index of the row at a view position.
    pub fn stable_index_at(&self, position: usize) -> Option<usize> {
        self.visible_rows.get(position).copied()
    }

    /// Row at a view position, projected to visible columns.
    pub fn get_row(&self, position: usize) -> Option<DataRow> {
        let row_idx = *self.visible_rows.get(position)?;
        let values = self
            .visible_columns
            .iter()
            .map(|&col_idx| {
                self.source
                    .get_value(row_idx, col_idx)
                    .cloned()
                    .unwrap_or(DataValue::Null)
            })
            .collect();
        Some(DataRow::new(values))
    }

    /// All displayed rows in view order, projected to visible columns. This
    /// is the `(columns, rows)` export boundary.
    pub fn displayed_rows(&self) -> Vec<DataRow> {
        (0..self.row_count()).filter_map(|i| self.get_row(i)).collect()
    }

    /// A subset of view positions, projected like `displayed_rows`. Callers
    /// pass selection positions; emission order follows the current sort
    /// order, not insertion order.
    pub fn rows_at_positions(&self, positions: &[usize]) -> Vec<DataRow> {
        let mut sorted: Vec<usize> = positions.to_vec();
        sorted.sort_unstable();
        sorted.into_iter().filter_map(|i| self.get_row(i)).collect()
    }

    pub fn source(&self) -> &DataTable {
        &self.source
    }

    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }

    pub fn visible_column_indices(&self) -> &[usize] {
        &self.visible_columns
    }
}
