use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::data::data_view::{DataView, FilterScope};
use crate::data::datatable::DataTable;
use crate::grid::selection::SelectionSet;
use crate::grid::viewport::{Viewport, VisibleRange};

/// Terminal rows are the geometry unit: one row, one cell of height.
const ROW_HEIGHT: f64 = 1.0;

/// The result grid: one DataView plus the scroll, cursor, and selection
/// state that rides on it. All mutation goes through the methods here so
/// the consistency rules hold:
///
/// - replacing the table resets every piece of derived state;
/// - a filter or sort change reshapes the view, which clears the
///   positional selection and re-clamps scroll and cursor;
/// - the selection is keyed by view position and never outlives the order
///   it was made in.
pub struct ResultGrid {
    view: DataView,
    viewport: Viewport,
    selection: SelectionSet,
    /// Cursor position in the view (0-based), kept inside the window.
    cursor: usize,
}

impl ResultGrid {
    pub fn new(table: Arc<DataTable>, overscan: usize) -> Self {
        Self {
            view: DataView::new(table),
            viewport: Viewport::new(ROW_HEIGHT, overscan),
            selection: SelectionSet::new(),
            cursor: 0,
        }
    }

    /// Swap in the next query's Row Store. Wholesale replacement: filter,
    /// sort, selection, scroll, and cursor all reset.
    pub fn replace_table(&mut self, table: Arc<DataTable>, overscan: usize) {
        debug!(target: "grid", "New result set: {} rows", table.row_count());
        *self = Self::new(table, overscan);
    }

    // --- derived-state changes --------------------------------------------

    pub fn set_filter(&mut self, term: &str, scope: FilterScope) {
        self.view.apply_filter(term, scope);
        self.after_reshape();
    }

    pub fn clear_filter(&mut self) {
        self.view.clear_filter();
        self.after_reshape();
    }

    /// Sort by visible column position (what the header click reports).
    pub fn sort_by_visible_column(&mut self, visible_index: usize) -> Result<()> {
        let Some(&source_index) = self.view.visible_column_indices().get(visible_index) else {
            return Ok(());
        };
        self.view.sort_on(source_index)?;
        self.after_reshape();
        Ok(())
    }

    pub fn toggle_column(&mut self, column_name: &str) {
        self.view.toggle_column_by_name(column_name);
        self.after_reshape();
    }

    pub fn unhide_all_columns(&mut self) {
        self.view.unhide_all_columns();
        self.after_reshape();
    }

    /// Filter/sort changed the view's shape: positional selections are
    /// stale, scroll may be out of range, the cursor may point past the
    /// end.
    fn after_reshape(&mut self) {
        self.selection.clear();
        let count = self.view.row_count();
        self.viewport.on_row_count_changed(count);
        self.cursor = self.cursor.min(count.saturating_sub(1));
    }

    // --- cursor and scrolling ---------------------------------------------

    pub fn set_viewport_rows(&mut self, rows: u16) {
        self.viewport
            .set_viewport_height(rows as f64 * ROW_HEIGHT, self.view.row_count());
    }

    pub fn move_cursor(&mut self, delta: i64) {
        let count = self.view.row_count();
        if count == 0 {
            return;
        }
        let cursor = self.cursor as i64 + delta;
        self.cursor = cursor.clamp(0, count as i64 - 1) as usize;
        self.scroll_cursor_into_view();
    }

    pub fn cursor_to_start(&mut self) {
        self.cursor = 0;
        self.viewport.scroll_to_top();
    }

    pub fn cursor_to_end(&mut self) {
        let count = self.view.row_count();
        self.cursor = count.saturating_sub(1);
        self.viewport.scroll_to_bottom(count);
    }

    fn scroll_cursor_into_view(&mut self) {
        let count = self.view.row_count();
        let window = self.viewport.strict_range(count);
        let cursor_top = self.cursor as f64 * ROW_HEIGHT;
        if self.cursor < window.start || window.is_empty() {
            self.viewport.scroll_to(cursor_top, count);
        } else if self.cursor >= window.end {
            let overshoot = (self.cursor + 1 - window.end) as f64 * ROW_HEIGHT;
            self.viewport
                .scroll_to(self.viewport.scroll_offset() + overshoot, count);
        }
    }

    pub fn scroll_page(&mut self, pages: i64) {
        self.viewport.scroll_page(pages, self.view.row_count());
        // Pull the cursor along so it stays on screen.
        let window = self.viewport.strict_range(self.view.row_count());
        self.cursor = self.cursor.clamp(
            window.start,
            window.end.saturating_sub(1).max(window.start),
        );
    }

    // --- selection --------------------------------------------------------

    pub fn toggle_select_at_cursor(&mut self) {
        if self.view.row_count() > 0 {
            self.selection.toggle(self.cursor);
        }
    }

    pub fn toggle_select_all(&mut self) {
        self.selection.toggle_all(self.view.row_count());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- access -----------------------------------------------------------

    pub fn view(&self) -> &DataView {
        &self.view
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> f64 {
        self.viewport.scroll_offset()
    }

    pub fn visible_window(&self) -> VisibleRange {
        self.viewport.visible_range(self.view.row_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::{DataColumn, DataRow, DataValue};

    fn table(rows: usize) -> Arc<DataTable> {
        let mut t = DataTable::new("t");
        t.add_column(DataColumn::new("id"));
        t.add_column(DataColumn::new("tag"));
        for i in 0..rows {
            t.add_row(DataRow::new(vec![
                DataValue::Integer(i as i64),
                DataValue::String(if i % 2 == 0 { "even" } else { "odd" }.to_string()),
            ]))
            .unwrap();
        }
        t.infer_column_types();
        Arc::new(t)
    }

    #[test]
    fn test_reshape_clears_selection() {
        let mut grid = ResultGrid::new(table(10), 0);
        grid.toggle_select_at_cursor();
        assert_eq!(grid.selection().len(), 1);

        grid.set_filter("even", FilterScope::AllColumns);
        assert!(grid.selection().is_empty());
        assert_eq!(grid.view().row_count(), 5);

        grid.toggle_select_all();
        assert_eq!(grid.selection().len(), 5);
        grid.sort_by_visible_column(0).unwrap();
        assert!(grid.selection().is_empty());
    }

    #[test]
    fn test_select_all_after_filter_clear_covers_full_view() {
        let mut grid = ResultGrid::new(table(100), 0);
        grid.set_filter("even", FilterScope::AllColumns);
        grid.toggle_select_all();
        assert_eq!(grid.selection().len(), 50);

        grid.clear_filter();
        grid.toggle_select_all();
        assert_eq!(grid.selection().len(), 100);
    }

    #[test]
    fn test_replace_table_resets_everything() {
        let mut grid = ResultGrid::new(table(50), 0);
        grid.set_viewport_rows(10);
        grid.set_filter("odd", FilterScope::AllColumns);
        grid.cursor_to_end();
        grid.toggle_select_all();

        grid.replace_table(table(5), 0);
        assert_eq!(grid.view().row_count(), 5);
        assert!(grid.selection().is_empty());
        assert_eq!(grid.cursor(), 0);
        assert_eq!(grid.scroll_offset(), 0.0);
        assert!(!grid.view().is_filter_active());
    }

    #[test]
    fn test_filter_shrink_clamps_scroll_and_cursor() {
        let mut grid = ResultGrid::new(table(1000), 0);
        grid.set_viewport_rows(10);
        grid.cursor_to_end();
        assert_eq!(grid.cursor(), 999);
        assert_eq!(grid.scroll_offset(), 990.0);

        grid.set_filter("even", FilterScope::AllColumns);
        assert_eq!(grid.view().row_count(), 500);
        assert!(grid.cursor() < 500);
        assert!(grid.scroll_offset() <= 490.0);
    }

    #[test]
    fn test_cursor_drags_scroll() {
        let mut grid = ResultGrid::new(table(100), 0);
        grid.set_viewport_rows(10);
        for _ in 0..15 {
            grid.move_cursor(1);
        }
        assert_eq!(grid.cursor(), 15);
        let window = grid.visible_window().index_range();
        assert!(window.contains(&15));
        assert_eq!(window.end, 16);

        grid.move_cursor(-15);
        assert_eq!(grid.cursor(), 0);
        assert_eq!(grid.scroll_offset(), 0.0);
    }

    #[test]
    fn test_window_matches_viewport_rows() {
        let mut grid = ResultGrid::new(table(100), 0);
        grid.set_viewport_rows(20);
        let window = grid.visible_window();
        assert_eq!(window.index_range(), 0..20);
        assert_eq!(window.total_content_height, 100.0);
    }
}
