use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tracing::info;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::config::Config;
use crate::data::data_exporter::DataExporter;
use crate::data::data_view::FilterScope;
use crate::data::datatable::DataTable;
use crate::favorites::QueryFavorites;
use crate::grid::result_grid::ResultGrid;
use crate::history::QueryHistory;
use crate::logging::LogRingBuffer;
use crate::query::executor::{ExecuteResult, QueryExecutor};
use crate::query::explain::ExplainPlan;
use crate::yank::YankManager;

/// Which pane owns keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Results,
    Filter,
}

/// Modal panel drawn over the results area. Owned state, toggled by the
/// handlers below; nothing reaches into the widget tree from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    History,
    Favorites,
    Columns,
    Stats,
    Explain,
    Logs,
}

/// Metadata of the last execution, for the results header and the
/// explain/empty panels.
pub struct ExecMeta {
    pub query: String,
    pub execution_time: f64,
    pub rows_affected: usize,
    pub message: Option<String>,
}

/// Transient status-line message, decayed by the tick handler.
pub struct StatusMessage {
    pub text: String,
    pub ttl_ticks: u8,
}

const STATUS_TTL_TICKS: u8 = 12;

pub struct App {
    pub config: Config,
    pub executor: QueryExecutor,
    pub history: QueryHistory,
    pub favorites: QueryFavorites,
    pub log_buffer: LogRingBuffer,

    pub query_input: Input,
    pub filter_input: Input,
    pub filter_scope: FilterScope,
    pub focus: Focus,
    pub overlay: Overlay,
    pub overlay_cursor: usize,

    pub grid: Option<ResultGrid>,
    pub exec_meta: Option<ExecMeta>,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: Config,
        history: QueryHistory,
        favorites: QueryFavorites,
        log_buffer: LogRingBuffer,
    ) -> Self {
        Self {
            config,
            executor: QueryExecutor::new(),
            history,
            favorites,
            log_buffer,
            query_input: Input::default(),
            filter_input: Input::default(),
            filter_scope: FilterScope::AllColumns,
            focus: Focus::Editor,
            overlay: Overlay::None,
            overlay_cursor: 0,
            grid: None,
            exec_meta: None,
            status: None,
            should_quit: false,
        }
    }

    // --- events ------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Global chords first.
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }
        if self.overlay != Overlay::None {
            return self.handle_overlay_key(key);
        }
        match key.code {
            KeyCode::F(2) => return self.open_overlay(Overlay::History),
            KeyCode::F(3) => return self.open_overlay(Overlay::Stats),
            KeyCode::F(4) => return self.open_overlay(Overlay::Explain),
            KeyCode::F(5) => return self.open_overlay(Overlay::Logs),
            _ => {}
        }
        match self.focus {
            Focus::Editor => self.handle_editor_key(key),
            Focus::Results => self.handle_results_key(key),
            Focus::Filter => self.handle_filter_key(key),
        }
    }

    /// Periodic tick: age out the status message.
    pub fn on_tick(&mut self) {
        if let Some(status) = &mut self.status {
            status.ttl_ticks = status.ttl_ticks.saturating_sub(1);
            if status.ttl_ticks == 0 {
                self.status = None;
            }
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter => self.execute_current_query(),
            KeyCode::Tab if self.grid.is_some() => {
                self.focus = Focus::Results;
                Ok(())
            }
            _ => {
                self.query_input.handle_event(&Event::Key(key));
                Ok(())
            }
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(grid) = self.grid.as_mut() else {
            self.focus = Focus::Editor;
            return Ok(());
        };
        match key.code {
            KeyCode::Tab | KeyCode::Esc => self.focus = Focus::Editor,
            KeyCode::Down | KeyCode::Char('j') => grid.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => grid.move_cursor(-1),
            KeyCode::PageDown => grid.scroll_page(1),
            KeyCode::PageUp => grid.scroll_page(-1),
            KeyCode::Home | KeyCode::Char('g') => grid.cursor_to_start(),
            KeyCode::End | KeyCode::Char('G') => grid.cursor_to_end(),
            KeyCode::Char(' ') => grid.toggle_select_at_cursor(),
            KeyCode::Char('a') => grid.toggle_select_all(),
            KeyCode::Char('x') => grid.clear_selection(),
            KeyCode::Char(c @ '1'..='9') => {
                let col = (c as usize) - ('1' as usize);
                grid.sort_by_visible_column(col)?;
            }
            KeyCode::Char('/') => {
                self.focus = Focus::Filter;
            }
            KeyCode::Char('v') => return self.open_overlay(Overlay::Columns),
            KeyCode::Char('F') => return self.open_overlay(Overlay::Favorites),
            KeyCode::Char('f') => self.toggle_favorite()?,
            KeyCode::Char('y') => self.yank_selection(),
            KeyCode::Char('Y') => self.yank_all(),
            KeyCode::Char('e') => self.export_csv(),
            KeyCode::Char('E') => self.export_json(),
            _ => {}
        }
        Ok(())
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.focus = Focus::Results;
            }
            // Cycle the filter scope: all columns, then each visible column.
            KeyCode::Tab => {
                self.filter_scope = self.next_filter_scope();
                self.reapply_filter();
            }
            _ => {
                self.filter_input.handle_event(&Event::Key(key));
                // Recompute on every keystroke.
                self.reapply_filter();
            }
        }
        Ok(())
    }

    fn next_filter_scope(&self) -> FilterScope {
        let Some(grid) = self.grid.as_ref() else {
            return FilterScope::AllColumns;
        };
        let columns = grid.view().column_names();
        match &self.filter_scope {
            FilterScope::AllColumns => match columns.first() {
                Some(first) => FilterScope::Column(first.clone()),
                None => FilterScope::AllColumns,
            },
            FilterScope::Column(current) => {
                match columns.iter().position(|c| c == current) {
                    Some(idx) if idx + 1 < columns.len() => {
                        FilterScope::Column(columns[idx + 1].clone())
                    }
                    _ => FilterScope::AllColumns,
                }
            }
        }
    }

    fn reapply_filter(&mut self) {
        let term = self.filter_input.value().to_string();
        let scope = self.filter_scope.clone();
        if let Some(grid) = self.grid.as_mut() {
            grid.set_filter(&term, scope);
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.overlay = Overlay::None;
                return Ok(());
            }
            _ => {}
        }
        match self.overlay {
            Overlay::History => self.handle_history_key(key)?,
            Overlay::Favorites => self.handle_favorites_key(key)?,
            Overlay::Columns => self.handle_columns_key(key),
            _ => {}
        }
        Ok(())
    }

    fn handle_history_key(&mut self, key: KeyEvent) -> Result<()> {
        let len = self.history.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.overlay_cursor = (self.overlay_cursor + 1).min(len.saturating_sub(1));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.overlay_cursor = self.overlay_cursor.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(entry) = self.history.entries().get(self.overlay_cursor) {
                    let query = entry.query.clone();
                    self.query_input = Input::new(query.clone()).with_cursor(query.len());
                    self.overlay = Overlay::None;
                    self.focus = Focus::Editor;
                }
            }
            KeyCode::Char('d') => {
                if let Some(entry) = self.history.entries().get(self.overlay_cursor) {
                    let id = entry.id;
                    self.history.remove(id)?;
                    self.overlay_cursor = self
                        .overlay_cursor
                        .min(self.history.len().saturating_sub(1));
                }
            }
            KeyCode::Char('C') => {
                self.history.clear()?;
                self.overlay_cursor = 0;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_favorites_key(&mut self, key: KeyEvent) -> Result<()> {
        let len = self.favorites.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.overlay_cursor = (self.overlay_cursor + 1).min(len.saturating_sub(1));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.overlay_cursor = self.overlay_cursor.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(entry) = self.favorites.entries().get(self.overlay_cursor) {
                    let query = entry.query.clone();
                    self.query_input = Input::new(query.clone()).with_cursor(query.len());
                    self.overlay = Overlay::None;
                    self.focus = Focus::Editor;
                }
            }
            KeyCode::Char('d') => {
                if let Some(entry) = self.favorites.entries().get(self.overlay_cursor) {
                    let id = entry.id;
                    self.favorites.remove(id)?;
                    self.overlay_cursor = self
                        .overlay_cursor
                        .min(self.favorites.len().saturating_sub(1));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_columns_key(&mut self, key: KeyEvent) {
        let Some(grid) = self.grid.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c @ '1'..='9') => {
                let idx = (c as usize) - ('1' as usize);
                let names = grid.view().source().column_names();
                if let Some(name) = names.get(idx) {
                    grid.toggle_column(name);
                }
            }
            KeyCode::Char('a') => grid.unhide_all_columns(),
            _ => {}
        }
    }

    fn open_overlay(&mut self, overlay: Overlay) -> Result<()> {
        self.overlay = overlay;
        self.overlay_cursor = 0;
        Ok(())
    }

    // --- actions -----------------------------------------------------------

    pub fn execute_current_query(&mut self) -> Result<()> {
        let query = self.query_input.value().trim().to_string();
        if query.is_empty() {
            self.set_status("Please enter a SQL query");
            return Ok(());
        }

        let result = self.executor.execute(&query);
        info!(target: "app", "Executed query: {} rows in {:.2}ms",
              result.data.rows.len(), result.execution_time);
        self.install_result(&query, result)?;
        Ok(())
    }

    fn install_result(&mut self, query: &str, result: ExecuteResult) -> Result<()> {
        let table = Arc::new(DataTable::from_result_set(
            "results",
            &result.data.columns,
            &result.data.rows,
        ));

        let overscan = self.config.display.overscan;
        match self.grid.as_mut() {
            Some(grid) => grid.replace_table(table, overscan),
            None => self.grid = Some(ResultGrid::new(table, overscan)),
        }
        // Component-local transient state resets with the Row Store.
        self.filter_input = Input::default();
        self.filter_scope = FilterScope::AllColumns;
        self.focus = Focus::Results;

        if self.config.behavior.enable_history {
            self.history
                .add(query, result.rows_affected, result.execution_time)?;
        }
        self.exec_meta = Some(ExecMeta {
            query: query.to_string(),
            execution_time: result.execution_time,
            rows_affected: result.rows_affected,
            message: result.message,
        });
        Ok(())
    }

    fn toggle_favorite(&mut self) -> Result<()> {
        let query = self.query_input.value().trim().to_string();
        if query.is_empty() {
            return Ok(());
        }
        if self.favorites.is_favorite(&query) {
            let id = self
                .favorites
                .entries()
                .iter()
                .find(|e| e.query == query)
                .map(|e| e.id);
            if let Some(id) = id {
                self.favorites.remove(id)?;
                self.set_status("Removed from favorites");
            }
        } else {
            self.favorites.add(&query, None)?;
            self.set_status("Added to favorites");
        }
        Ok(())
    }

    fn yank_selection(&mut self) {
        let Some(grid) = self.grid.as_ref() else {
            return;
        };
        match YankManager::yank_selection(grid.view(), grid.selection()) {
            Ok(result) => self.set_status(&format!("Copied {}", result.description)),
            Err(err) => self.set_status(&format!("Copy failed: {}", err)),
        }
    }

    fn yank_all(&mut self) {
        let Some(grid) = self.grid.as_ref() else {
            return;
        };
        match YankManager::yank_all_csv(grid.view()) {
            Ok(result) => self.set_status(&format!("Copied {} as CSV", result.preview)),
            Err(err) => self.set_status(&format!("Copy failed: {}", err)),
        }
    }

    fn export_csv(&mut self) {
        let Some(grid) = self.grid.as_ref() else {
            return;
        };
        let view = grid.view();
        let message = DataExporter::export_to_csv_file(
            &view.column_names(),
            &view.displayed_rows(),
            &self.config.export_dir(),
        );
        match message {
            Ok(msg) => self.set_status(&msg),
            Err(err) => self.set_status(&format!("Export failed: {}", err)),
        }
    }

    fn export_json(&mut self) {
        let Some(grid) = self.grid.as_ref() else {
            return;
        };
        let view = grid.view();
        let message = DataExporter::export_to_json_file(
            &view.column_names(),
            &view.displayed_rows(),
            &self.config.export_dir(),
        );
        match message {
            Ok(msg) => self.set_status(&msg),
            Err(err) => self.set_status(&format!("Export failed: {}", err)),
        }
    }

    pub fn explain_plan(&self) -> Option<ExplainPlan> {
        let meta = self.exec_meta.as_ref()?;
        ExplainPlan::for_query(&meta.query, meta.rows_affected)
    }

    pub fn set_status(&mut self, text: &str) {
        self.status = Some(StatusMessage {
            text: text.to_string(),
            ttl_ticks: STATUS_TTL_TICKS,
        });
    }
}
