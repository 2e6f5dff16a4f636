use anyhow::{anyhow, Result};
use arboard::Clipboard;
use base64::Engine;
use std::io::Write;
use tracing::warn;

use crate::data::data_exporter::DataExporter;
use crate::data::data_view::DataView;
use crate::grid::selection::SelectionSet;

/// Manages clipboard copies of grid data.
pub struct YankManager;

/// Result of a yank operation, for the status line.
pub struct YankResult {
    pub description: String,
    pub preview: String,
    pub full_value: String,
}

impl YankManager {
    /// Copy a single cell (view position + visible column index).
    pub fn yank_cell(view: &DataView, position: usize, column: usize) -> Result<YankResult> {
        let row = view
            .get_row(position)
            .ok_or_else(|| anyhow!("Row position out of bounds"))?;
        let value = row
            .get(column)
            .ok_or_else(|| anyhow!("Column index out of bounds"))?
            .to_string();
        let column_name = view
            .column_names()
            .get(column)
            .cloned()
            .unwrap_or_default();

        Self::write_clipboard(&value)?;

        let preview = if value.len() > 20 {
            format!("{}...", &value[..17])
        } else {
            value.clone()
        };
        Ok(YankResult {
            description: column_name,
            preview,
            full_value: value,
        })
    }

    /// Copy the selected rows as tab-delimited text, in view order. With no
    /// selection, the whole displayed set is copied.
    pub fn yank_selection(view: &DataView, selection: &SelectionSet) -> Result<YankResult> {
        let columns = view.column_names();
        let (rows, what) = if selection.is_empty() {
            (view.displayed_rows(), "all rows".to_string())
        } else {
            let positions = selection.selected_in_view_order();
            (
                view.rows_at_positions(&positions),
                format!("{} selected rows", positions.len()),
            )
        };
        if rows.is_empty() {
            return Err(anyhow!("Nothing to copy"));
        }

        let text = DataExporter::to_tsv_text(&columns, &rows);
        Self::write_clipboard(&text)?;

        Ok(YankResult {
            description: what,
            preview: format!("{} rows x {} columns", rows.len(), columns.len()),
            full_value: text,
        })
    }

    /// Copy the whole displayed set as CSV.
    pub fn yank_all_csv(view: &DataView) -> Result<YankResult> {
        let columns = view.column_names();
        let rows = view.displayed_rows();
        if rows.is_empty() {
            return Err(anyhow!("No data to copy"));
        }

        let filter_info = if view.is_filter_active() {
            " (filtered)"
        } else {
            ""
        };
        let text = DataExporter::to_csv_text(&columns, &rows);
        Self::write_clipboard(&text)?;

        Ok(YankResult {
            description: format!("All data{}", filter_info),
            preview: format!("{} rows x {} columns", rows.len(), columns.len()),
            full_value: text,
        })
    }

    /// Write text to the system clipboard, falling back to an OSC 52
    /// escape when the platform clipboard is unavailable (SSH, headless).
    /// Errors only when both paths fail; view state is untouched either
    /// way.
    fn write_clipboard(text: &str) -> Result<()> {
        match Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(target: "yank", "Clipboard unavailable ({}), trying OSC 52", err);
                Self::write_osc52(text)
            }
        }
    }

    fn write_osc52(text: &str) -> Result<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);
        let mut out = std::io::stdout();
        write!(out, "\x1b]52;c;{}\x07", encoded)?;
        out.flush()?;
        Ok(())
    }
}
