use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::data::data_analyzer::{ColumnSummary, DataAnalyzer};
use crate::data::data_view::FilterScope;
use crate::data::datavalue_compare::SortDirection;
use crate::ui::app::{App, Focus, Overlay};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // editor
            Constraint::Length(1), // filter bar
            Constraint::Min(0),    // results
            Constraint::Length(1), // status
        ])
        .split(f.area());

    draw_editor(f, app, chunks[0]);
    draw_filter_bar(f, app, chunks[1]);
    draw_results(f, app, chunks[2]);
    draw_status(f, app, chunks[3]);

    match app.overlay {
        Overlay::None => {}
        Overlay::History => draw_history(f, app, chunks[2]),
        Overlay::Favorites => draw_favorites(f, app, chunks[2]),
        Overlay::Columns => draw_columns(f, app, chunks[2]),
        Overlay::Stats => draw_stats(f, app, chunks[2]),
        Overlay::Explain => draw_explain(f, app, chunks[2]),
        Overlay::Logs => draw_logs(f, app, chunks[2]),
    }
}

fn focus_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_editor(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Query (Enter to run, Tab to grid, F2 history)")
        .border_style(focus_style(app.focus == Focus::Editor));
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll = app.query_input.visual_scroll(inner_width);
    let editor = Paragraph::new(app.query_input.value())
        .scroll((0, scroll as u16))
        .block(block);
    f.render_widget(editor, area);

    if app.focus == Focus::Editor {
        let x = area.x + 1 + (app.query_input.visual_cursor().saturating_sub(scroll)) as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn draw_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let scope = match &app.filter_scope {
        FilterScope::AllColumns => "all columns".to_string(),
        FilterScope::Column(name) => format!("column '{}'", name),
    };
    let line = if app.focus == Focus::Filter {
        Line::from(vec![
            Span::styled(" filter> ", Style::default().fg(Color::Cyan)),
            Span::raw(app.filter_input.value().to_string()),
            Span::styled(
                format!("  [{}] (Tab cycles scope)", scope),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else if app.filter_input.value().is_empty() {
        Line::from(Span::styled(
            " / filter  1-9 sort  Space select  a all  y copy  e export  v columns  F3 stats",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled(" filter: ", Style::default().fg(Color::Yellow)),
            Span::raw(app.filter_input.value().to_string()),
            Span::styled(format!("  [{}]", scope), Style::default().fg(Color::DarkGray)),
        ])
    };
    f.render_widget(Paragraph::new(line), area);

    if app.focus == Focus::Filter {
        let x = area.x + 9 + app.filter_input.visual_cursor() as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    }
}

fn draw_results(f: &mut Frame, app: &mut App, area: Rect) {
    let border_style = focus_style(app.focus == Focus::Results);

    let Some(grid) = app.grid.as_mut() else {
        let empty = Paragraph::new("No results to display. Execute a query to see results.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Results"));
        f.render_widget(empty, area);
        return;
    };

    // Borders plus the header row; what remains is the row viewport.
    let viewport_rows = area.height.saturating_sub(3);
    grid.set_viewport_rows(viewport_rows);

    let view = grid.view();
    if view.row_count() == 0 {
        let message = if view.is_empty_after_filter() {
            format!("No rows match the filter '{}'", view.filter_term())
        } else {
            let meta = app.exec_meta.as_ref();
            let detail = meta
                .and_then(|m| m.message.clone())
                .unwrap_or_else(|| "The query returned no rows.".to_string());
            format!("No Results Found\n\n{}", detail)
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Results")
                    .border_style(border_style),
            );
        f.render_widget(empty, area);
        return;
    }

    let columns = view.column_names();
    let sort = view.sort_state();
    let show_row_numbers = app.config.display.show_row_numbers;

    let mut header_cells: Vec<Cell> = Vec::new();
    if show_row_numbers {
        header_cells.push(Cell::from("#").style(Style::default().fg(Color::Magenta)));
    }
    for (visible_idx, name) in columns.iter().enumerate() {
        let source_idx = view.visible_column_indices()[visible_idx];
        let indicator = match sort {
            Some(s) if s.column == source_idx => match s.direction {
                SortDirection::Ascending => " ^",
                SortDirection::Descending => " v",
            },
            _ => "",
        };
        header_cells.push(
            Cell::from(format!("{}{}", name, indicator)).style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }

    // Render only the windowed rows, skipping overscan above the fold.
    let scroll = grid.scroll_offset();
    let window = grid.visible_window();
    let selection = grid.selection();
    let cursor = grid.cursor();

    let rows: Vec<Row> = window
        .items
        .iter()
        .filter(|item| item.offset >= scroll)
        .take(viewport_rows as usize)
        .filter_map(|item| {
            let row = view.get_row(item.index)?;
            let selected = selection.is_selected(item.index);
            let mut cells: Vec<Cell> = Vec::new();
            if show_row_numbers {
                let marker = if selected { "*" } else { " " };
                cells.push(
                    Cell::from(format!("{}{}", marker, item.index + 1))
                        .style(Style::default().fg(Color::Magenta)),
                );
            }
            for value in &row.values {
                cells.push(Cell::from(value.to_string()));
            }
            let mut style = Style::default();
            if selected {
                style = style.fg(Color::Yellow);
            }
            if item.index == cursor {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            Some(Row::new(cells).style(style))
        })
        .collect();

    let mut widths: Vec<Constraint> = Vec::new();
    if show_row_numbers {
        widths.push(Constraint::Length(7));
    }
    let n = columns.len().max(1) as u32;
    widths.extend(columns.iter().map(|_| Constraint::Ratio(1, n)));

    let title = results_title(app);
    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        );
    f.render_widget(table, area);
}

fn results_title(app: &App) -> String {
    let Some(grid) = app.grid.as_ref() else {
        return "Results".to_string();
    };
    let view = grid.view();
    let mut title = format!(
        "Results ({} rows, {} cols",
        view.row_count(),
        view.column_count()
    );
    if let Some(meta) = &app.exec_meta {
        title.push_str(&format!(", {:.2} ms", meta.execution_time));
    }
    if view.is_filter_active() {
        title.push_str(", filtered");
    }
    if !grid.selection().is_empty() {
        title.push_str(&format!(", {} selected", grid.selection().len()));
    }
    title.push(')');
    title
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled(
            " Ctrl+C quit  F2 history  F3 stats  F4 explain  F5 logs",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn overlay_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Yellow))
}

fn draw_list_overlay(
    f: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line>,
    cursor: usize,
) {
    f.render_widget(Clear, area);
    let visible = area.height.saturating_sub(2) as usize;
    let skip = cursor.saturating_sub(visible.saturating_sub(1));
    let text: Vec<Line> = lines.into_iter().skip(skip).take(visible).collect();
    f.render_widget(Paragraph::new(text).block(overlay_block(title)), area);
}

fn draw_history(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = if app.history.is_empty() {
        vec![Line::from("No queries executed yet")]
    } else {
        app.history
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let prefix = if i == app.overlay_cursor { "> " } else { "  " };
                let style = if i == app.overlay_cursor {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(
                    format!(
                        "{}{} ({} rows, {:.1} ms)",
                        prefix, entry.query, entry.rows_affected, entry.execution_time
                    ),
                    style,
                ))
            })
            .collect()
    };
    draw_list_overlay(
        f,
        area,
        "History (Enter recall, d delete, C clear, Esc close)",
        lines,
        app.overlay_cursor,
    );
}

fn draw_favorites(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = if app.favorites.is_empty() {
        vec![Line::from("No favorites saved; press f in the grid")]
    } else {
        app.favorites
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let prefix = if i == app.overlay_cursor { "> " } else { "  " };
                let style = if i == app.overlay_cursor {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(
                    format!("{}{}: {}", prefix, entry.name, entry.query),
                    style,
                ))
            })
            .collect()
    };
    draw_list_overlay(
        f,
        area,
        "Favorites (Enter recall, d delete, Esc close)",
        lines,
        app.overlay_cursor,
    );
}

fn draw_columns(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match app.grid.as_ref() {
        None => vec![Line::from("No result set")],
        Some(grid) => {
            let view = grid.view();
            view.source()
                .column_names()
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let visible = view.is_column_visible(i);
                    let mark = if visible { "[x]" } else { "[ ]" };
                    Line::from(format!("{} {} {}", i + 1, mark, name))
                })
                .collect()
        }
    };
    draw_list_overlay(
        f,
        area,
        "Columns (1-9 toggle, a show all, Esc close)",
        lines,
        0,
    );
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match app.grid.as_ref() {
        None => vec![Line::from("No result set")],
        Some(grid) => {
            let stats = DataAnalyzer::analyze(grid.view());
            if stats.is_empty() {
                vec![Line::from("No data available for statistics")]
            } else {
                stats
                    .iter()
                    .map(|stat| match &stat.summary {
                        ColumnSummary::Numeric {
                            count,
                            min,
                            max,
                            sum,
                            avg,
                            median,
                        } => Line::from(format!(
                            "{}: numeric  n={} min={} max={} avg={:.2} median={:.2} sum={}",
                            stat.column_name, count, min, max, avg, median, sum
                        )),
                        ColumnSummary::Categorical {
                            count,
                            unique,
                            top_values,
                        } => {
                            let top: Vec<String> = top_values
                                .iter()
                                .map(|(v, c)| format!("{} ({})", v, c))
                                .collect();
                            Line::from(format!(
                                "{}: text  n={} unique={} top: {}",
                                stat.column_name,
                                count,
                                unique,
                                top.join(", ")
                            ))
                        }
                    })
                    .collect()
            }
        }
    };
    draw_list_overlay(f, area, "Statistics (displayed rows, Esc close)", lines, 0);
}

fn draw_explain(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match app.explain_plan() {
        None => vec![Line::from("Execute a query to see the execution plan")],
        Some(plan) => {
            let mut lines: Vec<Line> = plan
                .operations
                .iter()
                .map(|op| {
                    Line::from(format!(
                        "{:?} on {}: ~{} rows, cost {:.1}  ({})",
                        op.kind, op.target, op.rows, op.cost, op.description
                    ))
                })
                .collect();
            lines.push(Line::from(""));
            lines.push(Line::from(format!("Total estimated cost: {:.1}", plan.total_cost)));
            lines
        }
    };
    draw_list_overlay(f, area, "Explain plan (heuristic, Esc close)", lines, 0);
}

fn draw_logs(f: &mut Frame, app: &App, area: Rect) {
    let count = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .log_buffer
        .recent(count)
        .into_iter()
        .map(|entry| Line::from(entry.format_for_display()))
        .collect();
    draw_list_overlay(f, area, "Recent logs (Esc close)", lines, 0);
}
