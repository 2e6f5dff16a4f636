use std::sync::Arc;

use sql_runner::data::data_exporter::DataExporter;
use sql_runner::data::data_view::{DataView, FilterScope};
use sql_runner::data::datatable::{DataColumn, DataRow, DataTable, DataValue};
use sql_runner::data::datavalue_compare::SortDirection;
use sql_runner::grid::result_grid::ResultGrid;
use sql_runner::grid::viewport::compute_visible_range;

fn people_table() -> Arc<DataTable> {
    let mut table = DataTable::new("people");
    table.add_column(DataColumn::new("id"));
    table.add_column(DataColumn::new("name"));
    table.add_column(DataColumn::new("score"));
    let rows: Vec<(i64, Option<&str>, Option<f64>)> = vec![
        (2, Some("b"), Some(10.0)),
        (1, Some("a"), None),
        (5, Some("e"), Some(7.5)),
        (4, None, Some(7.5)),
        (3, Some("c"), Some(99.0)),
    ];
    for (id, name, score) in rows {
        table
            .add_row(DataRow::new(vec![
                DataValue::Integer(id),
                name.map(|n| DataValue::String(n.to_string()))
                    .unwrap_or(DataValue::Null),
                score.map(DataValue::Float).unwrap_or(DataValue::Null),
            ]))
            .unwrap();
    }
    table.infer_column_types();
    Arc::new(table)
}

#[test]
fn filter_is_idempotent() {
    let mut view = DataView::new(people_table());
    view.apply_filter("b", FilterScope::AllColumns);
    let once: Vec<usize> = view.visible_row_indices().to_vec();

    view.apply_filter("b", FilterScope::AllColumns);
    assert_eq!(view.visible_row_indices(), &once[..]);
}

#[test]
fn sort_ascending_reversed_matches_descending_modulo_nulls() {
    // Distinct keys, one null: reversing the non-null ascending prefix must
    // equal the descending order's non-null prefix; nulls stay last both
    // ways.
    let mut asc = DataView::new(people_table());
    asc.apply_sort(1, SortDirection::Ascending).unwrap();
    let asc_rows: Vec<usize> = asc.visible_row_indices().to_vec();

    let mut desc = DataView::new(people_table());
    desc.apply_sort(1, SortDirection::Descending).unwrap();
    let desc_rows: Vec<usize> = desc.visible_row_indices().to_vec();

    // Row 3 has a null name and must be last in both directions.
    assert_eq!(*asc_rows.last().unwrap(), 3);
    assert_eq!(*desc_rows.last().unwrap(), 3);

    let mut reversed: Vec<usize> = asc_rows[..asc_rows.len() - 1].to_vec();
    reversed.reverse();
    assert_eq!(reversed, desc_rows[..desc_rows.len() - 1]);
}

#[test]
fn sort_is_stable_for_equal_keys_in_both_directions() {
    // score 7.5 appears at stable indices 2 and 3; they must keep that
    // relative order whichever way the sort runs.
    let mut view = DataView::new(people_table());
    view.apply_sort(2, SortDirection::Ascending).unwrap();
    let asc: Vec<usize> = view.visible_row_indices().to_vec();
    let pos2 = asc.iter().position(|&i| i == 2).unwrap();
    let pos3 = asc.iter().position(|&i| i == 3).unwrap();
    assert!(pos2 < pos3);

    view.apply_sort(2, SortDirection::Descending).unwrap();
    let desc: Vec<usize> = view.visible_row_indices().to_vec();
    let pos2 = desc.iter().position(|&i| i == 2).unwrap();
    let pos3 = desc.iter().position(|&i| i == 3).unwrap();
    assert!(pos2 < pos3);
}

#[test]
fn scenario_a_sort_by_id_ascending() {
    let mut table = DataTable::new("s");
    table.add_column(DataColumn::new("id"));
    table.add_column(DataColumn::new("name"));
    table
        .add_row(DataRow::new(vec![
            DataValue::Integer(2),
            DataValue::String("b".to_string()),
        ]))
        .unwrap();
    table
        .add_row(DataRow::new(vec![
            DataValue::Integer(1),
            DataValue::String("a".to_string()),
        ]))
        .unwrap();
    table.infer_column_types();

    let mut view = DataView::new(Arc::new(table));
    view.apply_sort(0, SortDirection::Ascending).unwrap();
    assert_eq!(view.get_row(0).unwrap().get(0), Some(&DataValue::Integer(1)));
    assert_eq!(view.get_row(1).unwrap().get(0), Some(&DataValue::Integer(2)));
}

#[test]
fn scenario_b_window_size_at_15k_rows() {
    // 400px viewport, 40px rows, overscan 10: 30 items mid-scroll, clamped
    // near the edges.
    let mid = compute_visible_range(15_000, 200_000.0, 400.0, 40.0, 10);
    assert_eq!(mid.items.len(), 30);

    let top = compute_visible_range(15_000, 0.0, 400.0, 40.0, 10);
    assert_eq!(top.items.len(), 20);
    assert_eq!(top.items[0].index, 0);
}

#[test]
fn scenario_c_no_match_filter_is_distinct_empty_state() {
    let mut view = DataView::new(people_table());
    view.apply_filter("xyz-no-match", FilterScope::AllColumns);
    assert_eq!(view.row_count(), 0);
    assert!(view.is_empty_after_filter());

    // A result set with no rows at all reports the other empty state.
    let mut empty = DataTable::new("empty");
    empty.add_column(DataColumn::new("message"));
    let view = DataView::new(Arc::new(empty));
    assert_eq!(view.row_count(), 0);
    assert!(!view.is_empty_after_filter());
}

#[test]
fn scenario_d_select_all_follows_view_growth() {
    let mut table = DataTable::new("d");
    table.add_column(DataColumn::new("n"));
    for i in 0..100 {
        table
            .add_row(DataRow::new(vec![DataValue::String(format!(
                "{}{}",
                if i < 3 { "keep" } else { "drop" },
                i
            ))]))
            .unwrap();
    }
    table.infer_column_types();

    let mut grid = ResultGrid::new(Arc::new(table), 0);
    grid.set_filter("keep", FilterScope::AllColumns);
    assert_eq!(grid.view().row_count(), 3);
    grid.toggle_select_all();
    assert_eq!(grid.selection().len(), 3);

    grid.clear_filter();
    assert_eq!(grid.view().row_count(), 100);
    grid.toggle_select_all();
    assert_eq!(grid.selection().len(), 100);
}

#[test]
fn scenario_e_csv_escapes_embedded_comma() {
    let columns = vec!["id".to_string(), "name".to_string()];
    let rows = vec![DataRow::new(vec![
        DataValue::Integer(1),
        DataValue::String("A,B".to_string()),
    ])];
    let csv = DataExporter::to_csv_text(&columns, &rows);
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("id,name"));
    assert_eq!(lines.next(), Some("1,\"A,B\""));
}

#[test]
fn csv_round_trip_through_parser() {
    let view = DataView::new(people_table());
    let columns = view.column_names();
    let rows = view.displayed_rows();
    let text = DataExporter::to_csv_text(&columns, &rows);

    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(headers, columns);

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), rows.len());
    for (record, row) in records.iter().zip(&rows) {
        for (field, value) in record.iter().zip(&row.values) {
            assert_eq!(field, value.to_string());
        }
    }
}

#[test]
fn json_round_trip_preserves_non_null_values() {
    let view = DataView::new(people_table());
    let columns = view.column_names();
    let rows = view.displayed_rows();
    let text = DataExporter::to_json_text(&columns, &rows).unwrap();

    let parsed: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.len(), rows.len());
    assert_eq!(parsed[0]["id"], 2);
    assert_eq!(parsed[0]["name"], "b");
    assert_eq!(parsed[0]["score"], 10.0);
    assert!(parsed[1]["score"].is_null());
}

#[test]
fn serializers_follow_filter_sort_and_visibility() {
    let mut view = DataView::new(people_table());
    view.hide_column_by_name("score");
    view.apply_filter("b", FilterScope::AllColumns);
    view.apply_sort(0, SortDirection::Descending).unwrap();

    let csv = DataExporter::to_csv_text(&view.column_names(), &view.displayed_rows());
    assert_eq!(csv, "id,name\n2,b");
}

#[test]
fn selection_export_follows_sort_order() {
    let mut grid = ResultGrid::new(people_table(), 0);
    grid.sort_by_visible_column(0).unwrap(); // ids ascending
    grid.toggle_select_at_cursor(); // position 0 -> id 1
    grid.move_cursor(2);
    grid.toggle_select_at_cursor(); // position 2 -> id 3

    let positions = grid.selection().selected_in_view_order();
    let rows = grid.view().rows_at_positions(&positions);
    let tsv = DataExporter::to_tsv_text(&grid.view().column_names(), &rows);
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines[1].split('\t').next(), Some("1"));
    assert_eq!(lines[2].split('\t').next(), Some("3"));
}
