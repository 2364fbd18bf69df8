//! End-to-end sheet reading scenarios over an in-memory workbook.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rowcast::prelude::*;
use rowcast_core::Workbook;

/// Loop over single-row groups: one `id` cell per row, blank column 0 stops.
fn items_definition() -> SheetDefinition {
    SheetDefinition::new(vec![BlockDefinition::looping(1, 1, 0, "items")
        .with_break(BreakCondition::blank(0))
        .cell(1, 0, "id")])
}

#[test]
fn simple_block_with_blank_cells_yields_null_fields() {
    // Nothing is written to the sheet at all: every cell extracts to null.
    let workbook = Workbook::new();

    let mut registry = SchemaRegistry::new();
    registry.register(
        RecordSchema::new("Header")
            .field("title", PropertyKind::Text)
            .field("issued", PropertyKind::Date)
            .field("count", PropertyKind::Int),
    );
    let definition = SheetDefinition::new(vec![BlockDefinition::simple(0, 1, 0, "header")
        .with_target("Header")
        .cell(0, 0, "title")
        .cell(0, 1, "issued")
        .cell(1, 0, "count")]);

    let result = SheetReader::new(&workbook)
        .with_schemas(&registry)
        .read(0, &definition);

    assert_eq!(result.status.code(), StatusCode::Success);
    let header = result.data.get("header").unwrap();
    assert_eq!(header.get("title"), Some(&DataValue::Null));
    assert_eq!(header.get("issued"), Some(&DataValue::Null));
    assert_eq!(header.get("count"), Some(&DataValue::Null));
}

#[test]
fn loop_with_immediately_true_break_yields_empty_list() {
    // Column 0 of the first prospective row-group is blank.
    let workbook = Workbook::new();
    let result = SheetReader::new(&workbook).read(0, &items_definition());

    assert_eq!(result.status.code(), StatusCode::Success);
    assert_eq!(result.data.get("items").unwrap().as_list().unwrap().len(), 0);
}

#[test]
fn loop_reads_rows_until_blank_sentinel() {
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut(0).unwrap();
    sheet.set_value_at(1, 0, "A").unwrap();
    sheet.set_value_at(2, 0, "B").unwrap();
    sheet.set_value_at(3, 0, "").unwrap();

    let reader = SheetReader::new(&workbook);
    let result = reader.read(0, &items_definition());

    assert_eq!(result.status.code(), StatusCode::Success);
    let items = result.data.get("items").unwrap().as_list().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].get("id"), Some(&DataValue::Text("A".into())));
    assert_eq!(items[1].get("id"), Some(&DataValue::Text("B".into())));

    // Re-reading the same immutable sheet gives the same graph.
    let again = reader.read(0, &items_definition());
    assert_eq!(again.data, result.data);
}

#[test]
fn unconvertible_cell_keeps_iteration_and_escalates_status() {
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut(0).unwrap();
    sheet.set_value_at(1, 0, 1.0).unwrap();
    sheet.set_value_at(2, 0, "B").unwrap();
    sheet.set_value_at(3, 0, 3.0).unwrap();

    let definition = SheetDefinition::new(vec![BlockDefinition::looping(1, 1, 0, "items")
        .with_break(BreakCondition::blank(0))
        .cell_def(CellDefinition::new(1, 0, "id").with_kind(PropertyKind::Int))]);

    let result = SheetReader::new(&workbook).read(0, &definition);

    assert_eq!(result.status.code(), StatusCode::DataCollectionError);
    assert_eq!(result.status.errors().len(), 1);
    assert!(matches!(result.status.errors()[0], ReadError::Conversion(_)));

    // The bad row-group is still appended, just without the failed field.
    let items = result.data.get("items").unwrap().as_list().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].get("id"), Some(&DataValue::Int(1)));
    assert_eq!(items[1].get("id"), None);
    assert_eq!(items[2].get("id"), Some(&DataValue::Int(3)));
}

#[test]
fn second_loop_block_is_skipped_by_default() {
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut(0).unwrap();
    sheet.set_value_at(1, 0, "A").unwrap();
    sheet.set_value_at(5, 0, "X").unwrap();

    let definition = SheetDefinition::new(vec![
        BlockDefinition::looping(1, 1, 0, "items")
            .with_break(BreakCondition::blank(0))
            .cell(1, 0, "id"),
        BlockDefinition::looping(5, 5, 0, "extras")
            .with_break(BreakCondition::blank(0))
            .cell(5, 0, "id"),
    ]);

    let result = SheetReader::new(&workbook).read(0, &definition);

    assert_eq!(result.status.code(), StatusCode::Success);
    assert_eq!(result.data.get("items").unwrap().as_list().unwrap().len(), 1);
    // The second loop block's target path stays absent.
    assert_eq!(result.data.get("extras"), None);
}

#[test]
fn sentinel_scenario_two_rows_then_blank() {
    // Rows 1-3 of column 0 hold "A", "B", "".
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut(0).unwrap();
    sheet.set_value_at(1, 0, "A").unwrap();
    sheet.set_value_at(2, 0, "B").unwrap();
    sheet.set_value_at(3, 0, "").unwrap();

    let result = SheetReader::new(&workbook).read(0, &items_definition());

    assert_eq!(result.status.code(), StatusCode::Success);
    let items = result.data.get("items").unwrap().as_list().unwrap();
    assert_eq!(
        items.iter().map(|i| i.get("id").cloned()).collect::<Vec<_>>(),
        vec![
            Some(DataValue::Text("A".into())),
            Some(DataValue::Text("B".into())),
        ]
    );
}

#[test]
fn cumulative_read_appends_to_existing_collection() {
    let mut first = Workbook::new();
    first.sheet_mut(0).unwrap().set_value_at(1, 0, "A").unwrap();
    let mut second = Workbook::new();
    second.sheet_mut(0).unwrap().set_value_at(1, 0, "B").unwrap();

    let definition = items_definition();
    let mut data = DataValue::record();
    let mut status = ReadStatus::new();

    SheetReader::new(&first).read_into(0, &definition, &mut data, &mut status);
    SheetReader::new(&second).read_into(0, &definition, &mut data, &mut status);

    assert_eq!(status.code(), StatusCode::Success);
    let items = data.get("items").unwrap().as_list().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].get("id"), Some(&DataValue::Text("A".into())));
    assert_eq!(items[1].get("id"), Some(&DataValue::Text("B".into())));
}

#[test]
fn fatal_setting_error_stops_remaining_blocks() {
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut(0).unwrap();
    sheet.set_value_at(0, 0, "scalar").unwrap();
    sheet.set_value_at(1, 0, "A").unwrap();
    sheet.set_value_at(5, 0, "tail").unwrap();

    let definition = SheetDefinition::new(vec![
        // Binds a record at "items"...
        BlockDefinition::simple(0, 0, 0, "items").cell(0, 0, "label"),
        // ...which the loop block then refuses to treat as a collection.
        BlockDefinition::looping(1, 1, 0, "items")
            .with_break(BreakCondition::blank(0))
            .cell(1, 0, "id"),
        BlockDefinition::simple(5, 5, 0, "tail").cell(5, 0, "label"),
    ]);

    let result = SheetReader::new(&workbook).read(0, &definition);

    assert_eq!(result.status.code(), StatusCode::SettingError);
    // The trailing block never ran.
    assert_eq!(result.data.get("tail"), None);
}

#[test]
fn skip_errors_disabled_stops_after_first_recoverable_failure() {
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut(0).unwrap();
    sheet.set_value_at(0, 0, "not a number").unwrap();
    sheet.set_value_at(1, 0, "tail").unwrap();

    let definition = SheetDefinition::new(vec![
        BlockDefinition::simple(0, 0, 0, "header")
            .cell_def(CellDefinition::new(0, 0, "count").with_kind(PropertyKind::Int)),
        BlockDefinition::simple(1, 1, 0, "tail").cell(1, 0, "label"),
    ]);

    let reader = SheetReader::new(&workbook).with_options(ReadOptions {
        skip_errors: false,
        ..ReadOptions::default()
    });
    let result = reader.read(0, &definition);

    assert_eq!(result.status.code(), StatusCode::DataCollectionError);
    assert_eq!(result.data.get("tail"), None);

    // With the default options the same read processes every block.
    let relaxed = SheetReader::new(&workbook).read(0, &definition);
    assert_eq!(relaxed.status.code(), StatusCode::DataCollectionError);
    assert_eq!(
        relaxed.data.get("tail").unwrap().get("label"),
        Some(&DataValue::Text("tail".into()))
    );
}

#[test]
fn schema_typed_loop_converts_dates_and_numbers() {
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut(0).unwrap();
    let day = NaiveDate::from_ymd_opt(2023, 11, 5)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    sheet.set_value_at(2, 0, 101.0).unwrap();
    sheet.set_date_at(2, 1, day).unwrap();
    sheet.set_value_at(3, 0, 102.0).unwrap();

    let mut registry = SchemaRegistry::new();
    registry.register(
        RecordSchema::new("Entry")
            .field("id", PropertyKind::Int)
            .field("booked", PropertyKind::Date),
    );
    let definition = SheetDefinition::new(vec![BlockDefinition::looping(2, 2, 0, "entries")
        .with_target("Entry")
        .with_break(BreakCondition::blank(0))
        .cell(2, 0, "id")
        .cell(2, 1, "booked")]);

    let result = SheetReader::new(&workbook)
        .with_schemas(&registry)
        .read(0, &definition);

    assert_eq!(result.status.code(), StatusCode::Success);
    let entries = result.data.get("entries").unwrap().as_list().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].get("id"), Some(&DataValue::Int(101)));
    assert_eq!(entries[0].get("booked"), Some(&DataValue::DateTime(day)));
    // Declared fields the second row never filled are present as nulls.
    assert_eq!(entries[1].get("id"), Some(&DataValue::Int(102)));
    assert_eq!(entries[1].get("booked"), Some(&DataValue::Null));
}

#[test]
fn header_and_items_template() {
    // A typical template: a fixed header region above a repeating table.
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut(0).unwrap();
    sheet.set_value_at(0, 1, "March order").unwrap();
    sheet.set_value_at(3, 0, "pencil").unwrap();
    sheet.set_value_at(3, 1, 12.0).unwrap();
    sheet.set_value_at(4, 0, "eraser").unwrap();
    sheet.set_value_at(4, 1, 3.0).unwrap();

    let definition = SheetDefinition::new(vec![
        BlockDefinition::simple(0, 0, 0, "order").cell(0, 1, "title"),
        BlockDefinition::looping(3, 3, 0, "order.lines")
            .with_break(BreakCondition::blank(0))
            .cell(3, 0, "name")
            .cell_def(CellDefinition::new(3, 1, "quantity").with_kind(PropertyKind::Int)),
    ]);

    let result = SheetReader::new(&workbook).read(0, &definition);

    assert_eq!(result.status.code(), StatusCode::Success);
    let order = result.data.get("order").unwrap();
    assert_eq!(order.get("title"), Some(&DataValue::Text("March order".into())));
    let lines = order.get("lines").unwrap().as_list().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].get("name"), Some(&DataValue::Text("eraser".into())));
    assert_eq!(lines[1].get("quantity"), Some(&DataValue::Int(3)));

    // The graph bridges into JSON for typed consumers.
    assert_eq!(
        result.data.to_json(),
        serde_json::json!({
            "order": {
                "title": "March order",
                "lines": [
                    {"name": "pencil", "quantity": 12},
                    {"name": "eraser", "quantity": 3},
                ],
            }
        })
    );
}

#[test]
fn definition_loaded_from_json_file_drives_a_read() {
    use std::io::Write;

    let json = r#"{
        "blocks": [{
            "is_loop": true,
            "start_row": 1, "end_row": 1, "start_col": 0,
            "data_name": "items",
            "break_condition": { "col": 0 },
            "cells": [{ "row": 1, "col": 0, "data_name": "id" }]
        }]
    }"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let definition = SheetDefinition::from_json_file(file.path()).unwrap();
    assert_eq!(definition, items_definition());

    let mut workbook = Workbook::new();
    workbook.sheet_mut(0).unwrap().set_value_at(1, 0, "A").unwrap();
    let result = SheetReader::new(&workbook).read(0, &definition);

    assert_eq!(result.status.code(), StatusCode::Success);
    assert_eq!(result.data.get("items").unwrap().as_list().unwrap().len(), 1);
}

#[test]
fn multi_row_step_groups_rows_into_one_item() {
    // Each iteration spans two rows: name on the first, amount on the second.
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_mut(0).unwrap();
    sheet.set_value_at(0, 0, "first").unwrap();
    sheet.set_value_at(1, 0, 10.0).unwrap();
    sheet.set_value_at(2, 0, "second").unwrap();
    sheet.set_value_at(3, 0, 20.0).unwrap();

    let definition = SheetDefinition::new(vec![BlockDefinition::looping(0, 1, 0, "entries")
        .with_break(BreakCondition::blank(0))
        .cell(0, 0, "name")
        .cell(1, 0, "amount")]);

    let result = SheetReader::new(&workbook).read(0, &definition);

    assert_eq!(result.status.code(), StatusCode::Success);
    let entries = result.data.get("entries").unwrap().as_list().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].get("name"), Some(&DataValue::Text("first".into())));
    assert_eq!(entries[0].get("amount"), Some(&DataValue::Int(10)));
    assert_eq!(entries[1].get("name"), Some(&DataValue::Text("second".into())));
    assert_eq!(entries[1].get("amount"), Some(&DataValue::Int(20)));
}
