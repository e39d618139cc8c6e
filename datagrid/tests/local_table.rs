use datagrid::column::Column;
use datagrid::column::ColumnSchema;
use datagrid::column::DataType;
use datagrid::model::Row;
use datagrid::model::SelectOption;
use datagrid::model::Value;
use datagrid::query::MatchMode;
use datagrid::selection::RowId;
use datagrid::selection::SelectionMode;
use datagrid::settings::Settings;
use datagrid::table::DataTable;
use datagrid::table::TableState;

fn people(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            Row::new()
                .set("id", i as i64)
                .set("age", ((i * 7) % 60) as i64)
                .set("name", format!("person {i}"))
                .set("country", if i % 2 == 0 { "BE" } else { "FR" })
        })
        .collect()
}

fn table_with(settings: Settings, rows: Vec<Row>) -> DataTable {
    let columns = Column::from_schemas(
        [
            ColumnSchema::new("id").data_type(DataType::Number),
            ColumnSchema::new("age").data_type(DataType::Number),
            ColumnSchema::new("name"),
            ColumnSchema::new("country").options(vec![
                SelectOption::new("BE", "Belgium"),
                SelectOption::new("FR", "France"),
            ]),
        ],
        &settings,
    )
    .unwrap();
    DataTable::new(settings, columns).unwrap().with_rows(rows)
}

#[test]
fn test_age_filter_scenario() {
    let rows = [5, 15, 25]
        .into_iter()
        .map(|age| Row::new().set("age", age))
        .collect();
    let mut table = table_with(Settings::default(), rows);
    table
        .set_filter("age", Value::from(10), MatchMode::GreaterThan, None)
        .unwrap();

    let ages: Vec<Value> = table
        .visible_rows()
        .iter()
        .filter_map(|r| r.row.and_then(|row| row.get("age")).cloned())
        .collect();
    assert_eq!(ages, vec![Value::Int(15), Value::Int(25)]);
    assert_eq!(table.state(), TableState::LocalIdle);
}

#[test]
fn test_second_page_of_25_rows() {
    let mut table = table_with(Settings::default(), people(25));
    assert_eq!(table.set_page(2), 2);
    let ids: Vec<RowId> = table.visible_rows().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, (10..20).map(RowId::Local).collect::<Vec<_>>());
    assert_eq!(table.get_local_rows(), table.get_local_rows());
}

#[test]
fn test_filtered_rows_satisfy_every_predicate() {
    let rows = people(40);
    for threshold in [0, 10, 33, 59, 70] {
        let mut table = table_with(Settings::default().with_per_page(-1), rows.clone());
        table
            .set_filter("age", Value::from(threshold), MatchMode::GreaterThanOrEqual, None)
            .unwrap();
        table
            .set_filter("name", Value::from("1"), MatchMode::Contains, None)
            .unwrap();

        let expected = rows
            .iter()
            .filter(|r| r.get("age").and_then(Value::as_f64).unwrap_or(0.0) >= threshold as f64)
            .filter(|r| r.get("name").is_some_and(|n| n.to_text().contains('1')))
            .count();
        assert_eq!(table.total(), expected);
        for visible in table.visible_rows() {
            let row = visible.row.unwrap();
            assert!(row.get("age").and_then(Value::as_f64).unwrap() >= threshold as f64);
        }
    }
}

#[test]
fn test_filter_and_sort_reset_page_and_selection() {
    let mut table = table_with(Settings::default(), people(50));
    let mut selections = table.events().selection.subscribe();

    table.set_page(3);
    table.select_at(20);
    assert_eq!(table.get_selection(), [RowId::Local(20)]);

    table
        .set_filter("age", Value::from(5), MatchMode::GreaterThan, None)
        .unwrap();
    assert_eq!(table.pager().current(), 1);
    assert!(table.get_selection().is_empty());

    table.set_page(2);
    table.select_at(12);
    table.toggle_sort("name", false).unwrap();
    assert_eq!(table.pager().current(), 1);
    assert!(table.get_selection().is_empty());

    let events = selections.drain();
    assert_eq!(events.len(), 4);
    assert_eq!(events[1].removed, vec![RowId::Local(20)]);
}

#[test]
fn test_single_select_a_then_b() {
    let mut table = table_with(Settings::default(), people(5));
    table.select(RowId::Local(0));
    table.select(RowId::Local(1));
    assert_eq!(table.get_selection(), [RowId::Local(1)]);
}

#[test]
fn test_multi_select_toggles() {
    let settings = Settings::default().with_selection_mode(SelectionMode::Multi);
    let mut table = table_with(settings, people(5));
    table.select(RowId::Local(0));
    table.select(RowId::Local(3));
    table.select(RowId::Local(0));
    assert_eq!(table.get_selection(), [RowId::Local(3)]);
}

#[test]
fn test_filter_event_reports_total() {
    let mut table = table_with(Settings::default(), people(30));
    let mut filters = table.events().filter.subscribe();
    table
        .set_filter("country", Value::from("BE"), MatchMode::Equals, None)
        .unwrap();
    let event = filters.try_recv().unwrap();
    assert_eq!(event.column.as_deref(), Some("country"));
    assert_eq!(event.total, 15);

    table.clear_filter("country").unwrap();
    assert_eq!(filters.try_recv().unwrap().total, 30);
}

#[test]
fn test_global_filter_matches_option_labels() {
    let mut table = table_with(Settings::default().with_per_page(-1), people(10));
    table.set_global_filter(Some("franc".into()));
    assert_eq!(table.total(), 5);
    table.set_global_filter(None);
    assert_eq!(table.total(), 10);
}

#[test]
fn test_numeric_strings_sort_numerically() {
    let rows = ["9", "10", "100", "2"]
        .into_iter()
        .map(|id| Row::new().set("id", id))
        .collect();
    let mut table = table_with(Settings::default(), rows);
    table.toggle_sort("id", false).unwrap();
    let ids: Vec<String> = table
        .visible_rows()
        .iter()
        .filter_map(|r| r.row.and_then(|row| row.key("id")))
        .collect();
    assert_eq!(ids, ["2", "9", "10", "100"]);
}

#[test]
fn test_set_rows_recomputes_and_clears_selection() {
    let mut table = table_with(Settings::default(), people(30));
    table
        .set_filter("country", Value::from("FR"), MatchMode::Equals, None)
        .unwrap();
    table.select_at(0);

    table.set_rows(people(10));
    assert_eq!(table.total(), 5);
    assert!(table.get_selection().is_empty());
}

#[test]
fn test_page_size_change() {
    let mut table = table_with(Settings::default(), people(45));
    table.set_page(4);
    let mut pages = table.events().page.subscribe();

    table.set_per_page(20).unwrap();
    assert_eq!(table.pager().current(), 1);
    assert_eq!(table.chunk(), 0..20);
    assert_eq!(pages.try_recv().map(|p| p.per_page), Some(20));

    assert!(table.set_per_page(0).is_err());
    table.set_per_page(-1).unwrap();
    assert_eq!(table.visible_rows().len(), 45);
}

#[test]
fn test_dotted_path_columns() {
    let settings = Settings::default();
    let columns = Column::from_schemas([ColumnSchema::new("a.b.c")], &settings).unwrap();
    let rows = vec![
        Row::new().set("a", Row::new().set("b", Row::new().set("c", 5))),
        Row::new().set("a", Row::new().set("x", Row::new().set("c", 6))),
    ];
    let table = DataTable::new(settings, columns).unwrap().with_rows(rows);
    let column = table.column("a.b.c").unwrap();
    assert_eq!(column.get_value(&table.rows()[0]), Value::from(5));
    assert_eq!(column.get_value(&table.rows()[1]), Value::Null);
}

#[test]
fn test_set_width_is_clamping_idempotent() {
    let settings = Settings::default();
    let mut column =
        Column::new(ColumnSchema::new("a").width_bounds(80, 300), &settings).unwrap();
    for width in [0, 79, 80, 150, 300, 301, u32::MAX] {
        let once = column.set_width(width);
        assert!((80..=300).contains(&once));
        assert_eq!(column.set_width(once), once);
    }
}
