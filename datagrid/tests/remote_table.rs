use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use datagrid::column::Column;
use datagrid::column::ColumnSchema;
use datagrid::column::DataType;
use datagrid::error::DataAccessError;
use datagrid::error::GridError;
use datagrid::model::Row;
use datagrid::model::SelectOption;
use datagrid::model::Value;
use datagrid::query::MatchMode;
use datagrid::query::PageQuery;
use datagrid::query::PageResult;
use datagrid::selection::RowId;
use datagrid::settings::Settings;
use datagrid::source::InMemoryRowSource;
use datagrid::source::RowSource;
use datagrid::table::DataTable;
use datagrid::table::TableState;

fn people(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            Row::new()
                .set("id", i as i64)
                .set("age", ((i * 7) % 60) as i64)
        })
        .collect()
}

fn remote_settings() -> Settings {
    Settings::default()
        .with_client_side(false)
        .with_row_key("id")
}

fn remote_table(settings: Settings) -> DataTable {
    let columns = Column::from_schemas(
        [
            ColumnSchema::new("id").data_type(DataType::Number),
            ColumnSchema::new("age").data_type(DataType::Number),
        ],
        &settings,
    )
    .unwrap();
    DataTable::new(settings, columns).unwrap()
}

/// Fails the next request once, then serves rows.
struct FlakySource {
    inner: InMemoryRowSource,
    fail_next: AtomicBool,
}

#[async_trait]
impl RowSource for FlakySource {
    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResult, DataAccessError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DataAccessError::fetch("backend unavailable"));
        }
        self.inner.fetch_page(query).await
    }
}

#[tokio::test]
async fn test_first_fetch_fills_the_page() {
    let source = Arc::new(InMemoryRowSource::new(people(25)));
    let mut table = remote_table(remote_settings()).with_source(source.clone());
    assert_eq!(table.state(), TableState::RemoteLoading);

    assert_eq!(table.sync_remote().await.unwrap(), 1);
    assert_eq!(table.state(), TableState::RemoteIdle);
    assert_eq!(table.total(), 25);
    assert_eq!(table.pager().total_pages(), 3);
    assert_eq!(source.request_count(), 1);

    let rows = table.visible_rows();
    assert_eq!(rows.len(), 10);
    assert!(rows.iter().all(|r| r.row.is_some()));
    assert_eq!(rows[3].id, RowId::Remote("3".into()));
}

#[tokio::test]
async fn test_stale_result_is_ignored() {
    let source = InMemoryRowSource::new(people(25));
    let mut table = remote_table(remote_settings());
    let first = table.take_pending_fetches().remove(0);

    table
        .set_filter("age", Value::from(30), MatchMode::GreaterThan, None)
        .unwrap();
    let second = table.take_pending_fetches().remove(0);
    assert!(second.generation > first.generation);
    assert!(second.query.filter.is_some());

    let stale = source.fetch_page(&first.query).await;
    assert!(!table.complete_fetch(first, stale));
    assert_eq!(table.total(), 0);
    assert!(table.is_loading());

    let current = source.fetch_page(&second.query).await;
    assert!(table.complete_fetch(second, current));
    let expected = people(25)
        .iter()
        .filter(|r| r.get("age").and_then(Value::as_f64).unwrap() > 30.0)
        .count();
    assert_eq!(table.total(), expected);
    assert!(!table.is_loading());
}

#[tokio::test]
async fn test_failed_fetch_recovers_on_next_change() {
    let source = Arc::new(FlakySource {
        inner: InMemoryRowSource::new(people(25)),
        fail_next: AtomicBool::new(true),
    });
    let mut table = remote_table(remote_settings()).with_source(source);
    let mut loading = table.events().loading.subscribe();

    let err = table.sync_remote().await.unwrap_err();
    assert!(matches!(err, GridError::DataAccess(DataAccessError::Fetch { .. })));
    assert_eq!(table.state(), TableState::RemoteError);
    assert!(!table.is_loading());
    assert!(table.last_error().is_some());
    assert_eq!(table.window().loaded_count(), 0);
    assert_eq!(loading.drain(), vec![false]);

    table.refresh();
    assert_eq!(table.sync_remote().await.unwrap(), 1);
    assert_eq!(table.state(), TableState::RemoteIdle);
    assert!(table.last_error().is_none());
    assert_eq!(table.total(), 25);
    assert_eq!(loading.drain(), vec![true, false]);
}

#[tokio::test]
async fn test_filter_and_sort_reach_the_source() {
    let source = Arc::new(InMemoryRowSource::new(people(40)));
    let mut table = remote_table(remote_settings()).with_source(source);
    table.sync_remote().await.unwrap();

    table
        .set_filter("age", Value::from(30), MatchMode::GreaterThan, None)
        .unwrap();
    table.toggle_sort("age", false).unwrap();
    table.sync_remote().await.unwrap();

    let ages: Vec<f64> = table
        .visible_rows()
        .iter()
        .map(|r| r.row.and_then(|row| row.get("age")).and_then(Value::as_f64).unwrap())
        .collect();
    assert!(!ages.is_empty());
    assert!(ages.iter().all(|age| *age > 30.0));
    assert!(ages.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[tokio::test]
async fn test_page_change_replaces_rows() {
    let source = Arc::new(InMemoryRowSource::new(people(25)));
    let mut table = remote_table(remote_settings()).with_source(source.clone());
    table.sync_remote().await.unwrap();

    let generation = table.generation();
    assert_eq!(table.set_page(3), 3);
    assert!(table.generation() > generation);
    table.sync_remote().await.unwrap();

    assert_eq!(table.window().loaded_count(), 5);
    let ids: Vec<RowId> = table.visible_rows().into_iter().map(|r| r.id).collect();
    assert_eq!(
        ids,
        (20..25).map(|i| RowId::Remote(i.to_string())).collect::<Vec<_>>()
    );
    assert_eq!(source.request_count(), 2);
}

#[tokio::test]
async fn test_virtual_scroll_fetches_each_page_once() {
    let settings = remote_settings()
        .with_virtual_scroll(true)
        .with_row_height(10)
        .with_viewport_height(50);
    let source = Arc::new(InMemoryRowSource::new(people(100)));
    let mut table = remote_table(settings).with_source(source.clone());
    table.sync_remote().await.unwrap();
    assert_eq!(table.total(), 100);
    assert_eq!(table.window().loaded_count(), 10);

    table.scroll_to(150);
    assert_eq!(table.pager().current(), 2);
    assert_eq!(table.take_pending_fetches().len(), 2);
    let placeholders = table
        .visible_rows()
        .into_iter()
        .filter(|r| (15..20).contains(&r.position))
        .all(|r| r.row.is_none());
    assert!(placeholders);

    table.scroll_to(150);
    table.scroll_to(100);
    assert!(table.take_pending_fetches().is_empty());

    // The dropped tickets left pages 2 and 3 unloaded; a refresh starts over.
    table.refresh();
    table.sync_remote().await.unwrap();
    table.scroll_to(150);
    table.sync_remote().await.unwrap();
    let loaded = table
        .visible_rows()
        .into_iter()
        .filter(|r| (15..20).contains(&r.position))
        .all(|r| r.row.is_some());
    assert!(loaded);
    assert_eq!(table.window().loaded_count(), 30);
    assert_eq!(source.request_count(), 4);
}

#[tokio::test]
async fn test_virtual_viewport_spanning_pages_loads_every_rendered_row() {
    let settings = remote_settings().with_virtual_scroll(true);
    let source = Arc::new(InMemoryRowSource::new(people(100)));
    let mut table = remote_table(settings).with_source(source.clone());
    let mut loading = table.events().loading.subscribe();

    table.sync_remote().await.unwrap();
    assert_eq!(table.chunk(), 0..17);
    assert!(table.visible_rows().iter().all(|r| r.row.is_some()));
    assert!(table.take_pending_fetches().is_empty());
    assert_eq!(source.request_count(), 2);
    assert_eq!(table.state(), TableState::RemoteIdle);
    assert_eq!(loading.drain(), vec![false]);

    table
        .set_filter("age", Value::from(10), MatchMode::GreaterThan, None)
        .unwrap();
    table.sync_remote().await.unwrap();
    let rows = table.visible_rows();
    assert_eq!(rows.len(), 17);
    assert!(rows.iter().all(|r| r.row.is_some()));
    assert_eq!(loading.drain(), vec![true, false]);
}

#[tokio::test]
async fn test_local_table_has_nothing_to_fetch() {
    let settings = Settings::default();
    let columns = Column::from_schemas([ColumnSchema::new("id")], &settings).unwrap();
    let mut table = DataTable::new(settings, columns).unwrap().with_rows(people(3));
    assert!(!table.fetch().await.unwrap());
    assert_eq!(table.sync_remote().await.unwrap(), 0);
    assert_eq!(table.total(), 3);
}

#[tokio::test]
async fn test_missing_source_is_an_error() {
    let mut table = remote_table(remote_settings());
    assert!(table.sync_remote().await.is_err());
}

#[tokio::test]
async fn test_global_search_matches_labels_in_both_modes() {
    let rows: Vec<Row> = [("Ann", "BE"), ("Bob", "FR"), ("Bert", "NL")]
        .into_iter()
        .map(|(name, country)| Row::new().set("name", name).set("country", country))
        .collect();
    let schemas = || {
        [
            ColumnSchema::new("name"),
            ColumnSchema::new("country").options(vec![
                SelectOption::new("BE", "Belgium"),
                SelectOption::new("FR", "France"),
            ]),
        ]
    };

    let settings = Settings::default();
    let columns = Column::from_schemas(schemas(), &settings).unwrap();
    let mut local = DataTable::new(settings, columns).unwrap().with_rows(rows.clone());

    let settings = remote_settings();
    let columns = Column::from_schemas(schemas(), &settings).unwrap();
    let mut remote = DataTable::new(settings, columns)
        .unwrap()
        .with_source(Arc::new(InMemoryRowSource::new(rows)));

    for text in ["belg", "be", "fr", "nl", "bert"] {
        local.set_global_filter(Some(text.into()));
        remote.set_global_filter(Some(text.into()));
        remote.sync_remote().await.unwrap();
        assert_eq!(local.total(), remote.total(), "search '{text}'");
    }
    local.set_global_filter(Some("belg".into()));
    assert_eq!(local.total(), 1);
}
