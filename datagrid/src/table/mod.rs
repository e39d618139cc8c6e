//! The table orchestrator.
//!
//! [`DataTable`] owns the columns, rows, settings and every piece of derived
//! state, and keeps them consistent. Each public mutation updates the state
//! it owns and then raises a [`Trigger`]; the dispatcher looks the trigger
//! up in the transition table and runs its steps in order.

mod fetch;
mod state;
mod transition;

use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;

pub use fetch::*;
pub use state::*;
pub use transition::*;

use crate::column::Column;
use crate::dimensions::Dimensions;
use crate::dimensions::ResizeOutcome;
use crate::dimensions::ResizeState;
use crate::error::ConfigError;
use crate::error::DataAccessError;
use crate::error::FieldValidationError;
use crate::events::EventBus;
use crate::events::FilterChanged;
use crate::events::PageChanged;
use crate::events::ResizeMove;
use crate::events::ScrollEvent;
use crate::events::SelectionChanged;
use crate::events::SortChanged;
use crate::model::Row;
use crate::model::SelectOption;
use crate::model::Value;
use crate::pager::DataPager;
use crate::query::DataFilter;
use crate::query::Direction;
use crate::query::MatchMode;
use crate::query::OrderBy;
use crate::selection::RowId;
use crate::selection::Selection;
use crate::settings::Settings;
use crate::settings::TableConfig;
use crate::source::RowSource;
use crate::virtualizer::RowVirtualizer;
use crate::window::SparseWindow;

/// A rendered row position.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow<'a> {
    /// Position in the filtered, sorted row set.
    pub position: usize,
    /// Stable identity, used for selection.
    pub id: RowId,
    /// The row; `None` while a server row is still loading.
    pub row: Option<&'a Row>,
}

/// A data grid: columns plus rows, filtered, sorted, paged and virtualized.
///
/// In local mode (`client_side`) the table holds every row and derives the
/// visible ones itself. In server mode it holds a [`SparseWindow`] and asks
/// a [`RowSource`] for the rows it needs through [`FetchTicket`]s.
///
/// # Example
///
/// ```
/// use datagrid::column::{Column, ColumnSchema, DataType};
/// use datagrid::model::{Row, Value};
/// use datagrid::query::MatchMode;
/// use datagrid::settings::Settings;
/// use datagrid::table::DataTable;
///
/// let settings = Settings::default();
/// let columns = Column::from_schemas(
///     [ColumnSchema::new("age").data_type(DataType::Number)],
///     &settings,
/// ).unwrap();
/// let rows = [5, 15, 25].into_iter().map(|age| Row::new().set("age", age)).collect();
///
/// let mut table = DataTable::new(settings, columns).unwrap().with_rows(rows);
/// table.set_filter("age", Value::from(10), MatchMode::GreaterThan, None).unwrap();
/// assert_eq!(table.total(), 2);
/// ```
pub struct DataTable {
    settings: Settings,
    columns: Vec<Column>,
    rows: Vec<Row>,
    /// Source indices of local rows passing the filter, in sort order.
    view: Vec<usize>,
    filter: DataFilter,
    order: OrderBy,
    pager: DataPager,
    selection: Selection,
    dimensions: Dimensions,
    virtualizer: RowVirtualizer,
    window: SparseWindow,
    events: EventBus,
    state: TableState,
    source: Option<Arc<dyn RowSource>>,
    /// Current generation of server queries; older results are stale.
    generation: u64,
    /// Fetches of the current generation not completed yet.
    in_flight: usize,
    /// Tickets issued by the dispatcher and not handed out yet.
    pending: Vec<FetchTicket>,
    last_error: Option<DataAccessError>,
    /// Rendered positions.
    chunk: Range<usize>,
    /// Positions newly covered by the last chunk update.
    appended: Vec<usize>,
    queue: VecDeque<Trigger>,
    dispatching: bool,
}

impl DataTable {
    /// Creates a table from built columns.
    ///
    /// Column indices are reassigned in order. A server-side table issues
    /// its first fetch immediately.
    pub fn new(settings: Settings, mut columns: Vec<Column>) -> Result<Self, ConfigError> {
        let mut names = HashSet::new();
        for (index, column) in columns.iter_mut().enumerate() {
            if !names.insert(column.name().to_string()) {
                return Err(ConfigError::DuplicateColumn(column.name().to_string()));
            }
            column.set_index(index);
        }
        let pager = DataPager::new(settings.per_page)?
            .with_page_size_options(settings.page_size_options.clone());
        let mut dimensions = Dimensions::new(&settings);
        dimensions.calc_columns_total_width(&columns);

        let mut table = Self {
            selection: Selection::new(settings.selection_mode),
            virtualizer: RowVirtualizer::new(&settings),
            state: TableState::idle(settings.client_side),
            settings,
            columns,
            rows: Vec::new(),
            view: Vec::new(),
            filter: DataFilter::new(),
            order: OrderBy::new(),
            pager,
            dimensions,
            window: SparseWindow::new(),
            events: EventBus::new(),
            source: None,
            generation: 0,
            in_flight: 0,
            pending: Vec::new(),
            last_error: None,
            chunk: 0..0,
            appended: Vec::new(),
            queue: VecDeque::new(),
            dispatching: false,
        };
        table.dispatch(Trigger::RowsReplaced);
        Ok(table)
    }

    /// Creates a table from a declarative config.
    pub fn from_config(config: TableConfig) -> Result<Self, ConfigError> {
        let columns = Column::from_schemas(config.columns, &config.settings)?;
        Self::new(config.settings, columns)
    }

    /// Replaces the local rows (builder pattern).
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.set_rows(rows);
        self
    }

    /// Sets the row source used by [`sync_remote`](Self::sync_remote).
    pub fn with_source(mut self, source: Arc<dyn RowSource>) -> Self {
        self.source = Some(source);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.visible())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    fn column_position(&self, name: &str) -> Result<usize, ConfigError> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| ConfigError::UnknownColumn(name.to_string()))
    }

    /// The local rows as given.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn filter(&self) -> &DataFilter {
        &self.filter
    }

    pub fn order(&self) -> &OrderBy {
        &self.order
    }

    pub fn pager(&self) -> &DataPager {
        &self.pager
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn virtualizer(&self) -> &RowVirtualizer {
        &self.virtualizer
    }

    /// Server rows fetched so far.
    pub fn window(&self) -> &SparseWindow {
        &self.window
    }

    /// Channels to subscribe to.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn state(&self) -> TableState {
        self.state
    }

    /// Returns `true` while server rows are being fetched.
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// The error of the last failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&DataAccessError> {
        self.last_error.as_ref()
    }

    /// Rows matching the current filter.
    pub fn total(&self) -> usize {
        if self.settings.client_side {
            self.view.len()
        } else {
            self.window.total()
        }
    }

    /// Rendered positions.
    pub fn chunk(&self) -> Range<usize> {
        self.chunk.clone()
    }

    /// Positions newly rendered by the last chunk update.
    pub fn appended(&self) -> &[usize] {
        &self.appended
    }

    fn mode(&self) -> Mode {
        Mode {
            client_side: self.settings.client_side,
            virtual_scroll: self.settings.virtual_scroll,
        }
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Replaces the local rows and recomputes the view. In server mode this
    /// refreshes from the source instead.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        if self.settings.client_side {
            self.rows = rows;
        } else if !rows.is_empty() {
            log::warn!("Ignoring {} local rows on a server-side table", rows.len());
        }
        self.dispatch(Trigger::RowsReplaced);
    }

    /// Re-fetches the server rows under a new generation.
    pub fn refresh(&mut self) {
        self.dispatch(Trigger::RowsReplaced);
    }

    /// Filters, sorts and counts the local rows, returning the source
    /// indices of the current page.
    pub fn get_local_rows(&mut self) -> Vec<usize> {
        self.recompute();
        self.pager.pager(&self.view).to_vec()
    }

    fn recompute(&mut self) {
        self.state = TableState::LocalRecomputing;
        let mut view = self.filter.apply(&self.rows, &self.columns);
        self.order.sort_indices(&self.rows, &mut view);
        log::trace!("Recomputed view: {} of {} rows", view.len(), self.rows.len());
        self.view = view;
        self.pager.set_total(self.view.len());
        self.state = TableState::LocalIdle;
    }

    /// Identity of the row at `position` of the view.
    pub fn row_id(&self, position: usize) -> Option<RowId> {
        if self.settings.client_side {
            return self.view.get(position).copied().map(RowId::Local);
        }
        let slot = self.window.get(position)?;
        Some(self.remote_id(position, slot.row()))
    }

    fn remote_id(&self, position: usize, row: Option<&Row>) -> RowId {
        match (&self.settings.row_key, row) {
            (Some(field), Some(row)) => row
                .key(field)
                .map(RowId::Remote)
                .unwrap_or(RowId::Local(position)),
            _ => RowId::Local(position),
        }
    }

    /// The row at `position` of the view, if loaded.
    pub fn row_at(&self, position: usize) -> Option<&Row> {
        if self.settings.client_side {
            self.view.get(position).and_then(|&i| self.rows.get(i))
        } else {
            self.window.get(position).and_then(|slot| slot.row())
        }
    }

    /// Rows of the current chunk, with loading placeholders in server mode.
    pub fn visible_rows(&self) -> Vec<VisibleRow<'_>> {
        self.chunk
            .clone()
            .filter_map(|position| {
                let row = self.row_at(position);
                if self.settings.client_side && row.is_none() {
                    return None;
                }
                let id = if self.settings.client_side {
                    RowId::Local(self.view[position])
                } else {
                    self.remote_id(position, row)
                };
                Some(VisibleRow { position, id, row })
            })
            .collect()
    }

    /// Recomputes the rendered chunk.
    ///
    /// With `reset` the whole chunk counts as new; otherwise only positions
    /// not rendered before are reported through [`appended`](Self::appended).
    pub fn chunk_rows(&mut self, reset: bool) -> &[usize] {
        let total = self.total();
        let range = if self.settings.virtual_scroll {
            self.virtualizer.visible_range(total)
        } else {
            self.pager.start_index().min(total)..self.pager.end_index()
        };
        self.appended = if reset {
            range.clone().collect()
        } else {
            range.clone().filter(|p| !self.chunk.contains(p)).collect()
        };
        log::trace!("Chunk {range:?}, {} new", self.appended.len());
        self.chunk = range;
        &self.appended
    }

    // =========================================================================
    // Filter and sort
    // =========================================================================

    /// Filters `column` by `value`, using the column's data type.
    ///
    /// Ignored for columns that cannot be filtered.
    pub fn set_filter(
        &mut self,
        column: &str,
        value: Value,
        match_mode: MatchMode,
        value_to: Option<Value>,
    ) -> Result<(), ConfigError> {
        let position = self.column_position(column)?;
        let column = &self.columns[position];
        if !column.filterable() {
            log::debug!("Column '{}' is not filterable", column.name());
            return Ok(());
        }
        let name = column.name().to_string();
        self.filter
            .set_filter(value, &name, match_mode, value_to, column.data_type());
        self.dispatch(Trigger::FilterChanged(Some(name)));
        Ok(())
    }

    /// Removes the filter on `column`.
    pub fn clear_filter(&mut self, column: &str) -> Result<(), ConfigError> {
        self.column_position(column)?;
        if self.filter.clear_filter(column) {
            self.dispatch(Trigger::FilterChanged(Some(column.to_string())));
        }
        Ok(())
    }

    /// Removes every filter, including the global search.
    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.dispatch(Trigger::FilterChanged(None));
    }

    /// Sets the text searched for in every visible column.
    pub fn set_global_filter(&mut self, text: Option<String>) {
        self.filter.set_global(text);
        self.dispatch(Trigger::FilterChanged(None));
    }

    /// Cycles the sort on `column`: none → asc → desc → none.
    ///
    /// With `multi` other sorted columns are kept as secondary keys.
    pub fn toggle_sort(&mut self, column: &str, multi: bool) -> Result<(), ConfigError> {
        let position = self.column_position(column)?;
        let column = &self.columns[position];
        if !column.sortable() {
            log::debug!("Column '{}' is not sortable", column.name());
            return Ok(());
        }
        let name = column.name().to_string();
        self.order.toggle(&name, column.data_type(), multi);
        self.dispatch(Trigger::SortChanged(name));
        Ok(())
    }

    /// Replaces the ordering. Unknown or unsortable columns are rejected.
    pub fn set_order(&mut self, order: OrderBy) -> Result<(), ConfigError> {
        for key in order.fields() {
            let position = self.column_position(&key.field)?;
            if !self.columns[position].sortable() {
                return Err(ConfigError::NotSortable(key.field.clone()));
            }
        }
        let column = order
            .fields()
            .first()
            .map(|key| key.field.clone())
            .unwrap_or_default();
        self.order = order;
        self.dispatch(Trigger::SortChanged(column));
        Ok(())
    }

    /// Removes a column together with its filter and sort.
    pub fn remove_column(&mut self, name: &str) -> Result<Column, ConfigError> {
        let position = self.column_position(name)?;
        let column = self.columns.remove(position);
        for (index, column) in self.columns.iter_mut().enumerate() {
            column.set_index(index);
        }
        self.dimensions.calc_columns_total_width(&self.columns);

        let had_sort = self.order.direction_of(name).is_some();
        if had_sort {
            let mut order = OrderBy::new();
            for key in self.order.fields().iter().filter(|k| k.field != name) {
                order = match key.direction {
                    Direction::Asc => order.then_asc(&key.field, key.data_type),
                    Direction::Desc => order.then_desc(&key.field, key.data_type),
                };
            }
            self.order = order;
        }
        if self.filter.clear_filter(name) {
            self.dispatch(Trigger::FilterChanged(Some(name.to_string())));
        } else if had_sort {
            self.dispatch(Trigger::SortChanged(name.to_string()));
        }
        Ok(column)
    }

    /// Shows or hides a column.
    pub fn set_column_visible(&mut self, name: &str, visible: bool) -> Result<(), ConfigError> {
        let position = self.column_position(name)?;
        self.columns[position].set_visible(visible);
        self.dimensions.calc_columns_total_width(&self.columns);
        Ok(())
    }

    // =========================================================================
    // Paging and scrolling
    // =========================================================================

    /// Moves to `page` (clamped). Returns the page moved to.
    pub fn set_page(&mut self, page: usize) -> usize {
        let before = self.pager.current();
        let page = self.pager.set_current(page);
        if page != before {
            self.dispatch(Trigger::PageChanged);
        }
        page
    }

    /// Changes the page size; `-1` shows every row.
    pub fn set_per_page(&mut self, per_page: i64) -> Result<(), ConfigError> {
        self.pager.set_per_page(per_page)?;
        self.virtualizer.set_per_page(per_page);
        self.dispatch(Trigger::PageSizeChanged);
        Ok(())
    }

    /// Scrolls the body to `offset` pixels.
    pub fn scroll_to(&mut self, offset: u64) {
        self.virtualizer.set_scroll_top(offset);
        self.dispatch(Trigger::Scrolled);
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Selects a row (replace in single mode, toggle in multi mode).
    pub fn select(&mut self, id: RowId) {
        let (added, removed) = self.selection.select(id);
        self.emit_selection(added, removed);
    }

    /// Selects the row at `position` of the view.
    pub fn select_at(&mut self, position: usize) -> Option<RowId> {
        let id = self.row_id(position)?;
        self.select(id.clone());
        Some(id)
    }

    /// Selects every row between the anchor and `target`, in view order.
    pub fn range_select(&mut self, target: RowId) {
        let ordered: Vec<RowId> = if self.settings.client_side {
            self.view.iter().copied().map(RowId::Local).collect()
        } else {
            self.window
                .loaded_in(0..self.window.total())
                .map(|(position, row)| self.remote_id(position, Some(row)))
                .collect()
        };
        let (added, removed) = self.selection.range_select(target, &ordered);
        self.emit_selection(added, removed);
    }

    /// Selected rows in the order they were selected.
    pub fn get_selection(&self) -> &[RowId] {
        self.selection.get_selection()
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        let removed = self.selection.clear_selection();
        self.emit_selection(vec![], removed);
    }

    fn emit_selection(&self, added: Vec<RowId>, removed: Vec<RowId>) {
        if added.is_empty() && removed.is_empty() {
            return;
        }
        self.events.selection.emit(SelectionChanged {
            selection: self.selection.get_selection().to_vec(),
            added,
            removed,
        });
    }

    // =========================================================================
    // Column resize
    // =========================================================================

    /// Starts resizing `column` at pointer position `x`.
    pub fn resize_begin(&mut self, column: &str, x: i32) -> Result<ResizeState, ConfigError> {
        let position = self.column_position(column)?;
        let body = self
            .virtualizer
            .total_height(self.total())
            .min(u64::from(self.settings.viewport_height));
        let table_height = u32::try_from(body)
            .unwrap_or(u32::MAX)
            .saturating_add(self.dimensions.header_row_height);
        let state = self
            .dimensions
            .resize_begin(&self.columns[position], x, table_height);
        self.events.resize_begin.emit(state);
        Ok(state)
    }

    /// Moves the resize guide.
    pub fn resize_move(&mut self, x: i32) {
        let Some(column) = self.dimensions.resizing().map(|r| r.column) else {
            return;
        };
        self.dimensions.resize_move(x);
        self.events.resize_move.emit(ResizeMove { column, x });
    }

    /// Commits the resize at `x`.
    pub fn resize_end(&mut self, x: i32) -> Option<ResizeOutcome> {
        let outcome =
            self.dimensions
                .resize_end(&mut self.columns, x, self.settings.column_resize_mode)?;
        self.events.resize_end.emit(outcome);
        Some(outcome)
    }

    // =========================================================================
    // Validation and options
    // =========================================================================

    /// Validates every column of a row.
    pub fn validate_row(&self, row: &Row) -> Vec<FieldValidationError> {
        self.columns
            .iter()
            .flat_map(|column| {
                column
                    .validate(&column.get_value(row))
                    .into_iter()
                    .map(|message| FieldValidationError::new(column.name(), message))
            })
            .collect()
    }

    /// Loads the filter values of every filterable column concurrently.
    pub async fn load_filter_values(
        &self,
    ) -> Result<HashMap<String, Vec<SelectOption>>, DataAccessError> {
        let columns: Vec<&Column> = self.columns.iter().filter(|c| c.filterable()).collect();
        let results =
            futures::future::join_all(columns.iter().map(|c| c.get_filter_values())).await;
        columns
            .into_iter()
            .zip(results)
            .map(|(column, values)| Ok((column.name().to_string(), values?)))
            .collect()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Queues a trigger and, unless already dispatching, runs the queue.
    fn dispatch(&mut self, trigger: Trigger) {
        self.queue.push_back(trigger);
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        while let Some(trigger) = self.queue.pop_front() {
            let steps = transition::steps(&trigger, self.mode());
            log::debug!("{trigger:?} in {:?}: {steps:?}", self.state);
            for step in steps {
                self.run(step);
            }
        }
        self.dispatching = false;
    }

    fn run(&mut self, step: Step) {
        match step {
            Step::ResetPage => {
                self.pager.set_current(1);
            }
            Step::ClearSelection => self.clear_selection(),
            Step::ClearPageCache => self.pager.clear_cache(),
            Step::Recompute => self.recompute(),
            Step::RequestFetch => {
                let ticket = self.begin_fetch();
                self.pending.push(ticket);
            }
            Step::FetchVisiblePages => self.fetch_visible_pages(),
            Step::ResetScroll => self.virtualizer.set_scroll_top(0),
            Step::ScrollToPage => {
                let offset = self.virtualizer.calc_page_offset_y(self.pager.current());
                self.virtualizer.set_scroll_top(offset);
            }
            Step::SyncPageFromScroll => {
                let before = self.pager.current();
                let page = self
                    .virtualizer
                    .page_from_offset(self.virtualizer.scroll_top());
                if self.pager.set_current(page) != before {
                    self.events.page.emit(PageChanged {
                        page: self.pager.current(),
                        per_page: self.pager.per_page(),
                    });
                }
            }
            Step::ChunkRows { reset } => {
                self.chunk_rows(reset);
            }
            Step::EmitFilter(column) => {
                self.events.filter.emit(FilterChanged {
                    column,
                    total: self.total(),
                });
            }
            Step::EmitSort(column) => {
                let direction = self.order.direction_of(&column);
                self.events.sort.emit(SortChanged { column, direction });
            }
            Step::EmitPage => {
                self.events.page.emit(PageChanged {
                    page: self.pager.current(),
                    per_page: self.pager.per_page(),
                });
            }
            Step::EmitScroll => {
                self.events.scroll.emit(ScrollEvent {
                    offset: self.virtualizer.scroll_top(),
                    range: self.chunk.clone(),
                });
            }
        }
    }
}

impl std::fmt::Debug for DataTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataTable")
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("total", &self.total())
            .field("state", &self.state)
            .field("page", &self.pager.current())
            .field("generation", &self.generation)
            .finish()
    }
}
