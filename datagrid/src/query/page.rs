//! Page request/response types exchanged with row sources.

use super::Filter;
use super::OrderBy;
use crate::model::Row;

/// A request for a window of rows.
///
/// Carries both the absolute window (`start`, `count`) used by virtual
/// scroll and the page coordinates it was derived from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageQuery {
    /// Active filter expression, if any.
    pub filter: Option<Filter>,
    /// Active ordering.
    pub order: OrderBy,
    /// Absolute index of the first requested row.
    pub start: usize,
    /// Number of requested rows.
    pub count: usize,
    /// 1-based page number.
    pub page: usize,
    /// Page size; `-1` requests every row.
    pub per_page: i64,
}

impl PageQuery {
    /// Returns `true` if `index` falls inside the requested window.
    pub fn covers(&self, index: usize) -> bool {
        index >= self.start && index < self.start + self.count
    }
}

/// A page of rows answered by a source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageResult {
    /// Rows of the window, in order, starting at the query's `start`.
    pub rows: Vec<Row>,
    /// Total number of rows matching the query.
    pub total: usize,
}

impl PageResult {
    /// Creates a new page result.
    pub fn new(rows: Vec<Row>, total: usize) -> Self {
        Self { rows, total }
    }
}
