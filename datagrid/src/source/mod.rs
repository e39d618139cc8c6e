//! Data sources the table fetches from.
//!
//! Server-side tables read rows through a [`RowSource`]; columns can load
//! their option lists through an [`OptionSource`]. Both are async and
//! object-safe so the table can hold them as `Arc<dyn _>`.

mod memory;

pub use memory::*;

use async_trait::async_trait;

use crate::error::DataAccessError;
use crate::model::SelectOption;
use crate::query::PageQuery;
use crate::query::PageResult;

/// Trait for server-side row providers.
///
/// Implementations answer a window of the filtered, sorted row set together
/// with the size of the whole set. The returned rows start at
/// `query.start`; fewer rows than `query.count` means the end was reached.
///
/// # Example
///
/// ```
/// use datagrid::model::Row;
/// use datagrid::query::PageQuery;
/// use datagrid::source::{InMemoryRowSource, RowSource};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let source = InMemoryRowSource::new((0..30).map(|i| Row::new().set("id", i)).collect());
/// let query = PageQuery { start: 10, count: 10, ..PageQuery::default() };
/// let page = source.fetch_page(&query).await.unwrap();
/// assert_eq!(page.total, 30);
/// assert_eq!(page.rows.len(), 10);
/// # });
/// ```
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetches one window of rows.
    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResult, DataAccessError>;
}

/// Trait for column option providers.
#[async_trait]
pub trait OptionSource: Send + Sync {
    /// Fetches the options of `column`.
    async fn fetch_options(&self, column: &str) -> Result<Vec<SelectOption>, DataAccessError>;
}
