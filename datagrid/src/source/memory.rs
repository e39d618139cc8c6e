//! In-memory sources

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;

use super::OptionSource;
use super::RowSource;
use crate::error::DataAccessError;
use crate::model::Row;
use crate::model::SelectOption;
use crate::query::PageQuery;
use crate::query::PageResult;

/// A row source answering from a `Vec<Row>`.
///
/// Applies the query's filter and order with the same semantics as local
/// mode, which makes it a stand-in for a real backend. The global search
/// arrives already lowered to option codes, see
/// [`DataFilter::global_filter`](crate::query::DataFilter::global_filter).
#[derive(Debug, Default)]
pub struct InMemoryRowSource {
    rows: Vec<Row>,
    requests: AtomicUsize,
}

impl InMemoryRowSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            requests: AtomicUsize::new(0),
        }
    }

    /// Returns the number of rows held.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the source holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of pages fetched so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowSource for InMemoryRowSource {
    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResult, DataAccessError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let mut indices: Vec<usize> = (0..self.rows.len())
            .filter(|&i| query.filter.as_ref().is_none_or(|f| f.matches(&self.rows[i])))
            .collect();
        query.order.sort_indices(&self.rows, &mut indices);

        let total = indices.len();
        let rows = indices
            .into_iter()
            .skip(query.start)
            .take(query.count)
            .map(|i| self.rows[i].clone())
            .collect();
        log::trace!("In-memory fetch {}+{} of {total}", query.start, query.count);
        Ok(PageResult::new(rows, total))
    }
}

/// An option source backed by a fixed map of column name to options.
#[derive(Debug, Clone, Default)]
pub struct StaticOptionSource {
    options: HashMap<String, Vec<SelectOption>>,
}

impl StaticOptionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the options of a column (builder pattern).
    pub fn with_options(mut self, column: impl Into<String>, options: Vec<SelectOption>) -> Self {
        self.options.insert(column.into(), options);
        self
    }
}

#[async_trait]
impl OptionSource for StaticOptionSource {
    async fn fetch_options(&self, column: &str) -> Result<Vec<SelectOption>, DataAccessError> {
        Ok(self.options.get(column).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::DataType;
    use crate::query::Filter;
    use crate::query::OrderBy;

    fn source() -> InMemoryRowSource {
        InMemoryRowSource::new((0..25).map(|i| Row::new().set("n", i)).collect())
    }

    #[tokio::test]
    async fn test_fetch_window() {
        let source = source();
        let query = PageQuery {
            filter: Some(Filter::ge("n", 5)),
            order: OrderBy::desc("n", Some(DataType::Number)),
            start: 0,
            count: 3,
            ..PageQuery::default()
        };
        let page = source.fetch_page(&query).await.unwrap();
        assert_eq!(page.total, 20);
        let keys: Vec<_> = page.rows.iter().filter_map(|r| r.key("n")).collect();
        assert_eq!(keys, ["24", "23", "22"]);
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_window_past_end() {
        let query = PageQuery {
            start: 20,
            count: 10,
            ..PageQuery::default()
        };
        let page = source().fetch_page(&query).await.unwrap();
        assert_eq!(page.rows.len(), 5);
    }

    #[tokio::test]
    async fn test_static_options() {
        let source = StaticOptionSource::new()
            .with_options("country", vec![SelectOption::new("BE", "Belgium")]);
        assert_eq!(source.fetch_options("country").await.unwrap().len(), 1);
        assert!(source.fetch_options("city").await.unwrap().is_empty());
    }
}
