//! Page slicing and the page-visited cache.

use std::collections::HashSet;

use crate::error::ConfigError;

/// Page size meaning "every row on one page".
pub const ALL_ROWS: i64 = -1;

/// Slices a row sequence into 1-based pages.
///
/// Besides the page coordinates the pager keeps an advisory record of pages
/// already rendered or requested; it never influences [`DataPager::pager`].
///
/// # Example
///
/// ```
/// use datagrid::pager::DataPager;
///
/// let rows: Vec<usize> = (0..25).collect();
/// let mut pager = DataPager::new(10).unwrap();
/// pager.set_total(rows.len());
/// pager.set_current(2);
/// assert_eq!(pager.pager(&rows), &rows[10..20]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DataPager {
    per_page: i64,
    total: usize,
    current: usize,
    cache: HashSet<usize>,
    page_size_options: Vec<i64>,
}

fn check_page_size(per_page: i64) -> Result<(), ConfigError> {
    if per_page > 0 || per_page == ALL_ROWS {
        Ok(())
    } else {
        Err(ConfigError::InvalidPageSize(per_page))
    }
}

impl DataPager {
    /// Creates a pager on page 1 with no rows.
    pub fn new(per_page: i64) -> Result<Self, ConfigError> {
        check_page_size(per_page)?;
        Ok(Self {
            per_page,
            total: 0,
            current: 1,
            cache: HashSet::new(),
            page_size_options: vec![10, 20, 30, 50],
        })
    }

    /// Sets the page sizes offered to the user (builder pattern).
    pub fn with_page_size_options(mut self, options: Vec<i64>) -> Self {
        self.page_size_options = options;
        self
    }

    /// Rows per page; [`ALL_ROWS`] shows everything.
    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Total number of rows being paged.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Current 1-based page.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_size_options(&self) -> &[i64] {
        &self.page_size_options
    }

    /// Number of pages, at least 1.
    pub fn total_pages(&self) -> usize {
        match usize::try_from(self.per_page) {
            Ok(per_page) if per_page > 0 => self.total.div_ceil(per_page).max(1),
            _ => 1,
        }
    }

    /// Absolute index of the first row of the current page.
    pub fn start_index(&self) -> usize {
        self.page_start(self.current)
    }

    /// Absolute index one past the last row of the current page, bounded by
    /// the total.
    pub fn end_index(&self) -> usize {
        match usize::try_from(self.per_page) {
            Ok(per_page) => (self.start_index() + per_page).min(self.total),
            Err(_) => self.total,
        }
    }

    /// Absolute index of the first row of `page`.
    pub fn page_start(&self, page: usize) -> usize {
        match usize::try_from(self.per_page) {
            Ok(per_page) => page.saturating_sub(1) * per_page,
            Err(_) => 0,
        }
    }

    /// Page holding the row at absolute `index`.
    pub fn page_of(&self, index: usize) -> usize {
        match usize::try_from(self.per_page) {
            Ok(per_page) if per_page > 0 => index / per_page + 1,
            _ => 1,
        }
    }

    /// Returns the current page's slice of `rows`.
    pub fn pager<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let Ok(per_page) = usize::try_from(self.per_page) else {
            return rows;
        };
        let start = self.start_index().min(rows.len());
        let end = (start + per_page).min(rows.len());
        &rows[start..end]
    }

    /// Moves to `page`, clamped into the valid range. Returns the page.
    pub fn set_current(&mut self, page: usize) -> usize {
        self.current = page.clamp(1, self.total_pages());
        self.current
    }

    /// Changes the page size, clamping the current page and dropping the
    /// page cache.
    pub fn set_per_page(&mut self, per_page: i64) -> Result<(), ConfigError> {
        check_page_size(per_page)?;
        self.per_page = per_page;
        self.cache.clear();
        self.set_current(self.current);
        Ok(())
    }

    /// Updates the total, clamping the current page. A changed total drops
    /// the page cache.
    pub fn set_total(&mut self, total: usize) {
        if total != self.total {
            self.cache.clear();
        }
        self.total = total;
        self.set_current(self.current);
    }

    /// Marks the current page as viewed.
    pub fn set_cache(&mut self) {
        self.cache.insert(self.current);
    }

    /// Returns `true` if the current page was viewed.
    pub fn is_viewed(&self) -> bool {
        self.is_page_viewed(self.current)
    }

    /// Marks `page` as viewed.
    pub fn mark_viewed(&mut self, page: usize) {
        self.cache.insert(page);
    }

    pub fn is_page_viewed(&self, page: usize) -> bool {
        self.cache.contains(&page)
    }

    /// Forgets every viewed page.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
