//! Row virtualization: which rows are on screen for a scroll offset.

use std::ops::Range;

use crate::settings::Settings;

/// Maps a vertical scroll offset onto a row range.
///
/// All rows share one fixed height. Rows above and below the rendered range
/// are replaced by padding so the scrollbar still reflects the full set.
///
/// # Example
///
/// ```
/// use datagrid::settings::Settings;
/// use datagrid::virtualizer::RowVirtualizer;
///
/// let mut v = RowVirtualizer::new(&Settings::default()); // 30px rows, 400px viewport
/// v.set_scroll_top(300);
/// assert_eq!(v.first_visible_index(), 10);
/// assert_eq!(v.visible_range(1000), 10..27);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowVirtualizer {
    row_height: u32,
    viewport_height: u32,
    overscan: usize,
    per_page: i64,
    scroll_top: u64,
}

impl RowVirtualizer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            row_height: settings.row_height.max(1),
            viewport_height: settings.viewport_height,
            overscan: settings.overscan,
            per_page: settings.per_page,
            scroll_top: 0,
        }
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    pub fn set_scroll_top(&mut self, offset: u64) {
        self.scroll_top = offset;
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height;
    }

    /// Keeps page offsets in step with the pager.
    pub fn set_per_page(&mut self, per_page: i64) {
        self.per_page = per_page;
    }

    /// Index of the row at the top of the viewport.
    pub fn first_visible_index(&self) -> usize {
        usize::try_from(self.scroll_top / u64::from(self.row_height)).unwrap_or(usize::MAX)
    }

    /// Rows rendered at once: a full viewport plus the overscan.
    pub fn rendered_count(&self) -> usize {
        self.viewport_height.div_ceil(self.row_height) as usize + self.overscan
    }

    /// Rendered rows for a set of `total` rows.
    pub fn visible_range(&self, total: usize) -> Range<usize> {
        let start = self.first_visible_index().min(total);
        let end = start.saturating_add(self.rendered_count()).min(total);
        start..end
    }

    /// Padding above the rendered rows.
    pub fn offset_y(&self, total: usize) -> u64 {
        self.rows_height(self.visible_range(total).start)
    }

    /// Padding below the rendered rows.
    pub fn bottom_padding(&self, total: usize) -> u64 {
        self.rows_height(total - self.visible_range(total).end)
    }

    /// Full scroll height of `total` rows.
    pub fn total_height(&self, total: usize) -> u64 {
        self.rows_height(total)
    }

    /// Scroll offset of the first row of `page` (1-based).
    pub fn calc_page_offset_y(&self, page: usize) -> u64 {
        self.page_height()
            .saturating_mul(page.saturating_sub(1) as u64)
    }

    /// The page containing scroll offset `offset`.
    pub fn page_from_offset(&self, offset: u64) -> usize {
        match self.page_height() {
            0 => 1,
            height => usize::try_from(offset / height)
                .unwrap_or(usize::MAX)
                .saturating_add(1),
        }
    }

    fn page_height(&self) -> u64 {
        u64::try_from(self.per_page)
            .map(|per_page| per_page * u64::from(self.row_height))
            .unwrap_or(0)
    }

    fn rows_height(&self, rows: usize) -> u64 {
        (rows as u64).saturating_mul(u64::from(self.row_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn virtualizer() -> RowVirtualizer {
        RowVirtualizer::new(
            &Settings::default()
                .with_row_height(30)
                .with_viewport_height(400)
                .with_per_page(10),
        )
    }

    #[test]
    fn test_range_math() {
        let mut v = virtualizer();
        assert_eq!(v.rendered_count(), 14 + 3);
        v.set_scroll_top(95);
        assert_eq!(v.first_visible_index(), 3);
        assert_eq!(v.visible_range(100), 3..20);
        assert_eq!(v.offset_y(100), 90);
        assert_eq!(v.bottom_padding(100), 80 * 30);
        assert_eq!(
            v.offset_y(100) + v.rows_height(17) + v.bottom_padding(100),
            v.total_height(100)
        );
    }

    #[test]
    fn test_range_near_end() {
        let mut v = virtualizer();
        v.set_scroll_top(30 * 95);
        assert_eq!(v.visible_range(100), 95..100);
        assert_eq!(v.bottom_padding(100), 0);
        v.set_scroll_top(30 * 500);
        assert_eq!(v.visible_range(100), 100..100);
    }

    #[test]
    fn test_page_offsets_are_inverse() {
        let v = virtualizer();
        for page in 1..50 {
            let offset = v.calc_page_offset_y(page);
            assert_eq!(v.page_from_offset(offset), page);
        }
        assert_eq!(v.calc_page_offset_y(3), 600);
        assert_eq!(v.page_from_offset(599), 2);
    }

    #[test]
    fn test_all_rows_has_single_page() {
        let mut v = virtualizer();
        v.set_per_page(-1);
        assert_eq!(v.calc_page_offset_y(4), 0);
        assert_eq!(v.page_from_offset(12_345), 1);
    }
}
