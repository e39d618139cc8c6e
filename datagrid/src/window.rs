//! Index-keyed window of server rows.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::model::Row;

/// A rendered position in the server row set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    /// The row has been fetched.
    Loaded(&'a Row),
    /// The row is part of the set but not fetched yet.
    Loading,
}

impl<'a> Slot<'a> {
    pub fn row(&self) -> Option<&'a Row> {
        match self {
            Slot::Loaded(row) => Some(row),
            Slot::Loading => None,
        }
    }
}

/// Sparse rows of a server-side set, keyed by absolute index.
///
/// Fetched pages are merged at their absolute position; indices inside the
/// known total that hold no row are loading placeholders.
///
/// # Example
///
/// ```
/// use datagrid::model::Row;
/// use datagrid::window::{Slot, SparseWindow};
///
/// let mut window = SparseWindow::new();
/// window.set_total(100);
/// window.merge(40, vec![Row::new().set("id", 40), Row::new().set("id", 41)]);
///
/// assert!(matches!(window.get(41), Some(Slot::Loaded(_))));
/// assert_eq!(window.get(0), Some(Slot::Loading));
/// assert_eq!(window.get(100), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseWindow {
    rows: BTreeMap<usize, Row>,
    total: usize,
}

impl SparseWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the full server set.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Updates the total, dropping rows beyond it.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.rows.retain(|index, _| *index < total);
    }

    /// Number of fetched rows held.
    pub fn loaded_count(&self) -> usize {
        self.rows.len()
    }

    /// Drops every fetched row and the total.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.total = 0;
    }

    /// Stores `rows` at absolute positions `start..start + rows.len()`.
    ///
    /// Rows beyond the known total are discarded.
    pub fn merge(&mut self, start: usize, rows: Vec<Row>) {
        for (offset, row) in rows.into_iter().enumerate() {
            let index = start + offset;
            if index >= self.total {
                log::trace!("Dropping row {index} beyond total {}", self.total);
                break;
            }
            self.rows.insert(index, row);
        }
    }

    /// The slot at `index`, or `None` outside the set.
    pub fn get(&self, index: usize) -> Option<Slot<'_>> {
        if index >= self.total {
            return None;
        }
        Some(match self.rows.get(&index) {
            Some(row) => Slot::Loaded(row),
            None => Slot::Loading,
        })
    }

    /// Returns `true` if the row at `index` has been fetched.
    pub fn is_loaded(&self, index: usize) -> bool {
        self.rows.contains_key(&index)
    }

    /// Slots for a range, clipped to the set.
    pub fn slots(&self, range: Range<usize>) -> Vec<(usize, Slot<'_>)> {
        range
            .filter_map(|index| self.get(index).map(|slot| (index, slot)))
            .collect()
    }

    /// Fetched rows within a range, in index order.
    pub fn loaded_in(&self, range: Range<usize>) -> impl Iterator<Item = (usize, &Row)> {
        self.rows.range(range).map(|(index, row)| (*index, row))
    }

    /// The smallest `(start, count)` window covering every unfetched index
    /// of `range`, or `None` when the range is fully loaded.
    pub fn required_window(&self, range: Range<usize>) -> Option<(usize, usize)> {
        let end = range.end.min(self.total);
        let mut missing = (range.start..end).filter(|index| !self.is_loaded(*index));
        let first = missing.next()?;
        let last = missing.last().unwrap_or(first);
        Some((first, last - first + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: usize) -> Row {
        Row::new().set("id", id as i64)
    }

    #[test]
    fn test_merge_by_absolute_index() {
        let mut window = SparseWindow::new();
        window.set_total(50);
        window.merge(20, (20..30).map(row).collect());
        window.merge(0, (0..5).map(row).collect());

        assert_eq!(window.loaded_count(), 15);
        let slot = window.get(25).and_then(|s| s.row()).unwrap();
        assert_eq!(slot.key("id"), Some("25".to_string()));
        assert_eq!(window.get(10), Some(Slot::Loading));
    }

    #[test]
    fn test_required_window() {
        let mut window = SparseWindow::new();
        window.set_total(50);
        assert_eq!(window.required_window(0..10), Some((0, 10)));

        window.merge(0, (0..5).map(row).collect());
        assert_eq!(window.required_window(0..10), Some((5, 5)));

        window.merge(5, (5..10).map(row).collect());
        assert_eq!(window.required_window(0..10), None);
        assert_eq!(window.required_window(45..60), Some((45, 5)));
    }

    #[test]
    fn test_rows_beyond_total_are_dropped() {
        let mut window = SparseWindow::new();
        window.set_total(3);
        window.merge(1, (1..6).map(row).collect());
        assert_eq!(window.loaded_count(), 2);

        window.set_total(2);
        assert_eq!(window.loaded_count(), 1);
        assert_eq!(window.slots(0..5).len(), 2);
    }
}
