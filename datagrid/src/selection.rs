//! Row selection bookkeeping.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Selection mode of the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// No selection allowed.
    None,
    /// Single row selection; selecting a row replaces the selection.
    #[default]
    Single,
    /// Multiple rows; selecting a row toggles its membership.
    Multi,
}

/// Stable identity of a row.
///
/// Local rows are identified by their index in the source row set, which
/// does not move when the view is filtered or sorted. Server rows are
/// identified by the text of their key field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowId {
    Local(usize),
    Remote(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Local(index) => write!(f, "#{index}"),
            RowId::Remote(key) => f.write_str(key),
        }
    }
}

/// Selected rows in insertion order.
///
/// Mutating methods return `(added, removed)` so callers can tell whether
/// anything changed.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    mode: SelectionMode,
    order: Vec<RowId>,
    selected: HashSet<RowId>,
    anchor: Option<RowId>,
}

impl Selection {
    /// Creates an empty selection in the given mode.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Selected rows, in the order they were selected.
    pub fn get_selection(&self) -> &[RowId] {
        &self.order
    }

    /// Check if a row is selected.
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Anchor for range selection.
    pub fn anchor(&self) -> Option<&RowId> {
        self.anchor.as_ref()
    }

    fn insert(&mut self, id: RowId) -> bool {
        if self.selected.insert(id.clone()) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, id: &RowId) -> bool {
        if self.selected.remove(id) {
            self.order.retain(|i| i != id);
            true
        } else {
            false
        }
    }

    /// Selects a row.
    ///
    /// Single mode replaces the selection; multi mode toggles the row. Does
    /// nothing when selection is disabled.
    pub fn select(&mut self, id: RowId) -> (Vec<RowId>, Vec<RowId>) {
        match self.mode {
            SelectionMode::None => (vec![], vec![]),
            SelectionMode::Single => {
                let removed: Vec<_> = self.order.iter().filter(|&i| *i != id).cloned().collect();
                let was_selected = self.selected.contains(&id);
                self.order.clear();
                self.selected.clear();
                self.anchor = Some(id.clone());
                self.insert(id.clone());
                let added = if was_selected { vec![] } else { vec![id] };
                (added, removed)
            }
            SelectionMode::Multi => {
                self.anchor = Some(id.clone());
                if self.remove(&id) {
                    (vec![], vec![id])
                } else {
                    self.insert(id.clone());
                    (vec![id], vec![])
                }
            }
        }
    }

    /// Selects every row between the anchor and `target` (inclusive), in
    /// view order. Multi mode only; other modes fall back to
    /// [`select`](Self::select).
    ///
    /// `ordered_ids` is the current view order. Rows outside the range stay
    /// selected.
    pub fn range_select(
        &mut self,
        target: RowId,
        ordered_ids: &[RowId],
    ) -> (Vec<RowId>, Vec<RowId>) {
        if self.mode != SelectionMode::Multi {
            return self.select(target);
        }
        let anchor = self.anchor.clone().unwrap_or_else(|| target.clone());
        let anchor_pos = ordered_ids.iter().position(|id| *id == anchor);
        let target_pos = ordered_ids.iter().position(|id| *id == target);
        let (start, end) = match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => (a.min(t), a.max(t)),
            // Anchor scrolled out of the view; start over from the target.
            _ => {
                self.anchor = None;
                return self.select(target);
            }
        };

        let added = ordered_ids[start..=end]
            .iter()
            .filter(|id| self.insert((*id).clone()))
            .cloned()
            .collect();
        (added, vec![])
    }

    /// Selects every given row (multi mode only). Returns the newly selected.
    pub fn select_all(&mut self, ids: &[RowId]) -> Vec<RowId> {
        if self.mode != SelectionMode::Multi {
            return vec![];
        }
        ids.iter().filter(|id| self.insert((*id).clone())).cloned().collect()
    }

    /// Clears the selection. Returns the rows that were deselected.
    pub fn clear_selection(&mut self) -> Vec<RowId> {
        self.selected.clear();
        self.anchor = None;
        std::mem::take(&mut self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::Range<usize>) -> Vec<RowId> {
        range.map(RowId::Local).collect()
    }

    #[test]
    fn test_single_replaces() {
        let mut selection = Selection::new(SelectionMode::Single);
        selection.select(RowId::Local(1));
        let (added, removed) = selection.select(RowId::Local(2));
        assert_eq!(added, [RowId::Local(2)]);
        assert_eq!(removed, [RowId::Local(1)]);
        assert_eq!(selection.get_selection(), [RowId::Local(2)]);
    }

    #[test]
    fn test_single_reselect_is_noop() {
        let mut selection = Selection::new(SelectionMode::Single);
        selection.select(RowId::Local(1));
        assert_eq!(selection.select(RowId::Local(1)), (vec![], vec![]));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_multi_toggles_in_insertion_order() {
        let mut selection = Selection::new(SelectionMode::Multi);
        selection.select(RowId::Remote("c".into()));
        selection.select(RowId::Remote("a".into()));
        selection.select(RowId::Remote("b".into()));
        selection.select(RowId::Remote("a".into()));
        assert_eq!(
            selection.get_selection(),
            [RowId::Remote("c".into()), RowId::Remote("b".into())]
        );
    }

    #[test]
    fn test_none_mode_ignores_selects() {
        let mut selection = Selection::new(SelectionMode::None);
        selection.select(RowId::Local(0));
        assert!(selection.is_empty());
        assert!(selection.select_all(&ids(0..3)).is_empty());
    }

    #[test]
    fn test_range_select() {
        let view = ids(0..10);
        let mut selection = Selection::new(SelectionMode::Multi);
        selection.select(RowId::Local(6));
        let (added, _) = selection.range_select(RowId::Local(3), &view);
        assert_eq!(added, ids(3..6));
        assert_eq!(selection.len(), 4);
        assert!(selection.is_selected(&RowId::Local(4)));
    }

    #[test]
    fn test_range_select_without_anchor_in_view() {
        let mut selection = Selection::new(SelectionMode::Multi);
        selection.select(RowId::Local(42));
        selection.range_select(RowId::Local(2), &ids(0..5));
        assert!(selection.is_selected(&RowId::Local(2)));
        assert!(selection.is_selected(&RowId::Local(42)));
    }

    #[test]
    fn test_clear_selection() {
        let mut selection = Selection::new(SelectionMode::Multi);
        selection.select_all(&ids(0..3));
        assert_eq!(selection.clear_selection(), ids(0..3));
        assert!(selection.is_empty());
        assert_eq!(selection.anchor(), None);
    }
}
