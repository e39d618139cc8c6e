//! Sort ordering over rows.

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::column::DataType;
use crate::model::Row;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

/// One sort key: a field, its direction and how its values compare.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
    pub data_type: Option<DataType>,
}

/// Specifies the ordering of rows.
///
/// Multiple fields can be chained together for secondary, tertiary, etc.
/// sorting. Nulls sort first in ascending order.
///
/// # Example
///
/// ```
/// use datagrid::column::DataType;
/// use datagrid::query::OrderBy;
///
/// let order = OrderBy::desc("revenue", Some(DataType::Number))
///     .then_asc("name", None);
/// assert_eq!(order.fields().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBy {
    fields: Vec<SortKey>,
}

impl OrderBy {
    /// Creates an empty ordering (source order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an ascending order on a field.
    pub fn asc(field: impl Into<String>, data_type: Option<DataType>) -> Self {
        Self::new().then(field, Direction::Asc, data_type)
    }

    /// Creates a descending order on a field.
    pub fn desc(field: impl Into<String>, data_type: Option<DataType>) -> Self {
        Self::new().then(field, Direction::Desc, data_type)
    }

    /// Adds a secondary ascending order on a field.
    pub fn then_asc(self, field: impl Into<String>, data_type: Option<DataType>) -> Self {
        self.then(field, Direction::Asc, data_type)
    }

    /// Adds a secondary descending order on a field.
    pub fn then_desc(self, field: impl Into<String>, data_type: Option<DataType>) -> Self {
        self.then(field, Direction::Desc, data_type)
    }

    fn then(
        mut self,
        field: impl Into<String>,
        direction: Direction,
        data_type: Option<DataType>,
    ) -> Self {
        self.fields.push(SortKey {
            field: field.into(),
            direction,
            data_type,
        });
        self
    }

    /// Returns the sort keys in priority order.
    pub fn fields(&self) -> &[SortKey] {
        &self.fields
    }

    /// Returns `true` if no sort is active.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Direction currently applied to `field`, if any.
    pub fn direction_of(&self, field: &str) -> Option<Direction> {
        self.fields
            .iter()
            .find(|key| key.field == field)
            .map(|key| key.direction)
    }

    /// Cycles the sort on `field`: none → asc → desc → none.
    ///
    /// With `multi` the other keys are kept; otherwise `field` becomes the
    /// only key.
    pub fn toggle(&mut self, field: &str, data_type: Option<DataType>, multi: bool) {
        let next = match self.direction_of(field) {
            None => Some(Direction::Asc),
            Some(Direction::Asc) => Some(Direction::Desc),
            Some(Direction::Desc) => None,
        };
        if !multi {
            self.fields.retain(|key| key.field == field);
        }
        match (next, self.fields.iter_mut().find(|key| key.field == field)) {
            (Some(direction), Some(key)) => key.direction = direction,
            (Some(direction), None) => self.fields.push(SortKey {
                field: field.to_string(),
                direction,
                data_type,
            }),
            (None, _) => self.fields.retain(|key| key.field != field),
        }
    }

    /// Removes every sort key.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Compares two rows under this ordering.
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        for key in &self.fields {
            let left = a.get_path(&key.field).cloned().unwrap_or_default();
            let right = b.get_path(&key.field).cloned().unwrap_or_default();
            let ordering = left.sort_cmp(&right, key.data_type);
            let ordering = match key.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stably sorts row indices of `rows` in place.
    pub fn sort_indices(&self, rows: &[Row], indices: &mut [usize]) {
        if self.is_empty() {
            return;
        }
        indices.sort_by(|&a, &b| self.compare(&rows[a], &rows[b]));
    }
}
