//! Table dimensions and column resizing.

use crate::column::Column;
use crate::settings::ColumnResizeMode;
use crate::settings::Settings;

/// An in-progress column resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeState {
    /// Index of the column being resized.
    pub column: usize,
    /// Pointer position when the resize started.
    pub start_x: i32,
    /// Column width when the resize started.
    pub start_width: u32,
    /// Current guide position.
    pub guide_x: i32,
    /// Table height measured at resize start, for sizing the guide.
    pub table_height: u32,
}

/// Result of a committed resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub column: usize,
    pub width: u32,
    /// The neighbour that absorbed the change in fit mode, with its width.
    pub neighbour: Option<(usize, u32)>,
    pub total_width: u32,
}

/// Derived widths and heights of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    pub header_row_height: u32,
    pub row_height: u32,
    pub columns_total_width: u32,
    resize: Option<ResizeState>,
}

impl Dimensions {
    pub fn new(settings: &Settings) -> Self {
        Self {
            header_row_height: settings.header_row_height,
            row_height: settings.row_height,
            columns_total_width: 0,
            resize: None,
        }
    }

    /// Sums the widths of visible columns and stores the result.
    pub fn calc_columns_total_width(&mut self, columns: &[Column]) -> u32 {
        self.columns_total_width = columns
            .iter()
            .filter(|c| c.visible())
            .map(Column::width)
            .sum();
        self.columns_total_width
    }

    /// The resize in progress, if any.
    pub fn resizing(&self) -> Option<&ResizeState> {
        self.resize.as_ref()
    }

    /// Starts resizing `column` at pointer position `x`.
    pub fn resize_begin(&mut self, column: &Column, x: i32, table_height: u32) -> ResizeState {
        let state = ResizeState {
            column: column.index(),
            start_x: x,
            start_width: column.width(),
            guide_x: x,
            table_height,
        };
        log::trace!("Resize begin: {state:?}");
        self.resize = Some(state);
        state
    }

    /// Tracks the guide while the pointer moves. Widths are not touched.
    pub fn resize_move(&mut self, x: i32) -> Option<i32> {
        let state = self.resize.as_mut()?;
        state.guide_x = x;
        Some(x)
    }

    /// Commits the resize at pointer position `x`.
    ///
    /// In fit mode the next visible column absorbs the change, so the total
    /// width stays the same unless one of the two columns hits its bound.
    pub fn resize_end(
        &mut self,
        columns: &mut [Column],
        x: i32,
        mode: ColumnResizeMode,
    ) -> Option<ResizeOutcome> {
        let state = self.resize.take()?;
        let position = columns.iter().position(|c| c.index() == state.column)?;

        let requested = i64::from(state.start_width) + i64::from(x) - i64::from(state.start_x);
        let width = columns[position].set_width(to_width(requested));

        let mut neighbour = None;
        if mode == ColumnResizeMode::Fit {
            let delta = i64::from(width) - i64::from(state.start_width);
            if let Some(next) = columns[position + 1..].iter().position(Column::visible) {
                let next = position + 1 + next;
                let before = columns[next].width();
                let after = columns[next].set_width(to_width(i64::from(before) - delta));
                let absorbed = i64::from(before) - i64::from(after);
                if absorbed != delta {
                    columns[position].set_width(to_width(i64::from(state.start_width) + absorbed));
                }
                neighbour = Some((columns[next].index(), after));
            }
        }

        let outcome = ResizeOutcome {
            column: state.column,
            width: columns[position].width(),
            neighbour,
            total_width: self.calc_columns_total_width(columns),
        };
        log::debug!("Resize end: {outcome:?}");
        Some(outcome)
    }
}

fn to_width(px: i64) -> u32 {
    u32::try_from(px.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnSchema;

    fn columns() -> Vec<Column> {
        Column::from_schemas(
            [
                ColumnSchema::new("a").width(100),
                ColumnSchema::new("hidden").width(100).visible(false),
                ColumnSchema::new("b").width(100).width_bounds(80, 500),
                ColumnSchema::new("c").width(100),
            ],
            &Settings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_total_width_skips_hidden() {
        let mut dims = Dimensions::new(&Settings::default());
        assert_eq!(dims.calc_columns_total_width(&columns()), 300);
    }

    #[test]
    fn test_simple_resize() {
        let mut columns = columns();
        let mut dims = Dimensions::new(&Settings::default());
        dims.resize_begin(&columns[0], 500, 400);
        assert_eq!(dims.resize_move(540), Some(540));
        assert_eq!(columns[0].width(), 100);

        let outcome = dims
            .resize_end(&mut columns, 550, ColumnResizeMode::Simple)
            .unwrap();
        assert_eq!(outcome.width, 150);
        assert_eq!(outcome.total_width, 350);
        assert!(dims.resizing().is_none());
    }

    #[test]
    fn test_resize_clamps_to_min() {
        let mut columns = columns();
        let mut dims = Dimensions::new(&Settings::default());
        dims.resize_begin(&columns[0], 500, 400);
        let outcome = dims
            .resize_end(&mut columns, 0, ColumnResizeMode::Simple)
            .unwrap();
        assert_eq!(outcome.width, 50);
    }

    #[test]
    fn test_fit_resize_preserves_total() {
        let mut columns = columns();
        let mut dims = Dimensions::new(&Settings::default());
        dims.resize_begin(&columns[0], 0, 400);
        let outcome = dims.resize_end(&mut columns, 10, ColumnResizeMode::Fit).unwrap();
        assert_eq!(outcome.width, 110);
        assert_eq!(outcome.neighbour, Some((2, 90)));
        assert_eq!(outcome.total_width, 300);
    }

    #[test]
    fn test_fit_resize_limited_by_neighbour_bound() {
        let mut columns = columns();
        let mut dims = Dimensions::new(&Settings::default());
        dims.resize_begin(&columns[0], 0, 400);
        let outcome = dims.resize_end(&mut columns, 60, ColumnResizeMode::Fit).unwrap();
        assert_eq!(outcome.neighbour, Some((2, 80)));
        assert_eq!(outcome.width, 120);
        assert_eq!(outcome.total_width, 300);
    }

    #[test]
    fn test_resize_end_without_begin() {
        let mut columns = columns();
        let mut dims = Dimensions::new(&Settings::default());
        assert_eq!(dims.resize_move(10), None);
        assert_eq!(dims.resize_end(&mut columns, 10, ColumnResizeMode::Simple), None);
    }
}
