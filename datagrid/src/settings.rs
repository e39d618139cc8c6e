//! Table-wide settings and declarative table configuration

use serde::Deserialize;
use serde::Serialize;

use crate::column::ColumnSchema;
use crate::error::ConfigError;
use crate::selection::SelectionMode;

/// How a column resize is committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnResizeMode {
    /// A guide follows the cursor; the width is committed on release.
    #[default]
    Simple,
    /// Like `Simple`, but the next visible column absorbs the change so the
    /// table width stays the same.
    Fit,
}

/// Table-wide policy, read at construction and at recompute points.
///
/// # Example
///
/// ```
/// use datagrid::settings::{ColumnResizeMode, Settings};
///
/// let settings = Settings::default()
///     .with_client_side(false)
///     .with_virtual_scroll(true)
///     .with_row_key("id")
///     .with_column_resize_mode(ColumnResizeMode::Fit);
/// assert!(!settings.client_side);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Allow sorting at all. `false` disables sort on every column.
    pub sortable: bool,
    /// Allow filtering at all. `false` disables filter on every column.
    pub filter: bool,
    /// Rows are held in memory and filtered/sorted/paged locally.
    ///
    /// Default: `true`
    pub client_side: bool,
    /// Render through the row virtualizer instead of discrete pages.
    pub virtual_scroll: bool,
    /// Columns used as group keys; these are hidden from the grid.
    pub group_rows_by: Vec<String>,
    /// Column resize behaviour.
    pub column_resize_mode: ColumnResizeMode,
    /// Row selection behaviour.
    pub selection_mode: SelectionMode,
    /// Field that identifies a row when rows are owned by a server.
    pub row_key: Option<String>,
    /// Fixed row height in pixels.
    ///
    /// Default: 30
    pub row_height: u32,
    /// Header row height in pixels. `0` hides the header.
    ///
    /// Default: 40
    pub header_row_height: u32,
    /// Height of the scrollable body in pixels.
    ///
    /// Default: 400
    pub viewport_height: u32,
    /// Extra rows rendered below the viewport during virtual scroll.
    ///
    /// Default: 3
    pub overscan: usize,
    /// Initial page size; `-1` shows all rows.
    ///
    /// Default: 10
    pub per_page: i64,
    /// Page sizes offered to the user.
    pub page_size_options: Vec<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sortable: true,
            filter: true,
            client_side: true,
            virtual_scroll: false,
            group_rows_by: Vec::new(),
            column_resize_mode: ColumnResizeMode::Simple,
            selection_mode: SelectionMode::Single,
            row_key: None,
            row_height: 30,
            header_row_height: 40,
            viewport_height: 400,
            overscan: 3,
            per_page: 10,
            page_size_options: vec![10, 20, 30, 50],
        }
    }
}

impl Settings {
    /// Creates settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables sorting table-wide.
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Enables or disables filtering table-wide.
    pub fn with_filter(mut self, filter: bool) -> Self {
        self.filter = filter;
        self
    }

    /// Chooses between in-memory and server-owned rows.
    pub fn with_client_side(mut self, client_side: bool) -> Self {
        self.client_side = client_side;
        self
    }

    /// Enables or disables virtual scroll.
    pub fn with_virtual_scroll(mut self, virtual_scroll: bool) -> Self {
        self.virtual_scroll = virtual_scroll;
        self
    }

    /// Sets the group key columns.
    pub fn with_group_rows_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_rows_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the column resize mode.
    pub fn with_column_resize_mode(mut self, mode: ColumnResizeMode) -> Self {
        self.column_resize_mode = mode;
        self
    }

    /// Sets the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Sets the row key field used in server mode.
    pub fn with_row_key(mut self, field: impl Into<String>) -> Self {
        self.row_key = Some(field.into());
        self
    }

    /// Sets the fixed row height.
    pub fn with_row_height(mut self, height: u32) -> Self {
        self.row_height = height;
        self
    }

    /// Sets the viewport height.
    pub fn with_viewport_height(mut self, height: u32) -> Self {
        self.viewport_height = height;
        self
    }

    /// Sets the initial page size.
    pub fn with_per_page(mut self, per_page: i64) -> Self {
        self.per_page = per_page;
        self
    }

    /// Returns `true` if the column is used as a group key.
    pub fn is_group_key(&self, column: &str) -> bool {
        self.group_rows_by.iter().any(|c| c == column)
    }
}

/// A complete declarative table definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Table-wide policy.
    pub settings: Settings,
    /// Column schemas, in display order.
    pub columns: Vec<ColumnSchema>,
}

impl TableConfig {
    /// Parses a table definition from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_json_defaults() {
        let config = TableConfig::from_json(
            r#"{
                "settings": {"clientSide": false, "groupRowsBy": ["region"], "columnResizeMode": "fit"},
                "columns": [{"name": "region"}, {"name": "amount", "type": "number"}]
            }"#,
        )
        .unwrap();

        assert!(!config.settings.client_side);
        assert!(config.settings.sortable);
        assert_eq!(config.settings.column_resize_mode, ColumnResizeMode::Fit);
        assert!(config.settings.is_group_key("region"));
        assert_eq!(config.settings.per_page, 10);
        assert_eq!(config.columns.len(), 2);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = TableConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
