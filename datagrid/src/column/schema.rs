//! Declarative column schema

use serde::Deserialize;
use serde::Serialize;

use crate::model::SelectOption;

/// Editor/render type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
    #[serde(rename = "datetime-local")]
    DateTimeLocal,
    Select,
    Checkbox,
    Textarea,
}

/// Comparison semantics of a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Case-insensitive string ordering.
    Text,
    /// Numeric ordering; numeric strings are parsed.
    Number,
    /// Chronological ordering; ISO date strings are parsed.
    Date,
}

impl ColumnType {
    /// The data type implied by this column type, if any.
    pub fn implied_data_type(self) -> Option<DataType> {
        match self {
            ColumnType::Date | ColumnType::DateTimeLocal => Some(DataType::Date),
            ColumnType::Number => Some(DataType::Number),
            _ => None,
        }
    }
}

/// Declarative description of a column, as found in a table config.
///
/// Unset fields receive defaults when the [`Column`](super::Column) is
/// built.
///
/// # Example
///
/// ```
/// use datagrid::column::{ColumnSchema, DataType};
///
/// let schema = ColumnSchema::new("age")
///     .title("Age")
///     .data_type(DataType::Number)
///     .width(80);
/// assert_eq!(schema.name, "age");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnSchema {
    /// Field name; dotted names address nested objects.
    pub name: String,
    /// Display title. Defaults to the name.
    pub title: Option<String>,
    /// Column type.
    #[serde(rename = "type")]
    pub column_type: Option<ColumnType>,
    /// Comparison semantics.
    pub data_type: Option<DataType>,
    /// Initial width in pixels.
    pub width: Option<u32>,
    /// Lower width bound.
    ///
    /// Default: 50
    pub min_width: u32,
    /// Upper width bound.
    ///
    /// Default: 500
    pub max_width: u32,
    /// Whether the column can be sorted.
    pub sortable: bool,
    /// Whether the column can be filtered.
    pub filter: bool,
    /// Whether the column is shown.
    pub visible: bool,
    /// Static code/label options.
    pub options: Option<Vec<SelectOption>>,
    /// Column whose value narrows this column's options by `parent_id`.
    pub depends_column: Option<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: None,
            column_type: None,
            data_type: None,
            width: None,
            min_width: 50,
            max_width: 500,
            sortable: true,
            filter: true,
            visible: true,
            options: None,
            depends_column: None,
        }
    }
}

impl ColumnSchema {
    /// Creates a schema for the given field name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the column type.
    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = Some(column_type);
        self
    }

    /// Sets the data type.
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Sets the initial width.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the width bounds.
    pub fn width_bounds(mut self, min: u32, max: u32) -> Self {
        self.min_width = min;
        self.max_width = max;
        self
    }

    /// Enables or disables sorting.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Enables or disables filtering.
    pub fn filter(mut self, filter: bool) -> Self {
        self.filter = filter;
        self
    }

    /// Shows or hides the column.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets static options.
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Makes this column's options depend on another column's value.
    pub fn depends_on(mut self, column: impl Into<String>) -> Self {
        self.depends_column = Some(column.into());
        self
    }
}
