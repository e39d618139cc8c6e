//! Column model: metadata, value extraction, option translation, validation

mod schema;
mod validator;

use std::collections::HashSet;
use std::sync::Arc;

pub use schema::*;
pub use validator::*;

use crate::error::ConfigError;
use crate::error::DataAccessError;
use crate::model::Row;
use crate::model::SelectOption;
use crate::model::Value;
use crate::settings::Settings;
use crate::source::OptionSource;

/// Minimum default width; longer titles widen the column.
const DEFAULT_WIDTH: u32 = 150;
/// Pixels per title character when deriving a default width.
const WIDTH_PER_CHAR: u32 = 5;

/// A column of the grid.
///
/// Built once from a [`ColumnSchema`] and the table [`Settings`]. Only the
/// width changes afterwards, and only through [`Column::set_width`].
///
/// # Example
///
/// ```
/// use datagrid::column::{Column, ColumnSchema};
/// use datagrid::model::{Row, Value};
/// use datagrid::settings::Settings;
///
/// let column = Column::new(ColumnSchema::new("a.b"), &Settings::default()).unwrap();
/// let row = Row::new().set("a", Row::new().set("b", 5));
/// assert_eq!(column.get_value(&row), Value::from(5));
/// assert_eq!(column.width(), 150);
/// ```
#[derive(Clone)]
pub struct Column {
    index: usize,
    name: String,
    title: String,
    column_type: ColumnType,
    data_type: Option<DataType>,
    width: u32,
    min_width: u32,
    max_width: u32,
    sortable: bool,
    filterable: bool,
    visible: bool,
    options: Option<Vec<SelectOption>>,
    depends_column: Option<String>,
    validator: Option<Arc<dyn Validator>>,
    option_source: Option<Arc<dyn OptionSource>>,
}

impl Column {
    /// Builds a column from its schema, applying table-wide overrides.
    pub fn new(schema: ColumnSchema, settings: &Settings) -> Result<Self, ConfigError> {
        if schema.name.trim().is_empty() {
            return Err(ConfigError::EmptyColumnName);
        }
        if schema.min_width > schema.max_width {
            return Err(ConfigError::width_range(
                schema.name,
                schema.min_width,
                schema.max_width,
            ));
        }

        let title = schema.title.unwrap_or_else(|| schema.name.clone());
        let column_type = schema.column_type.unwrap_or(if schema.options.is_some() {
            ColumnType::Select
        } else {
            ColumnType::Text
        });
        let data_type = schema
            .data_type
            .or_else(|| column_type.implied_data_type());
        let default_width = DEFAULT_WIDTH.max(title.chars().count() as u32 * WIDTH_PER_CHAR);

        let mut column = Self {
            index: 0,
            sortable: schema.sortable && settings.sortable,
            filterable: schema.filter && settings.filter,
            visible: schema.visible && !settings.is_group_key(&schema.name),
            name: schema.name,
            title,
            column_type,
            data_type,
            width: 0,
            min_width: schema.min_width,
            max_width: schema.max_width,
            options: schema.options,
            depends_column: schema.depends_column,
            validator: None,
            option_source: None,
        };
        column.set_width(schema.width.unwrap_or(default_width));
        Ok(column)
    }

    /// Builds an ordered column set, assigning indices and rejecting
    /// duplicate names.
    pub fn from_schemas(
        schemas: impl IntoIterator<Item = ColumnSchema>,
        settings: &Settings,
    ) -> Result<Vec<Self>, ConfigError> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for (index, schema) in schemas.into_iter().enumerate() {
            if !seen.insert(schema.name.clone()) {
                return Err(ConfigError::DuplicateColumn(schema.name));
            }
            let mut column = Self::new(schema, settings)?;
            column.index = index;
            columns.push(column);
        }
        Ok(columns)
    }

    /// Attaches a validator (builder pattern).
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Attaches an async option source (builder pattern).
    pub fn with_option_source(mut self, source: Arc<dyn OptionSource>) -> Self {
        self.option_source = Some(source);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Position of the column in the table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Field name (possibly a dotted path).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Comparison semantics; `None` compares as text.
    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    /// Current width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn sortable(&self) -> bool {
        self.sortable
    }

    pub fn filterable(&self) -> bool {
        self.filterable
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Static options, if any.
    pub fn options(&self) -> Option<&[SelectOption]> {
        self.options.as_deref()
    }

    pub fn depends_column(&self) -> Option<&str> {
        self.depends_column.as_deref()
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Extracts this column's value from a row.
    ///
    /// Dotted names walk nested objects; a missing segment yields
    /// [`Value::Null`].
    pub fn get_value(&self, row: &Row) -> Value {
        row.get_path(&self.name).cloned().unwrap_or(Value::Null)
    }

    /// Like [`get_value`](Self::get_value), but an absent row renders as an
    /// empty string.
    pub fn cell_value(&self, row: Option<&Row>) -> Value {
        match row {
            Some(row) => self.get_value(row),
            None => Value::String(String::new()),
        }
    }

    /// Options visible for the given parent value.
    ///
    /// When the column depends on another column and `depends_value` is not
    /// blank, only options whose `parent_id` matches are returned.
    pub fn get_options(&self, depends_value: Option<&Value>) -> Vec<&SelectOption> {
        let Some(options) = &self.options else {
            return Vec::new();
        };
        match (&self.depends_column, depends_value) {
            (Some(_), Some(parent)) if !parent.is_blank() => options
                .iter()
                .filter(|option| option.belongs_to(parent))
                .collect(),
            _ => options.iter().collect(),
        }
    }

    /// Translates a stored code into its display label.
    ///
    /// Unmatched codes are returned unchanged.
    pub fn get_option_name(&self, value: &Value, depends_value: Option<&Value>) -> Value {
        self.get_options(depends_value)
            .into_iter()
            .find(|option| option.matches(value))
            .map(|option| Value::String(option.name.clone()))
            .unwrap_or_else(|| value.clone())
    }

    /// The row's value as displayed: translated through options when the
    /// column has them.
    pub fn get_value_view(&self, row: &Row) -> Value {
        let value = self.get_value(row);
        if self.options.is_none() || value.is_null() {
            return value;
        }
        let parent = self
            .depends_column
            .as_deref()
            .and_then(|field| row.get_path(field));
        self.get_option_name(&value, parent)
    }

    /// Values offered by a filter UI for this column.
    ///
    /// Prefers the async option source, then static options.
    pub async fn get_filter_values(&self) -> Result<Vec<SelectOption>, DataAccessError> {
        if let Some(source) = &self.option_source {
            return source.fetch_options(&self.name).await;
        }
        Ok(self.options.clone().unwrap_or_default())
    }

    /// Validates a value, returning error messages (empty when valid).
    pub fn validate(&self, value: &Value) -> Vec<String> {
        match &self.validator {
            Some(validator) => validator.validate(&self.title, value),
            None => Vec::new(),
        }
    }

    /// Sets the width, clamped into `[min_width, max_width]`, and returns the
    /// committed width.
    pub fn set_width(&mut self, width: u32) -> u32 {
        self.width = width.clamp(self.min_width, self.max_width);
        self.width
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("title", &self.title)
            .field("column_type", &self.column_type)
            .field("data_type", &self.data_type)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("visible", &self.visible)
            .field("validator", &self.validator.is_some())
            .field("option_source", &self.option_source.is_some())
            .finish()
    }
}
