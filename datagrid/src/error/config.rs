//! Configuration error types

/// Errors raised while building columns, settings or pager state.
///
/// These fail fast at construction time instead of clamping the table into
/// an inconsistent state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// `min_width` is larger than `max_width`.
    #[error("Column '{column}' has min width {min} greater than max width {max}")]
    InvalidWidthRange { column: String, min: u32, max: u32 },

    /// A column was declared without a name.
    #[error("Column name must not be empty")]
    EmptyColumnName,

    /// Two columns share the same name.
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A page size other than a positive number or `-1` (all rows).
    #[error("Invalid page size {0}")]
    InvalidPageSize(i64),

    /// An operation referenced a column that is not part of the table.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// A sort was requested on a column that cannot be sorted.
    #[error("Column '{0}' is not sortable")]
    NotSortable(String),

    /// The table configuration could not be parsed.
    #[error("Config parse error: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Creates a new width range error.
    pub fn width_range(column: impl Into<String>, min: u32, max: u32) -> Self {
        Self::InvalidWidthRange {
            column: column.into(),
            min,
            max,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
