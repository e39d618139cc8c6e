//! Backend-neutral filter expressions.

use std::cmp::Ordering;

use crate::column::DataType;
use crate::model::Row;
use crate::model::Value;

/// A filter condition over rows.
///
/// Filters can be combined using logical operators (`And`, `Or`). The same
/// expression is evaluated locally by [`Filter::matches`] and handed to a
/// [`RowSource`](crate::source::RowSource) in server mode.
///
/// Comparison operands carry their own type: a [`Value::Float`] or
/// [`Value::Int`] operand compares numerically, a [`Value::DateTime`]
/// operand chronologically, anything else as case-insensitive text. A row
/// value that cannot be read as the operand's type never matches.
///
/// # Example
///
/// ```
/// use datagrid::model::Row;
/// use datagrid::query::Filter;
///
/// let filter = Filter::gt("age", 10).and_also(Filter::contains("name", "an"));
///
/// assert!(filter.matches(&Row::new().set("age", 15).set("name", "Anna")));
/// assert!(!filter.matches(&Row::new().set("age", 5).set("name", "Anna")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Equality: `field = value`
    Eq(String, Value),
    /// Not equal: `field <> value`
    Ne(String, Value),
    /// Greater than: `field > value`
    Gt(String, Value),
    /// Greater than or equal: `field >= value`
    Ge(String, Value),
    /// Less than: `field < value`
    Lt(String, Value),
    /// Less than or equal: `field <= value`
    Le(String, Value),
    /// Inclusive range: `from <= field <= to`
    Between(String, Value, Value),
    /// Membership: `field in (values)`
    In(String, Vec<Value>),
    /// Contains substring (case-insensitive).
    Contains(String, String),
    /// Starts with (case-insensitive).
    StartsWith(String, String),
    /// Ends with (case-insensitive).
    EndsWith(String, String),
    /// Field is absent or null.
    IsNull(String),
    /// Field is present and not null.
    IsNotNull(String),
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
}

impl Filter {
    /// Creates an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Creates a not-equal filter.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    /// Creates a greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    /// Creates a greater-than-or-equal filter.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ge(field.into(), value.into())
    }

    /// Creates a less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    /// Creates a less-than-or-equal filter.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Le(field.into(), value.into())
    }

    /// Creates an inclusive range filter.
    pub fn between(
        field: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        Filter::Between(field.into(), from.into(), to.into())
    }

    /// Creates a membership filter.
    pub fn one_of<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In(field.into(), values.into_iter().map(Into::into).collect())
    }

    /// Creates a contains filter.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Contains(field.into(), value.into())
    }

    /// Creates a starts-with filter.
    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::StartsWith(field.into(), value.into())
    }

    /// Creates an ends-with filter.
    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::EndsWith(field.into(), value.into())
    }

    /// Creates an is-null filter.
    pub fn is_null(field: impl Into<String>) -> Self {
        Filter::IsNull(field.into())
    }

    /// Creates an is-not-null filter.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Filter::IsNotNull(field.into())
    }

    /// Creates a logical AND of multiple filters.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    /// Creates a logical OR of multiple filters.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Combines this filter with another using logical AND.
    pub fn and_also(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            _ => Filter::And(vec![self, other]),
        }
    }

    /// Combines this filter with another using logical OR.
    pub fn or_else(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut filters) => {
                filters.push(other);
                Filter::Or(filters)
            }
            _ => Filter::Or(vec![self, other]),
        }
    }

    /// Evaluates the filter against a row.
    ///
    /// An empty `And` matches everything; an empty `Or` matches nothing.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Eq(field, v) => compare(row, field, v) == Some(Ordering::Equal),
            Filter::Ne(field, v) => compare(row, field, v) != Some(Ordering::Equal),
            Filter::Gt(field, v) => compare(row, field, v) == Some(Ordering::Greater),
            Filter::Ge(field, v) => compare(row, field, v).is_some_and(Ordering::is_ge),
            Filter::Lt(field, v) => compare(row, field, v) == Some(Ordering::Less),
            Filter::Le(field, v) => compare(row, field, v).is_some_and(Ordering::is_le),
            Filter::Between(field, from, to) => {
                compare(row, field, from).is_some_and(Ordering::is_ge)
                    && compare(row, field, to).is_some_and(Ordering::is_le)
            }
            Filter::In(field, values) => values
                .iter()
                .any(|v| compare(row, field, v) == Some(Ordering::Equal)),
            Filter::Contains(field, needle) => {
                text(row, field).is_some_and(|t| t.contains(&needle.to_lowercase()))
            }
            Filter::StartsWith(field, needle) => {
                text(row, field).is_some_and(|t| t.starts_with(&needle.to_lowercase()))
            }
            Filter::EndsWith(field, needle) => {
                text(row, field).is_some_and(|t| t.ends_with(&needle.to_lowercase()))
            }
            Filter::IsNull(field) => row.get_path(field).is_none(),
            Filter::IsNotNull(field) => row.get_path(field).is_some(),
            Filter::And(filters) => filters.iter().all(|f| f.matches(row)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(row)),
        }
    }
}

/// The ordering implied by an operand's representation.
fn operand_type(operand: &Value) -> DataType {
    match operand {
        Value::Int(_) | Value::Float(_) => DataType::Number,
        Value::DateTime(_) => DataType::Date,
        _ => DataType::Text,
    }
}

fn compare(row: &Row, field: &str, operand: &Value) -> Option<Ordering> {
    row.get_path(field)?
        .compare(operand, Some(operand_type(operand)))
}

fn text(row: &Row, field: &str) -> Option<String> {
    row.get_path(field).map(|v| v.to_text().to_lowercase())
}
