//! Per-column filter state with match modes.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::Filter;
use crate::column::Column;
use crate::column::DataType;
use crate::error::ConfigError;
use crate::model::Row;
use crate::model::SelectOption;
use crate::model::Value;

/// How a column filter value is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    #[default]
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    /// Inclusive range; needs both bounds.
    Between,
    /// Membership in a value list.
    In,
}

impl FromStr for MatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "eq" | "equals" => Self::Equals,
            "ne" | "notequals" => Self::NotEquals,
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "gt" | "greaterthan" => Self::GreaterThan,
            "ge" | "greaterthanorequal" => Self::GreaterThanOrEqual,
            "lt" | "lessthan" => Self::LessThan,
            "le" | "lessthanorequal" => Self::LessThanOrEqual,
            "between" => Self::Between,
            "in" => Self::In,
            other => return Err(ConfigError::Parse(format!("unknown match mode '{other}'"))),
        })
    }
}

/// A single column's filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEntry {
    pub value: Value,
    pub match_mode: MatchMode,
    pub value_to: Option<Value>,
    pub data_type: Option<DataType>,
}

impl FilterEntry {
    /// Lowers the entry to a filter expression on `field`.
    ///
    /// Returns `None` for blank values and for ranges missing a bound.
    fn to_filter(&self, field: &str) -> Option<Filter> {
        if self.value.is_blank() {
            return None;
        }
        let value = self.value.clone();
        let field = field.to_string();
        Some(match self.match_mode {
            MatchMode::Equals => Filter::Eq(field, value),
            MatchMode::NotEquals => Filter::Ne(field, value),
            MatchMode::Contains => Filter::Contains(field, value.to_text()),
            MatchMode::StartsWith => Filter::StartsWith(field, value.to_text()),
            MatchMode::EndsWith => Filter::EndsWith(field, value.to_text()),
            MatchMode::GreaterThan => Filter::Gt(field, value),
            MatchMode::GreaterThanOrEqual => Filter::Ge(field, value),
            MatchMode::LessThan => Filter::Lt(field, value),
            MatchMode::LessThanOrEqual => Filter::Le(field, value),
            MatchMode::Between => {
                let to = self.value_to.as_ref().filter(|v| !v.is_blank())?;
                Filter::Between(field, value, to.clone())
            }
            MatchMode::In => match value {
                Value::List(values) => Filter::In(field, values),
                single => Filter::In(field, vec![single]),
            },
        })
    }
}

/// Matches `text` in the displayed value of `column`.
fn global_column_filter(column: &Column, text: &str) -> Filter {
    let raw = Filter::contains(column.name(), text);
    let Some(options) = column.options().filter(|options| !options.is_empty()) else {
        return raw;
    };
    // Codes compare as text, the way labels are looked up.
    let code = |option: &SelectOption| Value::String(option.id.to_text());
    let unlabelled = Filter::and(
        std::iter::once(raw).chain(options.iter().map(|o| Filter::ne(column.name(), code(o)))),
    );
    let needle = text.to_lowercase();
    let labelled: Vec<Value> = options
        .iter()
        .filter(|o| o.name.to_lowercase().contains(&needle))
        .map(code)
        .collect();
    if labelled.is_empty() {
        unlabelled
    } else {
        Filter::or([Filter::In(column.name().to_string(), labelled), unlabelled])
    }
}

/// Coerces a filter operand into the column's representation.
///
/// Untyped columns compare as text; operands that do not parse as the
/// column type stay text.
fn coerce_operand(value: Value, data_type: Option<DataType>) -> Value {
    let data_type = data_type.unwrap_or(DataType::Text);
    match value {
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|v| v.coerce(Some(data_type)))
                .collect(),
        ),
        other => match other.coerce(Some(data_type)) {
            coerced @ (Value::Float(_) | Value::DateTime(_) | Value::String(_) | Value::Null) => {
                coerced
            }
            _ => Value::String(other.to_text()),
        },
    }
}

/// The set of active column filters, plus an optional global search.
///
/// Entries are keyed by column name. Clearing a filter removes the entry;
/// an entry holding a blank value exists but never restricts rows.
///
/// # Example
///
/// ```
/// use datagrid::column::DataType;
/// use datagrid::model::{Row, Value};
/// use datagrid::query::{DataFilter, MatchMode};
///
/// let rows = vec![
///     Row::new().set("age", 5),
///     Row::new().set("age", 15),
///     Row::new().set("age", 25),
/// ];
/// let mut filter = DataFilter::new();
/// filter.set_filter(Value::from(10), "age", MatchMode::GreaterThan, None, Some(DataType::Number));
/// assert_eq!(filter.apply(&rows, &[]), vec![1, 2]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFilter {
    entries: BTreeMap<String, FilterEntry>,
    global: Option<String>,
}

impl DataFilter {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the filter on `column`.
    pub fn set_filter(
        &mut self,
        value: Value,
        column: &str,
        match_mode: MatchMode,
        value_to: Option<Value>,
        data_type: Option<DataType>,
    ) {
        let entry = FilterEntry {
            value: coerce_operand(value, data_type),
            match_mode,
            value_to: value_to.map(|v| coerce_operand(v, data_type)),
            data_type,
        };
        log::trace!("Filter on '{column}': {entry:?}");
        self.entries.insert(column.to_string(), entry);
    }

    /// Removes the filter on `column`. Returns `true` if one existed.
    pub fn clear_filter(&mut self, column: &str) -> bool {
        self.entries.remove(column).is_some()
    }

    /// Removes every column filter and the global search.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.global = None;
    }

    /// Returns `true` if `column` has an entry, even a blank one.
    pub fn has_filter(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    /// Returns the entry for `column`.
    pub fn get(&self, column: &str) -> Option<&FilterEntry> {
        self.entries.get(column)
    }

    /// Iterates over entries in column-name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FilterEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if any entry or the global search restricts rows.
    pub fn is_active(&self) -> bool {
        self.global.is_some() || self.to_filter().is_some()
    }

    /// Sets the global search text; blank text clears it.
    pub fn set_global(&mut self, text: Option<String>) {
        self.global = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
    }

    /// The global search text.
    pub fn global(&self) -> Option<&str> {
        self.global.as_deref()
    }

    /// Lowers the column entries to an AND expression.
    ///
    /// Returns `None` when no entry restricts rows.
    pub fn to_filter(&self) -> Option<Filter> {
        let mut filters: Vec<Filter> = self
            .entries
            .iter()
            .filter_map(|(field, entry)| entry.to_filter(field))
            .collect();
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::And(filters)),
        }
    }

    /// Lowers the global search to an OR over visible columns, for sources
    /// that evaluate filters themselves.
    ///
    /// Matches the same rows as local evaluation: columns with options are
    /// searched by label for known codes and by raw value otherwise.
    /// Cascading option lists are not narrowed by the parent value.
    pub fn global_filter(&self, columns: &[Column]) -> Option<Filter> {
        let text = self.global.as_deref()?;
        Some(Filter::or(
            columns
                .iter()
                .filter(|c| c.visible())
                .map(|c| global_column_filter(c, text)),
        ))
    }

    /// Returns `true` if any visible column displays `text`.
    fn global_matches(text: &str, row: &Row, columns: &[Column]) -> bool {
        let needle = text.to_lowercase();
        columns.iter().filter(|c| c.visible()).any(|column| {
            column
                .get_value_view(row)
                .to_text()
                .to_lowercase()
                .contains(&needle)
        })
    }

    /// Returns the indices of rows passing every active predicate, in
    /// source order.
    pub fn apply(&self, rows: &[Row], columns: &[Column]) -> Vec<usize> {
        let filter = self.to_filter();
        rows.iter()
            .enumerate()
            .filter(|(_, row)| filter.as_ref().is_none_or(|f| f.matches(row)))
            .filter(|(_, row)| {
                self.global
                    .as_deref()
                    .is_none_or(|text| Self::global_matches(text, row, columns))
            })
            .map(|(index, _)| index)
            .collect()
    }
}
