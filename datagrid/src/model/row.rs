//! Dynamic row record

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// A single row of the grid.
///
/// Rows hold field values as a `HashMap<String, Value>`; the engine never
/// mutates rows it was given, it only reads them through columns.
///
/// # Example
///
/// ```
/// use datagrid::model::{Row, Value};
///
/// let row = Row::new()
///     .set("name", "Contoso")
///     .set("address", Row::new().set("city", "Ghent"));
///
/// assert_eq!(row.get_path("address.city"), Some(&Value::from("Ghent")));
/// assert_eq!(row.get_path("address.zip"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: HashMap<String, Value>,
}

impl Row {
    /// Creates a new empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Returns a reference to the top-level field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns `true` if the row contains the given top-level field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Consumes the row and returns its fields.
    pub fn into_fields(self) -> HashMap<String, Value> {
        self.fields
    }

    /// Returns the number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolves a dotted path such as `customer.address.city`.
    ///
    /// A top-level key that literally contains the dots wins over path
    /// traversal. Returns `None` as soon as a segment is absent, null, or not
    /// an object; absent data is expected in heterogeneous row sets.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.fields.get(path) {
            return (!value.is_null()).then_some(value);
        }
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(fields) => fields.get(segment)?,
                _ => return None,
            };
        }
        (!current.is_null()).then_some(current)
    }

    /// Returns the text form of the key field, used as row identity when
    /// rows are owned by a server.
    pub fn key(&self, field: &str) -> Option<String> {
        self.get_path(field).map(Value::to_text)
    }
}

impl From<HashMap<String, Value>> for Row {
    fn from(fields: HashMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
