//! Select options for code/label translation

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// An entry of a column's option list.
///
/// Options translate stored codes into display labels. `parent_id` links an
/// option to a value of another column, which is how cascading option lists
/// (country → city) are expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    /// The stored code.
    pub id: Value,
    /// The display label.
    pub name: String,
    /// The parent column value this option belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Value>,
}

impl SelectOption {
    /// Creates a new option.
    pub fn new(id: impl Into<Value>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    /// Sets the parent value (builder pattern).
    pub fn with_parent(mut self, parent_id: impl Into<Value>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Returns `true` if this option's code matches `value`.
    ///
    /// Codes are compared by their text form so `1` and `"1"` match.
    pub fn matches(&self, value: &Value) -> bool {
        self.id.to_text() == value.to_text()
    }

    /// Returns `true` if this option belongs to the given parent value.
    pub fn belongs_to(&self, parent: &Value) -> bool {
        self.parent_id
            .as_ref()
            .is_some_and(|p| p.to_text() == parent.to_text())
    }
}
