//! Validation error types

/// A validation failure for a single field of a row.
///
/// Validation never fails an operation; these are returned as data so the
/// caller can decide how to present them.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValidationError {
    /// The column name that failed validation.
    pub field: String,
    /// Human-readable validation error message.
    pub message: String,
}

impl FieldValidationError {
    /// Creates a new field validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
