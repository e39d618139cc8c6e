//! Per-column value validation.

use crate::model::Value;

/// Capability injected into a column to validate edited values.
///
/// Receives the column title (for messages) and the value, and returns
/// human-readable errors. An empty list means the value is valid.
///
/// Any `Fn(&str, &Value) -> Vec<String>` closure is a validator.
pub trait Validator: Send + Sync {
    fn validate(&self, title: &str, value: &Value) -> Vec<String>;
}

impl<F> Validator for F
where
    F: Fn(&str, &Value) -> Vec<String> + Send + Sync,
{
    fn validate(&self, title: &str, value: &Value) -> Vec<String> {
        self(title, value)
    }
}

/// Type alias for rule closures; `None` means the rule passed.
type Rule = Box<dyn Fn(&str, &Value) -> Option<String> + Send + Sync>;

/// A validator assembled from built-in and custom rules.
///
/// Every failing rule contributes one message, in the order the rules were
/// added.
///
/// # Example
///
/// ```
/// use datagrid::column::{Rules, Validator};
/// use datagrid::model::Value;
///
/// let rules = Rules::new().required().max_length(5);
/// assert_eq!(rules.validate("Code", &Value::Null), vec!["Code is required"]);
/// assert!(rules.validate("Code", &Value::from("abc")).is_empty());
/// ```
#[derive(Default)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom rule that fails with `msg` when `f` returns false.
    pub fn rule<F>(mut self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let msg = msg.into();
        self.rules
            .push(Box::new(move |_, v| (!f(v)).then(|| msg.clone())));
        self
    }

    /// Requires a non-blank value.
    pub fn required(mut self) -> Self {
        self.rules.push(Box::new(|title, v| {
            v.is_blank().then(|| format!("{title} is required"))
        }));
        self
    }

    /// Requires at most `max` characters. Blank values pass.
    pub fn max_length(mut self, max: usize) -> Self {
        self.rules.push(Box::new(move |title, v| {
            (v.to_text().chars().count() > max)
                .then(|| format!("{title} must be at most {max} characters"))
        }));
        self
    }

    /// Requires at least `min` characters. Blank values pass.
    pub fn min_length(mut self, min: usize) -> Self {
        self.rules.push(Box::new(move |title, v| {
            let len = v.to_text().chars().count();
            (!v.is_blank() && len < min)
                .then(|| format!("{title} must be at least {min} characters"))
        }));
        self
    }

    /// Requires a number not below `min`. Blank values pass.
    pub fn min(mut self, min: f64) -> Self {
        self.rules.push(Box::new(move |title, v| {
            if v.is_blank() {
                return None;
            }
            match v.as_f64() {
                Some(n) if n >= min => None,
                Some(_) => Some(format!("{title} must be at least {min}")),
                None => Some(format!("{title} must be a number")),
            }
        }));
        self
    }

    /// Requires a number not above `max`. Blank values pass.
    pub fn max(mut self, max: f64) -> Self {
        self.rules.push(Box::new(move |title, v| {
            if v.is_blank() {
                return None;
            }
            match v.as_f64() {
                Some(n) if n <= max => None,
                Some(_) => Some(format!("{title} must be at most {max}")),
                None => Some(format!("{title} must be a number")),
            }
        }));
        self
    }
}

impl Validator for Rules {
    fn validate(&self, title: &str, value: &Value) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|rule| rule(title, value))
            .collect()
    }
}

impl std::fmt::Debug for Rules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rules")
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_validator() {
        let validator = |title: &str, v: &Value| {
            if v.as_f64().is_some() {
                vec![]
            } else {
                vec![format!("{title} must be numeric")]
            }
        };
        assert_eq!(
            validator.validate("Age", &Value::from("x")),
            vec!["Age must be numeric"]
        );
    }

    #[test]
    fn test_rules_collect_every_failure() {
        let rules = Rules::new()
            .min(10.0)
            .rule(|v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0), "must be even");
        assert_eq!(
            rules.validate("Qty", &Value::from(3)),
            vec!["Qty must be at least 10".to_string(), "must be even".to_string()]
        );
        assert!(rules.validate("Qty", &Value::from(12)).is_empty());
    }

    #[test]
    fn test_blank_passes_bounds() {
        let rules = Rules::new().min(1.0).min_length(3);
        assert!(rules.validate("Qty", &Value::Null).is_empty());
    }
}
