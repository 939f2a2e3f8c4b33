//! Field-level validation errors.

use std::collections::BTreeMap;
use std::fmt;

/// Validation failures keyed by field name.
///
/// An empty set means the record is valid. Errors are recoverable: callers
/// display them and let the author resubmit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a message to a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    /// Messages attached to `field`, empty if none.
    #[must_use]
    pub fn on(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of messages across all fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| (*field, m.as_str())))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field} {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let errors = ValidationErrors::new();
        assert!(errors.is_empty());
        assert_eq!(errors.len(), 0);
        assert!(errors.on("hat").is_empty());
    }

    #[test]
    fn test_add_and_lookup() {
        let mut errors = ValidationErrors::new();
        errors.add("hat", "not wearable by user");
        errors.add("body", "can't be blank");
        errors.add("body", "is too short");

        assert_eq!(errors.on("hat"), ["not wearable by user"]);
        assert_eq!(errors.on("body").len(), 2);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_display_is_field_ordered() {
        let mut errors = ValidationErrors::new();
        errors.add("short_id", "is invalid");
        errors.add("body", "can't be blank");
        assert_eq!(errors.to_string(), "body can't be blank, short_id is invalid");
    }
}
