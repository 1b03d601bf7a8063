pub mod user;
pub mod business;
pub mod tax_profile;
pub mod preferences;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use user::{LoginInput, RegisterInput, User, UserProfile};
pub use business::{Business, BusinessInfo, BusinessInput};
pub use tax_profile::{TaxInfo, TaxInput, TaxProfile};
pub use preferences::{AccountingMethod, BookkeepingPreferences, Preferences, PreferencesInput};

/// A single submitted form value. Forms post strings; JSON clients may send booleans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
}

impl FieldValue {
    /// Only a literal `true` (or the string "true") counts as set.
    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Text(s) => s == "true",
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Flat field-name → value mapping, the shape every step submission arrives in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepFields(HashMap<String, FieldValue>);

impl StepFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Missing fields read as the empty string.
    pub fn text(&self, name: &str) -> String {
        self.0.get(name).map(FieldValue::as_text).unwrap_or_default()
    }

    pub fn flag(&self, name: &str) -> bool {
        self.0.get(name).map(FieldValue::as_bool).unwrap_or(false)
    }
}

/// Empty strings are stored as NULL.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_only_accept_literal_true() {
        let fields = StepFields::new()
            .with("a", "true")
            .with("b", "on")
            .with("c", true)
            .with("d", "TRUE");
        assert!(fields.flag("a"));
        assert!(!fields.flag("b"));
        assert!(fields.flag("c"));
        assert!(!fields.flag("d"));
        assert!(!fields.flag("missing"));
    }

    #[test]
    fn step_fields_deserialize_mixed_values() {
        let fields: StepFields =
            serde_json::from_str(r#"{"tinNumber":"123456789","vatRegistered":false}"#).unwrap();
        assert_eq!(fields.text("tinNumber"), "123456789");
        assert!(!fields.flag("vatRegistered"));
        assert_eq!(fields.text("fiscalYearEnd"), "");
    }
}
