//! Options controlling structural comparison

use std::collections::HashSet;

/// Tolerance rules for a single comparison
///
/// Nothing is ignored by default; callers opt in per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Field names skipped at any depth (matched on the key, not the full path)
    pub ignore_fields: HashSet<String>,
    /// Treat an expected `null` as matching anything
    pub ignore_null_values: bool,
    /// Treat an expected undefined value as matching anything
    pub ignore_undefined_values: bool,
    /// Compare strings exactly; when false, strings are compared case-folded
    pub case_sensitive: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignore_fields: HashSet::new(),
            ignore_null_values: false,
            ignore_undefined_values: false,
            case_sensitive: true,
        }
    }
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip every field with this key name
    pub fn ignore_field(mut self, field: &str) -> Self {
        self.ignore_fields.insert(field.to_string());
        self
    }

    /// Skip every field whose key name is in `fields`
    pub fn ignore_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn ignore_nulls(mut self) -> Self {
        self.ignore_null_values = true;
        self
    }

    pub fn ignore_undefined(mut self) -> Self {
        self.ignore_undefined_values = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Whether a key is in the ignore set
    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignore_fields.contains(key)
    }
}
