//! Structural comparison

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::tree::{Tree, View};
use crate::CompareOptions;

/// Outcome of comparing an expected tree against an actual one
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub success: bool,
    pub differences: Vec<Difference>,
    pub missing_fields: Vec<String>,
    pub extra_fields: Vec<String>,
}

/// A value-level difference at one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    pub category: DiffCategory,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffCategory {
    /// The two sides hold different types; the subtree was not walked
    TypeMismatch,
    /// Arrays of different length; elements were not compared
    LengthMismatch,
    /// Scalars of the same type with different values
    ValueMismatch,
}

impl fmt::Display for DiffCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffCategory::TypeMismatch => write!(f, "TYPE"),
            DiffCategory::LengthMismatch => write!(f, "LENGTH"),
            DiffCategory::ValueMismatch => write!(f, "VALUE"),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", display_path(&self.path), self.message)
    }
}

/// Render a path for humans; the root has an empty path
pub(crate) fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Compare `expected` against `actual`
///
/// Differences and missing fields come from one walk driven by `expected`;
/// extra fields come from a second, independent walk driven by `actual`.
/// Never panics and never mutates its inputs.
pub fn compare<T: Tree>(expected: &T, actual: &T, options: &CompareOptions) -> ComparisonResult {
    let mut walk = Walk::default();
    walk.diff("", expected, actual, options);
    collect_extras("", expected, actual, options, &mut walk.extra_fields);

    ComparisonResult {
        success: walk.differences.is_empty()
            && walk.missing_fields.is_empty()
            && walk.extra_fields.is_empty(),
        differences: walk.differences,
        missing_fields: walk.missing_fields,
        extra_fields: walk.extra_fields,
    }
}

#[derive(Default)]
struct Walk {
    differences: Vec<Difference>,
    missing_fields: Vec<String>,
    extra_fields: Vec<String>,
}

impl Walk {
    fn diff<T: Tree>(&mut self, path: &str, expected: &T, actual: &T, options: &CompareOptions) {
        let expected = expected.view();
        let actual = actual.view();

        match (&expected, &actual) {
            (View::Null, View::Null) | (View::Undefined, View::Undefined) => return,
            (View::Null, _) if options.ignore_null_values => return,
            (View::Undefined, _) if options.ignore_undefined_values => return,
            _ => {}
        }

        if expected.type_name() != actual.type_name() {
            self.push(
                DiffCategory::TypeMismatch,
                path,
                format!(
                    "type mismatch: expected {}, got {}",
                    expected.type_name(),
                    actual.type_name()
                ),
            );
            return;
        }

        match (expected, actual) {
            (View::Array(exp_items), View::Array(act_items)) => {
                if exp_items.len() != act_items.len() {
                    self.push(
                        DiffCategory::LengthMismatch,
                        path,
                        format!(
                            "array length mismatch: expected {}, got {}",
                            exp_items.len(),
                            act_items.len()
                        ),
                    );
                    return;
                }
                for (i, (exp, act)) in exp_items.into_iter().zip(act_items).enumerate() {
                    self.diff(&index_path(path, i), exp, act, options);
                }
            }
            (View::Object(exp_fields), View::Object(act_fields)) => {
                let act_fields: HashMap<&str, _> = act_fields.into_iter().collect();
                for (key, exp) in exp_fields {
                    if options.is_ignored(key) {
                        continue;
                    }
                    let child = key_path(path, key);
                    match act_fields.get(key) {
                        Some(act) => self.diff(&child, exp, *act, options),
                        None => self.missing_fields.push(child),
                    }
                }
            }
            (exp, act) => {
                if !scalars_equal(&exp, &act, options) {
                    self.push(
                        DiffCategory::ValueMismatch,
                        path,
                        format!("expected {}, got {}", exp.render(), act.render()),
                    );
                }
            }
        }
    }

    fn push(&mut self, category: DiffCategory, path: &str, message: String) {
        self.differences.push(Difference {
            category,
            path: path.to_string(),
            message,
        });
    }
}

fn scalars_equal<T>(expected: &View<'_, T>, actual: &View<'_, T>, options: &CompareOptions) -> bool {
    match (expected, actual) {
        (View::String(a), View::String(b)) if !options.case_sensitive => {
            a.to_lowercase() == b.to_lowercase()
        }
        (View::String(a), View::String(b)) => a == b,
        (View::Number(a), View::Number(b)) => a == b,
        (View::Bool(a), View::Bool(b)) => a == b,
        (View::Null, View::Null) | (View::Undefined, View::Undefined) => true,
        _ => false,
    }
}

/// Record every key of `actual` that the matching level of `expected` lacks
fn collect_extras<T: Tree>(
    path: &str,
    expected: &T,
    actual: &T,
    options: &CompareOptions,
    extras: &mut Vec<String>,
) {
    match (expected.view(), actual.view()) {
        (View::Object(exp_fields), View::Object(act_fields)) => {
            let exp_fields: HashMap<&str, _> = exp_fields.into_iter().collect();
            for (key, act) in act_fields {
                if options.is_ignored(key) {
                    continue;
                }
                let child = key_path(path, key);
                match exp_fields.get(key) {
                    Some(exp) => collect_extras(&child, *exp, act, options, extras),
                    None => extras.push(child),
                }
            }
        }
        (View::Array(exp_items), View::Array(act_items)) => {
            for (i, act) in act_items.into_iter().enumerate() {
                let child = index_path(path, i);
                match exp_items.get(i) {
                    Some(exp) => collect_extras(&child, *exp, act, options, extras),
                    None => extras.push(child),
                }
            }
        }
        _ => {}
    }
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn run(expected: Value, actual: Value) -> ComparisonResult {
        compare(&expected, &actual, &CompareOptions::default())
    }

    #[test]
    fn test_reflexive() {
        let value = json!({"a": 1, "b": {"c": 2}, "d": [1, {"e": null}], "f": "x"});
        let result = run(value.clone(), value);
        assert!(result.success);
        assert!(result.differences.is_empty());
    }

    #[test]
    fn test_type_mismatch_short_circuits() {
        let result = run(json!({"a": {"b": 1}}), json!({"a": "x"}));
        assert_eq!(result.differences.len(), 1);
        let diff = &result.differences[0];
        assert_eq!(diff.path, "a");
        assert_eq!(diff.category, DiffCategory::TypeMismatch);
        assert!(result.missing_fields.is_empty());
        assert!(!result.success);
    }

    #[test]
    fn test_missing_field() {
        let result = run(json!({"a": 1, "b": 2}), json!({"a": 1}));
        assert_eq!(result.missing_fields, vec!["b"]);
        assert!(result.differences.is_empty());
        assert!(result.extra_fields.is_empty());
        assert!(!result.success);
    }

    #[test]
    fn test_extra_field() {
        let result = run(json!({"a": 1}), json!({"a": 1, "b": 2}));
        assert_eq!(result.extra_fields, vec!["b"]);
        assert!(result.missing_fields.is_empty());
        assert!(!result.success);
    }

    #[test]
    fn test_nested_extra_field() {
        let result = run(json!({"a": {"b": 1}}), json!({"a": {"b": 1, "c": 3}}));
        assert_eq!(result.extra_fields, vec!["a.c"]);
    }

    #[test]
    fn test_ignore_fields_by_leaf_name() {
        let options = CompareOptions::new().ignore_field("href");
        let result = compare(
            &json!({"a": {"href": "x"}, "href": "y"}),
            &json!({"a": {"href": "z"}, "href": "w"}),
            &options,
        );
        assert!(result.success, "{:?}", result);
    }

    #[test]
    fn test_ignored_field_not_reported_as_extra() {
        let options = CompareOptions::new().ignore_field("webUrl");
        let result = compare(
            &json!({"a": {}}),
            &json!({"a": {"webUrl": "http://x"}, "webUrl": "http://y"}),
            &options,
        );
        assert!(result.success);
    }

    #[test]
    fn test_array_length_mismatch_skips_elements() {
        let result = run(json!({"xs": [1, 2, 3]}), json!({"xs": [9, 9]}));
        assert_eq!(result.differences.len(), 1);
        assert_eq!(result.differences[0].path, "xs");
        assert_eq!(result.differences[0].category, DiffCategory::LengthMismatch);
    }

    #[test]
    fn test_arrays_are_positional() {
        let result = run(json!([1, 2]), json!([2, 1]));
        let paths: Vec<_> = result.differences.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["[0]", "[1]"]);
    }

    #[test]
    fn test_nested_path_format() {
        let result = run(json!({"a": {"b": [0, 0, {"c": 1}]}}), json!({"a": {"b": [0, 0, {"c": 2}]}}));
        assert_eq!(result.differences[0].path, "a.b[2].c");
        assert_eq!(result.differences[0].message, "expected 1, got 2");
    }

    #[test]
    fn test_array_vs_object_is_type_mismatch() {
        let result = run(json!({"a": []}), json!({"a": {}}));
        assert_eq!(result.differences[0].category, DiffCategory::TypeMismatch);
        assert_eq!(result.differences[0].message, "type mismatch: expected array, got object");
    }

    #[test]
    fn test_no_coercion_between_number_and_string() {
        let result = run(json!({"n": 1}), json!({"n": "1"}));
        assert_eq!(result.differences[0].category, DiffCategory::TypeMismatch);
    }

    #[test]
    fn test_null_handling() {
        assert!(run(json!({"a": null}), json!({"a": null})).success);
        assert!(!run(json!({"a": null}), json!({"a": 5})).success);

        let options = CompareOptions::new().ignore_nulls();
        assert!(compare(&json!({"a": null}), &json!({"a": 5}), &options).success);
        // Only an expected null is tolerated
        assert!(!compare(&json!({"a": 5}), &json!({"a": null}), &options).success);
    }

    #[test]
    fn test_undefined_handling() {
        let expected: Option<Value> = None;
        let actual = Some(json!({"a": 1}));
        assert!(!compare(&expected, &actual, &CompareOptions::default()).success);
        assert!(compare(&expected, &actual, &CompareOptions::new().ignore_undefined()).success);
        assert!(compare(&None::<Value>, &None, &CompareOptions::default()).success);
    }

    #[test]
    fn test_case_sensitivity() {
        assert!(!run(json!({"s": "Hello"}), json!({"s": "hello"})).success);
        let options = CompareOptions::new().case_insensitive();
        assert!(compare(&json!({"s": "Hello"}), &json!({"s": "hello"}), &options).success);
    }

    #[test]
    fn test_integer_and_float_compare_numerically() {
        assert!(run(json!({"n": 1}), json!({"n": 1.0})).success);
        assert!(!run(json!({"n": 1}), json!({"n": 1.5})).success);
    }

    #[test]
    fn test_root_scalar_difference() {
        let result = run(json!("a"), json!("b"));
        assert_eq!(result.differences[0].path, "");
        assert_eq!(result.differences[0].to_string(), "<root>: expected \"a\", got \"b\"");
    }

    #[test]
    fn test_extra_array_elements_reported() {
        let result = run(json!({"xs": [1]}), json!({"xs": [1, 2]}));
        assert_eq!(result.extra_fields, vec!["xs[1]"]);
    }
}
