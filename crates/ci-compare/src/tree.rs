//! Abstract tree-shaped values

use std::fmt;

use serde_json::Value;

/// A numeric leaf
///
/// Integers compare exactly against integers; any comparison involving a
/// float is done in `f64`, so `1` and `1.0` are equal.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl Number {
    fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::Int(i as i128)
        } else if let Some(u) = n.as_u64() {
            Number::Int(u as i128)
        } else {
            Number::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// A borrowed view of one node of a tree
pub enum View<'a, T> {
    /// No value at all, as opposed to an explicit null
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(&'a str),
    Array(Vec<&'a T>),
    Object(Vec<(&'a str, &'a T)>),
}

impl<T> View<'_, T> {
    /// Name of the node's type, used to detect type mismatches
    pub fn type_name(&self) -> &'static str {
        match self {
            View::Undefined => "undefined",
            View::Null => "null",
            View::Bool(_) => "boolean",
            View::Number(_) => "number",
            View::String(_) => "string",
            View::Array(_) => "array",
            View::Object(_) => "object",
        }
    }

    /// Short rendering for diagnostics
    pub fn render(&self) -> String {
        match self {
            View::Undefined => "undefined".to_string(),
            View::Null => "null".to_string(),
            View::Bool(b) => b.to_string(),
            View::Number(n) => n.to_string(),
            View::String(s) => format!("{:?}", s),
            View::Array(items) => format!("array(len {})", items.len()),
            View::Object(fields) => format!("object({} fields)", fields.len()),
        }
    }
}

/// A value the comparator can walk
///
/// Children share a single node type, so recursion settles on one type
/// after the root.
pub trait Tree {
    type Child: Tree<Child = Self::Child>;

    fn view(&self) -> View<'_, Self::Child>;
}

impl Tree for Value {
    type Child = Value;

    fn view(&self) -> View<'_, Value> {
        match self {
            Value::Null => View::Null,
            Value::Bool(b) => View::Bool(*b),
            Value::Number(n) => View::Number(n.into()),
            Value::String(s) => View::String(s),
            Value::Array(items) => View::Array(items.iter().collect()),
            Value::Object(map) => View::Object(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
        }
    }
}

impl<T: Tree> Tree for Option<T> {
    type Child = T::Child;

    fn view(&self) -> View<'_, T::Child> {
        match self {
            Some(inner) => inner.view(),
            None => View::Undefined,
        }
    }
}

impl<T: Tree> Tree for &T {
    type Child = T::Child;

    fn view(&self) -> View<'_, T::Child> {
        (**self).view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_equality() {
        assert_eq!(Number::Int(1), Number::Float(1.0));
        assert_ne!(Number::Int(1), Number::Int(2));
        assert_eq!(Number::from(&serde_json::Number::from(u64::MAX)), Number::Int(u64::MAX as i128));
    }

    #[test]
    fn test_value_views() {
        assert_eq!(json!(null).view().type_name(), "null");
        assert_eq!(json!([1, 2]).view().type_name(), "array");
        assert_eq!(json!({"a": 1}).view().type_name(), "object");
        assert_eq!(json!("x").view().render(), "\"x\"");
    }

    #[test]
    fn test_option_none_is_undefined() {
        let missing: Option<Value> = None;
        assert_eq!(missing.view().type_name(), "undefined");
        assert_eq!(Some(json!(true)).view().type_name(), "boolean");
    }
}
