//! Runtime values produced by field lookups.

use std::fmt;

use regex::Regex;

use crate::query::BinaryOp;

/// The declared type of a field.
///
/// The type decides how string comparisons behave: `String` fields match
/// exactly (strict) or by substring (loose), `Text` fields match by substring
/// (strict) or fuzzily (loose).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Short textual values such as names and codes.
    String,
    /// Long-form prose such as rules text.
    Text,
    /// Numeric values, possibly with sentinel strings.
    Number,
    /// Flags.
    Boolean,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        })
    }
}

/// The value of a field for one record.
///
/// The two array variants are distinct. A `Multi` value holds several
/// simultaneous values, so a negated comparison only succeeds when no element
/// matches. A `DualFace` value holds the flattened values of both faces of a
/// record, so a negated comparison succeeds when any of them fails to match.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Absent. Equivalent to the empty string in equality.
    #[default]
    Null,
    /// A flag.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// Several simultaneous values.
    Multi(Vec<FieldValue>),
    /// Distinct values found across the faces of a two-faced record.
    DualFace(Vec<FieldValue>),
}

impl FieldValue {
    /// Combines the values of both faces.
    ///
    /// Identical faces collapse into a single value. Otherwise multi-values
    /// are flattened into their elements and duplicates removed, so
    /// `[item, weapon]` and `[item]` combine to `DualFace[item, weapon]`.
    pub fn dual_face(front: FieldValue, back: FieldValue) -> Self {
        if front == back {
            front
        } else {
            FieldValue::across_faces([front, back])
        }
    }

    /// Flattens per-face values into a dual-face value.
    ///
    /// A single distinct value is returned as is.
    pub fn across_faces<I>(faces: I) -> Self
    where
        I: IntoIterator<Item = FieldValue>,
    {
        let mut values: Vec<FieldValue> = Vec::new();
        for value in faces.into_iter().flat_map(FieldValue::into_elements) {
            if !values.contains(&value) {
                values.push(value);
            }
        }

        if values.len() == 1 {
            values.pop().unwrap_or_default()
        } else {
            FieldValue::DualFace(values)
        }
    }

    fn into_elements(self) -> Vec<FieldValue> {
        match self {
            FieldValue::Multi(items) | FieldValue::DualFace(items) => items,
            other => vec![other],
        }
    }

    /// Builds a multi-value from any iterator of values.
    pub fn multi<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FieldValue>,
    {
        FieldValue::Multi(values.into_iter().map(Into::into).collect())
    }

    /// True for `Null` and the empty string.
    pub fn is_nullish(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Truthiness of a bare value used as a boolean.
    ///
    /// Arrays are truthy when any element is.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::String(s) => !s.is_empty(),
            FieldValue::Multi(items) => items.iter().any(FieldValue::is_truthy),
            FieldValue::DualFace(items) => items.iter().any(FieldValue::is_truthy),
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::String(_) => "string",
            FieldValue::Multi(_) => "multi-value",
            FieldValue::DualFace(_) => "dual-face value",
        }
    }

    /// Returns the string, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number, if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::multi(values)
    }
}

/// A fully evaluated operand of a binary expression.
///
/// Field lookups see the other side of a comparison as an `Operand`, which is
/// how a field's value can depend on what it is compared against.
#[derive(Debug, Clone)]
pub enum Operand {
    /// A field value or literal.
    Value(FieldValue),
    /// A compiled regex literal.
    Pattern(Regex),
    /// The evaluated elements of a list.
    List(Vec<Operand>),
}

impl Operand {
    /// Returns the value, if this operand is one.
    pub fn as_value(&self) -> Option<&FieldValue> {
        match self {
            Operand::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the string value, if this operand is a plain string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(FieldValue::as_str)
    }
}

impl From<FieldValue> for Operand {
    fn from(value: FieldValue) -> Self {
        Operand::Value(value)
    }
}

/// What a field is being compared against.
///
/// Built for each comparison and handed to lookups on the second resolution
/// pass.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonContext<'a> {
    /// The operator of the comparison.
    pub operator: BinaryOp,
    /// The resolved value of the other operand.
    pub other: &'a Operand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_face_collapses_identical_faces() {
        let value = FieldValue::dual_face(FieldValue::from(2), FieldValue::from(2));
        assert_eq!(value, FieldValue::Number(2.0));

        let value = FieldValue::dual_face(FieldValue::from(2), FieldValue::Null);
        assert_eq!(value, FieldValue::DualFace(vec![2.into(), FieldValue::Null]));
    }

    #[test]
    fn test_dual_face_flattens_multi_values() {
        let value = FieldValue::dual_face(
            FieldValue::multi(["item", "weapon"]),
            FieldValue::multi(["item"]),
        );
        assert_eq!(value, FieldValue::DualFace(vec!["item".into(), "weapon".into()]));

        let value = FieldValue::dual_face(FieldValue::multi(["spell"]), FieldValue::from("spell"));
        assert_eq!(value, FieldValue::from("spell"));

        let value = FieldValue::dual_face(FieldValue::from("ally"), FieldValue::multi(["item"]));
        assert_eq!(value, FieldValue::DualFace(vec!["ally".into(), "item".into()]));
    }

    #[test]
    fn test_nullish() {
        assert!(FieldValue::Null.is_nullish());
        assert!(FieldValue::from("").is_nullish());
        assert!(!FieldValue::from(" ").is_nullish());
        assert!(!FieldValue::from(0).is_nullish());
        assert!(!FieldValue::from(false).is_nullish());
    }

    #[test]
    fn test_truthiness() {
        assert!(!FieldValue::Null.is_truthy());
        assert!(!FieldValue::from(0).is_truthy());
        assert!(FieldValue::from(2).is_truthy());
        assert!(!FieldValue::from("").is_truthy());
        assert!(FieldValue::from("x").is_truthy());
        assert!(!FieldValue::multi([false, false]).is_truthy());
        assert!(FieldValue::multi([false, true]).is_truthy());
        assert!(FieldValue::dual_face(false.into(), true.into()).is_truthy());
    }

    #[test]
    fn test_from_option_and_vec() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("a")), FieldValue::from("a"));
        assert_eq!(
            FieldValue::from(vec!["a", "b"]),
            FieldValue::Multi(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::Text.to_string(), "text");
        assert_eq!(FieldType::Boolean.to_string(), "boolean");
    }
}
