//! Equality, ordering and arithmetic over resolved operands.

use regex::Regex;

use crate::error::{QueryError, QueryResult};
use crate::fields::{FieldType, FieldValue, Operand};
use crate::fuzzy::{fuzzy_match, NeedleCache};
use crate::query::BinaryOp;

/// A borrowed view of an operand or of one of its elements.
#[derive(Debug, Clone, Copy)]
pub(super) enum Side<'v> {
    Value(&'v FieldValue),
    Pattern(&'v Regex),
    List(&'v [Operand]),
}

impl<'v> From<&'v Operand> for Side<'v> {
    fn from(operand: &'v Operand) -> Self {
        match operand {
            Operand::Value(value) => Side::Value(value),
            Operand::Pattern(regex) => Side::Pattern(regex),
            Operand::List(items) => Side::List(items),
        }
    }
}

impl<'v> Side<'v> {
    /// The elements of any array-like side: multi-values, both faces or a list.
    fn elements(self) -> Option<Vec<Side<'v>>> {
        match self {
            Side::Value(FieldValue::Multi(items) | FieldValue::DualFace(items)) => {
                Some(items.iter().map(Side::Value).collect())
            }
            Side::List(items) => Some(items.iter().map(Side::from).collect()),
            _ => None,
        }
    }

    /// The values across all faces, if this is a dual-face value.
    fn faces(self) -> Option<&'v [FieldValue]> {
        match self {
            Side::Value(FieldValue::DualFace(items)) => Some(items),
            _ => None,
        }
    }
}

/// Equality rules for one comparison.
pub(super) struct Matcher<'a> {
    strict: bool,
    field_type: Option<FieldType>,
    needles: &'a NeedleCache,
}

impl<'a> Matcher<'a> {
    pub(super) fn new(strict: bool, field_type: Option<FieldType>, needles: &'a NeedleCache) -> Self {
        Self {
            strict,
            field_type,
            needles,
        }
    }

    /// Succeeds if any pairing of elements is equal.
    pub(super) fn equals(&self, left: Side<'_>, right: Side<'_>) -> bool {
        if let Some(items) = left.elements() {
            return items.into_iter().any(|item| self.equals(item, right));
        }
        if let Some(items) = right.elements() {
            return items.into_iter().any(|item| self.equals(left, item));
        }

        match (left, right) {
            (Side::Value(value), Side::Pattern(regex)) | (Side::Pattern(regex), Side::Value(value)) => {
                value.as_str().is_some_and(|s| regex.is_match(s))
            }
            (Side::Value(left), Side::Value(right)) => self.scalars_equal(left, right),
            _ => false,
        }
    }

    /// Negated equality.
    ///
    /// A dual-face side succeeds when any of its values is unequal. A
    /// multi-value or list side succeeds only when no element is equal.
    pub(super) fn not_equals(&self, left: Side<'_>, right: Side<'_>) -> bool {
        if let Some(faces) = left.faces() {
            return faces.iter().any(|face| self.not_equals(Side::Value(face), right));
        }
        if let Some(items) = left.elements() {
            return items.into_iter().all(|item| !self.equals(item, right));
        }
        if let Some(faces) = right.faces() {
            return faces.iter().any(|face| self.not_equals(left, Side::Value(face)));
        }
        if let Some(items) = right.elements() {
            return items.into_iter().all(|item| !self.equals(left, item));
        }
        !self.equals(left, right)
    }

    /// Negated containment: the exact negation of containment, for every
    /// kind of value.
    pub(super) fn not_contains(&self, left: Side<'_>, list: Side<'_>) -> bool {
        !self.equals(left, list)
    }

    fn scalars_equal(&self, left: &FieldValue, right: &FieldValue) -> bool {
        if self.field_type == Some(FieldType::Number) {
            if let Some(equal) = numeric_equality(left, right) {
                return equal;
            }
        }

        match (left, right) {
            (FieldValue::Number(l), FieldValue::Number(r)) => l == r,
            (FieldValue::Bool(l), FieldValue::Bool(r)) => l == r,
            (FieldValue::String(l), FieldValue::String(r)) => self.strings_equal(l, r),
            _ => left.is_nullish() && right.is_nullish(),
        }
    }

    fn strings_equal(&self, left: &str, right: &str) -> bool {
        let left = normalize(left);
        let right = normalize(right);

        if left.is_empty() || right.is_empty() {
            return left.is_empty() && right.is_empty();
        }

        if !self.strict {
            return self
                .needles
                .get_or_prepare(&right)
                .is_some_and(|needle| fuzzy_match(&[left.as_str()], &needle));
        }

        if self.field_type == Some(FieldType::Text) {
            left.contains(right.as_str())
        } else {
            left == right
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Compares a numeric-looking string against a number field value.
///
/// Returns `None` when neither side is a string or the string is not numeric,
/// leaving the comparison to the general rules.
fn numeric_equality(left: &FieldValue, right: &FieldValue) -> Option<bool> {
    let (text, other) = match (left, right) {
        (_, FieldValue::String(s)) => (s, left),
        (FieldValue::String(s), _) => (s, right),
        _ => return None,
    };
    let coerced = parse_number(text).ok()?;

    let other = match other {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Null => None,
        FieldValue::String(s) => parse_number(s).ok()?,
        _ => return Some(false),
    };
    Some(coerced == other)
}

/// Converts a field value to a number.
///
/// `Null`, the empty string and `"-"` have no numeric value. The sentinels
/// `"x"`, `"*"` and `"?"` map to -2, -3 and -4.
///
/// # Errors
///
/// Returns `QueryError::Coercion` for non-numeric strings, booleans and
/// array values.
pub fn to_number(value: &FieldValue) -> QueryResult<Option<f64>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::Number(n) => Ok(Some(*n)),
        FieldValue::String(s) => parse_number(s),
        other => Err(QueryError::coercion(other.kind())),
    }
}

fn parse_number(raw: &str) -> QueryResult<Option<f64>> {
    match raw.trim().to_lowercase().as_str() {
        "" | "-" => Ok(None),
        "x" => Ok(Some(-2.0)),
        "*" => Ok(Some(-3.0)),
        "?" => Ok(Some(-4.0)),
        text => text
            .parse::<f64>()
            .ok()
            .filter(|n| !n.is_nan())
            .map(Some)
            .ok_or_else(|| QueryError::coercion(format!("\"{}\"", raw))),
    }
}

fn side_number(side: Side<'_>) -> QueryResult<Option<f64>> {
    match side {
        Side::Value(value) => to_number(value),
        Side::Pattern(regex) => Err(QueryError::coercion(format!("regex /{}/", regex.as_str()))),
        Side::List(_) => Err(QueryError::coercion("list")),
    }
}

/// Numeric ordering. Array-like sides succeed if any pairing does; a side
/// without a numeric value makes the pairing false.
pub(super) fn ordering(op: BinaryOp, left: Side<'_>, right: Side<'_>) -> QueryResult<bool> {
    if let Some(items) = left.elements() {
        for item in items {
            if ordering(op, item, right)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }
    if let Some(items) = right.elements() {
        for item in items {
            if ordering(op, left, item)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }

    let (Some(l), Some(r)) = (side_number(left)?, side_number(right)?) else {
        return Ok(false);
    };

    Ok(match op {
        BinaryOp::Gt => l > r,
        BinaryOp::Lt => l < r,
        BinaryOp::Gte => l >= r,
        BinaryOp::Lte => l <= r,
        _ => false,
    })
}

/// Name of a division-like operator in error messages.
pub(super) fn operator_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Rem => "modulo",
        _ => "division",
    }
}

/// Arithmetic over two operands, mapped over multi-values and faces.
///
/// A side without a numeric value yields `Null`.
pub(super) fn arithmetic(op: BinaryOp, left: Side<'_>, right: Side<'_>) -> QueryResult<FieldValue> {
    match (left, right) {
        (Side::Value(l), Side::Value(r)) => arithmetic_values(op, l, r),
        _ => {
            let (Some(l), Some(r)) = (side_number(left)?, side_number(right)?) else {
                return Ok(FieldValue::Null);
            };
            apply(op, l, r).map(FieldValue::Number)
        }
    }
}

fn arithmetic_values(op: BinaryOp, left: &FieldValue, right: &FieldValue) -> QueryResult<FieldValue> {
    match (left, right) {
        (FieldValue::Multi(items), _) => items
            .iter()
            .map(|item| arithmetic_values(op, item, right))
            .collect::<QueryResult<Vec<_>>>()
            .map(FieldValue::Multi),
        (FieldValue::DualFace(items), _) => items
            .iter()
            .map(|item| arithmetic_values(op, item, right))
            .collect::<QueryResult<Vec<_>>>()
            .map(FieldValue::across_faces),
        (_, FieldValue::Multi(items)) => items
            .iter()
            .map(|item| arithmetic_values(op, left, item))
            .collect::<QueryResult<Vec<_>>>()
            .map(FieldValue::Multi),
        (_, FieldValue::DualFace(items)) => items
            .iter()
            .map(|item| arithmetic_values(op, left, item))
            .collect::<QueryResult<Vec<_>>>()
            .map(FieldValue::across_faces),
        _ => {
            let (Some(l), Some(r)) = (to_number(left)?, to_number(right)?) else {
                return Ok(FieldValue::Null);
            };
            apply(op, l, r).map(FieldValue::Number)
        }
    }
}

fn apply(op: BinaryOp, l: f64, r: f64) -> QueryResult<f64> {
    match op {
        BinaryOp::Add => Ok(l + r),
        BinaryOp::Sub => Ok(l - r),
        BinaryOp::Mul => Ok(l * r),
        BinaryOp::Div | BinaryOp::Rem if r == 0.0 => Err(QueryError::DivisionByZero {
            operator: operator_name(op),
        }),
        BinaryOp::Div => Ok(l / r),
        BinaryOp::Rem => Ok(l % r),
        other => Err(QueryError::invalid_node(format!(
            "'{}' is not an arithmetic operator",
            other
        ))),
    }
}
