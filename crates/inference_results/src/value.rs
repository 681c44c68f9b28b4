//! Class values carried by top class entries.
//!
//! A class is a string, a number or a boolean. Numbers compare and hash by
//! their IEEE-754 bit pattern so equality and hashing agree.

use crate::errors::{Result, ResultsError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Canonical string form of a double, as older peers render it.
///
/// Magnitudes in `[1e-3, 1e7)` use plain decimal notation with at least one
/// fractional digit (`1.0`, `0.001`); others use `d.dddE<exp>` (`1.0E16`,
/// `9.0E-4`). Non-finite values render as `NaN`, `Infinity`, `-Infinity`.
/// Digits are the shortest that round-trip.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    let scientific = format!("{:e}", magnitude);
    let (mantissa, exponent) = match scientific
        .split_once('e')
        .and_then(|(m, e)| e.parse::<i32>().ok().map(|e| (m, e)))
    {
        Some(parts) => parts,
        None => return format!("{:?}", value),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (1e-3..1e7).contains(&magnitude) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() > int_len {
                format!("{}{}.{}", sign, &digits[..int_len], &digits[int_len..])
            } else {
                format!("{}{:0<width$}.0", sign, digits, width = int_len)
            }
        } else {
            let zeros = "0".repeat((-exponent - 1) as usize);
            format!("{}0.{}{}", sign, zeros, digits)
        }
    } else {
        let (lead, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        format!("{}{}.{}E{}", sign, lead, rest, exponent)
    }
}

/// JSON representation of a double. Non-finite values have no JSON number
/// form and fall back to their canonical string.
pub fn double_to_json(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(format_double(value)))
}

/// A predicted class: string, number or boolean.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ClassValue {
    /// JSON form used in rendered documents.
    pub fn to_json_value(&self) -> Value {
        match self {
            ClassValue::String(s) => Value::String(s.clone()),
            ClassValue::Number(n) => double_to_json(*n),
            ClassValue::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Convert a JSON value into a class value.
    ///
    /// `null` is a [`ResultsError::NullField`]; arrays and objects are not
    /// class values.
    pub fn from_json_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Err(ResultsError::NullField("class_name".to_string())),
            Value::String(s) => Ok(ClassValue::String(s)),
            Value::Bool(b) => Ok(ClassValue::Boolean(b)),
            Value::Number(n) => n.as_f64().map(ClassValue::Number).ok_or_else(|| {
                ResultsError::InvalidArgument(format!("class number [{}] is not representable", n))
            }),
            other => Err(ResultsError::InvalidArgument(format!(
                "class value must be a string, number or boolean, got [{}]",
                other
            ))),
        }
    }
}

impl fmt::Display for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassValue::String(s) => f.write_str(s),
            ClassValue::Number(n) => f.write_str(&format_double(*n)),
            ClassValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl PartialEq for ClassValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ClassValue::String(a), ClassValue::String(b)) => a == b,
            (ClassValue::Number(a), ClassValue::Number(b)) => a.to_bits() == b.to_bits(),
            (ClassValue::Boolean(a), ClassValue::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ClassValue {}

impl Hash for ClassValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ClassValue::String(s) => s.hash(state),
            ClassValue::Number(n) => n.to_bits().hash(state),
            ClassValue::Boolean(b) => b.hash(state),
        }
    }
}

impl From<String> for ClassValue {
    fn from(value: String) -> Self {
        ClassValue::String(value)
    }
}

impl From<&str> for ClassValue {
    fn from(value: &str) -> Self {
        ClassValue::String(value.to_string())
    }
}

impl From<f64> for ClassValue {
    fn from(value: f64) -> Self {
        ClassValue::Number(value)
    }
}

impl From<bool> for ClassValue {
    fn from(value: bool) -> Self {
        ClassValue::Boolean(value)
    }
}

impl TryFrom<Value> for ClassValue {
    type Error = ResultsError;

    fn try_from(value: Value) -> Result<Self> {
        ClassValue::from_json_value(value)
    }
}
