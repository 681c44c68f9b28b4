//! How the predicted value is rendered into a result document.

use crate::errors::{Result, ResultsError};
use crate::value::double_to_json;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Output type of the predicted value field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionFieldType {
    #[default]
    String,
    Number,
    Boolean,
}

impl PredictionFieldType {
    pub const ALL: [PredictionFieldType; 3] = [
        PredictionFieldType::String,
        PredictionFieldType::Number,
        PredictionFieldType::Boolean,
    ];

    /// Wire ordinal.
    pub fn ordinal(self) -> u32 {
        match self {
            PredictionFieldType::String => 0,
            PredictionFieldType::Number => 1,
            PredictionFieldType::Boolean => 2,
        }
    }

    pub fn from_ordinal(ordinal: u32) -> Result<Self> {
        Self::ALL.get(ordinal as usize).copied().ok_or_else(|| {
            ResultsError::MalformedStream(format!(
                "unknown prediction field type ordinal [{}]",
                ordinal
            ))
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PredictionFieldType::String => "string",
            PredictionFieldType::Number => "number",
            PredictionFieldType::Boolean => "boolean",
        }
    }

    /// Parse a type name, falling back to `String` for unknown names.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(name, "unknown prediction field type, using string");
            PredictionFieldType::String
        })
    }

    /// Render a prediction according to this type.
    ///
    /// `string_rep` is the label or canonical string form of `value`.
    pub fn transform(self, value: f64, string_rep: &str) -> Value {
        match self {
            PredictionFieldType::String => Value::String(string_rep.to_string()),
            PredictionFieldType::Number => {
                if string_rep.is_empty() {
                    return double_to_json(value);
                }
                if let Ok(long) = string_rep.parse::<i64>() {
                    return Value::from(long);
                }
                match string_rep.parse::<f64>() {
                    Ok(parsed) => double_to_json(parsed),
                    Err(_) => double_to_json(value),
                }
            }
            PredictionFieldType::Boolean => {
                if let Ok(parsed) = string_rep.parse::<f64>() {
                    return Value::Bool(parsed == 1.0);
                }
                if string_rep.eq_ignore_ascii_case("true") {
                    return Value::Bool(true);
                }
                if string_rep.eq_ignore_ascii_case("false") {
                    return Value::Bool(false);
                }
                Value::Bool(value == 1.0)
            }
        }
    }
}

impl FromStr for PredictionFieldType {
    type Err = ResultsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(PredictionFieldType::String),
            "number" => Ok(PredictionFieldType::Number),
            "boolean" => Ok(PredictionFieldType::Boolean),
            other => Err(ResultsError::Config(format!(
                "unknown prediction field type [{}]",
                other
            ))),
        }
    }
}

/// Unknown names deserialize as `String`.
impl<'de> Deserialize<'de> for PredictionFieldType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(PredictionFieldType::parse_or_default(&name))
    }
}

impl fmt::Display for PredictionFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
