//! Dotted-path document trees that results are written into.

use crate::errors::{Result, ResultsError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

/// A document that accepts values at dotted paths such as `ml.results.label`.
pub trait ResultDocument {
    /// Set `value` at `path`, creating intermediate objects as needed.
    fn set_field_value(&mut self, path: &str, value: Value) -> Result<()>;

    /// Check that `path` could be set without changing the document.
    fn check_field_path(&self, path: &str) -> Result<()>;
}

/// A JSON document being enriched with inference results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestDocument {
    source: Map<String, Value>,
}

impl IngestDocument {
    pub fn new(source: Map<String, Value>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    pub fn into_source(self) -> Map<String, Value> {
        self.source
    }

    /// Value at a dotted path, if every segment exists.
    pub fn get_field_value(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.source.get(first)?, |current, segment| {
            current.as_object()?.get(segment)
        })
    }

    pub fn has_field(&self, path: &str) -> bool {
        self.get_field_value(path).is_some()
    }
}

impl ResultDocument for IngestDocument {
    fn set_field_value(&mut self, path: &str, value: Value) -> Result<()> {
        self.source.set_field_value(path, value)
    }

    fn check_field_path(&self, path: &str) -> Result<()> {
        self.source.check_field_path(path)
    }
}

impl ResultDocument for Map<String, Value> {
    fn set_field_value(&mut self, path: &str, value: Value) -> Result<()> {
        let (last, parents) = split_path(path)?;
        trace!(path, "setting document field");

        let mut current = self;
        for segment in parents {
            let child = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match child {
                Value::Object(map) => map,
                other => return Err(blocked_path(segment, path, other)),
            };
        }
        current.insert(last.to_string(), value);
        Ok(())
    }

    fn check_field_path(&self, path: &str) -> Result<()> {
        let (_, parents) = split_path(path)?;

        let mut current = self;
        for segment in parents {
            current = match current.get(segment) {
                None => return Ok(()),
                Some(Value::Object(map)) => map,
                Some(other) => return Err(blocked_path(segment, path, other)),
            };
        }
        Ok(())
    }
}

fn split_path(path: &str) -> Result<(&str, Vec<&str>)> {
    let mut segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(ResultsError::InvalidArgument(format!(
            "path [{}] has an empty segment",
            path
        )));
    }
    match segments.pop() {
        Some(last) => Ok((last, segments)),
        None => Err(ResultsError::InvalidArgument("path must not be empty".into())),
    }
}

fn blocked_path(segment: &str, path: &str, existing: &Value) -> ResultsError {
    ResultsError::InvalidArgument(format!(
        "cannot add field under [{}] in path [{}]: existing value is {}",
        segment,
        path,
        json_type_name(existing)
    ))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
