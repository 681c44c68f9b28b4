//! Rendering of classification results into documents.

use crate::classification::{ClassEntry, ClassificationResult};
use crate::document::ResultDocument;
use crate::errors::{Result, ResultsError};
use crate::feature_importance::{FeatureImportance, FEATURE_IMPORTANCE};
use serde_json::{Map, Value};
use tracing::trace;

impl ClassificationResult {
    /// Write this result under `parent_result_field` of `document`.
    ///
    /// The predicted value is rendered through the configured
    /// [`PredictionFieldType`](crate::PredictionFieldType). Top classes and
    /// feature importance are only written when present.
    pub fn write_result<D>(&self, document: &mut D, parent_result_field: &str) -> Result<()>
    where
        D: ResultDocument + ?Sized,
    {
        require_parent_field(parent_result_field)?;
        trace!(parent = parent_result_field, "writing classification result");

        let mut fields = vec![(
            format!("{}.{}", parent_result_field, self.results_field()),
            self.prediction_field_type()
                .transform(self.value(), &self.value_as_string()),
        )];
        if !self.top_classes().is_empty() {
            fields.push((
                format!("{}.{}", parent_result_field, self.top_classes_field()),
                self.top_classes_json(),
            ));
        }
        if !self.feature_importance().is_empty() {
            fields.push((
                format!("{}.{}", parent_result_field, FEATURE_IMPORTANCE),
                self.feature_importance_json(),
            ));
        }

        // nothing is written unless every field can be
        for (path, _) in &fields {
            document.check_field_path(path)?;
            if let Some((other, _)) = fields
                .iter()
                .find(|(other, _)| other.starts_with(&format!("{}.", path)))
            {
                return Err(ResultsError::InvalidArgument(format!(
                    "field [{}] would be nested under field [{}]",
                    other, path
                )));
            }
        }
        for (path, value) in fields {
            document.set_field_value(&path, value)?;
        }
        Ok(())
    }

    /// Build a fresh map holding this result under the single key
    /// `parent_result_field`.
    ///
    /// Unlike [`write_result`](Self::write_result) the predicted value is
    /// always the label or string form.
    pub fn write_result_to_map(&self, parent_result_field: &str) -> Result<Map<String, Value>> {
        require_parent_field(parent_result_field)?;

        let mut results = Map::new();
        results.insert(
            self.results_field().to_string(),
            Value::String(self.value_as_string()),
        );
        if !self.top_classes().is_empty() {
            results.insert(self.top_classes_field().to_string(), self.top_classes_json());
        }
        if !self.feature_importance().is_empty() {
            results.insert(FEATURE_IMPORTANCE.to_string(), self.feature_importance_json());
        }

        let mut parent = Map::new();
        parent.insert(parent_result_field.to_string(), Value::Object(results));
        Ok(parent)
    }

    fn top_classes_json(&self) -> Value {
        Value::Array(
            self.top_classes()
                .iter()
                .map(ClassEntry::as_value_map)
                .map(Value::Object)
                .collect(),
        )
    }

    fn feature_importance_json(&self) -> Value {
        Value::Array(
            self.feature_importance()
                .iter()
                .map(FeatureImportance::to_map)
                .map(Value::Object)
                .collect(),
        )
    }
}

fn require_parent_field(parent_result_field: &str) -> Result<()> {
    if parent_result_field.trim().is_empty() {
        return Err(ResultsError::InvalidArgument(
            "[parent_result_field] must not be empty".to_string(),
        ));
    }
    Ok(())
}
