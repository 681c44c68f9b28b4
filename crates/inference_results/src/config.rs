//! Classification output configuration
//!
//! Supplies the field names, top-K limits and prediction field type that
//! every [`ClassificationResult`](crate::ClassificationResult) is built with.
//! Callers own the configuration and pass it to each result explicitly.

use crate::errors::{Result, ResultsError};
use crate::feature_importance::FEATURE_IMPORTANCE;
use crate::prediction_type::PredictionFieldType;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RESULTS_FIELD: &str = "predicted_value";
pub const DEFAULT_TOP_CLASSES_RESULTS_FIELD: &str = "top_classes";

/// Classification inference configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Number of top classes the model is asked to report
    pub num_top_classes: u32,
    /// Field holding the predicted value
    pub results_field: String,
    /// Field holding the top classes list
    pub top_classes_results_field: String,
    /// Number of feature importance values kept per result
    pub num_top_feature_importance_values: u32,
    /// Rendering of the predicted value
    pub prediction_field_type: PredictionFieldType,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            num_top_classes: 0,
            results_field: DEFAULT_RESULTS_FIELD.to_string(),
            top_classes_results_field: DEFAULT_TOP_CLASSES_RESULTS_FIELD.to_string(),
            num_top_feature_importance_values: 0,
            prediction_field_type: PredictionFieldType::String,
        }
    }
}

impl ClassificationConfig {
    pub fn new(
        num_top_classes: u32,
        results_field: impl Into<String>,
        top_classes_results_field: impl Into<String>,
        num_top_feature_importance_values: u32,
        prediction_field_type: PredictionFieldType,
    ) -> Self {
        Self {
            num_top_classes,
            results_field: results_field.into(),
            top_classes_results_field: top_classes_results_field.into(),
            num_top_feature_importance_values,
            prediction_field_type,
        }
    }

    /// Check that the output field names can coexist in one document.
    pub fn validate(&self) -> Result<()> {
        if self.results_field.trim().is_empty() {
            return Err(ResultsError::Config("results_field must not be empty".into()));
        }
        if self.top_classes_results_field.trim().is_empty() {
            return Err(ResultsError::Config(
                "top_classes_results_field must not be empty".into(),
            ));
        }
        if self.results_field == self.top_classes_results_field {
            return Err(ResultsError::Config(format!(
                "results_field and top_classes_results_field are both [{}]",
                self.results_field
            )));
        }
        for field in [&self.results_field, &self.top_classes_results_field] {
            if field == FEATURE_IMPORTANCE {
                return Err(ResultsError::Config(format!(
                    "[{}] is reserved for feature importance",
                    FEATURE_IMPORTANCE
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClassificationConfig::default();
        assert_eq!(config.results_field, "predicted_value");
        assert_eq!(config.top_classes_results_field, "top_classes");
        assert_eq!(config.prediction_field_type, PredictionFieldType::String);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_clashing_fields() {
        let config = ClassificationConfig::new(0, "same", "same", 0, PredictionFieldType::String);
        assert!(matches!(config.validate(), Err(ResultsError::Config(_))));

        let config = ClassificationConfig::new(
            0,
            "feature_importance",
            "top_classes",
            0,
            PredictionFieldType::String,
        );
        assert!(config.validate().is_err());

        let config = ClassificationConfig::new(0, " ", "top", 0, PredictionFieldType::String);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ClassificationConfig =
            serde_json::from_str(r#"{"results_field": "label", "prediction_field_type": "boolean"}"#)
                .unwrap();
        assert_eq!(config.results_field, "label");
        assert_eq!(config.top_classes_results_field, "top_classes");
        assert_eq!(config.prediction_field_type, PredictionFieldType::Boolean);
    }

    #[test]
    fn test_unknown_prediction_type_falls_back_to_string() {
        let config: ClassificationConfig =
            serde_json::from_str(r#"{"prediction_field_type": "float"}"#).unwrap();
        assert_eq!(config.prediction_field_type, PredictionFieldType::String);
    }
}
