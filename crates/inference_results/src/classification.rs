//! Classification inference results
//!
//! A result holds the predicted value, an optional label, the ranked top
//! classes and the already truncated feature importance list, together with
//! the output field names it was configured with. Results are immutable
//! once built.

use crate::config::ClassificationConfig;
use crate::errors::Result;
use crate::feature_importance::{take_top_feature_importances, FeatureImportance};
use crate::prediction_type::PredictionFieldType;
use crate::value::{double_to_json, format_double, ClassValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::hash::{Hash, Hasher};

pub const CLASS_NAME: &str = "class_name";
pub const CLASS_PROBABILITY: &str = "class_probability";
pub const CLASS_SCORE: &str = "class_score";

/// One candidate class with its probability and score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    classification: ClassValue,
    probability: f64,
    score: f64,
}

impl ClassEntry {
    pub fn new(classification: impl Into<ClassValue>, probability: f64, score: f64) -> Self {
        Self {
            classification: classification.into(),
            probability,
            score,
        }
    }

    /// Build an entry from a JSON class value; `null` is rejected.
    pub fn from_json(classification: Value, probability: f64, score: f64) -> Result<Self> {
        Ok(Self {
            classification: ClassValue::from_json_value(classification)?,
            probability,
            score,
        })
    }

    pub fn classification(&self) -> &ClassValue {
        &self.classification
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// The three document keys of this entry.
    pub fn as_value_map(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(3);
        map.insert(CLASS_NAME.to_string(), self.classification.to_json_value());
        map.insert(CLASS_PROBABILITY.to_string(), double_to_json(self.probability));
        map.insert(CLASS_SCORE.to_string(), double_to_json(self.score));
        map
    }
}

impl PartialEq for ClassEntry {
    fn eq(&self, other: &Self) -> bool {
        self.classification == other.classification
            && self.probability.to_bits() == other.probability.to_bits()
            && self.score.to_bits() == other.score.to_bits()
    }
}

impl Eq for ClassEntry {}

impl Hash for ClassEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.classification.hash(state);
        self.probability.to_bits().hash(state);
        self.score.to_bits().hash(state);
    }
}

/// Result of a classification model for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    value: f64,
    classification_label: Option<String>,
    top_classes: Vec<ClassEntry>,
    feature_importance: Vec<FeatureImportance>,
    results_field: String,
    top_classes_field: String,
    prediction_field_type: PredictionFieldType,
}

impl ClassificationResult {
    /// Writeable name of this result type
    pub const NAME: &'static str = "classification";

    pub fn new(
        value: f64,
        classification_label: Option<String>,
        top_classes: Vec<ClassEntry>,
        config: &ClassificationConfig,
    ) -> Self {
        Self::with_feature_importance(value, classification_label, top_classes, Vec::new(), config)
    }

    /// Build a result, keeping only the configured number of most
    /// important features.
    pub fn with_feature_importance(
        value: f64,
        classification_label: Option<String>,
        top_classes: Vec<ClassEntry>,
        feature_importance: Vec<FeatureImportance>,
        config: &ClassificationConfig,
    ) -> Self {
        Self {
            value,
            classification_label,
            top_classes,
            feature_importance: take_top_feature_importances(
                feature_importance,
                config.num_top_feature_importance_values as usize,
            ),
            results_field: config.results_field.clone(),
            top_classes_field: config.top_classes_results_field.clone(),
            prediction_field_type: config.prediction_field_type,
        }
    }

    /// Reassemble a result from already ranked parts, as read off the wire.
    pub(crate) fn from_parts(
        value: f64,
        classification_label: Option<String>,
        top_classes: Vec<ClassEntry>,
        feature_importance: Vec<FeatureImportance>,
        results_field: String,
        top_classes_field: String,
        prediction_field_type: PredictionFieldType,
    ) -> Self {
        Self {
            value,
            classification_label,
            top_classes,
            feature_importance,
            results_field,
            top_classes_field,
            prediction_field_type,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn classification_label(&self) -> Option<&str> {
        self.classification_label.as_deref()
    }

    pub fn top_classes(&self) -> &[ClassEntry] {
        &self.top_classes
    }

    pub fn feature_importance(&self) -> &[FeatureImportance] {
        &self.feature_importance
    }

    pub fn results_field(&self) -> &str {
        &self.results_field
    }

    pub fn top_classes_field(&self) -> &str {
        &self.top_classes_field
    }

    pub fn prediction_field_type(&self) -> PredictionFieldType {
        self.prediction_field_type
    }

    /// The label when there is one, otherwise the canonical string form of
    /// the predicted value.
    pub fn value_as_string(&self) -> String {
        match &self.classification_label {
            Some(label) => label.clone(),
            None => format_double(self.value),
        }
    }
}

impl PartialEq for ClassificationResult {
    fn eq(&self, other: &Self) -> bool {
        self.value.to_bits() == other.value.to_bits()
            && self.classification_label == other.classification_label
            && self.results_field == other.results_field
            && self.top_classes_field == other.top_classes_field
            && self.top_classes == other.top_classes
            && self.prediction_field_type == other.prediction_field_type
            && self.feature_importance == other.feature_importance
    }
}

impl Eq for ClassificationResult {}

impl Hash for ClassificationResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
        self.classification_label.hash(state);
        self.top_classes.hash(state);
        self.results_field.hash(state);
        self.top_classes_field.hash(state);
        self.feature_importance.hash(state);
        self.prediction_field_type.hash(state);
    }
}
