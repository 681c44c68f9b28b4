//! Feature importance values and top-K ranking

use crate::errors::{Result, ResultsError};
use crate::stream::{StreamInput, StreamOutput};
use crate::value::double_to_json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Document field that holds the feature importance list
pub const FEATURE_IMPORTANCE: &str = "feature_importance";
pub const FEATURE_NAME: &str = "feature_name";
pub const IMPORTANCE: &str = "importance";

/// Contribution of one input feature to a prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Input feature name
    pub feature_name: String,
    /// Signed contribution
    pub importance: f64,
    /// Contribution towards each class, for multi-class models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_importance: Option<BTreeMap<String, f64>>,
}

impl FeatureImportance {
    /// Importance of a regression or binary model
    pub fn regression(feature_name: impl Into<String>, importance: f64) -> Self {
        Self {
            feature_name: feature_name.into(),
            importance,
            class_importance: None,
        }
    }

    /// Importance broken down per class
    pub fn classification(
        feature_name: impl Into<String>,
        importance: f64,
        class_importance: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            feature_name: feature_name.into(),
            importance,
            class_importance: Some(class_importance),
        }
    }

    /// Flat map rendering: name, importance and one key per class.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(FEATURE_NAME.to_string(), Value::String(self.feature_name.clone()));
        map.insert(IMPORTANCE.to_string(), double_to_json(self.importance));
        if let Some(classes) = &self.class_importance {
            for (class_name, importance) in classes {
                map.insert(class_name.clone(), double_to_json(*importance));
            }
        }
        map
    }

    pub fn write_to(&self, out: &mut StreamOutput) -> Result<()> {
        out.write_string(&self.feature_name)?;
        out.write_double(self.importance);
        match &self.class_importance {
            Some(classes) => {
                out.write_bool(true);
                let entries: Vec<(&String, &f64)> = classes.iter().collect();
                out.write_collection(&entries, |out, (name, importance)| {
                    out.write_string(name)?;
                    out.write_double(**importance);
                    Ok(())
                })
            }
            None => {
                out.write_bool(false);
                Ok(())
            }
        }
    }

    pub fn read_from(input: &mut StreamInput<'_>) -> Result<Self> {
        let feature_name = input.read_string()?;
        let importance = input.read_double()?;
        let class_importance = if input.read_bool()? {
            let entries = input.read_list(|input| Ok((input.read_string()?, input.read_double()?)))?;
            let count = entries.len();
            let classes: BTreeMap<String, f64> = entries.into_iter().collect();
            if classes.len() != count {
                return Err(ResultsError::MalformedStream(format!(
                    "class importance of [{}] repeats a class name",
                    feature_name
                )));
            }
            Some(classes)
        } else {
            None
        };
        Ok(Self {
            feature_name,
            importance,
            class_importance,
        })
    }
}

impl PartialEq for FeatureImportance {
    fn eq(&self, other: &Self) -> bool {
        self.feature_name == other.feature_name
            && self.importance.to_bits() == other.importance.to_bits()
            && match (&self.class_importance, &other.class_importance) {
                (Some(a), Some(b)) => {
                    a.len() == b.len()
                        && a.iter()
                            .zip(b.iter())
                            .all(|((ka, va), (kb, vb))| ka == kb && va.to_bits() == vb.to_bits())
                }
                (None, None) => true,
                _ => false,
            }
    }
}

impl Eq for FeatureImportance {}

impl Hash for FeatureImportance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.feature_name.hash(state);
        self.importance.to_bits().hash(state);
        match &self.class_importance {
            Some(classes) => {
                1u8.hash(state);
                classes.len().hash(state);
                for (name, importance) in classes {
                    name.hash(state);
                    importance.to_bits().hash(state);
                }
            }
            None => 0u8.hash(state),
        }
    }
}

/// Keep the `k` most important features.
///
/// Ranks by descending absolute importance. The sort is stable, so equal
/// magnitudes keep their input order.
pub fn take_top_feature_importances(
    mut importances: Vec<FeatureImportance>,
    k: usize,
) -> Vec<FeatureImportance> {
    if k == 0 || importances.is_empty() {
        return Vec::new();
    }
    importances.sort_by(|l, r| r.importance.abs().total_cmp(&l.importance.abs()));
    importances.truncate(k);
    importances
}
