//! Wire encoding of classification results.
//!
//! Layout, in order: predicted value, feature importance list, optional
//! label, top classes, top classes field, results field and, for peers on
//! or after [`V_THRESHOLD`], the prediction field type.
//!
//! Peers before [`V_THRESHOLD`] only understand string class names and have
//! no prediction field type. Writing for them renders every class to its
//! string form and leaves the type out; reading from them yields string
//! classes and [`PredictionFieldType::String`]. The downgrade is lossy.

use crate::classification::{ClassEntry, ClassificationResult};
use crate::errors::{Result, ResultsError};
use crate::feature_importance::FeatureImportance;
use crate::prediction_type::PredictionFieldType;
use crate::stream::{StreamInput, StreamOutput};
use crate::value::ClassValue;
use crate::version::{WireVersion, V_THRESHOLD};
use tracing::{debug, trace};

/// Encodes and decodes results for a given peer version
#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec;

impl WireCodec {
    /// Encode `result` for a peer running `version`.
    pub fn encode(result: &ClassificationResult, version: WireVersion) -> Result<Vec<u8>> {
        let mut out = StreamOutput::new(version);
        write_result(result, &mut out)?;
        let bytes = out.into_bytes();
        debug!(
            %version,
            bytes = bytes.len(),
            typed_classes = version >= V_THRESHOLD,
            "encoded classification result"
        );
        Ok(bytes)
    }

    /// Decode a result sent by a peer running `version`.
    ///
    /// The whole buffer must be consumed.
    pub fn decode(bytes: &[u8], version: WireVersion) -> Result<ClassificationResult> {
        let mut input = StreamInput::new(bytes, version);
        let result = read_result(&mut input)?;
        if input.remaining() != 0 {
            return Err(ResultsError::MalformedStream(format!(
                "{} trailing bytes after classification result",
                input.remaining()
            )));
        }
        debug!(
            %version,
            bytes = bytes.len(),
            top_classes = result.top_classes().len(),
            "decoded classification result"
        );
        Ok(result)
    }
}

/// Write a result into an existing stream.
pub fn write_result(result: &ClassificationResult, out: &mut StreamOutput) -> Result<()> {
    out.write_double(result.value());
    out.write_collection(result.feature_importance(), |out, importance| {
        importance.write_to(out)
    })?;
    out.write_optional_string(result.classification_label())?;
    out.write_collection(result.top_classes(), write_class_entry)?;
    out.write_string(result.top_classes_field())?;
    out.write_string(result.results_field())?;
    if out.version() >= V_THRESHOLD {
        out.write_enum(result.prediction_field_type().ordinal());
    } else {
        trace!(version = %out.version(), "omitting prediction field type for older peer");
    }
    Ok(())
}

/// Read a result from an existing stream.
pub fn read_result(input: &mut StreamInput<'_>) -> Result<ClassificationResult> {
    let value = input.read_double()?;
    let feature_importance = input.read_list(FeatureImportance::read_from)?;
    let classification_label = input.read_optional_string()?;
    let top_classes = input.read_list(read_class_entry)?;
    let top_classes_field = input.read_string()?;
    let results_field = input.read_string()?;
    let prediction_field_type = if input.version() >= V_THRESHOLD {
        PredictionFieldType::from_ordinal(input.read_enum()?)?
    } else {
        PredictionFieldType::String
    };
    Ok(ClassificationResult::from_parts(
        value,
        classification_label,
        top_classes,
        feature_importance,
        results_field,
        top_classes_field,
        prediction_field_type,
    ))
}

fn write_class_entry(out: &mut StreamOutput, entry: &ClassEntry) -> Result<()> {
    if out.version() >= V_THRESHOLD {
        out.write_generic_value(entry.classification())?;
    } else {
        out.write_string(&entry.classification().to_string())?;
    }
    out.write_double(entry.probability());
    out.write_double(entry.score());
    Ok(())
}

fn read_class_entry(input: &mut StreamInput<'_>) -> Result<ClassEntry> {
    let classification = if input.version() >= V_THRESHOLD {
        input.read_generic_value()?
    } else {
        ClassValue::String(input.read_string()?)
    };
    let probability = input.read_double()?;
    let score = input.read_double()?;
    Ok(ClassEntry::new(classification, probability, score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassificationConfig;

    fn typed_result(prediction_field_type: PredictionFieldType) -> ClassificationResult {
        let config = ClassificationConfig::new(3, "label", "top", 2, prediction_field_type);
        ClassificationResult::with_feature_importance(
            1.0,
            Some("1".into()),
            vec![
                ClassEntry::new(1.0, 0.8, 0.8),
                ClassEntry::new(false, 0.15, 0.15),
                ClassEntry::new("other", 0.05, 0.05),
            ],
            vec![
                FeatureImportance::regression("f1", 0.3),
                FeatureImportance::regression("f2", -0.6),
            ],
            &config,
        )
    }

    #[test]
    fn round_trip_on_threshold_version() {
        let result = typed_result(PredictionFieldType::Boolean);
        let bytes = WireCodec::encode(&result, V_THRESHOLD).unwrap();
        assert_eq!(WireCodec::decode(&bytes, V_THRESHOLD).unwrap(), result);
    }

    #[test]
    fn older_peer_gets_string_classes_and_default_type() {
        let result = typed_result(PredictionFieldType::Number);
        let bytes = WireCodec::encode(&result, WireVersion::V_7_7_0).unwrap();
        let decoded = WireCodec::decode(&bytes, WireVersion::V_7_7_0).unwrap();

        let classes: Vec<&ClassValue> =
            decoded.top_classes().iter().map(ClassEntry::classification).collect();
        assert_eq!(
            classes,
            vec![
                &ClassValue::from("1.0"),
                &ClassValue::from("false"),
                &ClassValue::from("other"),
            ]
        );
        assert_eq!(decoded.prediction_field_type(), PredictionFieldType::String);
        assert_eq!(decoded.classification_label(), Some("1"));
        assert_eq!(decoded.feature_importance(), result.feature_importance());
    }

    #[test]
    fn older_encoding_is_shorter_by_the_type_ordinal() {
        let config = ClassificationConfig::default();
        let result = ClassificationResult::new(0.0, None, vec![], &config);
        let old = WireCodec::encode(&result, WireVersion::V_7_7_0).unwrap();
        let new = WireCodec::encode(&result, V_THRESHOLD).unwrap();
        assert_eq!(new.len(), old.len() + 1);
        assert_eq!(&new[..old.len()], old.as_slice());
    }

    #[test]
    fn unknown_prediction_type_ordinal_is_malformed() {
        let result = typed_result(PredictionFieldType::String);
        let mut bytes = WireCodec::encode(&result, V_THRESHOLD).unwrap();
        if let Some(last) = bytes.last_mut() {
            *last = 7;
        }
        assert!(matches!(
            WireCodec::decode(&bytes, V_THRESHOLD),
            Err(ResultsError::MalformedStream(_))
        ));
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let result = typed_result(PredictionFieldType::String);
        let mut bytes = WireCodec::encode(&result, V_THRESHOLD).unwrap();
        bytes.push(0);
        assert!(matches!(
            WireCodec::decode(&bytes, V_THRESHOLD),
            Err(ResultsError::MalformedStream(_))
        ));
    }

    #[test]
    fn truncation_anywhere_is_malformed() {
        let result = typed_result(PredictionFieldType::Boolean);
        let bytes = WireCodec::encode(&result, V_THRESHOLD).unwrap();
        for len in 0..bytes.len() {
            assert!(
                matches!(
                    WireCodec::decode(&bytes[..len], V_THRESHOLD),
                    Err(ResultsError::MalformedStream(_))
                ),
                "prefix of {} bytes decoded",
                len
            );
        }
    }
}
