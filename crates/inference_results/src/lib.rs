//! Classification inference results for the wire and for documents
//!
//! A [`ClassificationResult`] carries a model's predicted value, optional
//! label, ranked top classes and top-K feature importance, plus the output
//! field names it was configured with.
//!
//! Modules:
//! - `classification`: Result and top class entry types
//! - `codec`: Version-aware binary encoding
//! - `projector`: Rendering into documents and maps
//! - `document`: Dotted-path document trees
//! - `config`: Output field configuration
//! - `feature_importance`: Feature importance values and top-K ranking
//! - `stream`: Versioned byte streams

pub mod classification;
pub mod codec;
pub mod config;
pub mod document;
pub mod errors;
pub mod feature_importance;
pub mod prediction_type;
pub mod projector;
pub mod stream;
pub mod value;
pub mod version;

pub use classification::{ClassEntry, ClassificationResult, CLASS_NAME, CLASS_PROBABILITY, CLASS_SCORE};
pub use codec::WireCodec;
pub use config::ClassificationConfig;
pub use document::{IngestDocument, ResultDocument};
pub use errors::{Result, ResultsError};
pub use feature_importance::{take_top_feature_importances, FeatureImportance, FEATURE_IMPORTANCE};
pub use prediction_type::PredictionFieldType;
pub use stream::{StreamInput, StreamOutput};
pub use value::ClassValue;
pub use version::{WireVersion, V_THRESHOLD};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
