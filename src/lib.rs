// Income Predictor - Core Library
// Exposes all modules for use in the CLI, the web server, and tests

pub mod artifacts;
pub mod batch;
pub mod encoders;
pub mod error;
pub mod features;
pub mod logging;
pub mod models;
pub mod predictor;
pub mod scaler;

#[cfg(feature = "server")]
pub mod web;

// Re-export commonly used types
pub use artifacts::{ArtifactInfo, ArtifactManifest, ArtifactPaths};
pub use batch::{score_csv, BatchSummary};
pub use encoders::{CategoricalEncoders, EncoderTable, LabelEncoder};
pub use error::{ErrorKind, PredictError};
pub use features::{CategoricalFeature, Feature, FeatureVector, UserInput, FEATURE_COUNT};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use models::{
    Classifier, DecisionTreeClassifier, IncomeLabel, KnnClassifier, KnnWeights, Metric, ModelKind,
};
pub use predictor::{Prediction, PredictionContext};
pub use scaler::StandardScaler;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
