// ⚠️ Prediction Errors
// Every failure on the encode → scale → classify path, plus artifact loading

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PredictError>;

/// Broad classes of failure, used to pick the message and status a surface shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An expected feature key is absent from the encoder table
    MissingEncoderKey,
    /// Encoding, scaling or classification rejected the assembled vector
    Transform,
    /// A submitted value could not be parsed or fell outside its bounds
    Input,
    /// An artifact file could not be read or is malformed
    Artifact,
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("missing encoder key '{key}': check that the label encoders artifact contains every expected feature")]
    MissingEncoderKey { key: String },

    #[error("unknown category '{value}' for feature '{feature}'")]
    UnknownCategory { feature: String, value: String },

    #[error("{stage} expected {expected} features, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{model} produced label {label}, expected 0 or 1")]
    InvalidLabel { model: &'static str, label: i64 },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{field} is not valid: '{value}' ({reason})")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid {artifact} artifact: {reason}")]
    InvalidArtifact { artifact: &'static str, reason: String },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PredictError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::MissingEncoderKey { .. } => ErrorKind::MissingEncoderKey,
            PredictError::UnknownCategory { .. }
            | PredictError::ShapeMismatch { .. }
            | PredictError::InvalidLabel { .. } => ErrorKind::Transform,
            PredictError::OutOfRange { .. } | PredictError::InvalidField { .. } => {
                ErrorKind::Input
            }
            PredictError::InvalidArtifact { .. }
            | PredictError::Io { .. }
            | PredictError::Json { .. } => ErrorKind::Artifact,
        }
    }

    pub fn invalid_artifact(artifact: &'static str, reason: impl Into<String>) -> Self {
        PredictError::InvalidArtifact {
            artifact,
            reason: reason.into(),
        }
    }

    /// Message shown on the form or returned by the API
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::MissingEncoderKey => format!("Encoder error: {}", self),
            ErrorKind::Transform => format!("Prediction failed: {}", self),
            ErrorKind::Input => format!("Invalid input: {}", self),
            ErrorKind::Artifact => format!("Artifact error: {}", self),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let missing = PredictError::MissingEncoderKey {
            key: "occupation".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::MissingEncoderKey);

        let shape = PredictError::ShapeMismatch {
            stage: "scaler",
            expected: 9,
            actual: 8,
        };
        assert_eq!(shape.kind(), ErrorKind::Transform);

        let range = PredictError::OutOfRange {
            field: "age",
            value: 16,
            min: 17,
            max: 90,
        };
        assert_eq!(range.kind(), ErrorKind::Input);

        let field = PredictError::InvalidField {
            field: "age",
            value: String::new(),
            reason: "expected a whole number".to_string(),
        };
        assert_eq!(field.kind(), ErrorKind::Input);
        assert_eq!(
            PredictError::invalid_artifact("scaler", "empty").kind(),
            ErrorKind::Artifact
        );
    }

    #[test]
    fn test_user_message_names_the_key() {
        let err = PredictError::MissingEncoderKey {
            key: "occupation".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.starts_with("Encoder error"));
        assert!(msg.contains("'occupation'"));
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = PredictError::ShapeMismatch {
            stage: "scaler",
            expected: 9,
            actual: 7,
        };
        assert_eq!(err.to_string(), "scaler expected 9 features, got 7");
    }
}
