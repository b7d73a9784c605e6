// 📏 Feature Scaler - fitted per-column standardization
// x' = (x - mean) / scale

use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    pub n_features_in: usize,
}

impl StandardScaler {
    /// Check that the fitted parameters describe `expected` columns
    pub fn validate(&self, expected: usize) -> Result<()> {
        if self.n_features_in != expected {
            return Err(PredictError::invalid_artifact(
                "scaler",
                format!(
                    "fitted on {} features, the form produces {}",
                    self.n_features_in, expected
                ),
            ));
        }
        if self.mean.len() != self.n_features_in || self.scale.len() != self.n_features_in {
            return Err(PredictError::invalid_artifact(
                "scaler",
                format!(
                    "mean has {} entries and scale has {}, expected {}",
                    self.mean.len(),
                    self.scale.len(),
                    self.n_features_in
                ),
            ));
        }
        if self
            .mean
            .iter()
            .chain(self.scale.iter())
            .any(|v| !v.is_finite())
        {
            return Err(PredictError::invalid_artifact(
                "scaler",
                "mean and scale must be finite",
            ));
        }
        Ok(())
    }

    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.n_features_in || self.mean.len() != x.len() || self.scale.len() != x.len() {
            return Err(PredictError::ShapeMismatch {
                stage: "scaler",
                expected: self.n_features_in,
                actual: x.len(),
            });
        }

        Ok(x
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(value, (mean, scale))| {
                // Constant columns were fitted with scale 0
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (value - mean) / scale
            })
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> StandardScaler {
        StandardScaler {
            mean: vec![10.0, 0.0, 5.0],
            scale: vec![2.0, 1.0, 0.0],
            n_features_in: 3,
        }
    }

    #[test]
    fn test_transform_standardizes() {
        let out = scaler().transform(&[14.0, -3.0, 7.0]).unwrap();
        assert_eq!(out, vec![2.0, -3.0, 2.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = scaler().transform(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            PredictError::ShapeMismatch {
                stage: "scaler",
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_validate_feature_count() {
        assert!(scaler().validate(3).is_ok());
        assert!(scaler().validate(9).is_err());

        let mut broken = scaler();
        broken.mean.pop();
        assert!(broken.validate(3).is_err());

        let mut nan = scaler();
        nan.scale[0] = f64::NAN;
        assert!(nan.validate(3).is_err());
    }
}
