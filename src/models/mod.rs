// 🤖 Classifiers - two fitted models behind one predict capability
//
// Both consume the scaled nine-column vector and answer 0 (≤50K) or 1 (>50K).

pub mod knn;
pub mod tree;

pub use knn::{KnnClassifier, KnnWeights, Metric};
pub use tree::DecisionTreeClassifier;

use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// LABEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeLabel {
    #[serde(rename = "<=50K")]
    AtMost50K,
    #[serde(rename = ">50K")]
    Above50K,
}

impl IncomeLabel {
    /// Map a raw class value from a model artifact
    pub fn from_class(model: &'static str, class: i64) -> Result<Self> {
        match class {
            0 => Ok(IncomeLabel::AtMost50K),
            1 => Ok(IncomeLabel::Above50K),
            other => Err(PredictError::InvalidLabel {
                model,
                label: other,
            }),
        }
    }

    pub fn class(&self) -> u8 {
        match self {
            IncomeLabel::AtMost50K => 0,
            IncomeLabel::Above50K => 1,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            IncomeLabel::AtMost50K => "Income <=50K",
            IncomeLabel::Above50K => "Income >50K",
        }
    }
}

impl fmt::Display for IncomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

pub trait Classifier: Send + Sync {
    /// Short name used in result lines and logs
    fn name(&self) -> &'static str;

    /// Predict from an already-scaled feature vector
    fn predict(&self, x: &[f64]) -> Result<IncomeLabel>;
}

// ============================================================================
// MODEL SELECTION
// ============================================================================

/// Which classifier an action trigger runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Knn,
    DecisionTree,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Knn, ModelKind::DecisionTree];

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::Knn => "KNN",
            ModelKind::DecisionTree => "Decision Tree",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Knn => "knn",
            ModelKind::DecisionTree => "decision_tree",
        }
    }

    /// Caption of the button that triggers this model
    pub fn action_label(&self) -> String {
        format!("Predict with {}", self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "knn" => Ok(ModelKind::Knn),
            "decision_tree" | "decision-tree" | "tree" => Ok(ModelKind::DecisionTree),
            other => Err(format!("unknown model '{}', expected knn or decision_tree", other)),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn check_dimensions(stage: &'static str, expected: usize, x: &[f64]) -> Result<()> {
    if x.len() == expected {
        Ok(())
    } else {
        Err(PredictError::ShapeMismatch {
            stage,
            expected,
            actual: x.len(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_messages() {
        assert_eq!(IncomeLabel::Above50K.to_string(), "Income >50K");
        assert_eq!(IncomeLabel::AtMost50K.to_string(), "Income <=50K");
    }

    #[test]
    fn test_label_from_class() {
        assert_eq!(IncomeLabel::from_class("knn", 0).unwrap(), IncomeLabel::AtMost50K);
        assert_eq!(IncomeLabel::from_class("knn", 1).unwrap(), IncomeLabel::Above50K);
        assert!(matches!(
            IncomeLabel::from_class("knn", 2),
            Err(PredictError::InvalidLabel { label: 2, .. })
        ));
    }

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("knn".parse::<ModelKind>().unwrap(), ModelKind::Knn);
        assert_eq!("KNN".parse::<ModelKind>().unwrap(), ModelKind::Knn);
        assert_eq!(
            "decision_tree".parse::<ModelKind>().unwrap(),
            ModelKind::DecisionTree
        );
        assert!("forest".parse::<ModelKind>().is_err());
        assert_eq!(ModelKind::Knn.action_label(), "Predict with KNN");
        assert_eq!(
            ModelKind::DecisionTree.action_label(),
            "Predict with Decision Tree"
        );
    }
}
