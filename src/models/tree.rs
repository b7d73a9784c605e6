// 🌳 Decision Tree - walk the fitted split arrays down to a leaf
//
// Node layout follows the flat `tree_` arrays: node i splits on feature[i] at
// threshold[i], children_left[i] == -1 marks a leaf, value[i] holds class weights.

use super::{check_dimensions, Classifier, IncomeLabel};
use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};

pub const TREE_LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    pub n_features: usize,
    pub classes: Vec<i64>,
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTreeClassifier {
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == TREE_LEAF
    }

    pub fn validate(&self, n_features: usize) -> Result<()> {
        let invalid = |reason: String| PredictError::invalid_artifact("decision tree", reason);
        let nodes = self.node_count();

        if self.n_features != n_features {
            return Err(invalid(format!(
                "fitted on {} features, the form produces {}",
                self.n_features, n_features
            )));
        }
        if nodes == 0 {
            return Err(invalid("tree has no nodes".to_string()));
        }
        let lengths = [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ];
        if lengths.iter().any(|len| *len != nodes) {
            return Err(invalid(format!(
                "node arrays disagree in length: {} children_left vs {:?}",
                nodes, lengths
            )));
        }
        if self.classes.is_empty() || self.classes.iter().any(|c| !matches!(c, 0 | 1)) {
            return Err(invalid(format!(
                "classes must be drawn from [0, 1], got {:?}",
                self.classes
            )));
        }

        for node in 0..nodes {
            let left = self.children_left[node];
            let right = self.children_right[node];

            if self.value[node].iter().any(|w| !w.is_finite()) {
                return Err(invalid(format!("node {} has a non-finite class weight", node)));
            }

            if left == TREE_LEAF {
                if right != TREE_LEAF {
                    return Err(invalid(format!("node {} has only a right child", node)));
                }
                if self.value[node].len() != self.classes.len() {
                    return Err(invalid(format!(
                        "leaf {} has {} class weights for {} classes",
                        node,
                        self.value[node].len(),
                        self.classes.len()
                    )));
                }
                continue;
            }

            // Children always come after their parent, which also rules out cycles
            for child in [left, right] {
                if child <= node as i64 || child >= nodes as i64 {
                    return Err(invalid(format!(
                        "node {} points to invalid child {}",
                        node, child
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(invalid(format!(
                    "node {} splits on feature {}, expected < {}",
                    node, feature, n_features
                )));
            }
            if self.threshold[node].is_nan() {
                return Err(invalid(format!("node {} has a NaN threshold", node)));
            }
        }
        Ok(())
    }

    /// Index of the leaf reached by `x`
    fn leaf_for(&self, x: &[f64]) -> Result<usize> {
        let mut node = 0usize;
        // Depth is bounded by the node count on a validated tree
        for _ in 0..self.node_count() {
            if self.is_leaf(node) {
                return Ok(node);
            }
            let feature = self.feature[node] as usize;
            let next = if x[feature] <= self.threshold[node] {
                self.children_left[node]
            } else {
                self.children_right[node]
            };
            node = usize::try_from(next).map_err(|_| {
                PredictError::invalid_artifact("decision tree", format!("bad child {}", next))
            })?;
            if node >= self.node_count() {
                return Err(PredictError::invalid_artifact(
                    "decision tree",
                    format!("child {} out of range", node),
                ));
            }
        }
        Err(PredictError::invalid_artifact(
            "decision tree",
            "no leaf reached",
        ))
    }
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &'static str {
        "decision_tree"
    }

    fn predict(&self, x: &[f64]) -> Result<IncomeLabel> {
        check_dimensions("decision tree", self.n_features, x)?;

        let leaf = self.leaf_for(x)?;
        let weights = &self.value[leaf];

        // First maximum wins
        let mut best = 0usize;
        for (i, w) in weights.iter().enumerate() {
            if *w > weights[best] {
                best = i;
            }
        }

        let class = *self.classes.get(best).ok_or_else(|| {
            PredictError::invalid_artifact("decision tree", format!("leaf {} has no class", leaf))
        })?;
        IncomeLabel::from_class("decision_tree", class)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // x0 <= 0.5 ? (x1 <= 2.0 ? 0 : 1) : 1
    fn stump() -> DecisionTreeClassifier {
        DecisionTreeClassifier {
            n_features: 2,
            classes: vec![0, 1],
            children_left: vec![1, 2, -1, -1, -1],
            children_right: vec![4, 3, -1, -1, -1],
            feature: vec![0, 1, -2, -2, -2],
            threshold: vec![0.5, 2.0, -2.0, -2.0, -2.0],
            value: vec![
                vec![10.0, 10.0],
                vec![8.0, 4.0],
                vec![7.0, 1.0],
                vec![1.0, 3.0],
                vec![2.0, 6.0],
            ],
        }
    }

    #[test]
    fn test_walks_to_leaves() {
        let tree = stump();
        assert!(tree.validate(2).is_ok());
        assert_eq!(tree.predict(&[0.0, 1.0]).unwrap(), IncomeLabel::AtMost50K);
        assert_eq!(tree.predict(&[0.0, 3.0]).unwrap(), IncomeLabel::Above50K);
        assert_eq!(tree.predict(&[0.9, 0.0]).unwrap(), IncomeLabel::Above50K);
    }

    #[test]
    fn test_threshold_is_inclusive_on_left() {
        let tree = stump();
        assert_eq!(tree.predict(&[0.5, 2.0]).unwrap(), IncomeLabel::AtMost50K);
    }

    #[test]
    fn test_tied_leaf_takes_first_class() {
        let mut tree = stump();
        tree.value[2] = vec![5.0, 5.0];
        assert_eq!(tree.predict(&[0.0, 0.0]).unwrap(), IncomeLabel::AtMost50K);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = stump().predict(&[0.0]).unwrap_err();
        assert!(matches!(err, PredictError::ShapeMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_validate_rejects_bad_structure() {
        let mut tree = stump();
        tree.children_left[1] = 0;
        assert!(tree.validate(2).is_err());

        let mut tree = stump();
        tree.feature[0] = 5;
        assert!(tree.validate(2).is_err());

        let mut tree = stump();
        tree.threshold.pop();
        assert!(tree.validate(2).is_err());

        let mut tree = stump();
        tree.classes = vec![0, 2];
        assert!(tree.validate(2).is_err());

        assert!(stump().validate(9).is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_weights() {
        let mut tree = stump();
        tree.value[3] = vec![f64::NAN, 3.0];
        let err = tree.validate(2).unwrap_err();
        assert!(err.to_string().contains("node 3"));

        let mut tree = stump();
        tree.value[0] = vec![f64::INFINITY, 1.0];
        assert!(tree.validate(2).is_err());
    }
}
