// 📍 k-Nearest Neighbors - vote among the k closest fitted samples

use super::{check_dimensions, Classifier, IncomeLabel};
use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KnnWeights {
    #[default]
    Uniform,
    Distance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Metric {
    Euclidean,
    Manhattan,
    Chebyshev,
    Minkowski { p: f64 },
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Minkowski { p: 2.0 }
    }
}

impl Metric {
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs());
        match *self {
            Metric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Manhattan => diffs.sum(),
            Metric::Chebyshev => diffs.fold(0.0, f64::max),
            Metric::Minkowski { p } if p == 1.0 => diffs.sum(),
            Metric::Minkowski { p } if p == 2.0 => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Minkowski { p } => diffs.map(|d| d.powf(p)).sum::<f64>().powf(1.0 / p),
        }
    }
}

/// Fitted KNN: the scaled training samples and their labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnClassifier {
    pub n_neighbors: usize,
    #[serde(default)]
    pub weights: KnnWeights,
    #[serde(default)]
    pub metric: Metric,
    pub fit_x: Vec<Vec<f64>>,
    pub fit_y: Vec<i64>,
}

impl KnnClassifier {
    pub fn validate(&self, n_features: usize) -> Result<()> {
        let invalid = |reason: String| PredictError::invalid_artifact("knn", reason);

        if self.fit_x.is_empty() {
            return Err(invalid("no fitted samples".to_string()));
        }
        if self.n_neighbors == 0 || self.n_neighbors > self.fit_x.len() {
            return Err(invalid(format!(
                "n_neighbors={} with {} fitted samples",
                self.n_neighbors,
                self.fit_x.len()
            )));
        }
        if self.fit_y.len() != self.fit_x.len() {
            return Err(invalid(format!(
                "{} labels for {} samples",
                self.fit_y.len(),
                self.fit_x.len()
            )));
        }
        if let Some((row, sample)) = self
            .fit_x
            .iter()
            .enumerate()
            .find(|(_, s)| s.len() != n_features)
        {
            return Err(invalid(format!(
                "sample {} has {} features, expected {}",
                row,
                sample.len(),
                n_features
            )));
        }
        if let Some(row) = self
            .fit_x
            .iter()
            .position(|s| s.iter().any(|v| !v.is_finite()))
        {
            return Err(invalid(format!("sample {} has a non-finite feature value", row)));
        }
        if let Some(label) = self.fit_y.iter().find(|y| !matches!(y, 0 | 1)) {
            return Err(invalid(format!("label {} is not 0 or 1", label)));
        }
        if let Metric::Minkowski { p } = self.metric {
            if !(p >= 1.0 && p.is_finite()) {
                return Err(invalid(format!("minkowski p={} must be >= 1", p)));
            }
        }
        Ok(())
    }

    fn n_features(&self) -> usize {
        self.fit_x.first().map(|s| s.len()).unwrap_or(0)
    }

    /// Indices and distances of the k nearest samples; ties go to the lower index
    fn neighbors(&self, x: &[f64]) -> Vec<(usize, f64)> {
        let mut distances: Vec<(usize, f64)> = self
            .fit_x
            .iter()
            .enumerate()
            .map(|(i, sample)| (i, self.metric.distance(sample, x)))
            .collect();
        distances.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        distances.truncate(self.n_neighbors);
        distances
    }
}

impl Classifier for KnnClassifier {
    fn name(&self) -> &'static str {
        "knn"
    }

    fn predict(&self, x: &[f64]) -> Result<IncomeLabel> {
        check_dimensions("knn", self.n_features(), x)?;

        let neighbors = self.neighbors(x);
        let exact_match = neighbors.iter().any(|(_, d)| *d == 0.0);

        let mut votes = [0.0f64; 2];
        for (index, distance) in &neighbors {
            let weight = match self.weights {
                KnnWeights::Uniform => 1.0,
                KnnWeights::Distance if exact_match => {
                    if *distance == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                KnnWeights::Distance => 1.0 / distance,
            };
            let class = self.fit_y[*index];
            let slot = usize::try_from(class)
                .ok()
                .filter(|c| *c < votes.len())
                .ok_or(PredictError::InvalidLabel {
                    model: "knn",
                    label: class,
                })?;
            votes[slot] += weight;
        }

        // A tied vote goes to the smaller class
        let winner = if votes[1] > votes[0] { 1 } else { 0 };
        IncomeLabel::from_class("knn", winner)
    }
}

// ============================================================================
// TESTS
// ============================================================================
