// 🔮 Prediction Context - encode → scale → classify
//
// Built once at process start and shared read-only. Every request runs the
// same linear path against it and keeps no state between calls.

use crate::artifacts::{read_artifact, ArtifactManifest, ArtifactPaths};
use crate::encoders::{CategoricalEncoders, EncoderTable};
use crate::error::Result;
use crate::features::{CategoricalFeature, Feature, FeatureVector, UserInput, FEATURE_COUNT};
use crate::models::{Classifier, DecisionTreeClassifier, IncomeLabel, KnnClassifier, ModelKind};
use crate::scaler::StandardScaler;
use serde::Serialize;

/// Outcome of one action trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub model: ModelKind,
    pub label: IncomeLabel,
    pub encoded: FeatureVector,
    pub scaled: Vec<f64>,
}

impl Prediction {
    /// Result line shown under the form, e.g. `Prediction (KNN): Income >50K`
    pub fn line(&self) -> String {
        format!("Prediction ({}): {}", self.model.display_name(), self.label)
    }
}

pub struct PredictionContext {
    encoders: CategoricalEncoders,
    scaler: StandardScaler,
    knn: Box<dyn Classifier>,
    decision_tree: Box<dyn Classifier>,
    manifest: ArtifactManifest,
}

impl PredictionContext {
    /// Assemble from already-validated parts
    pub fn new(
        encoders: CategoricalEncoders,
        scaler: StandardScaler,
        knn: Box<dyn Classifier>,
        decision_tree: Box<dyn Classifier>,
    ) -> Self {
        PredictionContext {
            encoders,
            scaler,
            knn,
            decision_tree,
            manifest: ArtifactManifest::new(),
        }
    }

    /// Read, validate and fingerprint all four artifacts
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let mut manifest = ArtifactManifest::new();

        let table: EncoderTable = read_artifact("label_encoders", &paths.encoders, &mut manifest)?;
        let encoders = CategoricalEncoders::from_table(table)?;

        let scaler: StandardScaler = read_artifact("scaler", &paths.scaler, &mut manifest)?;
        scaler.validate(FEATURE_COUNT)?;

        let knn: KnnClassifier = read_artifact("knn", &paths.knn, &mut manifest)?;
        knn.validate(FEATURE_COUNT)?;

        let tree: DecisionTreeClassifier =
            read_artifact("decision_tree", &paths.decision_tree, &mut manifest)?;
        tree.validate(FEATURE_COUNT)?;

        tracing::info!(
            knn_samples = knn.fit_x.len(),
            k = knn.n_neighbors,
            tree_nodes = tree.node_count(),
            "prediction context ready"
        );

        Ok(PredictionContext {
            encoders,
            scaler,
            knn: Box::new(knn),
            decision_tree: Box::new(tree),
            manifest,
        })
    }

    pub fn encoders(&self) -> &CategoricalEncoders {
        &self.encoders
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }

    pub fn classifier(&self, model: ModelKind) -> &dyn Classifier {
        match model {
            ModelKind::Knn => self.knn.as_ref(),
            ModelKind::DecisionTree => self.decision_tree.as_ref(),
        }
    }

    /// Categories offered by a selector, in code order
    pub fn categories(&self, feature: CategoricalFeature) -> &[String] {
        self.encoders.get(feature).classes()
    }

    /// Form defaults: lowest numeric bound, first class of every selector
    pub fn default_input(&self) -> UserInput {
        let first = |f: CategoricalFeature| self.categories(f).first().cloned().unwrap_or_default();
        UserInput {
            age: crate::features::AGE_MIN,
            workclass: first(CategoricalFeature::Workclass),
            education: first(CategoricalFeature::Education),
            marital_status: first(CategoricalFeature::MaritalStatus),
            occupation: first(CategoricalFeature::Occupation),
            relationship: first(CategoricalFeature::Relationship),
            race: first(CategoricalFeature::Race),
            sex: first(CategoricalFeature::Sex),
            hours_per_week: crate::features::HOURS_MIN,
        }
    }

    /// Build the fixed-order, unscaled vector for one submission
    pub fn encode(&self, input: &UserInput) -> Result<FeatureVector> {
        input.check_bounds()?;

        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            values[feature.index()] = match feature.categorical() {
                Some(cat) => self.encoders.encode(cat, input.category(cat))? as f64,
                None if feature == Feature::Age => input.age as f64,
                None => input.hours_per_week as f64,
            };
        }
        Ok(FeatureVector::new(values))
    }

    /// Scale an encoded vector and run one classifier on it
    pub fn classify(&self, encoded: &FeatureVector, model: ModelKind) -> Result<Prediction> {
        let scaled = self.scaler.transform(encoded.as_slice())?;
        let label = self.classifier(model).predict(&scaled)?;
        Ok(Prediction {
            model,
            label,
            encoded: *encoded,
            scaled,
        })
    }

    pub fn predict(&self, input: &UserInput, model: ModelKind) -> Result<Prediction> {
        let encoded = self.encode(input)?;
        let prediction = self.classify(&encoded, model)?;
        tracing::debug!(model = %model, label = prediction.label.class(), "prediction");
        Ok(prediction)
    }
}

impl std::fmt::Debug for PredictionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionContext")
            .field("knn", &self.knn.name())
            .field("decision_tree", &self.decision_tree.name())
            .field("artifacts", &self.manifest.artifacts.len())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::encoders::tests::adult_table;
    use crate::error::{ErrorKind, PredictError};

    /// Classifier that records nothing and answers by a fixed rule
    struct Threshold {
        feature: usize,
        cut: f64,
    }

    impl Classifier for Threshold {
        fn name(&self) -> &'static str {
            "threshold"
        }

        fn predict(&self, x: &[f64]) -> Result<IncomeLabel> {
            crate::models::check_dimensions("threshold", FEATURE_COUNT, x)?;
            let class = if x[self.feature] > self.cut { 1 } else { 0 };
            IncomeLabel::from_class("threshold", class)
        }
    }

    fn identity_scaler() -> StandardScaler {
        StandardScaler {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
            n_features_in: FEATURE_COUNT,
        }
    }

    /// Context with adult encoders, an identity scaler and rule-based models:
    /// KNN stand-in says >50K above age 50, tree stand-in above 45 hours.
    pub(crate) fn fake_context() -> PredictionContext {
        PredictionContext::new(
            CategoricalEncoders::from_table(adult_table()).unwrap(),
            identity_scaler(),
            Box::new(Threshold {
                feature: Feature::Age.index(),
                cut: 50.0,
            }),
            Box::new(Threshold {
                feature: Feature::HoursPerWeek.index(),
                cut: 45.0,
            }),
        )
    }

    pub(crate) fn sample_input() -> UserInput {
        UserInput {
            age: 39,
            workclass: "Private".to_string(),
            education: "Bachelors".to_string(),
            marital_status: "Never-married".to_string(),
            occupation: "Tech-support".to_string(),
            relationship: "Not-in-family".to_string(),
            race: "White".to_string(),
            sex: "Male".to_string(),
            hours_per_week: 40,
        }
    }

    #[test]
    fn test_encode_fixed_order() {
        let ctx = fake_context();
        let vector = ctx.encode(&sample_input()).unwrap();
        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        assert_eq!(
            vector.as_slice(),
            &[39.0, 4.0, 9.0, 4.0, 13.0, 1.0, 4.0, 1.0, 40.0]
        );
        assert_eq!(vector.get(Feature::Occupation), 13.0);
    }

    #[test]
    fn test_every_selection_gives_nine_values_in_range() {
        let ctx = fake_context();
        for cat in CategoricalFeature::ALL {
            for class in ctx.categories(cat) {
                let mut input = sample_input();
                match cat {
                    CategoricalFeature::Workclass => input.workclass = class.clone(),
                    CategoricalFeature::Education => input.education = class.clone(),
                    CategoricalFeature::MaritalStatus => input.marital_status = class.clone(),
                    CategoricalFeature::Occupation => input.occupation = class.clone(),
                    CategoricalFeature::Relationship => input.relationship = class.clone(),
                    CategoricalFeature::Race => input.race = class.clone(),
                    CategoricalFeature::Sex => input.sex = class.clone(),
                }
                let vector = ctx.encode(&input).unwrap();
                assert_eq!(vector.as_slice().len(), 9);
                let code = vector.get(cat.feature());
                assert!(code >= 0.0 && code < ctx.categories(cat).len() as f64);
            }
        }
    }

    #[test]
    fn test_boundaries_pass_through_unclamped() {
        let ctx = fake_context();
        for (age, hours) in [(17, 1), (90, 100)] {
            let mut input = sample_input();
            input.age = age;
            input.hours_per_week = hours;
            let vector = ctx.encode(&input).unwrap();
            assert_eq!(vector.get(Feature::Age), age as f64);
            assert_eq!(vector.get(Feature::HoursPerWeek), hours as f64);
        }
    }

    #[test]
    fn test_out_of_range_withholds_prediction() {
        let ctx = fake_context();
        let mut input = sample_input();
        input.age = 91;
        let err = ctx.predict(&input, ModelKind::Knn).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_models_are_selected_by_kind() {
        let ctx = fake_context();
        let mut input = sample_input();
        input.age = 60;
        input.hours_per_week = 40;

        let knn = ctx.predict(&input, ModelKind::Knn).unwrap();
        assert_eq!(knn.label, IncomeLabel::Above50K);
        assert_eq!(knn.line(), "Prediction (KNN): Income >50K");

        let tree = ctx.predict(&input, ModelKind::DecisionTree).unwrap();
        assert_eq!(tree.label, IncomeLabel::AtMost50K);
        assert_eq!(tree.line(), "Prediction (Decision Tree): Income <=50K");
    }

    #[test]
    fn test_repeated_prediction_is_idempotent() {
        let ctx = fake_context();
        let input = sample_input();
        for model in ModelKind::ALL {
            let first = ctx.predict(&input, model).unwrap();
            let second = ctx.predict(&input, model).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_scaler_mismatch_is_transform_error() {
        let mut ctx = fake_context();
        ctx.scaler = StandardScaler {
            mean: vec![0.0; 8],
            scale: vec![1.0; 8],
            n_features_in: 8,
        };
        let err = ctx.predict(&sample_input(), ModelKind::Knn).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transform);
        assert!(matches!(err, PredictError::ShapeMismatch { stage: "scaler", .. }));
    }

    #[test]
    fn test_unknown_category_is_transform_error() {
        let ctx = fake_context();
        let mut input = sample_input();
        input.occupation = "Astronaut".to_string();
        let err = ctx.predict(&input, ModelKind::DecisionTree).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transform);
    }

    #[test]
    fn test_default_input_is_first_class_and_lower_bounds() {
        let ctx = fake_context();
        let input = ctx.default_input();
        assert_eq!(input.age, 17);
        assert_eq!(input.hours_per_week, 1);
        assert_eq!(input.workclass, "?");
        assert_eq!(input.sex, "Female");
        assert!(ctx.encode(&input).is_ok());
    }
}
