// 🧾 Feature Layout - the fixed nine-column vector the models were fitted on
// Order: age, workclass, education, marital-status, occupation, relationship,
//        race, sex, hours-per-week

use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};

/// Number of columns in every encoded vector
pub const FEATURE_COUNT: usize = 9;

pub const AGE_MIN: i64 = 17;
pub const AGE_MAX: i64 = 90;
pub const HOURS_MIN: i64 = 1;
pub const HOURS_MAX: i64 = 100;

// ============================================================================
// FEATURE ENUMS
// ============================================================================

/// Every column of the model input, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    Age,
    Workclass,
    Education,
    MaritalStatus,
    Occupation,
    Relationship,
    Race,
    Sex,
    HoursPerWeek,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Age,
        Feature::Workclass,
        Feature::Education,
        Feature::MaritalStatus,
        Feature::Occupation,
        Feature::Relationship,
        Feature::Race,
        Feature::Sex,
        Feature::HoursPerWeek,
    ];

    /// Column name as used by the training data
    pub fn column(&self) -> &'static str {
        match self {
            Feature::Age => "age",
            Feature::HoursPerWeek => "hours-per-week",
            other => other
                .categorical()
                .map(|c| c.artifact_key())
                .unwrap_or_default(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feature::Age => "Age",
            Feature::HoursPerWeek => "Hours per Week",
            other => other.categorical().map(|c| c.label()).unwrap_or_default(),
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn categorical(&self) -> Option<CategoricalFeature> {
        match self {
            Feature::Workclass => Some(CategoricalFeature::Workclass),
            Feature::Education => Some(CategoricalFeature::Education),
            Feature::MaritalStatus => Some(CategoricalFeature::MaritalStatus),
            Feature::Occupation => Some(CategoricalFeature::Occupation),
            Feature::Relationship => Some(CategoricalFeature::Relationship),
            Feature::Race => Some(CategoricalFeature::Race),
            Feature::Sex => Some(CategoricalFeature::Sex),
            Feature::Age | Feature::HoursPerWeek => None,
        }
    }

    /// Inclusive bounds for the two numeric inputs
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self {
            Feature::Age => Some((AGE_MIN, AGE_MAX)),
            Feature::HoursPerWeek => Some((HOURS_MIN, HOURS_MAX)),
            _ => None,
        }
    }
}

/// The seven columns that go through a label encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoricalFeature {
    Workclass,
    Education,
    MaritalStatus,
    Occupation,
    Relationship,
    Race,
    Sex,
}

impl CategoricalFeature {
    pub const ALL: [CategoricalFeature; 7] = [
        CategoricalFeature::Workclass,
        CategoricalFeature::Education,
        CategoricalFeature::MaritalStatus,
        CategoricalFeature::Occupation,
        CategoricalFeature::Relationship,
        CategoricalFeature::Race,
        CategoricalFeature::Sex,
    ];

    /// Key under which the encoder is stored in the encoders artifact.
    /// Spelled exactly as the training columns; never normalized.
    pub fn artifact_key(&self) -> &'static str {
        match self {
            CategoricalFeature::Workclass => "workclass",
            CategoricalFeature::Education => "education",
            CategoricalFeature::MaritalStatus => "marital-status",
            CategoricalFeature::Occupation => "occupation",
            CategoricalFeature::Relationship => "relationship",
            CategoricalFeature::Race => "race",
            CategoricalFeature::Sex => "sex",
        }
    }

    /// HTML form field name
    pub fn field_name(&self) -> &'static str {
        match self {
            CategoricalFeature::MaritalStatus => "marital_status",
            other => other.artifact_key(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoricalFeature::Workclass => "Workclass",
            CategoricalFeature::Education => "Education",
            CategoricalFeature::MaritalStatus => "Marital Status",
            CategoricalFeature::Occupation => "Occupation",
            CategoricalFeature::Relationship => "Relationship",
            CategoricalFeature::Race => "Race",
            CategoricalFeature::Sex => "Sex",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn feature(&self) -> Feature {
        Feature::ALL[self.index() + 1]
    }
}

// ============================================================================
// USER INPUT RECORD
// ============================================================================

/// Raw values from one form submission, before encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    pub age: i64,
    pub workclass: String,
    pub education: String,
    #[serde(alias = "marital-status")]
    pub marital_status: String,
    pub occupation: String,
    pub relationship: String,
    pub race: String,
    pub sex: String,
    #[serde(alias = "hours-per-week")]
    pub hours_per_week: i64,
}

impl UserInput {
    pub fn category(&self, feature: CategoricalFeature) -> &str {
        match feature {
            CategoricalFeature::Workclass => &self.workclass,
            CategoricalFeature::Education => &self.education,
            CategoricalFeature::MaritalStatus => &self.marital_status,
            CategoricalFeature::Occupation => &self.occupation,
            CategoricalFeature::Relationship => &self.relationship,
            CategoricalFeature::Race => &self.race,
            CategoricalFeature::Sex => &self.sex,
        }
    }

    /// Check both numeric inputs against their inclusive bounds
    pub fn check_bounds(&self) -> Result<()> {
        check_range("age", self.age, AGE_MIN, AGE_MAX)?;
        check_range("hours-per-week", self.hours_per_week, HOURS_MIN, HOURS_MAX)
    }
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(PredictError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Encoded, unscaled model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        FeatureVector(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }
}

// ============================================================================
// TESTS
// ============================================================================
