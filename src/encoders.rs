// 🔤 Categorical Encoders - category string ↔ integer code
// Codes are positions in the sorted class list, as a fitted LabelEncoder assigns them

use crate::error::{PredictError, Result};
use crate::features::CategoricalFeature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// LABEL ENCODER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build from a fitted class list. Classes must be non-empty, unique and
    /// strictly ascending, otherwise the codes would not match training.
    pub fn new(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(PredictError::invalid_artifact(
                "label encoders",
                "encoder has no classes",
            ));
        }
        if let Some(pair) = classes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(PredictError::invalid_artifact(
                "label encoders",
                format!(
                    "classes must be sorted and unique, found '{}' before '{}'",
                    pair[0], pair[1]
                ),
            ));
        }
        Ok(LabelEncoder { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Code for a known category
    pub fn code(&self, value: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|i| i as u32)
    }

    pub fn transform(&self, feature: CategoricalFeature, value: &str) -> Result<u32> {
        self.code(value).ok_or_else(|| PredictError::UnknownCategory {
            feature: feature.artifact_key().to_string(),
            value: value.to_string(),
        })
    }

    pub fn inverse_transform(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(|s| s.as_str())
    }
}

// ============================================================================
// ENCODER TABLE (raw, keyed by name)
// ============================================================================

/// Encoders as persisted: feature key → class list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderTable(BTreeMap<String, Vec<String>>);

impl EncoderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, classes: Vec<String>) {
        self.0.insert(key.into(), classes);
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }
}

// ============================================================================
// CATEGORICAL ENCODERS (validated, statically indexed)
// ============================================================================

/// One encoder per categorical feature. Lookups cannot miss once built.
#[derive(Debug, Clone)]
pub struct CategoricalEncoders {
    encoders: [LabelEncoder; 7],
}

impl CategoricalEncoders {
    /// Resolve every expected key from the raw table.
    /// The first absent key, in vector order, is reported.
    pub fn from_table(mut table: EncoderTable) -> Result<Self> {
        let mut resolved = Vec::with_capacity(CategoricalFeature::ALL.len());

        for feature in CategoricalFeature::ALL {
            let key = feature.artifact_key();
            let classes = table
                .remove(key)
                .ok_or_else(|| PredictError::MissingEncoderKey {
                    key: key.to_string(),
                })?;
            resolved.push(LabelEncoder::new(classes).map_err(|e| match e {
                PredictError::InvalidArtifact { artifact, reason } => PredictError::InvalidArtifact {
                    artifact,
                    reason: format!("{}: {}", key, reason),
                },
                other => other,
            })?);
        }

        let leftover: Vec<&str> = table.keys().collect();
        if !leftover.is_empty() {
            tracing::debug!(keys = ?leftover, "ignoring extra encoder keys");
        }

        let encoders: [LabelEncoder; 7] = resolved
            .try_into()
            .map_err(|_| PredictError::invalid_artifact("label encoders", "wrong encoder count"))?;
        Ok(CategoricalEncoders { encoders })
    }

    pub fn get(&self, feature: CategoricalFeature) -> &LabelEncoder {
        &self.encoders[feature.index()]
    }

    pub fn encode(&self, feature: CategoricalFeature, value: &str) -> Result<u32> {
        self.get(feature).transform(feature, value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoricalFeature, &LabelEncoder)> {
        CategoricalFeature::ALL
            .into_iter()
            .map(move |f| (f, self.get(f)))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    /// Class lists of the adult census columns
    pub(crate) fn adult_table() -> EncoderTable {
        let mut table = EncoderTable::new();
        table.insert(
            "workclass",
            strings(&[
                "?", "Federal-gov", "Local-gov", "Never-worked", "Private",
                "Self-emp-inc", "Self-emp-not-inc", "State-gov", "Without-pay",
            ]),
        );
        table.insert(
            "education",
            strings(&[
                "10th", "11th", "12th", "1st-4th", "5th-6th", "7th-8th", "9th",
                "Assoc-acdm", "Assoc-voc", "Bachelors", "Doctorate", "HS-grad",
                "Masters", "Preschool", "Prof-school", "Some-college",
            ]),
        );
        table.insert(
            "marital-status",
            strings(&[
                "Divorced", "Married-AF-spouse", "Married-civ-spouse",
                "Married-spouse-absent", "Never-married", "Separated", "Widowed",
            ]),
        );
        table.insert(
            "occupation",
            strings(&[
                "?", "Adm-clerical", "Armed-Forces", "Craft-repair", "Exec-managerial",
                "Farming-fishing", "Handlers-cleaners", "Machine-op-inspct",
                "Other-service", "Priv-house-serv", "Prof-specialty", "Protective-serv",
                "Sales", "Tech-support", "Transport-moving",
            ]),
        );
        table.insert(
            "relationship",
            strings(&[
                "Husband", "Not-in-family", "Other-relative", "Own-child", "Unmarried",
                "Wife",
            ]),
        );
        table.insert(
            "race",
            strings(&[
                "Amer-Indian-Eskimo", "Asian-Pac-Islander", "Black", "Other", "White",
            ]),
        );
        table.insert("sex", strings(&["Female", "Male"]));
        table
    }

    #[test]
    fn test_codes_follow_sorted_position() {
        let encoders = CategoricalEncoders::from_table(adult_table()).unwrap();
        assert_eq!(encoders.encode(CategoricalFeature::Workclass, "Private").unwrap(), 4);
        assert_eq!(encoders.encode(CategoricalFeature::Education, "Bachelors").unwrap(), 9);
        assert_eq!(
            encoders.encode(CategoricalFeature::MaritalStatus, "Never-married").unwrap(),
            4
        );
        assert_eq!(
            encoders.encode(CategoricalFeature::Occupation, "Tech-support").unwrap(),
            13
        );
        assert_eq!(
            encoders.encode(CategoricalFeature::Relationship, "Not-in-family").unwrap(),
            1
        );
        assert_eq!(encoders.encode(CategoricalFeature::Race, "White").unwrap(), 4);
        assert_eq!(encoders.encode(CategoricalFeature::Sex, "Male").unwrap(), 1);
    }

    #[test]
    fn test_every_class_encodes_within_range() {
        let encoders = CategoricalEncoders::from_table(adult_table()).unwrap();
        for (feature, encoder) in encoders.iter() {
            for class in encoder.classes() {
                let code = encoder.transform(feature, class).unwrap();
                assert!((code as usize) < encoder.num_classes());
                assert_eq!(encoder.inverse_transform(code), Some(class.as_str()));
            }
        }
    }

    #[test]
    fn test_missing_key_is_reported() {
        let mut table = adult_table();
        table.remove("occupation");

        let err = CategoricalEncoders::from_table(table).unwrap_err();
        assert!(matches!(err, PredictError::MissingEncoderKey { ref key } if key == "occupation"));
    }

    #[test]
    fn test_underscore_spelling_is_not_accepted() {
        let mut table = adult_table();
        let classes = table.remove("marital-status").unwrap();
        table.insert("marital_status", classes);

        let err = CategoricalEncoders::from_table(table).unwrap_err();
        assert!(
            matches!(err, PredictError::MissingEncoderKey { ref key } if key == "marital-status")
        );
    }

    #[test]
    fn test_unknown_category() {
        let encoders = CategoricalEncoders::from_table(adult_table()).unwrap();
        let err = encoders
            .encode(CategoricalFeature::Race, "Martian")
            .unwrap_err();
        assert!(matches!(err, PredictError::UnknownCategory { .. }));
    }

    #[test]
    fn test_unsorted_classes_rejected() {
        let mut table = adult_table();
        table.insert("sex", strings(&["Male", "Female"]));

        let err = CategoricalEncoders::from_table(table).unwrap_err();
        match err {
            PredictError::InvalidArtifact { reason, .. } => assert!(reason.starts_with("sex:")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_table_deserializes_from_json() {
        let json = serde_json::to_string(&adult_table()).unwrap();
        let table: EncoderTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, adult_table());
        assert!(json.contains("\"marital-status\""));
    }
}
