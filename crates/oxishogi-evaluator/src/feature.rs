//! The declared feature schema of an evaluation set.
//!
//! Features are a fixed, ordered list declared with the data, not discovered
//! at runtime. Every feature is tagged with a [`FeatureClass`]: *major*
//! features (piece material and similar high-leverage terms) get the wide
//! chromosome segments and come first in every weight vector; *minor*
//! features follow with the narrow segments. The major-first ordering is an
//! invariant enforced at construction, so downstream code can derive the
//! chromosome split from `num_major_features` alone.

use derive_more as dm;
use serde::{Deserialize, Serialize};

/// Whether a feature occupies a wide (major) or narrow (minor) chromosome
/// segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureClass {
    Major,
    Minor,
}

/// One declared feature: its reporting label and its segment class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDef {
    pub label: String,
    pub class: FeatureClass,
}

impl FeatureDef {
    /// Convenience constructor for a major feature.
    #[must_use]
    pub fn major(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            class: FeatureClass::Major,
        }
    }

    /// Convenience constructor for a minor feature.
    #[must_use]
    pub fn minor(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            class: FeatureClass::Minor,
        }
    }
}

/// The schema declares features a reader would reject.
#[derive(Debug, Clone, PartialEq, Eq, dm::Display, dm::Error)]
pub enum SchemaError {
    /// A schema with no features encodes nothing.
    #[display("feature schema declares no features")]
    Empty,
    /// Major features must precede every minor feature.
    #[display("major feature '{label}' declared after a minor feature")]
    MajorAfterMinor { label: String },
}

/// An ordered feature list with the major-first invariant established.
///
/// Weight vectors, candidate feature vectors and chromosome segments all
/// follow this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FeatureDef>", into = "Vec<FeatureDef>")]
pub struct FeatureSchema {
    features: Vec<FeatureDef>,
    num_major: usize,
}

impl FeatureSchema {
    /// Builds a schema from an ordered feature list.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the list is empty or a major feature
    /// appears after a minor one.
    pub fn new(features: Vec<FeatureDef>) -> Result<Self, SchemaError> {
        if features.is_empty() {
            return Err(SchemaError::Empty);
        }
        let num_major = features
            .iter()
            .take_while(|f| f.class == FeatureClass::Major)
            .count();
        if let Some(stray) = features[num_major..]
            .iter()
            .find(|f| f.class == FeatureClass::Major)
        {
            return Err(SchemaError::MajorAfterMinor {
                label: stray.label.clone(),
            });
        }
        Ok(Self {
            features,
            num_major,
        })
    }

    /// All features, majors first.
    #[must_use]
    pub fn features(&self) -> &[FeatureDef] {
        &self.features
    }

    /// Total feature count.
    #[must_use]
    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// Count of major (wide-segment) features; they are always the leading
    /// entries.
    #[must_use]
    pub fn num_major_features(&self) -> usize {
        self.num_major
    }

    /// Count of minor (narrow-segment) features.
    #[must_use]
    pub fn num_minor_features(&self) -> usize {
        self.features.len() - self.num_major
    }

    /// The feature labels in schema order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.features.iter().map(|f| f.label.clone()).collect()
    }
}

impl TryFrom<Vec<FeatureDef>> for FeatureSchema {
    type Error = SchemaError;

    fn try_from(features: Vec<FeatureDef>) -> Result<Self, Self::Error> {
        Self::new(features)
    }
}

impl From<FeatureSchema> for Vec<FeatureDef> {
    fn from(schema: FeatureSchema) -> Self {
        schema.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_count_derived_from_prefix() {
        let schema = FeatureSchema::new(vec![
            FeatureDef::major("pawn_material"),
            FeatureDef::major("piece_material"),
            FeatureDef::minor("king_safety"),
        ])
        .unwrap();
        assert_eq!(schema.num_features(), 3);
        assert_eq!(schema.num_major_features(), 2);
        assert_eq!(schema.num_minor_features(), 1);
    }

    #[test]
    fn test_all_minor_schema_is_valid() {
        let schema =
            FeatureSchema::new(vec![FeatureDef::minor("mobility"), FeatureDef::minor("tempo")])
                .unwrap();
        assert_eq!(schema.num_major_features(), 0);
    }

    #[test]
    fn test_rejects_major_after_minor() {
        let err = FeatureSchema::new(vec![
            FeatureDef::major("pawn_material"),
            FeatureDef::minor("mobility"),
            FeatureDef::major("piece_material"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MajorAfterMinor {
                label: "piece_material".to_owned()
            }
        );
    }

    #[test]
    fn test_rejects_empty_schema() {
        assert_eq!(FeatureSchema::new(vec![]).unwrap_err(), SchemaError::Empty);
    }

    #[test]
    fn test_deserialization_enforces_invariant() {
        let json = r#"[
            {"label": "mobility", "class": "minor"},
            {"label": "pawn_material", "class": "major"}
        ]"#;
        let result: Result<FeatureSchema, _> = serde_json::from_str(json);
        assert!(result.is_err(), "out-of-order schema must not deserialize");
    }
}
