//! Query profiles: free text translated into the feature space
//!
//! The starting point of every query is the "average country": the per-feature
//! mean of the raw values, scaled with the dataset's own normalization
//! parameters. Keyword rules then nudge individual features upward.

use std::iter;

use compass_dataset::PreparedDataset;
use serde::{Serialize, Serializer, ser::SerializeMap as _};

use crate::rules::{Concept, RuleTable};

/// Decimal places kept in the human-readable criteria.
pub const CRITERIA_DECIMALS: i32 = 3;

/// Normalized query vector plus its human-readable form.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryProfile {
    /// Query vector in schema order
    pub vector: Vec<f64>,
    /// Feature name to rounded value, in schema order
    pub criteria: Criteria,
    /// Concepts of the rules that fired, in rule table order
    pub matched: Vec<Concept>,
}

impl QueryProfile {
    /// Builds the query profile for `text`.
    ///
    /// Pure function of the text, the rule table and the prepared dataset:
    /// repeated calls return identical profiles. Empty text yields the
    /// unmodified mean profile.
    #[must_use]
    pub fn build(dataset: &PreparedDataset, rules: &RuleTable, text: &str) -> Self {
        let schema = dataset.schema();
        let mut vector = dataset.normalized_mean();
        let matched = rules.apply(text, &mut vector, |feature| schema.index_of(feature));
        let criteria = Criteria::new(schema.names(), &vector);
        tracing::debug!(?matched, "query profile built");
        Self {
            vector,
            criteria,
            matched,
        }
    }
}

/// Feature name to rounded query value, kept in schema order.
///
/// Serializes as a JSON object whose keys follow the schema order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Criteria {
    entries: Vec<(String, f64)>,
}

impl Criteria {
    #[must_use]
    pub fn new(names: &[String], vector: &[f64]) -> Self {
        debug_assert_eq!(names.len(), vector.len(), "vector length mismatch");
        let entries = iter::zip(names, vector)
            .map(|(name, value)| (name.clone(), round_to(*value, CRITERIA_DECIMALS)))
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Criteria {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Rounds half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use compass_dataset::PrepareOptions;
    use serde_json::json;

    use super::*;

    fn dataset() -> PreparedDataset {
        let raw = [
            json!({ "name": "Alpha", "education_index": 0.9, "wealth_index": 30000 }),
            json!({ "name": "Beta", "education_index": 0.6, "wealth_index": 60000 }),
            json!({ "name": "Gamma", "education_index": 0.3, "wealth_index": 10000 }),
            json!({ "name": "Delta", "education_index": 0.8, "wealth_index": 20000 }),
            json!({ "name": "Epsilon", "education_index": 0.5, "wealth_index": 50000 }),
        ];
        PreparedDataset::prepare(&raw, &PrepareOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_text_is_mean_profile() {
        let dataset = dataset();
        let profile = QueryProfile::build(&dataset, &RuleTable::default(), "");
        assert_eq!(profile.vector, dataset.normalized_mean());
        assert!(profile.matched.is_empty());
        assert_eq!(profile.criteria.get("education_index"), Some(0.533));
        assert_eq!(profile.criteria.get("wealth_index"), Some(0.48));
    }

    #[test]
    fn test_education_boost_over_baseline() {
        let dataset = dataset();
        let baseline = dataset.normalized_mean();
        let profile = QueryProfile::build(&dataset, &RuleTable::default(), "education");
        assert!((profile.vector[0] - (baseline[0] + 0.4)).abs() < 1e-12);
        assert_eq!(profile.vector[1], baseline[1]);
        assert_eq!(profile.matched, [Concept::Education]);
        assert_eq!(profile.criteria.get("education_index"), Some(0.933));
    }

    #[test]
    fn test_build_is_idempotent() {
        let dataset = dataset();
        let rules = RuleTable::default();
        let a = QueryProfile::build(&dataset, &rules, "safe, happy, high salary");
        let b = QueryProfile::build(&dataset, &rules, "safe, happy, high salary");
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_value_exceeds_ceiling() {
        let dataset = dataset();
        let text = "education eğitim üniversite income salary zengin gelir maaş";
        let profile = QueryProfile::build(&dataset, &RuleTable::default(), text);
        assert!(profile.vector.iter().all(|v| *v <= 1.0));
    }

    #[test]
    fn test_criteria_serializes_in_schema_order() {
        let criteria = Criteria::new(
            &["zeta".to_owned(), "alpha".to_owned()],
            &[0.123_456, 0.987_654],
        );
        assert_eq!(
            serde_json::to_string(&criteria).unwrap(),
            r#"{"zeta":0.123,"alpha":0.988}"#
        );
        assert_eq!(criteria.iter().map(|(k, _)| k).collect::<Vec<_>>(), ["zeta", "alpha"]);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123_456, 3), 0.123);
        assert_eq!(round_to(99.995_01, 2), 100.0);
        assert_eq!(round_to(42.0, 2), 42.0);
    }
}
