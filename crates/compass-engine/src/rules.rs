//! Keyword boost rules
//!
//! A [`RuleTable`] is an ordered list of [`KeywordRule`]s. Each rule names a
//! concept, a set of trigger keywords and the features it nudges. A rule fires
//! when any of its triggers occurs as a substring of the lower-cased query
//! text; every boost of a fired rule is added to the target feature and the
//! result is clamped at [`BOOST_CEILING`]. Boosts targeting a feature that is
//! not part of the schema are ignored.
//!
//! Tables are plain data. Besides the built-in [`RuleTable::default`], a table
//! can be loaded from JSON:
//!
//! ```
//! use compass_engine::rules::RuleTable;
//!
//! let json = r#"[
//!     {
//!         "concept": "education",
//!         "triggers": ["school", "University"],
//!         "boosts": [{ "feature": "education_index", "amount": 0.25 }]
//!     }
//! ]"#;
//! let table = RuleTable::from_json(json)?;
//!
//! assert_eq!(table.rules().len(), 1);
//! assert!(table.rules()[0].matches("near a good university"));
//! # Ok::<(), compass_engine::RuleTableError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::RuleTableError;

/// Upper bound of any boosted query value.
pub const BOOST_CEILING: f64 = 1.0;

/// Broad category a rule expresses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    #[display("safety")]
    Safety,
    #[display("education")]
    Education,
    #[display("happiness")]
    Happiness,
    #[display("income")]
    Income,
    #[display("connectivity")]
    Connectivity,
}

/// Additive nudge applied to one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub feature: String,
    pub amount: f64,
}

impl Boost {
    fn new(feature: &str, amount: f64) -> Self {
        Self {
            feature: feature.to_owned(),
            amount,
        }
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub concept: Concept,
    /// Lower-cased trigger keywords
    pub triggers: Vec<String>,
    pub boosts: Vec<Boost>,
}

impl KeywordRule {
    /// Returns `true` if any trigger occurs in `text` (case-insensitive).
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.matches_lowercase(&text.to_lowercase())
    }

    pub(crate) fn matches_lowercase(&self, lowercase_text: &str) -> bool {
        self.triggers
            .iter()
            .any(|trigger| lowercase_text.contains(trigger.as_str()))
    }
}

/// Ordered, validated collection of keyword rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<KeywordRule>,
}

impl Default for RuleTable {
    /// The built-in table. Triggers cover English and Turkish phrasing.
    fn default() -> Self {
        let rule = |concept, triggers: &[&str], boosts: Vec<Boost>| KeywordRule {
            concept,
            triggers: triggers.iter().map(|t| (*t).to_owned()).collect(),
            boosts,
        };
        Self {
            rules: vec![
                rule(
                    Concept::Safety,
                    &["güvenli", "safety", "safe", "güvenlik"],
                    vec![
                        Boost::new("political_stability_index", 0.4),
                        Boost::new("healthcare_quality_index", 0.2),
                    ],
                ),
                rule(
                    Concept::Education,
                    &["eğitim", "education", "üniversite"],
                    vec![Boost::new("education_index", 0.4)],
                ),
                rule(
                    Concept::Happiness,
                    &["mutlu", "huzurlu", "happy", "happiness"],
                    vec![Boost::new("happiness_index", 0.4)],
                ),
                rule(
                    Concept::Income,
                    &["gelir", "maaş", "income", "salary", "zengin"],
                    vec![
                        Boost::new("wealth_index", 0.3),
                        Boost::new("gdp_per_capita", 0.3),
                    ],
                ),
                rule(
                    Concept::Connectivity,
                    &["internet", "remote", "uzaktan"],
                    vec![Boost::new("internet_penetration", 0.3)],
                ),
            ],
        }
    }
}

impl RuleTable {
    /// Validates and normalizes a list of rules.
    ///
    /// Triggers are lower-cased and trimmed. Fails if a rule has no triggers,
    /// a blank trigger, no boosts, a blank feature name, or an amount that is
    /// not a positive finite number.
    pub fn new(rules: Vec<KeywordRule>) -> Result<Self, RuleTableError> {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, mut rule)| {
                if rule.triggers.is_empty() {
                    return Err(RuleTableError::NoTriggers { index });
                }
                for trigger in &mut rule.triggers {
                    *trigger = trigger.trim().to_lowercase();
                    if trigger.is_empty() {
                        return Err(RuleTableError::BlankTrigger { index });
                    }
                }
                if rule.boosts.is_empty() {
                    return Err(RuleTableError::NoBoosts { index });
                }
                for boost in &rule.boosts {
                    if boost.feature.trim().is_empty() {
                        return Err(RuleTableError::BlankFeature { index });
                    }
                    if !boost.amount.is_finite() || boost.amount <= 0.0 {
                        return Err(RuleTableError::InvalidAmount {
                            index,
                            amount: boost.amount,
                        });
                    }
                }
                Ok(rule)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Parses and validates a JSON array of rules.
    pub fn from_json(json: &str) -> Result<Self, RuleTableError> {
        let rules = serde_json::from_str(json).map_err(RuleTableError::Parse)?;
        Self::new(rules)
    }

    #[must_use]
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Applies every matching rule to `vector` in table order.
    ///
    /// `index_of` maps a feature name to its axis. Returns the concepts of the
    /// rules that fired, in table order.
    pub fn apply<F>(&self, text: &str, vector: &mut [f64], index_of: F) -> Vec<Concept>
    where
        F: Fn(&str) -> Option<usize>,
    {
        let lowercase = text.to_lowercase();
        let mut fired = Vec::new();
        for rule in self
            .rules
            .iter()
            .filter(|rule| rule.matches_lowercase(&lowercase))
        {
            for boost in &rule.boosts {
                if let Some(axis) = index_of(&boost.feature) {
                    vector[axis] = (vector[axis] + boost.amount).min(BOOST_CEILING);
                }
            }
            fired.push(rule.concept);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURES: [&str; 3] = ["education_index", "wealth_index", "happiness_index"];

    fn index_of(feature: &str) -> Option<usize> {
        FEATURES.iter().position(|f| *f == feature)
    }

    #[test]
    fn test_default_table_shape() {
        let table = RuleTable::default();
        let concepts = table.rules().iter().map(|r| r.concept).collect::<Vec<_>>();
        assert_eq!(
            concepts,
            [
                Concept::Safety,
                Concept::Education,
                Concept::Happiness,
                Concept::Income,
                Concept::Connectivity
            ]
        );
        // The built-in table must pass its own validation
        assert_eq!(RuleTable::new(table.rules().to_vec()).unwrap(), table);
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let table = RuleTable::default();
        let mut v = [0.5, 0.5, 0.5];
        let fired = table.apply("Looking for a HAPPY place", &mut v, index_of);
        assert_eq!(fired, [Concept::Happiness]);
        assert_eq!(v, [0.5, 0.5, 0.9]);
    }

    #[test]
    fn test_turkish_triggers() {
        let table = RuleTable::default();
        let mut v = [0.1, 0.1, 0.1];
        let fired = table.apply("Güvenli ve yüksek eğitim, gelir düzeyi yüksek", &mut v, index_of);
        assert_eq!(fired, [Concept::Safety, Concept::Education, Concept::Income]);
        assert!((v[0] - 0.5).abs() < 1e-12);
        assert!((v[1] - 0.4).abs() < 1e-12);
        assert_eq!(v[2], 0.1);
    }

    #[test]
    fn test_boost_is_clamped() {
        let table = RuleTable::default();
        let mut v = [0.9, 0.95, 1.0];
        table.apply("education salary happiness", &mut v, index_of);
        assert_eq!(v, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_absent_feature_is_noop() {
        let table = RuleTable::default();
        let mut v = [0.2, 0.2, 0.2];
        let fired = table.apply("fast internet for remote work", &mut v, index_of);
        assert_eq!(fired, [Concept::Connectivity]);
        assert_eq!(v, [0.2, 0.2, 0.2]);
    }

    #[test]
    fn test_no_match_leaves_vector_untouched() {
        let table = RuleTable::default();
        let mut v = [0.3, 0.4, 0.5];
        assert!(table.apply("", &mut v, index_of).is_empty());
        assert!(table.apply("mountains and beaches", &mut v, index_of).is_empty());
        assert_eq!(v, [0.3, 0.4, 0.5]);
    }

    #[test]
    fn test_triggers_are_normalized() {
        let table = RuleTable::new(vec![KeywordRule {
            concept: Concept::Education,
            triggers: vec!["  School ".to_owned()],
            boosts: vec![Boost::new("education_index", 0.1)],
        }])
        .unwrap();
        assert_eq!(table.rules()[0].triggers, ["school"]);
        assert!(table.rules()[0].matches("SCHOOLS"));
    }

    #[test]
    fn test_invalid_tables() {
        let base = KeywordRule {
            concept: Concept::Safety,
            triggers: vec!["safe".to_owned()],
            boosts: vec![Boost::new("political_stability_index", 0.4)],
        };

        let mut rule = base.clone();
        rule.triggers.clear();
        assert!(matches!(
            RuleTable::new(vec![base.clone(), rule]),
            Err(RuleTableError::NoTriggers { index: 1 })
        ));

        let mut rule = base.clone();
        rule.triggers.push("   ".to_owned());
        assert!(matches!(
            RuleTable::new(vec![rule]),
            Err(RuleTableError::BlankTrigger { index: 0 })
        ));

        let mut rule = base.clone();
        rule.boosts.clear();
        assert!(matches!(
            RuleTable::new(vec![rule]),
            Err(RuleTableError::NoBoosts { index: 0 })
        ));

        let mut rule = base.clone();
        rule.boosts[0].feature = String::new();
        assert!(matches!(
            RuleTable::new(vec![rule]),
            Err(RuleTableError::BlankFeature { index: 0 })
        ));

        for amount in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            let mut rule = base.clone();
            rule.boosts[0].amount = amount;
            assert!(matches!(
                RuleTable::new(vec![rule]),
                Err(RuleTableError::InvalidAmount { index: 0, .. })
            ));
        }
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            RuleTable::from_json("{ not json"),
            Err(RuleTableError::Parse(_))
        ));
        assert!(matches!(
            RuleTable::from_json(r#"[{ "concept": "weather", "triggers": ["sun"], "boosts": [] }]"#),
            Err(RuleTableError::Parse(_))
        ));
    }

    #[test]
    fn test_json_round_trip_of_default_table() {
        let table = RuleTable::default();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(RuleTable::from_json(&json).unwrap(), table);
    }
}
