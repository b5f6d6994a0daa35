//! Feature schema: the canonical axis order of every vector
//!
//! The schema is fixed once per preparation run. Raw rows, normalized rows,
//! the mean profile and every query vector are laid out in this order.
//!
//! Two ways to obtain a schema:
//!
//! - [`FeatureSchema::new`]: an explicit, typed list of feature names. It is
//!   validated against the dataset with [`FeatureSchema::validate`].
//! - [`FeatureSchema::discover`]: every column that is present and numeric in
//!   every record, in the column order of the first record.

use std::{collections::HashSet, iter};

use ndarray::Array2;

use crate::{PrepareError, record::FlatRecord};

/// Ordered list of numeric feature names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Creates an explicit schema.
    ///
    /// Fails if the list is empty or contains a duplicate name.
    pub fn new<I, S>(names: I) -> Result<Self, PrepareError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect::<Vec<String>>();
        if names.is_empty() {
            return Err(PrepareError::EmptySchema);
        }
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(PrepareError::DuplicateFeature {
                    feature: name.clone(),
                });
            }
        }
        Ok(Self { names })
    }

    /// Discovers the schema from the dataset.
    ///
    /// A column is a feature iff every record supplies a numeric value for it.
    /// Fails with [`PrepareError::EmptyDataset`] or
    /// [`PrepareError::NoNumericFeatures`].
    pub fn discover(records: &[FlatRecord]) -> Result<Self, PrepareError> {
        let (first, rest) = records.split_first().ok_or(PrepareError::EmptyDataset)?;
        let names = first
            .column_names()
            .filter(|column| first.numeric(column).is_some())
            .filter(|column| rest.iter().all(|record| record.numeric(column).is_some()))
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if names.is_empty() {
            return Err(PrepareError::NoNumericFeatures);
        }
        Ok(Self { names })
    }

    /// Checks that every record supplies a numeric value for every feature.
    ///
    /// Reports the first offending (record, feature) pair in dataset order.
    pub fn validate(&self, records: &[FlatRecord]) -> Result<(), PrepareError> {
        if records.is_empty() {
            return Err(PrepareError::EmptyDataset);
        }
        for (index, record) in records.iter().enumerate() {
            for feature in &self.names {
                match record.get(feature) {
                    None => {
                        return Err(PrepareError::MissingFeature {
                            feature: feature.clone(),
                            index,
                        });
                    }
                    Some(value) if value.as_f64().is_none() => {
                        return Err(PrepareError::NonNumericFeature {
                            feature: feature.clone(),
                            index,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Extracts the raw feature matrix, one row per record.
    ///
    /// The schema must have been validated against `records`.
    pub fn extract(&self, records: &[FlatRecord]) -> Result<Array2<f64>, PrepareError> {
        let mut matrix = Array2::zeros((records.len(), self.len()));
        for (index, (record, mut row)) in iter::zip(records, matrix.rows_mut()).enumerate() {
            for (feature, cell) in iter::zip(&self.names, row.iter_mut()) {
                *cell = record
                    .numeric(feature)
                    .ok_or_else(|| PrepareError::NonNumericFeature {
                        feature: feature.clone(),
                        index,
                    })?;
            }
        }
        Ok(matrix)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a feature on the vector axis, if it is part of the schema.
    #[must_use]
    pub fn index_of(&self, feature: &str) -> Option<usize> {
        self.names.iter().position(|name| name == feature)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use serde_json::json;

    use super::*;

    fn flat(values: &[serde_json::Value]) -> Vec<FlatRecord> {
        values
            .iter()
            .map(|v| FlatRecord::flatten(v).unwrap())
            .collect()
    }

    #[test]
    fn test_discover_keeps_only_numeric_everywhere() {
        let records = flat(&[
            json!({ "name": "A", "wealth_index": 1, "extra": 3, "hdi": { "score": 0.7 } }),
            json!({ "name": "B", "wealth_index": 2.5, "extra": "n/a", "hdi": { "score": 0.9 } }),
            json!({ "name": "C", "wealth_index": 4, "hdi": { "score": 0.5 } }),
        ]);
        let schema = FeatureSchema::discover(&records).unwrap();
        assert_eq!(schema.names(), ["wealth_index", "hdi.score"]);
        assert_eq!(schema.index_of("hdi.score"), Some(1));
        assert_eq!(schema.index_of("extra"), None);
    }

    #[test]
    fn test_discover_errors() {
        assert!(matches!(
            FeatureSchema::discover(&[]),
            Err(PrepareError::EmptyDataset)
        ));
        let records = flat(&[json!({ "name": "A", "region": "X" })]);
        assert!(matches!(
            FeatureSchema::discover(&records),
            Err(PrepareError::NoNumericFeatures)
        ));
    }

    #[test]
    fn test_explicit_schema_rejects_duplicates() {
        assert!(matches!(
            FeatureSchema::new(["a", "b", "a"]),
            Err(PrepareError::DuplicateFeature { feature }) if feature == "a"
        ));
        assert!(matches!(
            FeatureSchema::new(Vec::<String>::new()),
            Err(PrepareError::EmptySchema)
        ));
    }

    #[test]
    fn test_validate_reports_first_problem() {
        let records = flat(&[
            json!({ "a": 1, "b": 2 }),
            json!({ "a": 1 }),
            json!({ "a": "x", "b": 2 }),
        ]);
        let schema = FeatureSchema::new(["a", "b"]).unwrap();
        assert!(matches!(
            schema.validate(&records),
            Err(PrepareError::MissingFeature { feature, index: 1 }) if feature == "b"
        ));

        let schema = FeatureSchema::new(["a"]).unwrap();
        assert!(matches!(
            schema.validate(&records),
            Err(PrepareError::NonNumericFeature { feature, index: 2 }) if feature == "a"
        ));
    }

    #[test]
    fn test_extract_uses_schema_order() {
        let records = flat(&[json!({ "a": 1, "b": 2 }), json!({ "b": 4, "a": 3 })]);
        let schema = FeatureSchema::new(["b", "a"]).unwrap();
        schema.validate(&records).unwrap();
        let matrix = schema.extract(&records).unwrap();
        assert_eq!(matrix, array![[2.0, 1.0], [4.0, 3.0]]);
    }
}
