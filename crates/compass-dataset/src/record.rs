//! Raw country records and their flattened form
//!
//! Source datasets are JSON arrays of objects with arbitrarily nested fields.
//! Before any column can be inspected, each object is flattened into a single
//! level map whose keys are dotted paths (`{"name": {"common": "Chile"}}`
//! becomes `name.common`). Arrays and scalars are kept as leaf values.
//!
//! # Example
//!
//! ```
//! use compass_dataset::record::FlatRecord;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "name": { "common": "Chile", "official": "Republic of Chile" },
//!     "capital": ["Santiago"],
//!     "education_index": 0.81,
//! });
//! let flat = FlatRecord::flatten(&raw).unwrap();
//!
//! assert_eq!(flat.get("name.common"), Some(&json!("Chile")));
//! assert_eq!(flat.get("capital"), Some(&json!(["Santiago"])));
//! assert_eq!(flat.numeric("education_index"), Some(0.81));
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

/// Separator used between nested keys in flattened column names.
pub const PATH_SEPARATOR: char = '.';

/// A single record flattened to dotted-path columns.
///
/// Column order follows the order in which keys appear in the source
/// document (depth first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    columns: Map<String, Value>,
}

impl FlatRecord {
    /// Flattens a JSON object into dotted-path columns.
    ///
    /// Returns `None` if `raw` is not a JSON object. Empty nested objects
    /// contribute no columns.
    #[must_use]
    pub fn flatten(raw: &Value) -> Option<Self> {
        let object = raw.as_object()?;
        let mut columns = Map::new();
        flatten_into(&mut columns, None, object);
        Some(Self { columns })
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Returns the column as a number, or `None` if it is absent or not numeric.
    ///
    /// Booleans are not numeric.
    #[must_use]
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    /// Returns the column as a string slice, or `None` if it is absent or not a string.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    /// Column names in document order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, object: &Map<String, Value>) {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(out, Some(&path), nested),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

/// Descriptive (non-feature) fields of a country.
///
/// Serialized field-for-field into each recommendation entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryMetadata {
    /// Display name (`name.common`, else a string `name` column, else empty)
    pub name: String,
    pub region: Option<String>,
    pub subregion: Option<String>,
    /// Passed through as-is; datasets store either a string or a list of strings
    pub capital: Option<Value>,
    pub description: Option<String>,
}

impl CountryMetadata {
    const NAME_COLUMNS: [&str; 2] = ["name.common", "name"];

    #[must_use]
    pub fn from_record(record: &FlatRecord) -> Self {
        let name = Self::NAME_COLUMNS
            .iter()
            .find_map(|column| record.text(column))
            .unwrap_or_default()
            .to_owned();
        let capital = record.get("capital").filter(|v| !v.is_null()).cloned();
        Self {
            name,
            region: record.text("region").map(str::to_owned),
            subregion: record.text("subregion").map(str::to_owned),
            capital,
            description: record.text("description").map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_flatten_rejects_non_object() {
        assert!(FlatRecord::flatten(&json!([1, 2])).is_none());
        assert!(FlatRecord::flatten(&json!("Chile")).is_none());
    }

    #[test]
    fn test_flatten_nested_paths_in_document_order() {
        let raw = json!({
            "name": { "common": "Japan", "native": { "jpn": "日本" } },
            "scores": { "education_index": 0.9 },
            "region": "Asia",
        });
        let flat = FlatRecord::flatten(&raw).unwrap();

        let names = flat.column_names().collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "name.common",
                "name.native.jpn",
                "scores.education_index",
                "region"
            ]
        );
        assert_eq!(flat.numeric("scores.education_index"), Some(0.9));
    }

    #[test]
    fn test_flatten_empty_nested_object() {
        let flat = FlatRecord::flatten(&json!({ "extra": {}, "a": 1 })).unwrap();
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn test_numeric_excludes_bool_and_strings() {
        let flat = FlatRecord::flatten(&json!({
            "landlocked": true,
            "population": "47M",
            "area": 505_990,
        }))
        .unwrap();
        assert_eq!(flat.numeric("landlocked"), None);
        assert_eq!(flat.numeric("population"), None);
        assert_eq!(flat.numeric("area"), Some(505_990.0));
    }

    #[test]
    fn test_metadata_prefers_common_name() {
        let flat = FlatRecord::flatten(&json!({
            "name": { "common": "Spain", "official": "Kingdom of Spain" },
            "region": "Europe",
            "subregion": "Southern Europe",
            "capital": ["Madrid"],
            "description": "Sunny.",
        }))
        .unwrap();
        let meta = CountryMetadata::from_record(&flat);
        assert_eq!(meta.name, "Spain");
        assert_eq!(meta.region.as_deref(), Some("Europe"));
        assert_eq!(meta.subregion.as_deref(), Some("Southern Europe"));
        assert_eq!(meta.capital, Some(json!(["Madrid"])));
        assert_eq!(meta.description.as_deref(), Some("Sunny."));
    }

    #[test]
    fn test_metadata_fallbacks() {
        let flat = FlatRecord::flatten(&json!({ "name": "Atlantis", "capital": null })).unwrap();
        let meta = CountryMetadata::from_record(&flat);
        assert_eq!(meta.name, "Atlantis");
        assert_eq!(meta.region, None);
        assert_eq!(meta.capital, None);

        let nameless = FlatRecord::flatten(&json!({ "x": 1 })).unwrap();
        assert_eq!(CountryMetadata::from_record(&nameless).name, "");
    }
}
