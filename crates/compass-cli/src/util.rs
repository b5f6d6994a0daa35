use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, bail};
use compass_dataset::{PrepareOptions, PreparedDataset};
use compass_engine::{Recommender, RecommenderConfig, RuleTable};
use serde::Serialize;
use serde_json::Value;

/// Writes `value` as pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_json(io::stdout().lock(), value).context("Failed to write JSON to stdout"),
    }
}

fn write_json<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read the raw country dataset (a JSON array of objects)
///
/// # Errors
///
/// Returns error if the file cannot be opened, is not a JSON array, or is empty
pub fn read_dataset_file<P>(path: P) -> anyhow::Result<Vec<Value>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let records: Vec<Value> = read_json_file("dataset", path)?;
    if records.is_empty() {
        bail!("{} is empty", path.display());
    }
    Ok(records)
}

/// Read a keyword rule table from a JSON file
pub fn read_rules_file<P>(path: P) -> anyhow::Result<RuleTable>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to open rules file: {}", path.display()))?;
    let rules = RuleTable::from_json(&json)
        .with_context(|| format!("Invalid rules file: {}", path.display()))?;
    Ok(rules)
}

/// Load and prepare the dataset
///
/// Any failure here is fatal: the caller must not serve queries afterwards.
pub fn load_dataset(path: &Path, options: &PrepareOptions) -> anyhow::Result<PreparedDataset> {
    let records = read_dataset_file(path)?;
    tracing::info!(path = %path.display(), records = records.len(), "dataset loaded");
    let dataset = PreparedDataset::prepare(&records, options)
        .with_context(|| format!("Failed to prepare dataset: {}", path.display()))?;
    Ok(dataset)
}

/// Build a ready-to-query recommender from the dataset file
pub fn load_recommender(
    path: &Path,
    options: &PrepareOptions,
    config: RecommenderConfig,
) -> anyhow::Result<Recommender> {
    let dataset = load_dataset(path, options)?;
    Ok(Recommender::with_dataset(config, dataset))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_write_json_is_pretty_with_trailing_newline() {
        let mut buf = Vec::new();
        write_json(&mut buf, &json!({ "name": "Norway", "score": 99.5 })).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "{\n  \"name\": \"Norway\",\n  \"score\": 99.5\n}\n");
    }

    #[test]
    fn test_read_missing_dataset_file() {
        let err = read_dataset_file("/nonexistent/countries.json").unwrap_err();
        assert!(err.to_string().contains("Failed to open dataset file"));
    }
}
