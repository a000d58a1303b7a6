//! Shared helpers for loader integration tests.

use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use textbatch::{PaddedBatch, Preprocess};

/// Passes example text through unchanged.
pub struct Identity;

impl Preprocess for Identity {
    fn preprocess(&self, example: &str) -> Result<String> {
        Ok(example.to_string())
    }
}

/// Uppercases example text, to make the preprocessing step observable.
pub struct Uppercase;

impl Preprocess for Uppercase {
    fn preprocess(&self, example: &str) -> Result<String> {
        Ok(example.to_uppercase())
    }
}

/// Fails any example containing the trigger token.
pub struct FailOn(pub &'static str);

impl Preprocess for FailOn {
    fn preprocess(&self, example: &str) -> Result<String> {
        anyhow::ensure!(
            !example.contains(self.0),
            "Refusing example containing {:?}",
            self.0
        );
        Ok(example.to_string())
    }
}

/// Writes `key,example,label` rows into `name` under `dir` and returns the
/// file's path.
pub fn write_csv(dir: &TempDir, name: &str, rows: &[(&str, i64)]) -> Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path)?;
    for (i, (example, label)) in rows.iter().enumerate() {
        writeln!(file, "row-{},{},{}", i, example, label)?;
    }
    Ok(path)
}

/// The number of real (non-empty-pad) tokens in a padded row.
pub fn real_len(row: &[String]) -> usize {
    row.iter().filter(|t| !t.is_empty()).count()
}

/// All labels from a batch sequence, flattened in emission order.
pub fn flatten_labels(batches: &[PaddedBatch]) -> Vec<i64> {
    batches.iter().flat_map(|b| b.labels().to_vec()).collect()
}
