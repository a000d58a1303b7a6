use crate::readers::RecordReader;
use crate::record::Record;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Wire shape of one JSONL row.
#[derive(Debug, Deserialize)]
struct JsonRow {
    example: String,
    label: i64,
}

/// Reads line-delimited JSON files with `{"example": ..., "label": ...}`
/// rows. Blank lines are skipped; parse errors carry the line number.
#[derive(Debug, Clone, Default)]
pub struct JsonlReader;

impl JsonlReader {
    pub fn new() -> Self {
        Self
    }
}

impl RecordReader for JsonlReader {
    fn read(&self, path: &Path) -> Result<Box<dyn Iterator<Item = Result<Record>> + Send>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let path: PathBuf = path.to_path_buf();

        let iter = reader.lines().enumerate().filter_map(move |(line_num, line)| {
            let line = match line {
                Ok(l) if l.trim().is_empty() => return None, // Skip blanks
                Ok(l) => l,
                Err(e) => {
                    return Some(Err(e).with_context(|| {
                        format!("Error reading {}:{}", path.display(), line_num + 1)
                    }))
                }
            };
            Some(
                serde_json::from_str::<JsonRow>(&line)
                    .map(|row| Record {
                        example: row.example,
                        label: row.label,
                    })
                    .with_context(|| {
                        format!("Invalid JSON at {}:{}", path.display(), line_num + 1)
                    }),
            )
        });
        Ok(Box::new(iter))
    }
}
