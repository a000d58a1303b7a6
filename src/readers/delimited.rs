use crate::readers::RecordReader;
use crate::record::Record;
use anyhow::{bail, ensure, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Default value (and implied type) for one column of a delimited record.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    /// A text column; the default fills in for empty fields.
    Str(String),
    /// An integer column; the default fills in for empty fields.
    Int(i64),
}

/// Column layout for delimited rows: per-column defaults plus which columns
/// hold the example text and the label.
///
/// The default schema keeps the original three-column contract: column 0 is
/// a row key that is decoded and then discarded, column 1 is the example,
/// column 2 is the integer label. Callers with a different layout set the
/// column indices explicitly.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    columns: Vec<ColumnDefault>,
    example_column: usize,
    label_column: usize,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            columns: vec![
                ColumnDefault::Str(String::new()),
                ColumnDefault::Str(String::new()),
                ColumnDefault::Int(0),
            ],
            example_column: 1,
            label_column: 2,
        }
    }
}

impl RecordSchema {
    /// Creates a schema over the given columns with the default example and
    /// label positions (columns 1 and 2).
    pub fn new(columns: Vec<ColumnDefault>) -> Result<Self> {
        Self::with_positions(columns, 1, 2)
    }

    /// Creates a schema with explicit example and label column positions.
    pub fn with_positions(
        columns: Vec<ColumnDefault>,
        example_column: usize,
        label_column: usize,
    ) -> Result<Self> {
        ensure!(
            example_column < columns.len(),
            "Example column {} out of range for {} columns",
            example_column,
            columns.len()
        );
        ensure!(
            label_column < columns.len(),
            "Label column {} out of range for {} columns",
            label_column,
            columns.len()
        );
        ensure!(
            example_column != label_column,
            "Example and label cannot share column {}",
            example_column
        );
        ensure!(
            matches!(columns[example_column], ColumnDefault::Str(_)),
            "Example column {} must be a string column",
            example_column
        );
        ensure!(
            matches!(columns[label_column], ColumnDefault::Int(_)),
            "Label column {} must be an integer column",
            label_column
        );

        Ok(Self {
            columns,
            example_column,
            label_column,
        })
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Parses one delimited row into a record.
    ///
    /// The row must have exactly as many fields as the schema has columns.
    /// Empty fields take their column default; a non-empty label field must
    /// parse as an integer.
    pub fn parse_row(&self, line: &str, field_delim: &str) -> Result<Record> {
        let fields: Vec<&str> = line.split(field_delim).collect();
        if fields.len() != self.columns.len() {
            bail!(
                "Expected {} fields, got {} in row {:?}",
                self.columns.len(),
                fields.len(),
                line
            );
        }

        let example = match (&self.columns[self.example_column], fields[self.example_column]) {
            (ColumnDefault::Str(default), "") => default.clone(),
            (_, field) => field.to_string(),
        };

        let label = match (&self.columns[self.label_column], fields[self.label_column]) {
            (ColumnDefault::Int(default), "") => *default,
            (_, field) => field.parse::<i64>().with_context(|| {
                format!(
                    "Label column {} is not an integer: {:?}",
                    self.label_column, field
                )
            })?,
        };

        Ok(Record { example, label })
    }
}

/// Reads delimited text files (CSV-like), one record per line.
///
/// Blank lines are skipped; the first `skip_header_lines` lines of every
/// file are dropped before any row is parsed.
#[derive(Debug, Clone)]
pub struct DelimitedReader {
    schema: RecordSchema,
    field_delim: String,
    skip_header_lines: usize,
}

impl DelimitedReader {
    pub fn new(
        schema: RecordSchema,
        field_delim: impl Into<String>,
        skip_header_lines: usize,
    ) -> Result<Self> {
        let field_delim = field_delim.into();
        ensure!(!field_delim.is_empty(), "Field delimiter cannot be empty");
        Ok(Self {
            schema,
            field_delim,
            skip_header_lines,
        })
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }
}

impl RecordReader for DelimitedReader {
    fn read(&self, path: &Path) -> Result<Box<dyn Iterator<Item = Result<Record>> + Send>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let schema = self.schema.clone();
        let field_delim = self.field_delim.clone();
        let path: PathBuf = path.to_path_buf();

        let iter = reader
            .lines()
            .enumerate()
            .skip(self.skip_header_lines)
            .filter_map(move |(line_num, line)| {
                let line = match line {
                    Ok(l) if l.trim().is_empty() => return None, // Skip blank lines
                    Ok(l) => l,
                    Err(e) => {
                        return Some(Err(e).with_context(|| {
                            format!("Error reading {}:{}", path.display(), line_num + 1)
                        }))
                    }
                };
                Some(schema.parse_row(&line, &field_delim).with_context(|| {
                    format!("Malformed row at {}:{}", path.display(), line_num + 1)
                }))
            });
        Ok(Box::new(iter))
    }
}
