//! Format-specific record readers.
//!
//! A [`RecordReader`] turns one input file into a stream of
//! `(example, label)` records. The default format is delimited text
//! ([`DelimitedReader`]); [`JsonlReader`] covers line-delimited JSON.
//! Pipelines with other serialized formats implement [`RecordReader`]
//! themselves and hand the reader to the loader.

mod delimited;
mod jsonl;

pub use delimited::{ColumnDefault, DelimitedReader, RecordSchema};
pub use jsonl::JsonlReader;

use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Reads records from a single file.
///
/// Implementations must be `Send + Sync`: the same reader instance is shared
/// by every loader worker thread, each streaming its own subset of files.
pub trait RecordReader: Send + Sync {
    /// Opens `path` and returns a fallible iterator of records.
    ///
    /// Opening errors (missing file, permissions) fail the call itself;
    /// per-row errors (malformed fields) surface as `Err` items so one bad
    /// row does not abort the file.
    fn read(&self, path: &Path) -> Result<Box<dyn Iterator<Item = Result<Record>> + Send>>;
}
