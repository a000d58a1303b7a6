//! Configuration for loader behaviour.
//!
//! `LoaderConfig` stores the parameters that control how records are read,
//! shuffled, bucketed, and batched. All fields are fixed for the lifetime of
//! a loader instance.
//!
//! Example:
//! ```ignore
//! let config = LoaderConfig::builder()
//!     .batch_size(64)
//!     .num_threads(4)
//!     .bucket_boundaries(vec![16, 32, 64])
//!     .seed(42)
//!     .build();
//! ```

use anyhow::{ensure, Result};
use std::time::Duration;

/// Configuration for a [`SequenceLoader`](crate::loader::SequenceLoader).
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Field delimiter for the default delimited reader.
    pub field_delim: String,
    /// Header lines to skip per file (default delimited reader only).
    pub skip_header_lines: usize,
    /// Number of reader worker threads (enqueue side, must be >= 1).
    pub num_threads: usize,
    /// Records per emitted batch.
    pub batch_size: usize,
    /// Minimum shuffle-buffer fill before records may be drawn.
    /// Defaults to `batch_size * num_threads` when unset.
    pub min_after_dequeue: Option<usize>,
    /// Shuffle-buffer capacity. Defaults to
    /// `min_after_dequeue + (num_threads + 16) * batch_size` when unset.
    pub capacity: Option<usize>,
    /// Length-bucket boundaries, strictly increasing. `[3]` means two
    /// buckets: `len <= 3` and `len > 3`.
    pub bucket_boundaries: Vec<usize>,
    /// Passes over the file list. `None` streams forever.
    pub epochs: Option<usize>,
    /// Seed for the shuffle buffer. Random when unset. Fixed seeds make
    /// single-threaded runs reproducible; with multiple reader threads,
    /// channel arrival order still varies between runs.
    pub seed: Option<u64>,
    /// Maximum time the batch iterator waits for the next record before
    /// assuming the workers are stuck.
    pub timeout: Duration,
    /// Pipeline name, used for worker thread names.
    pub name: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            field_delim: ",".to_string(),
            skip_header_lines: 0,
            num_threads: 1,
            batch_size: 3,
            min_after_dequeue: None,
            capacity: None,
            bucket_boundaries: vec![3],
            epochs: None,
            seed: None,
            timeout: Duration::from_secs(30),
            name: "data_loader".to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn builder() -> LoaderConfigBuilder {
        LoaderConfigBuilder::default()
    }

    /// The minimum fill actually in effect.
    pub fn effective_min_after_dequeue(&self) -> usize {
        self.min_after_dequeue
            .unwrap_or(self.batch_size * self.num_threads)
    }

    /// The shuffle-buffer capacity actually in effect.
    pub fn effective_capacity(&self) -> usize {
        self.capacity.unwrap_or_else(|| {
            self.effective_min_after_dequeue() + (self.num_threads + 16) * self.batch_size
        })
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "Batch size must be greater than 0");
        ensure!(
            self.num_threads >= 1,
            "At least one reader thread is required"
        );
        ensure!(!self.field_delim.is_empty(), "Field delimiter cannot be empty");
        ensure!(
            self.effective_min_after_dequeue() < self.effective_capacity(),
            "min_after_dequeue ({}) must be less than shuffle-buffer capacity ({})",
            self.effective_min_after_dequeue(),
            self.effective_capacity()
        );
        Ok(())
    }
}

/// Builder for [`LoaderConfig`] with method chaining.
#[derive(Default)]
pub struct LoaderConfigBuilder {
    config: LoaderConfig,
}

impl LoaderConfigBuilder {
    /// Set the field delimiter for the default delimited reader.
    pub fn field_delim(mut self, delim: impl Into<String>) -> Self {
        self.config.field_delim = delim.into();
        self
    }

    /// Set the number of header lines to skip per file.
    pub fn skip_header_lines(mut self, lines: usize) -> Self {
        self.config.skip_header_lines = lines;
        self
    }

    /// Set the number of reader worker threads.
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Set the batch size (must be > 0).
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set the shuffle-buffer minimum fill.
    pub fn min_after_dequeue(mut self, min: usize) -> Self {
        self.config.min_after_dequeue = Some(min);
        self
    }

    /// Set the shuffle-buffer capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = Some(capacity);
        self
    }

    /// Set the length-bucket boundaries (strictly increasing).
    pub fn bucket_boundaries(mut self, boundaries: Vec<usize>) -> Self {
        self.config.bucket_boundaries = boundaries;
        self
    }

    /// Set a finite number of passes over the file list.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.config.epochs = Some(epochs);
        self
    }

    /// Set the shuffle seed for reproducible draining order.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set how long the batch iterator waits for the next record.
    ///
    /// - Too low: may fail batches during legitimately slow reads.
    /// - Too high: delays detection of stuck workers.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the pipeline name used in worker thread names.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> LoaderConfig {
        self.config
    }
}
