//! `SequenceLoader` constructors and pipeline wiring.
//!
//! # Constructor Overview
//!
//! - `new()` - default delimited reader (built from the config's delimiter
//!   and header-skip count) + default `PadCollator`
//! - `new_with_reader()` - custom record format + default `PadCollator`
//! - `new_with_reader_and_collator()` - custom format + custom collator
//!
//! Every constructor requires a [`Preprocess`] implementation: per-example
//! preprocessing has no default, so a loader cannot be built without one.
//!
//! # Seed Handling
//!
//! `config.seed` fixes the shuffle-buffer draining order. When unset, a
//! random runtime seed is drawn at construction so a single loader is still
//! internally consistent across `batches()` calls. Note that with more than
//! one reader thread, channel interleaving makes cross-run record order
//! nondeterministic even with a fixed seed.

use crate::bucket::BucketAssembler;
use crate::collator::{Collator, PadCollator};
use crate::preprocess::Preprocess;
use crate::readers::{DelimitedReader, RecordReader, RecordSchema};
use crate::record::{Record, TokenizedRecord};
use crate::shuffle::ShuffleBuffer;
use anyhow::{ensure, Context, Result};
use rand::Rng;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::config::LoaderConfig;
use super::iterator::BatchIter;
use super::pool::WorkerPool;

/// Streams padded, length-bucketed, label-paired batches from a set of
/// record files.
///
/// The pipeline per [`batches()`](Self::batches) call:
///
/// ```text
/// files -> reader workers -> preprocess -> tokenize
///       -> bounded channel -> shuffle buffer -> length buckets
///       -> collator -> PaddedBatch
/// ```
///
/// # Type parameters
/// - `R`: record reader (file format seam)
/// - `P`: per-example preprocessor (required, no default behavior)
/// - `C`: collator (defaults to [`PadCollator`])
///
/// # Thread safety
/// The loader is `Send + Sync`; each `batches()` call spawns its own worker
/// set and the returned iterator is consumed on a single thread.
pub struct SequenceLoader<R, P, C = PadCollator> {
    pub(crate) file_names: Vec<PathBuf>,
    pub(crate) reader: Arc<R>,
    pub(crate) preprocessor: Arc<P>,
    pub(crate) collator: C,
    pub(crate) config: LoaderConfig,
    pub(crate) runtime_seed: u64,
}

impl<P> SequenceLoader<DelimitedReader, P>
where
    P: Preprocess + 'static,
{
    /// Creates a loader over delimited text files.
    ///
    /// The reader is built from `schema` plus the config's `field_delim` and
    /// `skip_header_lines`.
    ///
    /// # Example
    /// ```ignore
    /// let loader = SequenceLoader::new(
    ///     vec!["train.csv".into()],
    ///     RecordSchema::default(),
    ///     Lowercase,
    ///     LoaderConfig::builder().batch_size(32).seed(42).build(),
    /// )?;
    /// for batch in loader.batches()?.take(1000) {
    ///     let batch = batch?;
    ///     // batch.tokens(), batch.labels()
    /// }
    /// ```
    pub fn new(
        file_names: Vec<PathBuf>,
        schema: RecordSchema,
        preprocessor: P,
        config: LoaderConfig,
    ) -> Result<Self> {
        let reader = DelimitedReader::new(
            schema,
            config.field_delim.clone(),
            config.skip_header_lines,
        )?;
        Self::new_with_reader(file_names, reader, preprocessor, config)
    }
}

impl<R, P> SequenceLoader<R, P>
where
    R: RecordReader + 'static,
    P: Preprocess + 'static,
{
    /// Creates a loader with a custom record reader and the default
    /// [`PadCollator`].
    pub fn new_with_reader(
        file_names: Vec<PathBuf>,
        reader: R,
        preprocessor: P,
        config: LoaderConfig,
    ) -> Result<Self> {
        Self::new_with_reader_and_collator(file_names, reader, preprocessor, config, PadCollator::new())
    }
}

impl<R, P, C> SequenceLoader<R, P, C>
where
    R: RecordReader + 'static,
    P: Preprocess + 'static,
    C: Collator,
{
    /// Creates a loader with a custom reader and collator.
    ///
    /// # Errors
    /// - empty file list
    /// - zero batch size or thread count
    /// - `min_after_dequeue >= capacity`
    /// - invalid bucket boundaries (zero or not strictly increasing)
    pub fn new_with_reader_and_collator(
        file_names: Vec<PathBuf>,
        reader: R,
        preprocessor: P,
        config: LoaderConfig,
        collator: C,
    ) -> Result<Self> {
        ensure!(!file_names.is_empty(), "File name list cannot be empty");
        config.validate()?;

        // Fail early on bad boundaries; batches() builds its own assembler.
        BucketAssembler::new(config.bucket_boundaries.clone(), config.batch_size)
            .context("Invalid bucket configuration")?;

        if config.num_threads > file_names.len() {
            eprintln!(
                "Warning: {} reader threads for {} files; extra threads will be idle.",
                config.num_threads,
                file_names.len()
            );
        }

        let runtime_seed = config.seed.unwrap_or_else(|| rand::rng().random());

        Ok(Self {
            file_names,
            reader: Arc::new(reader),
            preprocessor: Arc::new(preprocessor),
            collator,
            config,
            runtime_seed,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The seed actually in use (the configured one, or the randomly drawn
    /// runtime seed).
    pub fn runtime_seed(&self) -> u64 {
        self.runtime_seed
    }

    /// Wires the pipeline and returns the batch stream.
    ///
    /// Spawns `num_threads` reader workers; files are distributed
    /// round-robin by worker id (worker `w` of `N` reads files
    /// `w, w+N, ...`), each worker looping over its shard `epochs` times or
    /// forever when `epochs` is unset. Dropping the returned iterator shuts
    /// the workers down and joins them.
    ///
    /// Read and parse failures surface as `Err` items from the iterator;
    /// the stream continues past them.
    pub fn batches(&self) -> Result<BatchIter<'_, C>> {
        let capacity = self.config.effective_capacity();
        let min_after_dequeue = self.config.effective_min_after_dequeue();

        let buffer = ShuffleBuffer::new(capacity, min_after_dequeue, self.runtime_seed)?;
        let assembler =
            BucketAssembler::new(self.config.bucket_boundaries.clone(), self.config.batch_size)?;

        let files: Arc<[PathBuf]> = self.file_names.clone().into();
        let reader = self.reader.clone();
        let preprocessor = self.preprocessor.clone();
        let num_threads = self.config.num_threads;
        let epochs = self.config.epochs;

        let pool = WorkerPool::new(
            &self.config.name,
            num_threads,
            capacity,
            move |worker_id, output_tx, shutdown| {
                let mut epoch = 0usize;
                'stream: loop {
                    if epochs.is_some_and(|max| epoch >= max) {
                        break;
                    }

                    let shard = files.iter().skip(worker_id).step_by(num_threads);
                    let mut shard_empty = true;
                    for path in shard {
                        shard_empty = false;

                        let rows = match reader.read(path) {
                            Ok(rows) => rows,
                            Err(e) => {
                                // Report the unreadable file, keep streaming
                                // the rest of the shard.
                                if output_tx.send(Err(e)).is_err() {
                                    break 'stream;
                                }
                                continue;
                            }
                        };

                        for row in rows {
                            if shutdown.load(Ordering::Relaxed) {
                                break 'stream;
                            }

                            let result = row.and_then(|record| {
                                let example = preprocessor
                                    .preprocess(&record.example)
                                    .with_context(|| {
                                        format!(
                                            "Preprocessing failed for record from {}",
                                            path.display()
                                        )
                                    })?;
                                Ok(TokenizedRecord::from_record(&Record {
                                    example,
                                    label: record.label,
                                }))
                            });

                            if output_tx.send(result).is_err() {
                                break 'stream;
                            }
                        }
                    }

                    if shard_empty {
                        // More workers than files; nothing will ever arrive.
                        break;
                    }
                    epoch += 1;
                }
            },
        )?;

        Ok(BatchIter::new(
            pool,
            buffer,
            assembler,
            &self.collator,
            self.config.timeout,
        ))
    }
}
