//! The `SequenceLoader`.
//!
//! Coordinates the record readers, preprocessor, shuffle buffer, bucket
//! assembler, and collator to stream padded training batches from text
//! files.
//!
//! # Architecture Overview
//!
//! ```text
//!                ┌───────────────┐
//!                │  file list    │
//!                └──────┬────────┘
//!                       │ round-robin shards
//!                       ↓
//!               [Reader workers] ←───── LoaderConfig (num_threads, epochs)
//!                       │ RecordReader + Preprocess + tokenize
//!                       ↓
//!               ┌───────────────┐
//!               │bounded channel│ (backpressure)
//!               └──────┬────────┘
//!                       ↓
//!               ┌───────────────┐
//!               │ ShuffleBuffer │ (capacity / min_after_dequeue)
//!               └──────┬────────┘
//!                       │ uniform random draw
//!                       ↓
//!               ┌────────────────┐
//!               │BucketAssembler │ (route by sequence length)
//!               └──────┬─────────┘
//!                       │ full bucket of batch_size records
//!                       ↓
//!               ┌───────────────┐
//!               │   Collator    │ (pad to batch max length)
//!               └──────┬────────┘
//!                       ↓
//!               ┌───────────────┐
//!               │  PaddedBatch  │ (token grid + aligned labels)
//!               └───────────────┘
//! ```
//!
//! # Module Structure
//!
//! ```text
//! src/loader/
//! ├── mod.rs        # Public API exports + module-level architecture docs
//! ├── config.rs     # LoaderConfig, builder, and validation
//! ├── loader.rs     # SequenceLoader constructors and worker wiring
//! ├── iterator.rs   # BatchIter (single consumer, dequeue side)
//! └── pool.rs       # WorkerPool (enqueue side, shutdown on drop)
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! let config = LoaderConfig::builder()
//!     .batch_size(32)
//!     .num_threads(4)
//!     .bucket_boundaries(vec![16, 64])
//!     .seed(42)
//!     .build();
//!
//! let loader = SequenceLoader::new(files, RecordSchema::default(), Lowercase, config)?;
//!
//! for batch in loader.batches()?.take(steps) {
//!     let batch = batch?;
//!     // batch.tokens() is a [batch_size x padded_len] grid,
//!     // batch.labels() the aligned label vector.
//! }
//! ```
//!
//! # Notes
//! - With `epochs = None` (the default) the stream never ends; bound it with
//!   `take(n)` or a finite `epochs`.
//! - Per-record order is intentionally not preserved; only the
//!   (example, label) pairing is.
//! - Memory usage is O(capacity + num_buckets * batch_size) records.

mod config;
mod iterator;
mod loader;
mod pool;

pub use config::{LoaderConfig, LoaderConfigBuilder};
pub use iterator::BatchIter;
pub use loader::SequenceLoader;
