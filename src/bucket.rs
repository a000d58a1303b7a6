use crate::record::TokenizedRecord;
use anyhow::{ensure, Result};

/// Routes records into length buckets and accumulates each bucket until it
/// holds a full batch.
///
/// `boundaries.len() + 1` buckets exist: a record of length `L` lands in the
/// first bucket whose boundary is `>= L`, or in the overflow bucket when `L`
/// exceeds every boundary. With the default boundary list `[3]` that means
/// two buckets, `len <= 3` and `len > 3`.
///
/// Grouping records of similar length before padding keeps the padding
/// overhead per batch small; the collator then pads a full bucket to the
/// batch's own maximum length.
#[derive(Debug)]
pub struct BucketAssembler {
    boundaries: Vec<usize>,
    batch_size: usize,
    pending: Vec<Vec<TokenizedRecord>>,
}

impl BucketAssembler {
    /// Creates an assembler with the given boundaries and batch size.
    ///
    /// Boundaries must be non-zero and strictly increasing. An empty
    /// boundary list degenerates to a single catch-all bucket.
    pub fn new(boundaries: Vec<usize>, batch_size: usize) -> Result<Self> {
        ensure!(batch_size > 0, "Batch size must be > 0");
        ensure!(
            boundaries.iter().all(|&b| b > 0),
            "Bucket boundaries must be > 0, got {:?}",
            boundaries
        );
        ensure!(
            boundaries.windows(2).all(|w| w[0] < w[1]),
            "Bucket boundaries must be strictly increasing, got {:?}",
            boundaries
        );

        let pending = (0..boundaries.len() + 1)
            .map(|_| Vec::with_capacity(batch_size))
            .collect();

        Ok(Self {
            boundaries,
            batch_size,
            pending,
        })
    }

    pub fn num_buckets(&self) -> usize {
        self.pending.len()
    }

    /// The bucket a sequence of length `seq_len` routes to.
    pub fn bucket_index(&self, seq_len: usize) -> usize {
        self.boundaries
            .iter()
            .position(|&b| seq_len <= b)
            .unwrap_or(self.boundaries.len())
    }

    /// Adds a record to its bucket. Returns the bucket's records when the
    /// record completes a full batch, in arrival order.
    pub fn push(&mut self, record: TokenizedRecord) -> Option<Vec<TokenizedRecord>> {
        let index = self.bucket_index(record.seq_len());
        let bucket = &mut self.pending[index];
        bucket.push(record);

        if bucket.len() >= self.batch_size {
            Some(std::mem::replace(
                bucket,
                Vec::with_capacity(self.batch_size),
            ))
        } else {
            None
        }
    }

    /// Total records currently waiting in partially filled buckets.
    pub fn pending_len(&self) -> usize {
        self.pending.iter().map(Vec::len).sum()
    }

    /// Discards all partially filled buckets.
    ///
    /// Called at end of a finite stream: leftover records cannot form a full
    /// batch and emitting them would break the constant-batch-size contract.
    pub fn discard_partial(&mut self) -> usize {
        let dropped = self.pending_len();
        for bucket in &mut self.pending {
            bucket.clear();
        }
        dropped
    }
}
