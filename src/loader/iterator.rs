//! The batch iterator: the dequeue side of the pipeline.
//!
//! `BatchIter` is the single consumer of the worker channel. It owns the
//! shuffle buffer and the bucket assembler, and drives the whole dequeue
//! path inside `next()`:
//!
//! 1. top the shuffle buffer off from the channel without blocking,
//! 2. once the buffer is past its minimum fill, pop a random record and
//!    route it to its length bucket,
//! 3. when a bucket reaches the batch size, collate and yield it,
//! 4. when every worker has finished (finite epochs), drain the buffer past
//!    the minimum-fill gate and yield the remaining full buckets; partially
//!    filled buckets are discarded so batch size stays constant.
//!
//! With `epochs = None` the stream is perpetual and step 4 never runs.

use crate::batch::PaddedBatch;
use crate::bucket::BucketAssembler;
use crate::collator::Collator;
use crate::record::TokenizedRecord;
use crate::shuffle::ShuffleBuffer;
use anyhow::{anyhow, Result};
use crossbeam_channel::{RecvTimeoutError, TryRecvError};
use std::time::Duration;

use super::pool::WorkerPool;

/// Iterator over `Result<PaddedBatch>`.
///
/// Created by [`SequenceLoader::batches()`](crate::loader::SequenceLoader::batches).
/// Dropping it signals shutdown to the reader workers and joins them.
pub struct BatchIter<'a, C> {
    pool: WorkerPool<Result<TokenizedRecord>>,
    buffer: ShuffleBuffer<TokenizedRecord>,
    assembler: BucketAssembler,
    collator: &'a C,
    timeout: Duration,
    draining: bool,
    done: bool,
}

impl<'a, C> BatchIter<'a, C>
where
    C: Collator,
{
    pub(crate) fn new(
        pool: WorkerPool<Result<TokenizedRecord>>,
        buffer: ShuffleBuffer<TokenizedRecord>,
        assembler: BucketAssembler,
        collator: &'a C,
        timeout: Duration,
    ) -> Self {
        Self {
            pool,
            buffer,
            assembler,
            collator,
            timeout,
            draining: false,
            done: false,
        }
    }

    /// Moves channel output into the shuffle buffer without blocking.
    /// Returns an error item to surface, if one arrived.
    fn top_off(&mut self) -> Option<anyhow::Error> {
        while !self.buffer.is_full() {
            match self.pool.try_recv() {
                Ok(Ok(record)) => {
                    // Cannot fail: the buffer was checked for space above.
                    if let Err(e) = self.buffer.push(record) {
                        return Some(e);
                    }
                }
                Ok(Err(e)) => return Some(e),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.draining = true;
                    break;
                }
            }
        }
        None
    }
}

impl<C> Iterator for BatchIter<'_, C>
where
    C: Collator,
{
    type Item = Result<PaddedBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.draining {
                // Workers are gone; empty the buffer ignoring the
                // minimum-fill gate, then discard incomplete buckets.
                match self.buffer.pop_remaining() {
                    Some(record) => {
                        if let Some(full) = self.assembler.push(record) {
                            return Some(self.collator.collate(&full));
                        }
                    }
                    None => {
                        self.assembler.discard_partial();
                        self.done = true;
                        return None;
                    }
                }
                continue;
            }

            if let Some(e) = self.top_off() {
                return Some(Err(e));
            }
            if self.draining {
                continue;
            }

            // Past the minimum fill: draw a shuffled record and route it.
            if let Some(record) = self.buffer.pop() {
                if let Some(full) = self.assembler.push(record) {
                    return Some(self.collator.collate(&full));
                }
                continue;
            }

            // At or below the minimum fill: block until a record arrives or
            // the workers finish.
            match self.pool.recv_timeout(self.timeout) {
                Ok(Ok(record)) => {
                    if let Err(e) = self.buffer.push(record) {
                        return Some(Err(e));
                    }
                }
                Ok(Err(e)) => return Some(Err(e)),
                Err(RecvTimeoutError::Disconnected) => {
                    self.draining = true;
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Some(Err(anyhow!(
                        "No records received for {:?} - workers may be stuck or input is exhausted below min_after_dequeue",
                        self.timeout
                    )));
                }
            }
        }
    }
}
