use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A bounded buffer that drains in uniform random order, decorrelating
/// output order from input order.
///
/// Semantics follow the classic random-shuffle queue:
/// - `capacity` bounds the number of buffered items; callers check
///   [`is_full`](Self::is_full) before pushing (pushing into a full buffer
///   is an error).
/// - [`pop`](Self::pop) refuses to yield until the buffer holds strictly
///   more than `min_after_dequeue` items, so early output is drawn from a
///   reasonably mixed pool. This is a best-effort decorrelation guarantee,
///   not a statistical one.
/// - [`pop_remaining`](Self::pop_remaining) ignores the threshold and is
///   used to drain the buffer once the input stream has ended.
///
/// The buffer has a single owner (the batch iterator) and does no internal
/// locking; cross-thread coordination happens in the channel that feeds it.
///
/// Draining uses `swap_remove` of a uniformly random index, so each pop is
/// O(1) and every buffered item is equally likely.
#[derive(Debug)]
pub struct ShuffleBuffer<T> {
    items: Vec<T>,
    capacity: usize,
    min_after_dequeue: usize,
    rng: StdRng,
}

impl<T> ShuffleBuffer<T> {
    /// Creates a buffer with the given bounds and RNG seed.
    pub fn new(capacity: usize, min_after_dequeue: usize, seed: u64) -> Result<Self> {
        ensure!(capacity > 0, "Shuffle buffer capacity must be > 0");
        ensure!(
            min_after_dequeue < capacity,
            "min_after_dequeue ({}) must be less than capacity ({})",
            min_after_dequeue,
            capacity
        );

        Ok(Self {
            items: Vec::with_capacity(capacity),
            capacity,
            min_after_dequeue,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// True once enough items are buffered for `pop` to yield.
    pub fn can_pop(&self) -> bool {
        self.items.len() > self.min_after_dequeue
    }

    /// Adds an item. Errors if the buffer is already at capacity.
    pub fn push(&mut self, item: T) -> Result<()> {
        ensure!(
            !self.is_full(),
            "Shuffle buffer is full (capacity {})",
            self.capacity
        );
        self.items.push(item);
        Ok(())
    }

    /// Removes and returns a uniformly random item, or `None` while the
    /// buffer holds `min_after_dequeue` items or fewer.
    pub fn pop(&mut self) -> Option<T> {
        if !self.can_pop() {
            return None;
        }
        Some(self.pop_any())
    }

    /// Removes and returns a uniformly random item regardless of the minimum
    /// fill threshold. Used to drain the buffer at end of stream.
    pub fn pop_remaining(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.pop_any())
    }

    fn pop_any(&mut self) -> T {
        let index = self.rng.random_range(0..self.items.len());
        self.items.swap_remove(index)
    }
}
