use anyhow::{anyhow, Result};

/// A `PaddedBatch` is a fixed-shape grid of tokens paired with an aligned
/// label vector, ready to feed a training step.
///
/// Shape guarantees (enforced by the collator that built the batch):
/// - every token row has the same length, [`padded_len`](Self::padded_len),
/// - `labels.len() == tokens.len()`,
/// - `labels[i]` is the label that arrived with row `i`.
///
/// Shorter examples are filled out with the collator's pad token; real
/// tokens are never truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedBatch {
    pub(crate) tokens: Vec<Vec<String>>,
    pub(crate) labels: Vec<i64>,
}

impl PaddedBatch {
    /// Number of records in the batch.
    pub fn batch_size(&self) -> usize {
        self.labels.len()
    }

    /// The uniform row length every example was padded to.
    pub fn padded_len(&self) -> usize {
        self.tokens.first().map(Vec::len).unwrap_or(0)
    }

    /// The padded token row at `index`.
    pub fn row(&self, index: usize) -> Result<&[String]> {
        self.tokens
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow!("Row {} out of bounds for batch of {}", index, self.labels.len()))
    }

    pub fn tokens(&self) -> &[Vec<String>] {
        &self.tokens
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Iterates over `(padded row, label)` pairs in batch order.
    pub fn iter(&self) -> impl Iterator<Item = (&[String], i64)> {
        self.tokens
            .iter()
            .map(Vec::as_slice)
            .zip(self.labels.iter().copied())
    }
}
