use crate::batch::PaddedBatch;
use crate::record::TokenizedRecord;
use anyhow::{bail, Result};

/// A `Collator` defines how to pad and combine a bucket's worth of
/// [`TokenizedRecord`]s into a [`PaddedBatch`].
pub trait Collator: Send + Sync {
    fn collate(&self, records: &[TokenizedRecord]) -> Result<PaddedBatch>;
}

/// The default `Collator`: pads every example in the batch to the batch's
/// maximum sequence length using a filler token.
///
/// Because the loader only hands the collator records from a single length
/// bucket, the padded length never exceeds that bucket's ceiling for bounded
/// buckets. Padding is append-only; real tokens are never truncated.
#[derive(Debug, Clone)]
pub struct PadCollator {
    pad_token: String,
}

impl PadCollator {
    /// Creates a collator that pads with the empty-string filler token.
    pub fn new() -> Self {
        Self {
            pad_token: String::new(),
        }
    }

    /// Overrides the filler token, e.g. `"<pad>"`.
    pub fn with_pad_token(mut self, pad_token: impl Into<String>) -> Self {
        self.pad_token = pad_token.into();
        self
    }

    pub fn pad_token(&self) -> &str {
        &self.pad_token
    }
}

impl Default for PadCollator {
    fn default() -> Self {
        Self::new()
    }
}

impl Collator for PadCollator {
    fn collate(&self, records: &[TokenizedRecord]) -> Result<PaddedBatch> {
        if records.is_empty() {
            bail!("Cannot collate an empty record list");
        }

        let padded_len = records.iter().map(TokenizedRecord::seq_len).max().unwrap_or(0);

        let mut tokens = Vec::with_capacity(records.len());
        let mut labels = Vec::with_capacity(records.len());
        for record in records {
            let mut row = record.tokens.clone();
            row.resize(padded_len, self.pad_token.clone());
            tokens.push(row);
            labels.push(record.label);
        }

        Ok(PaddedBatch { tokens, labels })
    }
}
