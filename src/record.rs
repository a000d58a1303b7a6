use anyhow::{ensure, Result};

/// A `Record` is one parsed input row: the raw example text paired with its
/// integer label.
///
/// Records are produced by a [`RecordReader`](crate::readers::RecordReader)
/// and stay paired with their label through every later stage (preprocessing,
/// shuffling, bucketing). Only whole records move through the pipeline, so
/// the example/label pairing can never drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub example: String,
    pub label: i64,
}

impl Record {
    pub fn new(example: impl Into<String>, label: i64) -> Self {
        Self {
            example: example.into(),
            label,
        }
    }
}

/// A `TokenizedRecord` is a [`Record`] whose example has been split on
/// whitespace into an ordered token sequence.
///
/// The sequence length is the highest token position plus one, which for a
/// whitespace split is simply the token count. An empty or all-whitespace
/// example tokenizes to zero tokens; it still carries its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedRecord {
    pub tokens: Vec<String>,
    pub label: i64,
}

impl TokenizedRecord {
    /// Tokenizes a record by splitting its example on runs of whitespace.
    pub fn from_record(record: &Record) -> Self {
        Self {
            tokens: record
                .example
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            label: record.label,
        }
    }

    /// Sequence length: maximum token position observed plus one.
    pub fn seq_len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rebuilds the token vector from an already-tokenized source, validating
    /// that no token itself contains whitespace (which would change the
    /// sequence length on a round trip).
    pub fn from_tokens(tokens: Vec<String>, label: i64) -> Result<Self> {
        for token in &tokens {
            ensure!(
                !token.chars().any(char::is_whitespace),
                "Token {:?} contains whitespace",
                token
            );
        }
        Ok(Self { tokens, label })
    }
}

#[cfg(test)]
mod record_tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_whitespace_runs() {
        let record = Record::new("the  cat\tsat", 1);
        let tokenized = TokenizedRecord::from_record(&record);
        assert_eq!(tokenized.tokens, vec!["the", "cat", "sat"]);
        assert_eq!(tokenized.seq_len(), 3);
        assert_eq!(tokenized.label, 1);
    }

    #[test]
    fn empty_example_has_zero_length() {
        let tokenized = TokenizedRecord::from_record(&Record::new("   ", 0));
        assert!(tokenized.is_empty());
        assert_eq!(tokenized.seq_len(), 0);
        assert_eq!(tokenized.label, 0);
    }

    #[test]
    fn from_tokens_rejects_embedded_whitespace() {
        assert!(TokenizedRecord::from_tokens(vec!["ok".into()], 1).is_ok());
        assert!(TokenizedRecord::from_tokens(vec!["not ok".into()], 1).is_err());
    }
}
