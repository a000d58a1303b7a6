use anyhow::Result;

/// Per-example preprocessing applied after a record is read and before it is
/// tokenized.
///
/// Every loader must supply an implementation at construction; there is no
/// default. Implementations must be `Send + Sync` so the same preprocessor
/// can be shared across loader worker threads.
///
/// The transformation receives the raw example text and returns the text to
/// tokenize. Returning an error fails that record (it is surfaced by the
/// batch iterator), not the whole pipeline.
pub trait Preprocess: Send + Sync {
    fn preprocess(&self, example: &str) -> Result<String>;
}

/// Lowercases the example text. The usual first normalization step for
/// whitespace-tokenized classification corpora.
#[derive(Debug, Clone, Copy)]
pub struct Lowercase;

impl Preprocess for Lowercase {
    fn preprocess(&self, example: &str) -> Result<String> {
        Ok(example.to_lowercase())
    }
}

/// Allows closures as preprocessors, mostly for tests and one-off pipelines:
/// `|example: &str| Ok(example.trim().to_string())`.
impl<F> Preprocess for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn preprocess(&self, example: &str) -> Result<String> {
        self(example)
    }
}
