//! Single-threaded end-to-end tests for the sequence loader.
//!
//! Tests cover:
//! - The documented two-row scenario (bucketing + padding + pairing)
//! - Batch shape invariants over a mixed-length corpus
//! - Header skipping, finite epochs, custom readers and collators
//! - Preprocessing application and error propagation

mod common;
use common::{flatten_labels, real_len, write_csv, FailOn, Identity, Uppercase};

use anyhow::Result;
use std::collections::HashSet;
use std::io::Write;
use tempfile::TempDir;
use textbatch::{
    JsonlReader, LoaderConfig, PadCollator, PaddedBatch, RecordSchema, SequenceLoader,
};

// ================================================================================================
// 1. The canonical two-row scenario
// ================================================================================================
#[test]
fn two_rows_share_a_bucket_and_pad_to_three() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_csv(&dir, "train.csv", &[("the cat sat", 1), ("dog ran", 0)])?;

    let config = LoaderConfig::builder()
        .batch_size(2)
        .bucket_boundaries(vec![3])
        .epochs(1)
        .seed(42)
        .build();

    let loader = SequenceLoader::new(vec![path], RecordSchema::default(), Identity, config)?;
    let batches: Vec<PaddedBatch> = loader.batches()?.collect::<Result<_>>()?;

    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.batch_size(), 2);
    assert_eq!(batch.padded_len(), 3);

    // Order may vary with the shuffle; pairing must not.
    let labels: HashSet<i64> = batch.labels().iter().copied().collect();
    assert_eq!(labels, HashSet::from([0, 1]));
    for (row, label) in batch.iter() {
        match label {
            1 => assert_eq!(row, &["the", "cat", "sat"]),
            0 => assert_eq!(row, &["dog", "ran", ""]),
            other => panic!("unexpected label {}", other),
        }
    }
    Ok(())
}

// ================================================================================================
// 2. Batch shape invariants
// ================================================================================================
#[test]
fn batches_are_constant_size_with_uniform_rows() -> Result<()> {
    let dir = TempDir::new()?;
    // Six short (<= 3 tokens) and six long (> 3 tokens) examples.
    let rows: Vec<(String, i64)> = (0..12)
        .map(|i| {
            let tokens = if i % 2 == 0 { 2 + i % 2 } else { 5 + i % 3 };
            ((0..tokens).map(|t| format!("w{}", t)).collect::<Vec<_>>().join(" "), i as i64)
        })
        .collect();
    let rows_ref: Vec<(&str, i64)> = rows.iter().map(|(e, l)| (e.as_str(), *l)).collect();
    let path = write_csv(&dir, "train.csv", &rows_ref)?;

    let config = LoaderConfig::builder()
        .batch_size(2)
        .bucket_boundaries(vec![3])
        .epochs(1)
        .seed(7)
        .build();

    let loader = SequenceLoader::new(vec![path], RecordSchema::default(), Identity, config)?;
    let batches: Vec<PaddedBatch> = loader.batches()?.collect::<Result<_>>()?;

    assert_eq!(batches.len(), 6);
    for batch in &batches {
        assert_eq!(batch.batch_size(), 2, "batch size must be constant");
        assert_eq!(batch.labels().len(), batch.tokens().len());

        let padded = batch.padded_len();
        assert!(batch.tokens().iter().all(|row| row.len() == padded));

        // All rows of one batch come from the same length bucket.
        let all_short = batch.tokens().iter().all(|row| real_len(row) <= 3);
        let all_long = batch.tokens().iter().all(|row| real_len(row) > 3);
        assert!(all_short || all_long, "mixed-bucket batch emitted");
    }
    Ok(())
}

#[test]
fn padding_never_truncates_tokens() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_csv(
        &dir,
        "train.csv",
        &[("a b c d e f g", 7), ("h i", 2), ("j k l m n", 5), ("o", 1)],
    )?;

    // Single catch-all bucket so lengths mix freely within a batch.
    let config = LoaderConfig::builder()
        .batch_size(4)
        .bucket_boundaries(vec![])
        .epochs(1)
        .seed(1)
        .build();

    let loader = SequenceLoader::new(vec![path], RecordSchema::default(), Identity, config)?;
    let batches: Vec<PaddedBatch> = loader.batches()?.collect::<Result<_>>()?;

    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.padded_len(), 7);
    // Label encodes the token count, so padding loss would be visible.
    for (row, label) in batch.iter() {
        assert_eq!(real_len(row) as i64, label);
    }
    Ok(())
}

// ================================================================================================
// 3. Reader configuration
// ================================================================================================
#[test]
fn header_lines_are_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("with_header.csv");
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, "key,example,label")?;
    writeln!(file, "a,one two,1")?;
    writeln!(file, "b,three four,0")?;

    let config = LoaderConfig::builder()
        .batch_size(2)
        .skip_header_lines(1)
        .epochs(1)
        .seed(3)
        .build();

    let loader = SequenceLoader::new(vec![path], RecordSchema::default(), Identity, config)?;
    let batches: Vec<PaddedBatch> = loader.batches()?.collect::<Result<_>>()?;

    assert_eq!(batches.len(), 1);
    let labels: HashSet<i64> = batches[0].labels().iter().copied().collect();
    assert_eq!(labels, HashSet::from([0, 1]));
    Ok(())
}

#[test]
fn finite_epochs_repeat_the_corpus() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_csv(
        &dir,
        "train.csv",
        &[("a b", 0), ("c d", 1), ("e f", 2), ("g h", 3)],
    )?;

    let config = LoaderConfig::builder()
        .batch_size(2)
        .bucket_boundaries(vec![3])
        .epochs(2)
        .seed(11)
        .build();

    let loader = SequenceLoader::new(vec![path], RecordSchema::default(), Identity, config)?;
    let batches: Vec<PaddedBatch> = loader.batches()?.collect::<Result<_>>()?;

    assert_eq!(batches.len(), 4); // 4 records x 2 epochs / batch_size 2
    let mut labels = flatten_labels(&batches);
    labels.sort_unstable();
    assert_eq!(labels, vec![0, 0, 1, 1, 2, 2, 3, 3]);
    Ok(())
}

#[test]
fn jsonl_reader_plugs_into_the_loader() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("train.jsonl");
    let mut file = std::fs::File::create(&path)?;
    writeln!(file, r#"{{"example": "the cat sat", "label": 1}}"#)?;
    writeln!(file, r#"{{"example": "dog ran", "label": 0}}"#)?;

    let config = LoaderConfig::builder()
        .batch_size(2)
        .epochs(1)
        .seed(5)
        .build();

    let loader = SequenceLoader::new_with_reader(vec![path], JsonlReader::new(), Identity, config)?;
    let batches: Vec<PaddedBatch> = loader.batches()?.collect::<Result<_>>()?;

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].padded_len(), 3);
    Ok(())
}

#[test]
fn custom_collator_pad_token_is_used() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_csv(&dir, "train.csv", &[("one two three", 1), ("four", 0)])?;

    let config = LoaderConfig::builder()
        .batch_size(2)
        .epochs(1)
        .seed(9)
        .build();

    let schema = RecordSchema::default();
    let reader = textbatch::DelimitedReader::new(schema, ",", 0)?;
    let loader = SequenceLoader::new_with_reader_and_collator(
        vec![path],
        reader,
        Identity,
        config,
        PadCollator::new().with_pad_token("<pad>"),
    )?;

    let batches: Vec<PaddedBatch> = loader.batches()?.collect::<Result<_>>()?;
    let batch = &batches[0];
    let short_row = batch
        .iter()
        .find(|(_, label)| *label == 0)
        .map(|(row, _)| row.to_vec())
        .expect("label 0 present");
    assert_eq!(short_row, vec!["four", "<pad>", "<pad>"]);
    Ok(())
}

// ================================================================================================
// 4. Preprocessing
// ================================================================================================
#[test]
fn preprocessor_transforms_examples_before_tokenizing() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_csv(&dir, "train.csv", &[("the cat", 1), ("dog ran", 0)])?;

    let config = LoaderConfig::builder()
        .batch_size(2)
        .epochs(1)
        .seed(2)
        .build();

    let loader = SequenceLoader::new(vec![path], RecordSchema::default(), Uppercase, config)?;
    let batches: Vec<PaddedBatch> = loader.batches()?.collect::<Result<_>>()?;

    for row in batches[0].tokens() {
        for token in row.iter().filter(|t| !t.is_empty()) {
            assert_eq!(token.to_uppercase(), *token);
        }
    }
    Ok(())
}

#[test]
fn preprocessor_errors_surface_without_ending_the_stream() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_csv(
        &dir,
        "train.csv",
        &[("good one", 0), ("bad poison row", 1), ("good two", 2)],
    )?;

    let config = LoaderConfig::builder()
        .batch_size(1)
        .bucket_boundaries(vec![])
        .epochs(1)
        .seed(4)
        .build();

    let loader = SequenceLoader::new(vec![path], RecordSchema::default(), FailOn("poison"), config)?;
    let results: Vec<Result<PaddedBatch>> = loader.batches()?.collect();

    let errors = results.iter().filter(|r| r.is_err()).count();
    let batches = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(errors, 1);
    assert_eq!(batches, 2);
    Ok(())
}

#[test]
fn unreadable_file_reports_error_but_stream_continues() -> Result<()> {
    let dir = TempDir::new()?;
    let good = write_csv(&dir, "train.csv", &[("a b", 0), ("c d", 1)])?;
    let missing = dir.path().join("missing.csv");

    let config = LoaderConfig::builder()
        .batch_size(2)
        .epochs(1)
        .seed(6)
        .build();

    let loader = SequenceLoader::new(
        vec![missing, good],
        RecordSchema::default(),
        Identity,
        config,
    )?;
    let results: Vec<Result<PaddedBatch>> = loader.batches()?.collect();

    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    let ok: Vec<&PaddedBatch> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(ok.len(), 1);
    assert_eq!(ok[0].batch_size(), 2);
    Ok(())
}

// ================================================================================================
// 5. Construction validation
// ================================================================================================
#[test]
fn empty_file_list_is_rejected() {
    let config = LoaderConfig::default();
    let result = SequenceLoader::new(vec![], RecordSchema::default(), Identity, config);
    assert!(result.is_err());
}

#[test]
fn invalid_bucket_boundaries_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "train.csv", &[("a", 0)]).unwrap();

    let config = LoaderConfig::builder()
        .bucket_boundaries(vec![5, 2])
        .build();
    let result = SequenceLoader::new(vec![path], RecordSchema::default(), Identity, config);
    assert!(result.is_err());
}
