//! Batch orchestration: drive the classifier over many items with per-item
//! failure isolation, order preservation, and per-label aggregation.

use std::io::Read;

use serde_json::Value;
use tracing::warn;

use super::pipeline::{PredictionResult, TextClassifier};
use crate::label::LabelCounts;
use crate::{Result, SentimentError};

/// One input unit in a batch: the text to classify plus an opaque metadata
/// bag (post score, url, subreddit, extra CSV columns) that the pipeline
/// passes through untouched.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub text: String,
    pub metadata: Value,
}

impl BatchItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// One item together with its tagged outcome. Failed items keep their error
/// instead of being dropped from the result.
#[derive(Debug)]
pub struct BatchEntry {
    pub item: BatchItem,
    pub outcome: Result<PredictionResult>,
}

/// Outcome of a whole batch: entries in input order plus label counts over
/// the successful entries. Immutable after construction.
#[derive(Debug, Default)]
pub struct BatchResult {
    entries: Vec<BatchEntry>,
    counts: LabelCounts,
}

impl BatchResult {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn counts(&self) -> &LabelCounts {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The explicit "no items" signal for empty batches and empty source
    /// fetches.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Successfully classified entries, in input order.
    pub fn successes(&self) -> impl Iterator<Item = (&BatchItem, &PredictionResult)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.as_ref().ok().map(|p| (&entry.item, p)))
    }
}

/// Classify every item in input order.
///
/// Item-scoped failures (empty text, tokenization errors) become the failed
/// outcome of that entry and processing continues; any other failure means
/// the engine itself is unusable and aborts the whole call. Counts cover
/// successful entries only.
pub fn classify_batch<C: TextClassifier>(
    classifier: &C,
    items: Vec<BatchItem>,
) -> Result<BatchResult> {
    let mut entries = Vec::with_capacity(items.len());
    let mut counts = LabelCounts::new();

    for item in items {
        let outcome = match classifier.classify(&item.text) {
            Ok(prediction) => {
                counts.record(prediction.label);
                Ok(prediction)
            }
            Err(e) if e.is_item_scoped() => {
                warn!(error = %e, "skipping unclassifiable batch item");
                Err(e)
            }
            Err(e) => return Err(e),
        };
        entries.push(BatchEntry { item, outcome });
    }

    Ok(BatchResult { entries, counts })
}

/// Read batch items from CSV, taking the text from `text_column` and passing
/// the remaining columns through as metadata.
///
/// A missing text column or unparseable CSV is a client error
/// ([`SentimentError::Validation`]); rows are returned in file order.
pub fn batch_from_csv<R: Read>(reader: R, text_column: &str) -> Result<Vec<BatchItem>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| SentimentError::Validation(format!("unreadable CSV: {e}")))?
        .clone();
    let text_index = headers
        .iter()
        .position(|header| header == text_column)
        .ok_or_else(|| {
            SentimentError::Validation(format!("CSV must contain a '{text_column}' column"))
        })?;

    let mut items = Vec::new();
    for record in csv_reader.records() {
        let record =
            record.map_err(|e| SentimentError::Validation(format!("malformed CSV row: {e}")))?;
        let text = record.get(text_index).unwrap_or("").to_string();

        let mut metadata = serde_json::Map::new();
        for (i, field) in record.iter().enumerate() {
            if i == text_index {
                continue;
            }
            if let Some(header) = headers.get(i) {
                metadata.insert(header.to_string(), Value::String(field.to_string()));
            }
        }

        let item = if metadata.is_empty() {
            BatchItem::new(text)
        } else {
            BatchItem::new(text).with_metadata(Value::Object(metadata))
        };
        items.push(item);
    }

    Ok(items)
}
