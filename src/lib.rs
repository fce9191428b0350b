//! # sentiment-pipeline
//!
//! Four-way sentiment classification (Negative / Neutral / Positive /
//! Irrelevant) for short text, running a fine-tuned BERT classifier locally
//! through candle. One pipeline serves single texts, CSV batches, and posts
//! fetched from an external source, with per-item failure isolation in
//! batches.

pub mod encoding;
pub mod error;
pub mod label;
pub mod models;
pub mod pipelines;
pub mod sources;

pub use error::{Result, SentimentError};
pub use label::{Label, LabelCounts};
pub use models::{BertSentimentModel, ModelSource};
pub use pipelines::sentiment::{
    batch_from_csv, classify_batch, BatchEntry, BatchItem, BatchResult, PredictionResult,
    SentimentModel, SentimentPipeline, SentimentPipelineBuilder, TextClassifier,
    DEFAULT_MAX_LENGTH,
};
pub use sources::{classify_query, ExternalSource};
