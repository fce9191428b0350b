//! Sentiment classification pipeline: text in, label + probabilities out.
//!
//! ## Main Types
//!
//! - [`SentimentPipeline`] - the classification service
//! - [`SentimentPipelineBuilder`] - builder for loading the model artifact
//! - [`SentimentModel`] - trait for the underlying inference engine
//! - [`batch`] - batch orchestration over CSV rows and fetched posts
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_pipeline::SentimentPipelineBuilder;
//!
//! fn main() -> sentiment_pipeline::Result<()> {
//!     let pipeline = SentimentPipelineBuilder::from_dir("sentiment-model").build()?;
//!     let result = pipeline.classify("I love this product!")?;
//!     println!("{} {:?}", result.label, result.probabilities);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod builder;
pub mod model;
pub mod pipeline;

pub use batch::{batch_from_csv, classify_batch, BatchEntry, BatchItem, BatchResult};
pub use builder::{SentimentPipelineBuilder, DEFAULT_MAX_LENGTH};
pub use model::SentimentModel;
pub use pipeline::{PredictionResult, SentimentPipeline, TextClassifier};
