use serde::Serialize;

use super::batch::{self, BatchItem, BatchResult};
use super::model::SentimentModel;
use crate::encoding::TextEncoder;
use crate::label::Label;
use crate::{Result, SentimentError};

/// One classification outcome: the winning label and the full probability
/// distribution over all four labels, in label-index order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: Label,
    pub probabilities: [f32; Label::COUNT],
}

/// Anything that can classify a single text.
///
/// The batch orchestrator and source-query helpers run against this trait so
/// they stay independent of the concrete model; [`SentimentPipeline`] is the
/// production implementation.
pub trait TextClassifier {
    fn classify(&self, text: &str) -> Result<PredictionResult>;
}

/// The sentiment classification service: validate, encode, infer, normalize.
///
/// Holds the encoder and loaded model; no state is retained between calls,
/// so one pipeline behind an `Arc` serves concurrent callers. Bounding the
/// number of in-flight inferences (a worker pool or semaphore) is left to
/// the caller, which matters on memory-constrained accelerators.
pub struct SentimentPipeline<M: SentimentModel> {
    pub(crate) model: M,
    pub(crate) encoder: TextEncoder,
}

impl<M: SentimentModel> SentimentPipeline<M> {
    /// Assemble a pipeline from an already loaded model and encoder.
    ///
    /// [`SentimentPipelineBuilder`](super::SentimentPipelineBuilder) is the
    /// usual entry point; this constructor is the seam for custom
    /// [`SentimentModel`] implementations.
    pub fn new(model: M, encoder: TextEncoder) -> Self {
        Self { model, encoder }
    }

    /// Classify one text.
    ///
    /// Empty or all-whitespace text is rejected before any encoding or
    /// inference happens.
    pub fn classify(&self, text: &str) -> Result<PredictionResult> {
        if text.trim().is_empty() {
            return Err(SentimentError::Validation(
                "text cannot be empty".to_string(),
            ));
        }
        let encoded = self.encoder.encode(text)?;
        let logits = self.model.forward(&encoded)?;
        prediction_from_logits(&logits)
    }

    /// Classify several texts through one batched forward pass.
    ///
    /// Per-item validation and encoding failures are returned in place;
    /// a failed forward pass aborts the whole call. Outcomes are in input
    /// order.
    pub fn classify_many(&self, texts: &[&str]) -> Result<Vec<Result<PredictionResult>>> {
        let mut outcomes: Vec<Option<Result<PredictionResult>>> =
            texts.iter().map(|_| None).collect();
        let mut encoded = Vec::new();
        let mut positions = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                outcomes[i] = Some(Err(SentimentError::Validation(
                    "text cannot be empty".to_string(),
                )));
                continue;
            }
            match self.encoder.encode(text) {
                Ok(input) => {
                    encoded.push(input);
                    positions.push(i);
                }
                Err(e) if e.is_item_scoped() => outcomes[i] = Some(Err(e)),
                Err(e) => return Err(e),
            }
        }

        if !encoded.is_empty() {
            let logits = self.model.forward_batch(&encoded)?;
            for (i, item_logits) in positions.into_iter().zip(logits) {
                outcomes[i] = Some(prediction_from_logits(&item_logits));
            }
        }

        Ok(outcomes
            .into_iter()
            .map(|outcome| {
                outcome.unwrap_or_else(|| {
                    Err(SentimentError::Inference(
                        "model returned fewer results than inputs".to_string(),
                    ))
                })
            })
            .collect())
    }

    /// Classify a batch of items with per-item failure isolation.
    ///
    /// See [`batch::classify_batch`].
    pub fn classify_batch(&self, items: Vec<BatchItem>) -> Result<BatchResult> {
        batch::classify_batch(self, items)
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

impl<M: SentimentModel> TextClassifier for SentimentPipeline<M> {
    fn classify(&self, text: &str) -> Result<PredictionResult> {
        SentimentPipeline::classify(self, text)
    }
}

/// Turn raw logits into a [`PredictionResult`].
fn prediction_from_logits(logits: &[f32]) -> Result<PredictionResult> {
    let probs = softmax(logits);
    let probabilities: [f32; Label::COUNT] = probs.as_slice().try_into().map_err(|_| {
        SentimentError::Inference(format!(
            "expected {} logits, got {}",
            Label::COUNT,
            logits.len()
        ))
    })?;
    let label = Label::from_index(argmax(&probabilities)).ok_or_else(|| {
        SentimentError::Inference("arg-max outside label range".to_string())
    })?;
    Ok(PredictionResult {
        label,
        probabilities,
    })
}

/// Numerically stabilized softmax: the max logit is subtracted before
/// exponentiating so large-magnitude logits cannot overflow.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; ties resolve to the lowest index because only
/// a strictly greater value displaces the current winner.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = i;
        }
    }
    best
}
