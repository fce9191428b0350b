use candle_core::Device;

use crate::encoding::EncodedInput;
use crate::{Result, SentimentError};

/// Inference engine seam: encoded input in, raw per-class logits out.
///
/// Implementations hold loaded weights and a device, both fixed after
/// construction; calls must not mutate model state.
pub trait SentimentModel {
    /// Logits for a single encoded input.
    fn forward(&self, input: &EncodedInput) -> Result<Vec<f32>> {
        self.forward_batch(std::slice::from_ref(input))?
            .into_iter()
            .next()
            .ok_or_else(|| SentimentError::Inference("model returned no logits".to_string()))
    }

    /// Logits for a batch of encoded inputs, one vector per input, in input
    /// order. Grouping inputs into one forward pass must not change any
    /// individual result versus [`SentimentModel::forward`].
    fn forward_batch(&self, inputs: &[EncodedInput]) -> Result<Vec<Vec<f32>>>;

    fn device(&self) -> &Device;
}
