//! Text-to-tensor encoding with a fixed-length truncation/padding policy.

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use crate::{Result, SentimentError};

/// One text encoded to model inputs.
///
/// `ids` and `attention_mask` always have exactly `max_length` elements:
/// shorter texts are padded (mask 0 on padded positions), longer texts are
/// truncated on the right.
#[derive(Debug, Clone)]
pub struct EncodedInput {
    ids: Vec<u32>,
    attention_mask: Vec<u32>,
}

impl EncodedInput {
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn attention_mask(&self) -> &[u32] {
        &self.attention_mask
    }

    /// Sequence length (equal for ids and mask).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Tokenizer adapter producing fixed-shape [`EncodedInput`]s.
///
/// Truncation and padding are configured once at construction, so every
/// `encode` call is a pure function of the text. The encoder itself does not
/// reject empty strings; callers validate input before forwarding it here.
pub struct TextEncoder {
    tokenizer: Tokenizer,
    max_length: usize,
}

impl TextEncoder {
    pub fn new(mut tokenizer: Tokenizer, max_length: usize) -> Result<Self> {
        let pad_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .or_else(|| tokenizer.token_to_id("<pad>"))
            .unwrap_or(0);
        let pad_token = tokenizer
            .id_to_token(pad_id)
            .unwrap_or_else(|| "[PAD]".to_string());

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| SentimentError::Encoding(format!("set truncation: {e}")))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_length),
            pad_id,
            pad_token,
            ..Default::default()
        }));

        Ok(Self {
            tokenizer,
            max_length,
        })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn encode(&self, text: &str) -> Result<EncodedInput> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| SentimentError::Encoding(format!("tokenization error: {e}")))?;

        Ok(EncodedInput {
            ids: encoding.get_ids().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
        })
    }
}
