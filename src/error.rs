use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentimentError {
    // Client input
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    // Serving
    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Source fetch failed: {0}")]
    SourceFetch(String),

    // Model loading
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Download failed: {0}")]
    Download(String),

    // Device
    #[error("Device error: {0}")]
    Device(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SentimentError>;

impl SentimentError {
    /// Whether this failure is confined to a single batch item.
    ///
    /// Bad text and tokenization failures only poison the item that carried
    /// them; everything else (inference faults, device errors, load errors)
    /// means the shared engine is unusable and the whole call must abort.
    pub fn is_item_scoped(&self) -> bool {
        matches!(
            self,
            SentimentError::Validation(_) | SentimentError::Encoding(_)
        )
    }
}

impl From<hf_hub::api::sync::ApiError> for SentimentError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        SentimentError::Download(value.to_string())
    }
}
