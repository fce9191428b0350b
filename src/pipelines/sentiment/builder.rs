use std::path::PathBuf;

use candle_core::Device;
use tokenizers::Tokenizer;

use super::pipeline::SentimentPipeline;
use crate::encoding::TextEncoder;
use crate::models::{BertSentimentModel, ModelSource};
use crate::pipelines::utils::DeviceRequest;
use crate::{Result, SentimentError};

/// Default maximum sequence length, matching the length the model was
/// fine-tuned with.
pub const DEFAULT_MAX_LENGTH: usize = 128;

/// Builds a [`SentimentPipeline`] from a model artifact.
///
/// `build` is the only way to obtain a pipeline, so a pipeline value always
/// holds a fully loaded model: there is no observable "uninitialized" state,
/// and a load failure is surfaced before any request can be served.
pub struct SentimentPipelineBuilder {
    source: ModelSource,
    max_length: usize,
    device_request: DeviceRequest,
}

impl SentimentPipelineBuilder {
    /// Load the artifact from a local directory containing `config.json`,
    /// `tokenizer.json`, and the model weights.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(ModelSource::Directory(dir.into()))
    }

    /// Load the artifact from a Hugging Face Hub repository.
    pub fn from_hub(repo_id: impl Into<String>) -> Self {
        Self::new(ModelSource::HubRepo(repo_id.into()))
    }

    fn new(source: ModelSource) -> Self {
        Self {
            source,
            max_length: DEFAULT_MAX_LENGTH,
            device_request: DeviceRequest::Default,
        }
    }

    /// Override the fixed sequence length every input is padded or truncated
    /// to.
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Force CPU even if CUDA is available.
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Select a specific CUDA device by index.
    pub fn cuda_device(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Provide an already constructed device.
    pub fn device(mut self, device: Device) -> Self {
        self.device_request = DeviceRequest::Explicit(device);
        self
    }

    pub fn build(self) -> Result<SentimentPipeline<BertSentimentModel>> {
        let device = self.device_request.resolve()?;
        let files = self.source.locate()?;
        let model = BertSentimentModel::from_files(&files, device)?;
        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| SentimentError::ModelLoad(format!("load tokenizer: {e}")))?;
        let encoder = TextEncoder::new(tokenizer, self.max_length)?;
        Ok(SentimentPipeline { model, encoder })
    }
}
