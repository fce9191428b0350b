//! BERT sequence-classification model for the sentiment pipeline.
//!
//! Uses `candle_transformers::models::bert` for the encoder and adds the
//! pooler + linear classification head that `BertForSequenceClassification`
//! checkpoints carry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;
use tracing::info;

use crate::encoding::EncodedInput;
use crate::label::Label;
use crate::pipelines::sentiment::model::SentimentModel;
use crate::{Result, SentimentError};

/// Where the pretrained artifact lives.
///
/// A directory is the primary deployment shape (a fine-tuned model exported
/// next to the service); a Hugging Face repo id is supported for pulling the
/// same bundle from the hub.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Directory(PathBuf),
    HubRepo(String),
}

/// Resolved paths of the three files every artifact must provide.
#[derive(Debug, Clone)]
pub struct ArtifactFiles {
    pub config: PathBuf,
    pub weights: PathBuf,
    pub tokenizer: PathBuf,
}

impl ModelSource {
    /// Locate config, weights, and tokenizer files for this source.
    ///
    /// Weights may be either `model.safetensors` or `pytorch_model.bin`;
    /// anything else missing is a fatal load error.
    pub fn locate(&self) -> Result<ArtifactFiles> {
        match self {
            ModelSource::Directory(dir) => {
                let config = require_file(dir, "config.json")?;
                let tokenizer = require_file(dir, "tokenizer.json")?;
                let safetensors = dir.join("model.safetensors");
                let weights = if safetensors.is_file() {
                    safetensors
                } else {
                    let pth = dir.join("pytorch_model.bin");
                    if pth.is_file() {
                        pth
                    } else {
                        return Err(SentimentError::ModelLoad(format!(
                            "no model weights in {}: expected model.safetensors or pytorch_model.bin",
                            dir.display()
                        )));
                    }
                };
                Ok(ArtifactFiles {
                    config,
                    weights,
                    tokenizer,
                })
            }
            ModelSource::HubRepo(repo_id) => {
                let api = Api::new()?;
                let repo = api.repo(Repo::new(repo_id.clone(), RepoType::Model));
                let config = repo.get("config.json")?;
                let tokenizer = repo.get("tokenizer.json")?;
                let weights = repo
                    .get("model.safetensors")
                    .or_else(|_| repo.get("pytorch_model.bin"))?;
                Ok(ArtifactFiles {
                    config,
                    weights,
                    tokenizer,
                })
            }
        }
    }
}

fn require_file(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(SentimentError::ModelLoad(format!(
            "missing {name} in {}",
            dir.display()
        )))
    }
}

/// BERT encoder + tanh pooler + linear classification head.
struct BertForSequenceClassification {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
}

impl BertForSequenceClassification {
    fn load(vb: VarBuilder, config: &Config, num_labels: usize) -> Result<Self> {
        let bert = BertModel::load(vb.pp("bert"), config)
            .map_err(|e| SentimentError::ModelLoad(format!("load encoder: {e}")))?;
        let pooler = candle_nn::linear(
            config.hidden_size,
            config.hidden_size,
            vb.pp("bert").pp("pooler").pp("dense"),
        )
        .map_err(|e| SentimentError::ModelLoad(format!("load pooler: {e}")))?;
        // Loading the head with a fixed output width doubles as the
        // fail-fast check that the checkpoint really has num_labels classes.
        let classifier = candle_nn::linear(config.hidden_size, num_labels, vb.pp("classifier"))
            .map_err(|e| {
                SentimentError::ModelLoad(format!(
                    "load classification head ({num_labels} labels): {e}"
                ))
            })?;
        Ok(Self {
            bert,
            pooler,
            classifier,
        })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> candle_core::Result<Tensor> {
        let hidden = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;
        // [CLS] token, then pooler + tanh, then the head: [batch, num_labels]
        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        self.classifier.forward(&pooled)
    }
}

#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// The loaded sentiment classifier and the device it runs on.
///
/// Weights are read once at construction and never mutated; every call takes
/// `&self`, so a pipeline holding this model can be shared across threads.
pub struct BertSentimentModel {
    model: BertForSequenceClassification,
    device: Device,
}

impl BertSentimentModel {
    pub fn load(source: &ModelSource, device: Device) -> Result<Self> {
        let files = source.locate()?;
        Self::from_files(&files, device)
    }

    pub fn from_files(files: &ArtifactFiles, device: Device) -> Result<Self> {
        let config_content = std::fs::read_to_string(&files.config)?;

        let class_cfg: ClassifierConfigJson = serde_json::from_str(&config_content)?;
        validate_id2label(&class_cfg.id2label)?;

        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| SentimentError::ModelLoad(format!("parse model config: {e}")))?;

        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, &device)?
            }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, &device)?
        };

        let model = BertForSequenceClassification::load(vb, &config, Label::COUNT)?;

        info!(
            weights = %files.weights.display(),
            device = ?device.location(),
            "sentiment model loaded"
        );

        Ok(Self { model, device })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

/// Cross-check the artifact's label table against the fixed [`Label`] enum.
///
/// An empty table is accepted (some exports omit it); a present table must
/// name all four labels at their fixed indices.
fn validate_id2label(id2label: &HashMap<String, String>) -> Result<()> {
    if id2label.is_empty() {
        return Ok(());
    }
    if id2label.len() != Label::COUNT {
        return Err(SentimentError::ModelLoad(format!(
            "model declares {} labels, expected {}",
            id2label.len(),
            Label::COUNT
        )));
    }
    for label in Label::ALL {
        let name = id2label.get(&label.index().to_string()).ok_or_else(|| {
            SentimentError::ModelLoad(format!("model id2label missing index {}", label.index()))
        })?;
        if !name.eq_ignore_ascii_case(label.as_str()) {
            return Err(SentimentError::ModelLoad(format!(
                "model label {} is '{}', expected '{}'",
                label.index(),
                name,
                label
            )));
        }
    }
    Ok(())
}

impl SentimentModel for BertSentimentModel {
    fn forward_batch(&self, inputs: &[EncodedInput]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let batch = inputs.len();
        let seq_len = inputs[0].len();
        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for input in inputs {
            ids.extend_from_slice(input.ids());
            mask.extend_from_slice(input.attention_mask());
        }

        let run = || -> candle_core::Result<Vec<Vec<f32>>> {
            let input_ids = Tensor::from_vec(ids, (batch, seq_len), &self.device)?;
            let attention_mask = Tensor::from_vec(mask, (batch, seq_len), &self.device)?;
            let token_type_ids = input_ids.zeros_like()?;
            let logits = self
                .model
                .forward(&input_ids, &token_type_ids, &attention_mask)?;
            logits.to_vec2::<f32>()
        };

        run().map_err(|e| SentimentError::Inference(e.to_string()))
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
