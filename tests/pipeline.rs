// Classification-service tests driven through a mock inference engine, so
// the full validate → encode → infer → softmax → arg-max path runs without a
// model artifact.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use candle_core::Device;
use sentiment_pipeline::encoding::{EncodedInput, TextEncoder};
use sentiment_pipeline::{Label, Result, SentimentError, SentimentModel, SentimentPipeline};
use tokenizers::models::wordlevel::WordLevel;
use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::Tokenizer;

const MAX_LENGTH: usize = 16;
const GREAT: u32 = 5;
const TERRIBLE: u32 = 6;

fn word_level_encoder() -> anyhow::Result<TextEncoder> {
    let vocab: HashMap<String, u32> = [
        ("[UNK]", 0u32),
        ("[PAD]", 1),
        ("the", 2),
        ("service", 3),
        ("was", 4),
        ("great", GREAT),
        ("terrible", TERRIBLE),
    ]
    .into_iter()
    .map(|(word, id)| (word.to_string(), id))
    .collect();

    let model = WordLevel::builder()
        .vocab(vocab)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| anyhow::anyhow!("build word-level model: {e}"))?;
    let mut tokenizer = Tokenizer::new(model);
    tokenizer.with_pre_tokenizer(Some(Whitespace {}));

    Ok(TextEncoder::new(tokenizer, MAX_LENGTH)?)
}

/// Engine emitting fixed logits keyed on the first token id, and counting
/// forward calls through a shared counter.
struct StubEngine {
    device: Device,
    forward_calls: Rc<Cell<usize>>,
}

impl StubEngine {
    fn new() -> (Self, Rc<Cell<usize>>) {
        let forward_calls = Rc::new(Cell::new(0));
        let engine = Self {
            device: Device::Cpu,
            forward_calls: Rc::clone(&forward_calls),
        };
        (engine, forward_calls)
    }
}

impl SentimentModel for StubEngine {
    fn forward_batch(&self, inputs: &[EncodedInput]) -> Result<Vec<Vec<f32>>> {
        self.forward_calls.set(self.forward_calls.get() + 1);
        Ok(inputs
            .iter()
            .map(|input| match input.ids().first() {
                Some(&GREAT) => vec![-1.0, 0.0, 4.0, -2.0],
                Some(&TERRIBLE) => vec![4.0, 0.0, -1.0, -2.0],
                _ => vec![-1.0, 0.0, -1.0, 3.0],
            })
            .collect())
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

fn stub_pipeline() -> anyhow::Result<(SentimentPipeline<StubEngine>, Rc<Cell<usize>>)> {
    let (engine, forward_calls) = StubEngine::new();
    Ok((
        SentimentPipeline::new(engine, word_level_encoder()?),
        forward_calls,
    ))
}

#[test]
fn classify_maps_logits_to_label_and_probabilities() -> anyhow::Result<()> {
    let (pipeline, _) = stub_pipeline()?;

    let result = pipeline.classify("great service")?;
    assert_eq!(result.label, Label::Positive);

    let sum: f32 = result.probabilities.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
    assert!(result
        .probabilities
        .iter()
        .all(|&p| (0.0..=1.0).contains(&p)));

    // label == argmax of the probabilities
    let max = result
        .probabilities
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max);
    assert_eq!(result.probabilities[result.label.index()], max);
    Ok(())
}

#[test]
fn classify_is_deterministic() -> anyhow::Result<()> {
    let (pipeline, _) = stub_pipeline()?;
    let first = pipeline.classify("terrible service")?;
    let second = pipeline.classify("terrible service")?;
    assert_eq!(first.label, Label::Negative);
    assert_eq!(first.probabilities, second.probabilities);
    Ok(())
}

#[test]
fn empty_text_is_rejected_without_touching_the_engine() -> anyhow::Result<()> {
    let (pipeline, forward_calls) = stub_pipeline()?;

    for text in ["", "   ", "\n\t"] {
        let result = pipeline.classify(text);
        assert!(matches!(result, Err(SentimentError::Validation(_))));
    }
    assert_eq!(forward_calls.get(), 0);

    // A valid text still goes through.
    assert_eq!(pipeline.classify("great")?.label, Label::Positive);
    assert_eq!(forward_calls.get(), 1);
    Ok(())
}

#[test]
fn classify_many_matches_single_calls() -> anyhow::Result<()> {
    let (pipeline, _) = stub_pipeline()?;
    let texts = ["great service", "terrible service", "the service was"];

    let batched = pipeline.classify_many(&texts)?;
    assert_eq!(batched.len(), texts.len());

    for (text, outcome) in texts.iter().zip(&batched) {
        let single = pipeline.classify(text)?;
        let batched_result = outcome.as_ref().expect("batched outcome");
        assert_eq!(single.label, batched_result.label);
        for (a, b) in single
            .probabilities
            .iter()
            .zip(batched_result.probabilities.iter())
        {
            assert!((a - b).abs() < 1e-6);
        }
    }
    Ok(())
}

#[test]
fn classify_many_isolates_invalid_items_in_one_forward_pass() -> anyhow::Result<()> {
    let (pipeline, forward_calls) = stub_pipeline()?;
    let texts = ["great", "   ", "terrible"];

    let outcomes = pipeline.classify_many(&texts)?;
    assert_eq!(outcomes.len(), 3);
    assert_eq!(
        outcomes[0].as_ref().expect("first outcome").label,
        Label::Positive
    );
    assert!(matches!(outcomes[1], Err(SentimentError::Validation(_))));
    assert_eq!(
        outcomes[2].as_ref().expect("third outcome").label,
        Label::Negative
    );

    // Valid items were grouped into a single batched forward pass.
    assert_eq!(forward_calls.get(), 1);
    assert!(pipeline.device().is_cpu());
    Ok(())
}
