pub mod bert;

pub use bert::{ArtifactFiles, BertSentimentModel, ModelSource};
