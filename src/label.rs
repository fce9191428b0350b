//! The fixed four-way sentiment taxonomy and per-label aggregation.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Sentiment category, bound to the classifier head's output indices.
///
/// The index↔name table is coupled to the model by fine-tuning, not by
/// structure; it is validated against the artifact's `id2label` at load time
/// and must never be reordered independently of the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Negative = 0,
    Neutral = 1,
    Positive = 2,
    Irrelevant = 3,
}

impl Label {
    /// Width of the classifier output head.
    pub const COUNT: usize = 4;

    /// All labels in index order.
    pub const ALL: [Label; Label::COUNT] = [
        Label::Negative,
        Label::Neutral,
        Label::Positive,
        Label::Irrelevant,
    ];

    pub fn from_index(index: usize) -> Option<Label> {
        Label::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Negative => "Negative",
            Label::Neutral => "Neutral",
            Label::Positive => "Positive",
            Label::Irrelevant => "Irrelevant",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count of successful classifications per label within one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCounts {
    counts: [usize; Label::COUNT],
}

impl LabelCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: Label) {
        self.counts[label.index()] += 1;
    }

    pub fn get(&self, label: Label) -> usize {
        self.counts[label.index()]
    }

    /// Total number of recorded classifications.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl Serialize for LabelCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Label::COUNT))?;
        for label in Label::ALL {
            map.serialize_entry(label.as_str(), &self.get(label))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_mapping_is_stable() {
        assert_eq!(Label::Negative.index(), 0);
        assert_eq!(Label::Neutral.index(), 1);
        assert_eq!(Label::Positive.index(), 2);
        assert_eq!(Label::Irrelevant.index(), 3);
        for label in Label::ALL {
            assert_eq!(Label::from_index(label.index()), Some(label));
        }
        assert_eq!(Label::from_index(4), None);
    }

    #[test]
    fn counts_tally_per_label() {
        let mut counts = LabelCounts::new();
        counts.record(Label::Positive);
        counts.record(Label::Positive);
        counts.record(Label::Negative);
        counts.record(Label::Irrelevant);

        assert_eq!(counts.get(Label::Positive), 2);
        assert_eq!(counts.get(Label::Negative), 1);
        assert_eq!(counts.get(Label::Neutral), 0);
        assert_eq!(counts.get(Label::Irrelevant), 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn counts_serialize_as_name_map() {
        let mut counts = LabelCounts::new();
        counts.record(Label::Neutral);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Negative": 0,
                "Neutral": 1,
                "Positive": 0,
                "Irrelevant": 0,
            })
        );
    }
}
