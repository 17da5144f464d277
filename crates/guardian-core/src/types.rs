//! Core types for Guardian

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Ordered toxicity labels a multi-output model is mapped onto
pub const LABELS: [&str; 6] = [
    "toxic",
    "severe_toxic",
    "obscene",
    "threat",
    "insult",
    "identity_hate",
];

/// Label used for single-output models and batch aggregates
pub const PRIMARY_LABEL: &str = "toxic";

/// Per-text mapping from label to probability.
///
/// Entries keep the order of [`LABELS`], and serialize as a JSON object in
/// that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelScores {
    entries: Vec<(&'static str, f32)>,
}

impl LabelScores {
    /// Map one row of model outputs onto the label set.
    ///
    /// A single output is reported as `toxic`; wider rows are truncated to
    /// the label set.
    pub fn from_row(row: &[f32]) -> Self {
        let entries = if row.len() == 1 {
            vec![(PRIMARY_LABEL, row[0])]
        } else {
            LABELS.iter().copied().zip(row.iter().copied()).collect()
        };
        Self { entries }
    }

    /// Probability for a label, if the model produced it
    pub fn get(&self, label: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, score)| *score)
    }

    /// Probability of the primary `toxic` label, `0.0` when absent
    pub fn toxic(&self) -> f32 {
        self.get(PRIMARY_LABEL).unwrap_or(0.0)
    }

    /// Highest probability across all labels
    pub fn max(&self) -> f32 {
        self.entries
            .iter()
            .map(|(_, score)| *score)
            .fold(0.0, f32::max)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LabelScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, score) in &self.entries {
            map.serialize_entry(label, score)?;
        }
        map.end()
    }
}

/// Coerce an arbitrary JSON value to text; anything but a string becomes
/// empty so a batch keeps its length and order
pub fn coerce_text(value: &serde_json::Value) -> String {
    value.as_str().map(str::to_string).unwrap_or_default()
}

/// Summary statistic over a batch of scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Mean `toxic` probability, `0.0` for an empty batch
    pub mean_toxicity: f64,
}

impl Aggregate {
    /// Aggregate for a batch with no scores
    pub fn empty() -> Self {
        Self { mean_toxicity: 0.0 }
    }

    /// Compute the mean `toxic` probability over a batch
    pub fn from_scores(scores: &[LabelScores]) -> Self {
        if scores.is_empty() {
            return Self::empty();
        }
        let total: f64 = scores.iter().map(|s| f64::from(s.toxic())).sum();
        Self {
            mean_toxicity: total / scores.len() as f64,
        }
    }
}

/// A top-level YouTube comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Display text of the comment
    pub text: String,

    /// Author display name
    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub like_count: u64,

    /// RFC 3339 publish timestamp as reported by the API
    #[serde(default)]
    pub published_at: String,
}

impl Comment {
    /// Create a comment carrying only text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: String::new(),
            like_count: 0,
            published_at: String::new(),
        }
    }
}

/// Metadata about a YouTube video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
}
