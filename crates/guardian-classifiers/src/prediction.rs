//! Thresholded per-label predictions for command-line reports

use guardian_core::{Error, LabelScores, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Probability cutoff above which a label is deemed positive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(f32);

impl Threshold {
    pub const DEFAULT: Threshold = Threshold(0.5);

    /// Create a threshold, rejecting values outside `[0, 1]`
    pub fn new(value: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::validation(format!(
                "threshold must be between 0 and 1, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Strictly-greater comparison
    pub fn exceeded_by(self, probability: f32) -> bool {
        probability > self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Probability of one label with its thresholded decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelPrediction {
    pub probability: f32,
    pub is_toxic: bool,
}

/// Thresholded prediction for one comment
#[derive(Debug, Clone, Serialize)]
pub struct CommentPrediction {
    pub comment: String,

    #[serde(serialize_with = "serialize_predictions")]
    pub predictions: Vec<(&'static str, LabelPrediction)>,

    pub any_toxic: bool,
}

impl CommentPrediction {
    /// Apply a threshold to one text's label scores
    pub fn from_scores(comment: impl Into<String>, scores: &LabelScores, threshold: Threshold) -> Self {
        let predictions: Vec<_> = scores
            .iter()
            .map(|(label, probability)| {
                (
                    label,
                    LabelPrediction {
                        probability,
                        is_toxic: threshold.exceeded_by(probability),
                    },
                )
            })
            .collect();

        let any_toxic = predictions.iter().any(|(_, p)| p.is_toxic);

        Self {
            comment: comment.into(),
            predictions,
            any_toxic,
        }
    }

    /// Highest probability across labels
    pub fn max_probability(&self) -> f32 {
        self.predictions
            .iter()
            .map(|(_, p)| p.probability)
            .fold(0.0, f32::max)
    }

    /// Labels above the threshold, in label order
    pub fn toxic_labels(&self) -> Vec<&'static str> {
        self.predictions
            .iter()
            .filter(|(_, p)| p.is_toxic)
            .map(|(label, _)| *label)
            .collect()
    }
}

/// Serialize label predictions as a JSON object in label order
pub fn serialize_predictions<S: Serializer>(
    predictions: &[(&'static str, LabelPrediction)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(predictions.len()))?;
    for (label, prediction) in predictions {
        map.serialize_entry(label, prediction)?;
    }
    map.end()
}
