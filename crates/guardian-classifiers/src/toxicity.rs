//! Toxicity scoring service: vectorizer + model in one forward pass

use crate::config::ScorerConfig;
use crate::model_loader::{CandleToxicityModel, ToxicityModel};
use crate::prediction::{CommentPrediction, Threshold};
use crate::vectorizer::{Vectorizer, VectorizerKind};
use guardian_core::{Aggregate, Error, LabelScores, Result};
use std::sync::Arc;
use std::time::Instant;

/// Multi-label toxicity scorer.
///
/// Holds read-only state only, so one instance can be shared across
/// threads behind an `Arc` for the life of the process.
pub struct ToxicityScorer {
    vectorizer: Vectorizer,
    model: Arc<dyn ToxicityModel>,
}

impl ToxicityScorer {
    /// Compose an already-loaded vectorizer and model
    pub fn new(vectorizer: Vectorizer, model: Arc<dyn ToxicityModel>) -> Self {
        Self { vectorizer, model }
    }

    /// Load model and vectorizer from disk
    pub fn load(config: &ScorerConfig) -> Result<Self> {
        let device = config.device.create()?;
        let model = CandleToxicityModel::load(&config.model_path, &device)?;
        let vectorizer = Vectorizer::load(
            config.vectorizer_kind,
            &config.vectorizer_path,
            config.max_sequence_length,
        )?;

        Ok(Self::new(vectorizer, Arc::new(model)))
    }

    /// Score a batch of texts.
    ///
    /// Returns one mapping per input, in input order. The whole batch goes
    /// through the model in a single forward pass.
    pub fn score<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<LabelScores>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let input = self.vectorizer.preprocess(texts, self.model.device())?;
        let rows = self.model.predict(&input)?;

        if rows.len() != texts.len() {
            return Err(Error::classifier(format!(
                "Model returned {} rows for a batch of {}",
                rows.len(),
                texts.len()
            )));
        }

        let scores: Vec<LabelScores> = rows.iter().map(|row| LabelScores::from_row(row)).collect();

        tracing::debug!(
            batch = texts.len(),
            latency_us = start.elapsed().as_micros() as u64,
            "Scored batch"
        );
        Ok(scores)
    }

    /// Score a batch and apply a threshold to every label
    pub fn predict<S: AsRef<str>>(&self, texts: &[S], threshold: Threshold) -> Result<Vec<CommentPrediction>> {
        let scores = self.score(texts)?;
        Ok(texts
            .iter()
            .zip(scores.iter())
            .map(|(text, scores)| CommentPrediction::from_scores(text.as_ref(), scores, threshold))
            .collect())
    }

    /// Mean `toxic` probability of a scored batch
    pub fn aggregate(scores: &[LabelScores]) -> Aggregate {
        Aggregate::from_scores(scores)
    }

    pub fn num_outputs(&self) -> usize {
        self.model.num_outputs()
    }

    pub fn vectorizer_kind(&self) -> VectorizerKind {
        self.vectorizer.kind()
    }
}
