//! Guardian Classifiers
//!
//! Multi-label toxicity scoring built from two pieces loaded once at startup:
//! - A [`Vectorizer`] turning raw text into token id and attention mask tensors,
//!   either from a fitted word index or a HuggingFace tokenizer
//! - A [`ToxicityModel`] producing per-label probabilities, backed by Candle
//!
//! [`ToxicityScorer`] composes the two; [`CommentPrediction`] adds the
//! threshold view used by the command-line reports.

pub mod config;
pub mod model_loader;
pub mod prediction;
pub mod toxicity;
pub mod vectorizer;

pub use config::{DeviceType, ScorerConfig, DEFAULT_MAX_SEQUENCE_LENGTH};
pub use model_loader::{CandleToxicityModel, ToxicityModel};
pub use prediction::{CommentPrediction, LabelPrediction, Threshold};
pub use toxicity::ToxicityScorer;
pub use vectorizer::{ModelInput, Vectorizer, VectorizerKind, WordIndexVectorizer};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{DeviceType, ScorerConfig};
    pub use crate::model_loader::{CandleToxicityModel, ToxicityModel};
    pub use crate::prediction::{CommentPrediction, Threshold};
    pub use crate::toxicity::ToxicityScorer;
    pub use crate::vectorizer::{ModelInput, Vectorizer, VectorizerKind};
}
