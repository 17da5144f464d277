//! Shared application state

use crate::config::Settings;
use guardian_classifiers::ToxicityScorer;
use guardian_core::Result;
use guardian_youtube::{CommentSource, YouTubeClient};
use std::sync::Arc;

/// Service context built once at startup and shared read-only by every
/// handler
#[derive(Clone)]
pub struct AppState {
    /// Loaded vectorizer and model
    pub scorer: Arc<ToxicityScorer>,

    /// Comment source; `None` when no API key is configured
    pub comments: Option<Arc<dyn CommentSource>>,

    pub settings: Arc<Settings>,
}

impl AppState {
    /// Load the scorer and build the YouTube client from settings
    pub fn load(settings: Settings) -> Result<Self> {
        let scorer = ToxicityScorer::load(&settings.scorer_config())?;
        tracing::info!(
            model = %settings.model_path.display(),
            vectorizer = %settings.vectorizer_path.display(),
            kind = %settings.vectorizer_kind,
            outputs = scorer.num_outputs(),
            "Loaded toxicity model"
        );

        let comments: Option<Arc<dyn CommentSource>> = if settings.has_youtube_key() {
            Some(Arc::new(YouTubeClient::new(settings.youtube_api_key.clone())?))
        } else {
            tracing::warn!("YOUTUBE_API_KEY not set, YouTube scoring disabled");
            None
        };

        Ok(Self::from_parts(scorer, comments, settings))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        scorer: ToxicityScorer,
        comments: Option<Arc<dyn CommentSource>>,
        settings: Settings,
    ) -> Self {
        Self {
            scorer: Arc::new(scorer),
            comments,
            settings: Arc::new(settings),
        }
    }
}
