pub mod comment;
pub mod predict;
pub mod web;
pub mod youtube;

use crate::cli::{Commands, ModelArgs};
use anyhow::Result;
use guardian_classifiers::ToxicityScorer;
use guardian_server::Settings;

/// Dispatch a parsed subcommand
pub async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Web(args) => web::run(args).await,
        Commands::Youtube(args) => youtube::run(args).await,
        Commands::Comment(args) => comment::run(args),
        Commands::Predict(args) => predict::run(args),
    }
}

/// Settings from file and environment, with command-line path overrides
pub fn load_settings(model: &ModelArgs) -> Result<Settings> {
    let mut settings = Settings::load()?;
    if let Some(path) = &model.model_path {
        settings = settings.with_model_path(path);
    }
    if let Some(path) = &model.vectorizer_path {
        settings = settings.with_vectorizer_path(path);
    }
    Ok(settings)
}

pub fn load_scorer(settings: &Settings) -> Result<ToxicityScorer> {
    tracing::info!("Loading model from: {}", settings.model_path.display());
    tracing::info!("Loading vectorizer from: {}", settings.vectorizer_path.display());
    Ok(ToxicityScorer::load(&settings.scorer_config())?)
}
