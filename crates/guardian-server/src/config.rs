//! Server settings

use config::{Config, Environment, File};
use guardian_classifiers::{DeviceType, ScorerConfig, VectorizerKind, DEFAULT_MAX_SEQUENCE_LENGTH};
use guardian_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative settings file
pub const CONFIG_PATH_VAR: &str = "GUARDIAN_CONFIG";

/// Settings file read when present
pub const DEFAULT_CONFIG_FILE: &str = "guardian.yaml";

/// Runtime settings.
///
/// Resolved from built-in defaults, then an optional YAML file, then
/// environment variables (`MODEL_PATH`, `MAX_COMMENTS`, ...), later sources
/// winning. A `.env` file feeds the environment but never replaces variables
/// that are already set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Model weights (`.safetensors`)
    pub model_path: PathBuf,

    /// Vectorizer file matching `vectorizer_kind`
    pub vectorizer_path: PathBuf,

    #[serde(default)]
    pub vectorizer_kind: VectorizerKind,

    pub max_sequence_length: usize,

    /// Empty disables the YouTube endpoint
    #[serde(default)]
    pub youtube_api_key: String,

    /// Only origin allowed by CORS on `/api/*`
    pub frontend_origin: String,

    /// Default comment limit for YouTube scoring requests
    pub max_comments: usize,

    #[serde(default)]
    pub device: DeviceType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/toxicity.safetensors"),
            vectorizer_path: PathBuf::from("models/tokenizer.json"),
            vectorizer_kind: VectorizerKind::WordIndex,
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            youtube_api_key: String::new(),
            frontend_origin: "http://localhost:5173".to_string(),
            max_comments: 300,
            device: DeviceType::Cpu,
        }
    }
}

impl Settings {
    /// Load settings from `GUARDIAN_CONFIG` (or `guardian.yaml`) and the
    /// process environment, after applying the nearest `.env`
    pub fn load() -> Result<Self> {
        load_dotenv()?;
        let file = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&file, Environment::default())
    }

    /// Load settings from an optional file and an explicit environment source
    pub fn load_from(file: &Path, env: Environment) -> Result<Self> {
        let defaults = Config::try_from(&Self::default()).map_err(config_error)?;

        let settings: Self = Config::builder()
            .add_source(defaults)
            .add_source(File::from(file).required(false))
            .add_source(env)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)?;

        settings.validate()?;
        tracing::debug!(
            model_path = %settings.model_path.display(),
            vectorizer_kind = %settings.vectorizer_kind,
            "Loaded settings"
        );
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.max_sequence_length == 0 {
            return Err(Error::config("MAX_SEQUENCE_LENGTH must be greater than zero"));
        }
        if self.frontend_origin.trim().is_empty() {
            return Err(Error::config("FRONTEND_ORIGIN must not be empty"));
        }
        Ok(())
    }

    /// Override the model path
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Override the vectorizer path
    pub fn with_vectorizer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.vectorizer_path = path.into();
        self
    }

    /// Whether a YouTube API key is configured
    pub fn has_youtube_key(&self) -> bool {
        !self.youtube_api_key.trim().is_empty()
    }

    /// Scorer configuration derived from these settings
    pub fn scorer_config(&self) -> ScorerConfig {
        ScorerConfig::from_paths(&self.model_path, &self.vectorizer_path)
            .with_vectorizer_kind(self.vectorizer_kind)
            .with_max_sequence_length(self.max_sequence_length)
            .with_device(self.device)
    }
}

/// Load `.env` from the working directory or its nearest parent into the
/// process environment. Returns the file used, or `None` when there is none.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    dotenv_outcome(dotenvy::dotenv())
}

/// Load a specific dotenv file into the process environment
pub fn load_dotenv_from(path: &Path) -> Result<Option<PathBuf>> {
    dotenv_outcome(dotenvy::from_path(path).map(|()| path.to_path_buf()))
}

fn dotenv_outcome(result: dotenvy::Result<PathBuf>) -> Result<Option<PathBuf>> {
    match result {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(Some(path))
        }
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(Error::config(format!("Failed to load .env: {}", e))),
    }
}

fn config_error(err: config::ConfigError) -> Error {
    Error::config(format!("Invalid settings: {}", err))
}
