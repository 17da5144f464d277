//! Configuration for loading the scoring service

use crate::vectorizer::VectorizerKind;
use candle_core::Device;
use guardian_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default padded sequence length for word-index vectorizers
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 200;

/// Paths and options needed to build a [`crate::ToxicityScorer`]
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Path to the `.safetensors` model weights
    pub model_path: PathBuf,

    /// Path to the vectorizer file (word index JSON or `tokenizer.json`)
    pub vectorizer_path: PathBuf,

    /// Which vectorizer implementation the file holds
    pub vectorizer_kind: VectorizerKind,

    /// Fixed sequence length for padding/truncation
    pub max_sequence_length: usize,

    /// Device to run inference on
    pub device: DeviceType,
}

impl ScorerConfig {
    /// Create a configuration from model and vectorizer paths
    pub fn from_paths(model_path: impl Into<PathBuf>, vectorizer_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            vectorizer_path: vectorizer_path.into(),
            vectorizer_kind: VectorizerKind::default(),
            max_sequence_length: DEFAULT_MAX_SEQUENCE_LENGTH,
            device: DeviceType::Cpu,
        }
    }

    /// Set vectorizer kind
    pub fn with_vectorizer_kind(mut self, kind: VectorizerKind) -> Self {
        self.vectorizer_kind = kind;
        self
    }

    /// Set maximum sequence length
    pub fn with_max_sequence_length(mut self, max_sequence_length: usize) -> Self {
        self.max_sequence_length = max_sequence_length;
        self
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceType) -> Self {
        self.device = device;
        self
    }
}

/// Device type for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceType {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// CUDA GPU inference
    Cuda(usize),
    /// Metal (Apple Silicon)
    Metal(usize),
}

impl DeviceType {
    /// Create the Candle device
    pub fn create(self) -> Result<Device> {
        match self {
            Self::Cpu => Ok(Device::Cpu),
            Self::Cuda(idx) => Device::new_cuda(idx).map_err(|e| {
                guardian_core::Error::classifier(format!("Failed to create CUDA device: {}", e))
            }),
            Self::Metal(idx) => Device::new_metal(idx).map_err(|e| {
                guardian_core::Error::classifier(format!("Failed to create Metal device: {}", e))
            }),
        }
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (kind, index) = match lower.split_once(':') {
            Some((kind, index)) => {
                let index = index
                    .parse::<usize>()
                    .map_err(|_| format!("invalid device index in '{}'", s))?;
                (kind.to_string(), index)
            }
            None => (lower, 0),
        };

        match kind.as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda(index)),
            "metal" | "mps" => Ok(Self::Metal(index)),
            _ => Err(format!("unknown device '{}' (expected cpu, cuda or metal)", s)),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceType> for String {
    fn from(device: DeviceType) -> Self {
        device.to_string()
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(idx) => write!(f, "cuda:{}", idx),
            Self::Metal(idx) => write!(f, "metal:{}", idx),
        }
    }
}
