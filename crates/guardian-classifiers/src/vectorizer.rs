//! Text vectorization: raw text to fixed-shape token id tensors
//!
//! Two implementations sit behind the [`Vectorizer`] enum and are selected
//! once at load time from configuration:
//! - [`WordIndexVectorizer`]: a fitted word → id vocabulary, with padding and
//!   truncation at the end of each sequence
//! - [`TokenizerVectorizer`]: a HuggingFace `tokenizer.json`, used as-is

use candle_core::{Device, Tensor};
use guardian_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer};

/// Id the word index pads with; never assigned to a vocabulary word
pub const PAD_ID: u32 = 0;

const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Vectorizer implementation stored in a vectorizer file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorizerKind {
    /// Fitted word index JSON, padded to a fixed length
    #[default]
    WordIndex,
    /// HuggingFace `tokenizer.json`
    Tokenizer,
}

impl FromStr for VectorizerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "word_index" | "sequence" => Ok(Self::WordIndex),
            "tokenizer" | "huggingface" => Ok(Self::Tokenizer),
            _ => Err(format!(
                "unknown vectorizer kind '{}' (expected word_index or tokenizer)",
                s
            )),
        }
    }
}

impl fmt::Display for VectorizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WordIndex => write!(f, "word_index"),
            Self::Tokenizer => write!(f, "tokenizer"),
        }
    }
}

/// Text to model-input adapter
pub enum Vectorizer {
    WordIndex(WordIndexVectorizer),
    Tokenizer(TokenizerVectorizer),
}

impl Vectorizer {
    /// Load the vectorizer of the given kind from a file
    pub fn load(kind: VectorizerKind, path: impl AsRef<Path>, max_sequence_length: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::config(format!(
                "Vectorizer file not found: {}",
                path.display()
            )));
        }

        tracing::info!("Loading {} vectorizer from: {}", kind, path.display());

        match kind {
            VectorizerKind::WordIndex => {
                WordIndexVectorizer::from_file(path, max_sequence_length).map(Self::WordIndex)
            }
            VectorizerKind::Tokenizer => TokenizerVectorizer::from_file(path).map(Self::Tokenizer),
        }
    }

    /// Turn a batch of texts into `(batch, seq_len)` id and mask tensors.
    ///
    /// Texts are stripped first. Row order matches input order.
    pub fn preprocess<S: AsRef<str>>(&self, texts: &[S], device: &Device) -> Result<ModelInput> {
        let cleaned: Vec<&str> = texts.iter().map(|t| t.as_ref().trim()).collect();

        let rows = match self {
            Self::WordIndex(v) => v.encode_batch(&cleaned),
            Self::Tokenizer(v) => v.encode_batch(&cleaned)?,
        };

        ModelInput::from_rows(rows, device)
    }

    pub fn kind(&self) -> VectorizerKind {
        match self {
            Self::WordIndex(_) => VectorizerKind::WordIndex,
            Self::Tokenizer(_) => VectorizerKind::Tokenizer,
        }
    }
}

/// One encoded text: token ids and the matching attention mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRow {
    pub ids: Vec<u32>,
    pub mask: Vec<u32>,
}

/// Batched model input.
///
/// `attention_mask` is `1` for real tokens and `0` for padding, so pooling
/// never depends on which id a vectorizer pads with.
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
}

impl ModelInput {
    /// Stack equal-length rows into `(batch, seq_len)` tensors
    pub fn from_rows(rows: Vec<EncodedRow>, device: &Device) -> Result<Self> {
        let batch = rows.len();
        let seq_len = rows.first().map(|row| row.ids.len()).unwrap_or(0);

        if rows
            .iter()
            .any(|row| row.ids.len() != seq_len || row.mask.len() != seq_len)
        {
            return Err(Error::classifier(
                "Vectorizer produced sequences of different lengths",
            ));
        }

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for row in rows {
            ids.extend(row.ids);
            mask.extend(row.mask);
        }

        let input_ids = Tensor::from_vec(ids, (batch, seq_len), device)
            .map_err(|e| Error::classifier(format!("Failed to create input tensor: {}", e)))?;
        let attention_mask = Tensor::from_vec(mask, (batch, seq_len), device)
            .map_err(|e| Error::classifier(format!("Failed to create mask tensor: {}", e)))?;

        Ok(Self {
            input_ids,
            attention_mask,
        })
    }
}

/// On-disk shape of a fitted word index
#[derive(Debug, Clone, Deserialize)]
struct WordIndexFile {
    word_index: HashMap<String, u32>,

    #[serde(default)]
    num_words: Option<u32>,

    #[serde(default)]
    oov_token: Option<String>,

    #[serde(default = "default_lower")]
    lower: bool,

    #[serde(default = "default_filters")]
    filters: String,

    #[serde(default = "default_split")]
    split: String,
}

fn default_lower() -> bool {
    true
}

fn default_filters() -> String {
    DEFAULT_FILTERS.to_string()
}

fn default_split() -> String {
    " ".to_string()
}

/// Sequence vectorizer over a fitted vocabulary
#[derive(Debug, Clone)]
pub struct WordIndexVectorizer {
    word_index: HashMap<String, u32>,
    num_words: Option<u32>,
    oov_id: Option<u32>,
    lower: bool,
    filters: Vec<char>,
    split: String,
    max_sequence_length: usize,
}

impl WordIndexVectorizer {
    /// Build a vectorizer with default text filtering (lower-case, punctuation
    /// stripped, split on spaces)
    pub fn new(word_index: HashMap<String, u32>, max_sequence_length: usize) -> Result<Self> {
        Self::from_parts(
            WordIndexFile {
                word_index,
                num_words: None,
                oov_token: None,
                lower: true,
                filters: default_filters(),
                split: default_split(),
            },
            max_sequence_length,
        )
    }

    /// Load a word index JSON file
    pub fn from_file(path: impl AsRef<Path>, max_sequence_length: usize) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read vectorizer {}: {}", path.display(), e))
        })?;

        let file: WordIndexFile = serde_json::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse word index {}: {}",
                path.display(),
                e
            ))
        })?;

        let vectorizer = Self::from_parts(file, max_sequence_length)?;
        tracing::info!(
            "Loaded word index with {} entries (max_sequence_length={})",
            vectorizer.word_index.len(),
            max_sequence_length
        );
        Ok(vectorizer)
    }

    fn from_parts(file: WordIndexFile, max_sequence_length: usize) -> Result<Self> {
        if max_sequence_length == 0 {
            return Err(Error::config("max_sequence_length must be greater than 0"));
        }
        if file.split.is_empty() {
            return Err(Error::config("word index split string must not be empty"));
        }

        let oov_id = match &file.oov_token {
            Some(token) => Some(*file.word_index.get(token).ok_or_else(|| {
                Error::config(format!("OOV token '{}' missing from word index", token))
            })?),
            None => None,
        };

        Ok(Self {
            word_index: file.word_index,
            num_words: file.num_words,
            oov_id,
            lower: file.lower,
            filters: file.filters.chars().collect(),
            split: file.split,
            max_sequence_length,
        })
    }

    /// Map text to word ids without padding
    pub fn text_to_sequence(&self, text: &str) -> Vec<u32> {
        let text = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let filtered: String = text
            .chars()
            .map(|c| {
                if self.filters.contains(&c) {
                    self.split.clone()
                } else {
                    c.to_string()
                }
            })
            .collect();

        filtered
            .split(self.split.as_str())
            .filter(|word| !word.is_empty())
            .filter_map(|word| self.lookup(word))
            .collect()
    }

    fn lookup(&self, word: &str) -> Option<u32> {
        match self.word_index.get(word) {
            Some(&id) if self.num_words.map_or(true, |limit| id < limit) => Some(id),
            _ => self.oov_id,
        }
    }

    /// Pad with [`PAD_ID`] or truncate at the end to `max_sequence_length`
    pub fn pad(&self, mut sequence: Vec<u32>) -> Vec<u32> {
        sequence.resize(self.max_sequence_length, PAD_ID);
        sequence
    }

    fn encode_batch(&self, texts: &[&str]) -> Vec<EncodedRow> {
        texts
            .iter()
            .map(|text| {
                let ids = self.pad(self.text_to_sequence(text));
                let mask = ids.iter().map(|&id| u32::from(id != PAD_ID)).collect();
                EncodedRow { ids, mask }
            })
            .collect()
    }

    pub fn max_sequence_length(&self) -> usize {
        self.max_sequence_length
    }

    pub fn vocab_size(&self) -> usize {
        self.word_index.len()
    }
}

/// HuggingFace tokenizer used as a ready-made vectorizer
pub struct TokenizerVectorizer {
    tokenizer: Tokenizer,
}

impl TokenizerVectorizer {
    /// Wrap a tokenizer, enabling batch-longest padding when none is set
    pub fn from_tokenizer(mut tokenizer: Tokenizer) -> Self {
        if tokenizer.get_padding().is_none() {
            tracing::debug!("Tokenizer has no padding configured; padding to batch longest");
            tokenizer.with_padding(Some(PaddingParams {
                strategy: PaddingStrategy::BatchLongest,
                pad_id: PAD_ID,
                ..Default::default()
            }));
        }
        Self { tokenizer }
    }

    /// Load a `tokenizer.json`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            Error::config(format!("Failed to load tokenizer {}: {}", path.display(), e))
        })?;
        Ok(Self::from_tokenizer(tokenizer))
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<EncodedRow>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| Error::classifier(format!("Tokenization failed: {}", e)))?;

        Ok(encodings
            .iter()
            .map(|encoding| EncodedRow {
                ids: encoding.get_ids().to_vec(),
                mask: encoding.get_attention_mask().to_vec(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> HashMap<String, u32> {
        [("you", 1), ("are", 2), ("an", 3), ("idiot", 4), ("nice", 5)]
            .into_iter()
            .map(|(w, i)| (w.to_string(), i))
            .collect()
    }

    #[test]
    fn test_text_to_sequence_filters_and_lowercases() {
        let vectorizer = WordIndexVectorizer::new(vocab(), 8).unwrap();
        assert_eq!(vectorizer.text_to_sequence("You are an IDIOT!"), vec![1, 2, 3, 4]);
        assert_eq!(vectorizer.text_to_sequence("you,,are"), vec![1, 2]);
    }

    #[test]
    fn test_unknown_words_are_dropped_without_oov() {
        let vectorizer = WordIndexVectorizer::new(vocab(), 8).unwrap();
        assert_eq!(vectorizer.text_to_sequence("you are great"), vec![1, 2]);
    }

    #[test]
    fn test_padding_at_end() {
        let vectorizer = WordIndexVectorizer::new(vocab(), 6).unwrap();
        assert_eq!(vectorizer.pad(vec![1, 2]), vec![1, 2, 0, 0, 0, 0]);
    }

    #[test]
    fn test_truncation_drops_trailing_tokens() {
        let vectorizer = WordIndexVectorizer::new(vocab(), 3).unwrap();
        assert_eq!(vectorizer.pad(vec![1, 2, 3, 4, 5]), vec![1, 2, 3]);
    }

    #[test]
    fn test_oov_and_num_words() {
        let mut index = vocab();
        index.insert("<OOV>".to_string(), 6);
        let file = WordIndexFile {
            word_index: index,
            num_words: Some(5),
            oov_token: Some("<OOV>".to_string()),
            lower: true,
            filters: default_filters(),
            split: default_split(),
        };
        let vectorizer = WordIndexVectorizer::from_parts(file, 4).unwrap();

        // "nice" has id 5, outside num_words; "great" is unknown
        assert_eq!(vectorizer.text_to_sequence("you nice great"), vec![1, 6, 6]);
    }

    #[test]
    fn test_missing_oov_token_is_config_error() {
        let file = WordIndexFile {
            word_index: vocab(),
            num_words: None,
            oov_token: Some("<OOV>".to_string()),
            lower: true,
            filters: default_filters(),
            split: default_split(),
        };
        let err = WordIndexVectorizer::from_parts(file, 4).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_sequence_length_rejected() {
        assert!(WordIndexVectorizer::new(vocab(), 0).is_err());
    }

    #[test]
    fn test_preprocess_shape_and_order() {
        let vectorizer = Vectorizer::WordIndex(WordIndexVectorizer::new(vocab(), 5).unwrap());
        let input = vectorizer
            .preprocess(&["  you are nice  ", "", "idiot"], &Device::Cpu)
            .unwrap();

        assert_eq!(input.input_ids.dims(), &[3, 5]);
        let rows = input.input_ids.to_vec2::<u32>().unwrap();
        assert_eq!(rows[0], vec![1, 2, 5, 0, 0]);
        assert_eq!(rows[1], vec![0, 0, 0, 0, 0]);
        assert_eq!(rows[2], vec![4, 0, 0, 0, 0]);

        let mask = input.attention_mask.to_vec2::<u32>().unwrap();
        assert_eq!(mask[0], vec![1, 1, 1, 0, 0]);
        assert_eq!(mask[1], vec![0, 0, 0, 0, 0]);
        assert_eq!(mask[2], vec![1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let rows = vec![
            EncodedRow { ids: vec![1, 2], mask: vec![1, 1] },
            EncodedRow { ids: vec![1], mask: vec![1] },
        ];
        let err = ModelInput::from_rows(rows, &Device::Cpu).unwrap_err();
        assert!(matches!(err, Error::Classifier(_)));
    }

    #[test]
    fn test_vectorizer_kind_parsing() {
        assert_eq!("word_index".parse::<VectorizerKind>().unwrap(), VectorizerKind::WordIndex);
        assert_eq!("word-index".parse::<VectorizerKind>().unwrap(), VectorizerKind::WordIndex);
        assert_eq!("tokenizer".parse::<VectorizerKind>().unwrap(), VectorizerKind::Tokenizer);
        assert!("pickle".parse::<VectorizerKind>().is_err());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = Vectorizer::load(VectorizerKind::WordIndex, "/nonexistent/vocab.json", 10)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
