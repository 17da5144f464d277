//! Model loading and inference for the multi-label toxicity network

use crate::vectorizer::ModelInput;
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Embedding, Linear};
use guardian_core::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// A loaded multi-output classifier
pub trait ToxicityModel: Send + Sync {
    /// Run one forward pass over a batch of token ids and attention masks.
    ///
    /// Returns one row of probabilities per example, each `num_outputs()` wide.
    fn predict(&self, input: &ModelInput) -> Result<Vec<Vec<f32>>>;

    /// Number of probabilities produced per example
    fn num_outputs(&self) -> usize;

    /// Device input tensors should be created on
    fn device(&self) -> &Device;
}

fn candle_err(context: &'static str) -> impl Fn(candle_core::Error) -> Error {
    move |e| Error::classifier(format!("{}: {}", context, e))
}

/// Embedding-bag network stored as safetensors.
///
/// Expected tensors:
/// - `embedding.weight` `(vocab, dim)`
/// - `dense_0.weight`/`dense_0.bias`, `dense_1.*`, ... (optional, ReLU)
/// - `output.weight` `(num_outputs, hidden)` and `output.bias`
///
/// Token embeddings are mean-pooled over positions the attention mask marks
/// as real tokens; outputs go
/// through a sigmoid so every label is an independent probability.
pub struct CandleToxicityModel {
    embedding: Embedding,
    vocab_size: usize,
    hidden: Vec<Linear>,
    output: Linear,
    num_outputs: usize,
    device: Device,
}

impl CandleToxicityModel {
    /// Load weights from a `.safetensors` file
    pub fn load(path: impl AsRef<Path>, device: &Device) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::classifier(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        tracing::info!("Loading model from: {}", path.display());

        let tensors = candle_core::safetensors::load(path, device).map_err(|e| {
            Error::classifier(format!(
                "Failed to load SafeTensors {}: {}",
                path.display(),
                e
            ))
        })?;

        let model = Self::from_tensors(tensors, device)?;
        tracing::info!(
            "Model loaded: vocab={}, hidden_layers={}, outputs={}",
            model.vocab_size,
            model.hidden.len(),
            model.num_outputs
        );
        Ok(model)
    }

    /// Assemble the network from named tensors
    pub fn from_tensors(mut tensors: HashMap<String, Tensor>, device: &Device) -> Result<Self> {
        let embedding_weight = take(&mut tensors, "embedding.weight")?;
        let (vocab_size, embedding_dim) = embedding_weight
            .dims2()
            .map_err(candle_err("embedding.weight must be 2-dimensional"))?;
        if vocab_size == 0 {
            return Err(Error::classifier("embedding.weight has an empty vocabulary"));
        }
        let embedding = Embedding::new(embedding_weight, embedding_dim);

        let mut hidden = Vec::new();
        let mut width = embedding_dim;
        loop {
            let prefix = format!("dense_{}", hidden.len());
            let weight_name = format!("{}.weight", prefix);
            if !tensors.contains_key(&weight_name) {
                break;
            }
            let weight = take(&mut tensors, &weight_name)?;
            let bias = take(&mut tensors, &format!("{}.bias", prefix))?;
            let (layer, out_dim) = linear_layer(&prefix, weight, bias, width)?;
            hidden.push(layer);
            width = out_dim;
        }

        let output_weight = take(&mut tensors, "output.weight")?;
        let output_bias = take(&mut tensors, "output.bias")?;
        let (output, num_outputs) = linear_layer("output", output_weight, output_bias, width)?;
        if num_outputs == 0 {
            return Err(Error::classifier("output layer has no units"));
        }

        Ok(Self {
            embedding,
            vocab_size,
            hidden,
            output,
            num_outputs,
            device: device.clone(),
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}

/// Remove a named tensor and convert it to `f32`
fn take(tensors: &mut HashMap<String, Tensor>, name: &str) -> Result<Tensor> {
    tensors
        .remove(name)
        .ok_or_else(|| Error::classifier(format!("Missing tensor '{}' in model", name)))?
        .to_dtype(DType::F32)
        .map_err(|e| Error::classifier(format!("Failed to convert {}: {}", name, e)))
}

/// Validate a dense layer's shapes and build it, returning its output width
fn linear_layer(name: &str, weight: Tensor, bias: Tensor, in_dim: usize) -> Result<(Linear, usize)> {
    let (out_dim, weight_in) = weight
        .dims2()
        .map_err(candle_err("Dense weight must be 2-dimensional"))?;

    if weight_in != in_dim {
        return Err(Error::classifier(format!(
            "{}.weight expects input width {}, previous layer produces {}",
            name, weight_in, in_dim
        )));
    }
    if bias.dims() != [out_dim] {
        return Err(Error::classifier(format!(
            "{}.bias has shape {:?}, expected [{}]",
            name,
            bias.dims(),
            out_dim
        )));
    }

    Ok((Linear::new(weight, Some(bias)), out_dim))
}

impl ToxicityModel for CandleToxicityModel {
    fn predict(&self, input: &ModelInput) -> Result<Vec<Vec<f32>>> {
        let (batch, seq_len) = input
            .input_ids
            .dims2()
            .map_err(candle_err("Input must be a (batch, seq_len) tensor"))?;
        if input.attention_mask.dims() != [batch, seq_len] {
            return Err(Error::classifier(format!(
                "Attention mask has shape {:?}, expected [{}, {}]",
                input.attention_mask.dims(),
                batch,
                seq_len
            )));
        }
        if batch == 0 {
            return Ok(Vec::new());
        }

        let rows = input
            .input_ids
            .to_dtype(DType::U32)
            .and_then(|t| t.to_vec2::<u32>())
            .map_err(candle_err("Failed to read input ids"))?;
        let mask_rows = input
            .attention_mask
            .to_dtype(DType::U32)
            .and_then(|t| t.to_vec2::<u32>())
            .map_err(candle_err("Failed to read attention mask"))?;

        // Ids outside the embedding table are masked out. A zero-length batch
        // still gets one masked column so pooling has a shape to reduce.
        let width = seq_len.max(1);
        let mut ids = Vec::with_capacity(batch * width);
        let mut mask = Vec::with_capacity(batch * width);
        for (row, row_mask) in rows.iter().zip(mask_rows.iter()) {
            for position in 0..width {
                let token = row
                    .get(position)
                    .copied()
                    .filter(|&id| (id as usize) < self.vocab_size);
                let attend = token.is_some() && row_mask.get(position).copied().unwrap_or(0) != 0;
                ids.push(token.unwrap_or(0));
                mask.push(if attend { 1f32 } else { 0f32 });
            }
        }

        let ids = Tensor::from_vec(ids, (batch, width), &self.device)
            .map_err(candle_err("Failed to create id tensor"))?;
        let mask = Tensor::from_vec(mask, (batch, width, 1), &self.device)
            .map_err(candle_err("Failed to create mask tensor"))?;

        let embedded = self
            .embedding
            .forward(&ids)
            .map_err(candle_err("Embedding lookup failed"))?;

        let summed = embedded
            .broadcast_mul(&mask)
            .and_then(|t| t.sum(1))
            .map_err(candle_err("Pooling failed"))?;
        let counts = mask
            .sum(1)
            .and_then(|t| t.maximum(1f32))
            .map_err(candle_err("Pooling failed"))?;
        let mut hidden = summed
            .broadcast_div(&counts)
            .map_err(candle_err("Pooling failed"))?;

        for layer in &self.hidden {
            hidden = layer
                .forward(&hidden)
                .and_then(|t| t.relu())
                .map_err(candle_err("Dense layer failed"))?;
        }

        let logits = self
            .output
            .forward(&hidden)
            .map_err(candle_err("Output layer failed"))?;

        candle_nn::ops::sigmoid(&logits)
            .and_then(|t| t.to_vec2::<f32>())
            .map_err(candle_err("Failed to read probabilities"))
    }

    fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
