//! ONNX Runtime inference for sentence-transformers models: tokenize, run
//! the encoder, then mean-pool the last hidden state.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{Array2, ArrayView2};
use ort::{session::Session, session::builder::GraphOptimizationLevel, value::Value};
use tokenizers::Tokenizer;

/// Maximum sequence length for sentence-transformers models.
const MAX_LENGTH: usize = 512;

pub(super) struct SentenceEncoder {
    tokenizer: Tokenizer,
    session: Mutex<Session>,
}

impl SentenceEncoder {
    /// Load `model.onnx` and `tokenizer.json` from the model directory.
    pub(super) fn load(model_dir: &Path) -> Result<Self, String> {
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|err| format!("Load tokenizer {} failed: {err}", tokenizer_path.display()))?;
        let model_path = model_dir.join("model.onnx");
        let session = Session::builder()
            .map_err(|err| format!("ONNX Runtime init failed: {err}"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|err| format!("ONNX optimization setup failed: {err}"))?
            .commit_from_file(&model_path)
            .map_err(|err| format!("Load ONNX model {} failed: {err}", model_path.display()))?;
        Ok(Self {
            tokenizer,
            session: Mutex::new(session),
        })
    }

    pub(super) fn encode(&self, text: &str) -> Result<Vec<f32>, String> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|err| format!("Tokenization failed: {err}"))?;
        let token_ids: Vec<i64> = encoding
            .get_ids()
            .iter()
            .take(MAX_LENGTH)
            .map(|&id| i64::from(id))
            .collect();
        let attention: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .take(MAX_LENGTH)
            .map(|&m| i64::from(m))
            .collect();
        let seq_len = token_ids.len();

        let input_ids = Array2::from_shape_vec((1, seq_len), token_ids)
            .map_err(|err| format!("Build input tensor failed: {err}"))?;
        let attention_mask = Array2::from_shape_vec((1, seq_len), attention.clone())
            .map_err(|err| format!("Build mask tensor failed: {err}"))?;
        let input_ids_value = Value::from_array(input_ids)
            .map_err(|err| format!("Build input tensor failed: {err}"))?;
        let attention_mask_value = Value::from_array(attention_mask)
            .map_err(|err| format!("Build mask tensor failed: {err}"))?;

        let mut session = self
            .session
            .lock()
            .map_err(|err| format!("Lock inference session failed: {err}"))?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_value,
                "attention_mask" => attention_mask_value
            ])
            .map_err(|err| format!("ONNX inference failed: {err}"))?;

        // Last hidden state is (batch, sequence, hidden).
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|err| format!("Extract output tensor failed: {err}"))?;
        let dims = shape.as_ref();
        if dims.len() != 3 {
            return Err(format!("Unexpected output rank: {}", dims.len()));
        }
        let out_seq = dims[1] as usize;
        let hidden = dims[2] as usize;
        let hidden_states = ArrayView2::from_shape((out_seq, hidden), data)
            .map_err(|err| format!("Reshape output failed: {err}"))?;
        Ok(mean_pool(&hidden_states, &attention))
    }
}

/// Standard sentence-transformers mean pooling: sum token vectors weighted
/// by the attention mask and divide by the mask total.
fn mean_pool(hidden_states: &ArrayView2<f32>, attention: &[i64]) -> Vec<f32> {
    let seq_len = hidden_states.shape()[0];
    let hidden = hidden_states.shape()[1];
    let mut pooled = vec![0.0_f32; hidden];
    let mut mask_sum = 0.0_f32;
    for t in 0..seq_len.min(attention.len()) {
        let mask_value = attention[t] as f32;
        mask_sum += mask_value;
        for h in 0..hidden {
            pooled[h] += hidden_states[[t, h]] * mask_value;
        }
    }
    if mask_sum > 0.0 {
        for value in &mut pooled {
            *value /= mask_sum;
        }
    }
    pooled
}
