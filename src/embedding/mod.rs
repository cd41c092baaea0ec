//! Text embedding via a multilingual sentence-transformer.
//!
//! The `onnx-embeddings` feature runs a real ONNX model resolved from
//! `OSINT_EMBED_MODEL_DIR`. Without it the module returns a constant mock
//! vector so callers can be exercised without the model weights installed.
//! No batching, caching, or retry.

#[cfg(feature = "onnx-embeddings")]
mod model;

use serde::Serialize;

/// Output dimension of the sentence-embedding model.
pub const EMBEDDING_DIM: usize = 384;
/// Model identifier reported alongside real embeddings.
pub const MODEL_NAME: &str = "paraphrase-multilingual-MiniLM-L12-v2";
/// Model identifier reported by the mock fallback.
pub const MOCK_MODEL_NAME: &str = "mock-multilingual-minilm";

/// Embedding response as printed by the embedder CLI.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedResult {
    pub embedding: Vec<f32>,
    pub model: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Embed text with the ONNX model. Invocation failure is recoverable: the
/// result carries the error message and a zero vector of the model
/// dimension.
#[cfg(feature = "onnx-embeddings")]
pub fn embed_text(text: &str, language: Option<&str>) -> EmbedResult {
    let language = language.unwrap_or("auto").to_string();
    match encode_with_model(text) {
        Ok(embedding) => EmbedResult {
            embedding,
            model: MODEL_NAME.to_string(),
            language,
            error: None,
        },
        Err(err) => EmbedResult {
            embedding: vec![0.0; EMBEDDING_DIM],
            model: MODEL_NAME.to_string(),
            language,
            error: Some(err),
        },
    }
}

#[cfg(feature = "onnx-embeddings")]
fn encode_with_model(text: &str) -> Result<Vec<f32>, String> {
    let model_dir = crate::config::embed_model_dir().ok_or_else(|| {
        format!(
            "{} environment variable is required for model inference",
            crate::config::EMBED_MODEL_DIR_ENV
        )
    })?;
    let encoder = model::SentenceEncoder::load(&model_dir)?;
    let embedding = encoder.encode(text)?;
    if embedding.len() != EMBEDDING_DIM {
        return Err(format!(
            "Model produced {} values, expected {EMBEDDING_DIM}",
            embedding.len()
        ));
    }
    Ok(embedding)
}

/// Mock embedding used when the model stack is not compiled in: a constant
/// vector of the agreed length, tagged with the mock model name.
#[cfg(not(feature = "onnx-embeddings"))]
pub fn embed_text(text: &str, language: Option<&str>) -> EmbedResult {
    let _ = text;
    EmbedResult {
        embedding: vec![0.1; EMBEDDING_DIM],
        model: MOCK_MODEL_NAME.to_string(),
        language: language.unwrap_or("unknown").to_string(),
        error: None,
    }
}

#[cfg(all(test, not(feature = "onnx-embeddings")))]
mod tests {
    use super::*;

    #[test]
    fn mock_embedding_has_fixed_dimension() {
        let result = embed_text("a long piece of reporting text", None);
        assert_eq!(result.embedding.len(), EMBEDDING_DIM);
        assert!(result.embedding.iter().all(|v| (*v - 0.1).abs() < 1e-6));
        assert_eq!(result.model, MOCK_MODEL_NAME);
        assert_eq!(result.language, "unknown");
        assert!(result.error.is_none());
    }

    #[test]
    fn empty_text_still_yields_fixed_dimension() {
        let result = embed_text("", Some("ru"));
        assert_eq!(result.embedding.len(), EMBEDDING_DIM);
        assert_eq!(result.language, "ru");
    }

    #[test]
    fn error_field_is_omitted_from_json_when_absent() {
        let result = embed_text("text", None);
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("\"error\""));
    }
}
