//! Embedding vector encoding, padding, and parsing helpers.

/// Encode a vector as the little-endian `f32` blob stored in SQLite.
pub fn encode_f32_le_blob(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len().saturating_mul(4));
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Decode a little-endian `f32` blob into a `Vec<f32>`.
pub fn decode_f32_le_blob(blob: &[u8]) -> Result<Vec<f32>, String> {
    if blob.len() % 4 != 0 {
        return Err("Embedding blob length is not a multiple of 4 bytes".to_string());
    }
    let mut out = Vec::with_capacity(blob.len() / 4);
    for chunk in blob.chunks_exact(4) {
        out.push(f32::from_le_bytes(
            chunk.try_into().expect("chunk size verified"),
        ));
    }
    Ok(out)
}

/// Zero-pad a vector up to `dim`. Vectors already at or above `dim` are
/// returned unchanged.
pub fn pad_to_dim(mut values: Vec<f32>, dim: usize) -> Vec<f32> {
    if values.len() < dim {
        values.resize(dim, 0.0);
    }
    values
}

/// Parse an embedding serialized as a bracketed array literal, e.g.
/// `"[0.1,0.2,0.3]"`. Brackets are optional so bare comma-separated lists
/// parse the same way.
pub fn parse_bracketed_array(text: &str) -> Result<Vec<f64>, String> {
    let trimmed = text.trim();
    let inner = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|_| format!("Invalid number in embedding array: {part}"))
        })
        .collect()
}
