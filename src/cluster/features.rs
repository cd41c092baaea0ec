use linfa::DatasetBase;
use linfa::traits::{Fit, Predict};
use linfa_reduction::Pca;
use ndarray::{Array2, Axis, concatenate};
use serde::Deserialize;

use crate::vectors::parse_bracketed_array;

/// Weight applied to embedding columns when auxiliary features are present.
const EMBEDDING_WEIGHT: f64 = 0.8;
/// Weight applied to the standardized auxiliary feature columns.
const FEATURE_WEIGHT: f64 = 0.2;

/// One event in the clustering request.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub embedding: EmbeddingInput,
    #[serde(default)]
    pub features: Option<Vec<f64>>,
}

/// Embedding payloads arrive either as a numeric list or as a stringified
/// bracketed array; both parse to the same vector.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Values(Vec<f64>),
    Text(String),
}

impl EmbeddingInput {
    fn to_values(&self) -> Result<Vec<f64>, String> {
        match self {
            EmbeddingInput::Values(values) => Ok(values.clone()),
            EmbeddingInput::Text(text) => parse_bracketed_array(text),
        }
    }
}

#[derive(Debug)]
pub(super) struct ParsedBatch {
    pub ids: Vec<String>,
    pub vectors: Array2<f64>,
    pub features: Option<Array2<f64>>,
}

/// Parse records into an id list, an embedding matrix, and an optional
/// auxiliary feature matrix. All embeddings must share one dimension, and
/// auxiliary features are all-or-nothing across the batch.
pub(super) fn parse_records(records: &[EventRecord]) -> Result<ParsedBatch, String> {
    let mut ids = Vec::with_capacity(records.len());
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let values = record.embedding.to_values()?;
        ids.push(record.id.clone());
        rows.push(values);
    }
    let vectors = rows_to_matrix(rows, "embedding")?;

    let with_features = records.iter().filter(|r| r.features.is_some()).count();
    let features = if with_features == 0 {
        None
    } else if with_features < records.len() {
        return Err("Auxiliary features must be present on every record or none".to_string());
    } else {
        let rows: Vec<Vec<f64>> = records
            .iter()
            .map(|record| record.features.clone().unwrap_or_default())
            .collect();
        Some(rows_to_matrix(rows, "feature")?)
    };

    Ok(ParsedBatch {
        ids,
        vectors,
        features,
    })
}

fn rows_to_matrix(rows: Vec<Vec<f64>>, kind: &str) -> Result<Array2<f64>, String> {
    let row_count = rows.len();
    let width = rows.first().map(Vec::len).unwrap_or(0);
    let mut flat = Vec::with_capacity(row_count * width);
    for (idx, row) in rows.into_iter().enumerate() {
        if row.len() != width {
            return Err(format!(
                "Inconsistent {kind} dimension at row {idx}: expected {width}, got {}",
                row.len()
            ));
        }
        flat.extend(row);
    }
    Array2::from_shape_vec((row_count, width), flat)
        .map_err(|err| format!("Building {kind} matrix failed: {err}"))
}

/// Z-score standardize each column (population standard deviation).
/// Zero-variance columns are centered only.
pub(super) fn standardize_columns(features: &Array2<f64>) -> Array2<f64> {
    let mut out = features.clone();
    for mut column in out.columns_mut() {
        let mean = column.mean().unwrap_or(0.0);
        let std = column.std(0.0);
        if std > 0.0 {
            column.mapv_inplace(|v| (v - mean) / std);
        } else {
            column.mapv_inplace(|v| v - mean);
        }
    }
    out
}

/// Combine embeddings with scaled auxiliary features. The embedding carries
/// the 0.8 weight and the features 0.2; without features the embedding
/// matrix passes through untouched.
pub(super) fn assemble_matrix(
    vectors: &Array2<f64>,
    features: Option<&Array2<f64>>,
) -> Result<Array2<f64>, String> {
    let Some(aux) = features else {
        return Ok(vectors.clone());
    };
    if aux.nrows() != vectors.nrows() {
        return Err(format!(
            "Feature row count {} does not match embedding row count {}",
            aux.nrows(),
            vectors.nrows()
        ));
    }
    let scaled = standardize_columns(aux);
    let weighted_vectors = vectors * EMBEDDING_WEIGHT;
    let weighted_features = scaled * FEATURE_WEIGHT;
    concatenate(
        Axis(1),
        &[weighted_vectors.view(), weighted_features.view()],
    )
    .map_err(|err| format!("Feature concatenation failed: {err}"))
}

/// Reduce the combined matrix with PCA when enabled and both the sample and
/// feature counts exceed the component count. The projection is an exact
/// SVD, so repeated runs produce identical output.
pub(super) fn maybe_reduce(
    matrix: Array2<f64>,
    use_pca: bool,
    n_components: usize,
) -> Result<Array2<f64>, String> {
    let (rows, cols) = matrix.dim();
    if !use_pca || rows <= n_components || cols <= n_components {
        return Ok(matrix);
    }
    let dataset = DatasetBase::from(matrix.clone());
    let pca = Pca::params(n_components)
        .fit(&dataset)
        .map_err(|err| format!("PCA fit failed: {err}"))?;
    let reduced: Array2<f64> = pca.predict(&matrix);
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardize_centers_and_scales_columns() {
        let features = array![[1.0, 10.0], [3.0, 10.0]];
        let scaled = standardize_columns(&features);
        // Column 0: mean 2, population std 1.
        assert!((scaled[[0, 0]] + 1.0).abs() < 1e-9);
        assert!((scaled[[1, 0]] - 1.0).abs() < 1e-9);
        // Zero-variance column is centered to zero.
        assert!(scaled[[0, 1]].abs() < 1e-9);
        assert!(scaled[[1, 1]].abs() < 1e-9);
    }

    #[test]
    fn assemble_applies_fixed_weights() {
        let vectors = array![[1.0, 2.0]];
        let features = array![[4.0]];
        let combined = assemble_matrix(&vectors, Some(&features)).unwrap();
        assert_eq!(combined.dim(), (1, 3));
        assert!((combined[[0, 0]] - 0.8).abs() < 1e-9);
        assert!((combined[[0, 1]] - 1.6).abs() < 1e-9);
        // Single-row feature column standardizes to zero before weighting.
        assert!(combined[[0, 2]].abs() < 1e-9);
    }

    #[test]
    fn assemble_without_features_passes_embeddings_through() {
        let vectors = array![[1.0, 2.0], [3.0, 4.0]];
        let combined = assemble_matrix(&vectors, None).unwrap();
        assert_eq!(combined, vectors);
    }

    #[test]
    fn parse_rejects_mismatched_embedding_dims() {
        let records = vec![
            EventRecord {
                id: "a".to_string(),
                embedding: EmbeddingInput::Values(vec![1.0, 2.0]),
                features: None,
            },
            EventRecord {
                id: "b".to_string(),
                embedding: EmbeddingInput::Values(vec![1.0]),
                features: None,
            },
        ];
        let err = parse_records(&records).unwrap_err();
        assert!(err.contains("Inconsistent embedding dimension"));
    }

    #[test]
    fn parse_rejects_partial_features() {
        let records = vec![
            EventRecord {
                id: "a".to_string(),
                embedding: EmbeddingInput::Values(vec![1.0]),
                features: Some(vec![0.5]),
            },
            EventRecord {
                id: "b".to_string(),
                embedding: EmbeddingInput::Values(vec![2.0]),
                features: None,
            },
        ];
        let err = parse_records(&records).unwrap_err();
        assert!(err.contains("every record or none"));
    }

    #[test]
    fn parse_accepts_stringified_embeddings() {
        let records = vec![EventRecord {
            id: "a".to_string(),
            embedding: EmbeddingInput::Text("[0.5, 1.5]".to_string()),
            features: None,
        }];
        let batch = parse_records(&records).unwrap();
        assert_eq!(batch.vectors, array![[0.5, 1.5]]);
    }

    #[test]
    fn reduce_is_skipped_for_small_batches() {
        let matrix = array![[1.0, 2.0], [3.0, 4.0]];
        let reduced = maybe_reduce(matrix.clone(), true, 50).unwrap();
        assert_eq!(reduced, matrix);
    }

    #[test]
    fn reduce_projects_to_requested_components() {
        let rows = 8;
        let cols = 5;
        let flat: Vec<f64> = (0..rows * cols).map(|v| (v % 7) as f64).collect();
        let matrix = Array2::from_shape_vec((rows, cols), flat).unwrap();
        let reduced = maybe_reduce(matrix, true, 2).unwrap();
        assert_eq!(reduced.dim(), (rows, 2));
    }
}
