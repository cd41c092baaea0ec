//! Batch clustering pipeline for event deduplication.
//!
//! Turns a batch of event embeddings (plus optional auxiliary numeric
//! features) into named clusters: feature assembly, optional PCA, HDBSCAN,
//! and result grouping.

mod engine;
mod features;
mod mapping;

pub use engine::{ClusterParams, Metric};
pub use features::{EmbeddingInput, EventRecord};
pub use mapping::{ClusterGroup, ClusterSummary};

/// Default number of PCA components when reduction is enabled.
pub const DEFAULT_PCA_COMPONENTS: usize = 50;

/// Dimensionality-reduction settings for the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PcaOptions {
    pub enabled: bool,
    pub components: usize,
}

impl Default for PcaOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            components: DEFAULT_PCA_COMPONENTS,
        }
    }
}

/// Run the full pipeline over a batch of event records.
pub fn cluster_events(
    records: &[EventRecord],
    params: &ClusterParams,
    pca: PcaOptions,
) -> Result<ClusterSummary, String> {
    let batch = features::parse_records(records)?;
    let combined = features::assemble_matrix(&batch.vectors, batch.features.as_ref())?;
    let reduced = features::maybe_reduce(combined, pca.enabled, pca.components)?;
    let rows: Vec<Vec<f64>> = reduced.rows().into_iter().map(|row| row.to_vec()).collect();
    let labels = engine::run_clustering(&rows, params)?;
    mapping::group_clusters(&batch.ids, &labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, embedding: Vec<f64>) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            embedding: EmbeddingInput::Values(embedding),
            features: None,
        }
    }

    #[test]
    fn small_batches_are_all_noise() {
        let records = vec![record("a", vec![0.0, 0.0])];
        let params = ClusterParams {
            min_cluster_size: 2,
            ..ClusterParams::default()
        };
        let summary = cluster_events(&records, &params, PcaOptions::default()).unwrap();
        assert!(summary.clusters.is_empty());
        assert_eq!(summary.clustered_count, 0);
        assert_eq!(summary.noise_count, 1);
    }

    #[test]
    fn stringified_embeddings_cluster_like_plain_lists() {
        let plain: Vec<EventRecord> = (0..6)
            .map(|idx| {
                let base = if idx < 3 { 0.0 } else { 10.0 };
                record(
                    &format!("e{idx}"),
                    vec![base + 0.1 * idx as f64, base],
                )
            })
            .collect();
        let stringified: Vec<EventRecord> = plain
            .iter()
            .map(|rec| {
                let values = match &rec.embedding {
                    EmbeddingInput::Values(values) => values.clone(),
                    EmbeddingInput::Text(_) => unreachable!(),
                };
                let literal = format!(
                    "[{}]",
                    values
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                );
                EventRecord {
                    id: rec.id.clone(),
                    embedding: EmbeddingInput::Text(literal),
                    features: None,
                }
            })
            .collect();

        let params = ClusterParams::default();
        let from_plain = cluster_events(&plain, &params, PcaOptions::default()).unwrap();
        let from_text = cluster_events(&stringified, &params, PcaOptions::default()).unwrap();
        assert_eq!(
            serde_json::to_string(&from_plain).unwrap(),
            serde_json::to_string(&from_text).unwrap()
        );
    }
}
