use hdbscan::{DistanceMetric, Hdbscan, HdbscanHyperParams};

/// Distance metrics supported by the clustering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Euclidean,
    Manhattan,
}

impl Metric {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(Metric::Euclidean),
            "manhattan" => Ok(Metric::Manhattan),
            other => Err(format!(
                "Unsupported distance metric: {other}. Use euclidean or manhattan."
            )),
        }
    }

    fn to_crate(self) -> DistanceMetric {
        match self {
            Metric::Euclidean => DistanceMetric::Euclidean,
            Metric::Manhattan => DistanceMetric::Manhattan,
        }
    }
}

/// HDBSCAN hyper-parameters. Cluster selection is excess-of-mass.
#[derive(Debug, Clone, Copy)]
pub struct ClusterParams {
    pub min_cluster_size: usize,
    pub min_samples: usize,
    pub metric: Metric,
    pub cluster_selection_epsilon: f64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_cluster_size: 2,
            min_samples: 1,
            metric: Metric::Euclidean,
            cluster_selection_epsilon: 0.3,
        }
    }
}

/// Cluster the rows, returning one label per row with -1 marking noise.
///
/// Batches below the minimum cluster size cannot form a cluster, so every
/// row is labeled noise without invoking HDBSCAN (which also panics on tiny
/// inputs).
pub(super) fn run_clustering(
    data: &[Vec<f64>],
    params: &ClusterParams,
) -> Result<Vec<i32>, String> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let min_required = params.min_cluster_size.max(params.min_samples).max(2);
    if data.len() < min_required {
        return Ok(vec![-1; data.len()]);
    }
    let clusterer = Hdbscan::new(data, build_hyperparams(params));
    clusterer
        .cluster()
        .map_err(|err| format!("HDBSCAN clustering failed: {err}"))
}

fn build_hyperparams(params: &ClusterParams) -> HdbscanHyperParams {
    HdbscanHyperParams::builder()
        .min_cluster_size(params.min_cluster_size)
        .min_samples(params.min_samples)
        .dist_metric(params.metric.to_crate())
        .epsilon(params.cluster_selection_epsilon)
        .build()
}
