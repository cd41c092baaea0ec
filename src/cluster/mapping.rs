use std::collections::BTreeMap;

use serde::Serialize;

/// One cluster and its member events.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterGroup {
    pub cluster_id: i32,
    pub event_ids: Vec<String>,
    pub size: usize,
}

/// Clustering result as printed to stdout.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub clusters: Vec<ClusterGroup>,
    pub clustered_count: usize,
    pub noise_count: usize,
}

/// Group labels into clusters ordered by cluster id. Noise (-1) is counted
/// but never emitted as a cluster.
pub(super) fn group_clusters(
    event_ids: &[String],
    labels: &[i32],
) -> Result<ClusterSummary, String> {
    if event_ids.len() != labels.len() {
        return Err("Cluster label length mismatch".to_string());
    }
    let mut members: BTreeMap<i32, Vec<String>> = BTreeMap::new();
    let mut clustered_count = 0usize;
    let mut noise_count = 0usize;
    for (event_id, label) in event_ids.iter().zip(labels.iter()) {
        if *label < 0 {
            noise_count += 1;
        } else {
            clustered_count += 1;
            members.entry(*label).or_default().push(event_id.clone());
        }
    }
    let clusters = members
        .into_iter()
        .map(|(cluster_id, event_ids)| {
            let size = event_ids.len();
            ClusterGroup {
                cluster_id,
                event_ids,
                size,
            }
        })
        .collect();
    Ok(ClusterSummary {
        clusters,
        clustered_count,
        noise_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn groups_members_by_label_in_id_order() {
        let event_ids = ids(&["a", "b", "c", "d"]);
        let labels = vec![1, 0, 1, -1];
        let summary = group_clusters(&event_ids, &labels).unwrap();
        assert_eq!(summary.clusters.len(), 2);
        assert_eq!(summary.clusters[0].cluster_id, 0);
        assert_eq!(summary.clusters[0].event_ids, ids(&["b"]));
        assert_eq!(summary.clusters[1].cluster_id, 1);
        assert_eq!(summary.clusters[1].event_ids, ids(&["a", "c"]));
        assert_eq!(summary.clusters[1].size, 2);
        assert_eq!(summary.clustered_count, 3);
        assert_eq!(summary.noise_count, 1);
    }

    #[test]
    fn noise_never_appears_as_a_cluster_id() {
        let event_ids = ids(&["a", "b"]);
        let labels = vec![-1, -1];
        let summary = group_clusters(&event_ids, &labels).unwrap();
        assert!(summary.clusters.is_empty());
        assert!(summary.clusters.iter().all(|c| c.cluster_id >= 0));
        assert_eq!(summary.noise_count, 2);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = group_clusters(&ids(&["a"]), &[0, 1]).unwrap_err();
        assert!(err.contains("length mismatch"));
    }
}
