//! Cluster a batch of event embeddings and print the groups as JSON.

use std::fs;
use std::path::PathBuf;

use osint_ingestion::cluster::{
    ClusterParams, EventRecord, Metric, PcaOptions, cluster_events,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("Clustering error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    let records = load_records(&options)?;
    let summary = cluster_events(&records, &options.params, options.pca)?;
    let json = serde_json::to_string(&summary)
        .map_err(|err| format!("Serialize cluster output failed: {err}"))?;
    println!("{json}");
    Ok(())
}

#[derive(Debug, Clone)]
struct Options {
    data: Option<String>,
    data_file: Option<PathBuf>,
    params: ClusterParams,
    pca: PcaOptions,
}

fn load_records(options: &Options) -> Result<Vec<EventRecord>, String> {
    let raw = match (&options.data, &options.data_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|err| format!("Read {} failed: {err}", path.display()))?,
        (None, None) => return Err("--data is required".to_string()),
    };
    serde_json::from_str(&raw).map_err(|err| format!("Parse event batch failed: {err}"))
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    let mut options = Options {
        data: None,
        data_file: None,
        params: ClusterParams::default(),
        pca: PcaOptions::default(),
    };

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--data" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--data requires a value".to_string())?;
                // Inline JSON starts with '['; anything else is a file path.
                if value.trim_start().starts_with('[') {
                    options.data = Some(value.to_string());
                } else {
                    options.data_file = Some(PathBuf::from(value));
                }
            }
            "--min-cluster-size" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--min-cluster-size requires a value".to_string())?;
                options.params.min_cluster_size = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --min-cluster-size value: {value}"))?;
            }
            "--min-samples" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--min-samples requires a value".to_string())?;
                options.params.min_samples = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --min-samples value: {value}"))?;
            }
            "--metric" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--metric requires a value".to_string())?;
                options.params.metric = Metric::parse(value)?;
            }
            "--cluster-selection-epsilon" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| {
                    "--cluster-selection-epsilon requires a value".to_string()
                })?;
                options.params.cluster_selection_epsilon = value
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid --cluster-selection-epsilon value: {value}"))?;
            }
            "--use-pca" => {
                options.pca.enabled = true;
            }
            "--pca-components" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--pca-components requires a value".to_string())?;
                options.pca.components = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --pca-components value: {value}"))?;
            }
            unknown => {
                return Err(format!("Unknown argument: {unknown}\n\n{}", help_text()));
            }
        }
        idx += 1;
    }

    if options.data.is_none() && options.data_file.is_none() {
        return Err(format!("--data is required\n\n{}", help_text()));
    }
    if options.pca.components == 0 {
        return Err("--pca-components must be at least 1".to_string());
    }

    Ok(Some(options))
}

fn help_text() -> String {
    [
        "osint-cluster",
        "",
        "Group a batch of event embeddings with HDBSCAN.",
        "",
        "Usage:",
        "  osint-cluster --data <json|path> [options]",
        "",
        "Options:",
        "  --data <json|path>              Event batch as inline JSON array or a file path (required).",
        "  --min-cluster-size <n>          Minimum cluster size (default: 2).",
        "  --min-samples <n>               Min samples for core distance (default: 1).",
        "  --metric <name>                 Distance metric: euclidean or manhattan (default: euclidean).",
        "  --cluster-selection-epsilon <f> Cluster selection epsilon (default: 0.3).",
        "  --use-pca                       Reduce dimensionality with PCA before clustering.",
        "  --pca-components <n>            PCA components when --use-pca is set (default: 50).",
    ]
    .join("\n")
}
