//! Embedding worker: drains the Redis task queue and backfills events
//! missing an embedding.

use osint_ingestion::store::EventStore;
use osint_ingestion::worker::{RedisTaskQueue, VectorWorker, WorkerOptions};
use osint_ingestion::{config, logging};

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if matches!(args.first().map(String::as_str), Some("-h" | "--help")) {
        println!("{}", help_text());
        return Ok(());
    }

    let settings = config::worker_config().map_err(|err| err.to_string())?;
    let store = EventStore::open(&settings.database_url).map_err(|err| err.to_string())?;
    let mut worker = VectorWorker::new(store);

    match args.first().map(String::as_str) {
        Some("once") => {
            let limit = match args.get(1) {
                Some(value) => Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid batch limit: {value}"))?,
                ),
                None => None,
            };
            worker.run_once(limit).map_err(|err| err.to_string())?;
            Ok(())
        }
        Some(unknown) => Err(format!("Unknown mode: {unknown}\n\n{}", help_text())),
        None => {
            let mut queue =
                RedisTaskQueue::connect(&settings.redis_url).map_err(|err| err.to_string())?;
            worker.run_continuous(&mut queue, &WorkerOptions::default())
        }
    }
}

fn help_text() -> String {
    [
        "osint-vector-worker",
        "",
        "Generate embeddings for stored events.",
        "",
        "Usage:",
        "  osint-vector-worker                Poll the Redis queue and backfill continuously.",
        "  osint-vector-worker once [limit]   Embed up to [limit] pending events and exit (default: 100).",
        "",
        "Environment:",
        "  DATABASE_URL   Event database location (required).",
        "  REDIS_URL      Redis server (default: redis://localhost:6379).",
    ]
    .join("\n")
}
