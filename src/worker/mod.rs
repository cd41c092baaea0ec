//! Queue-driven embedding worker.
//!
//! The worker drains `embedding_tasks`, embeds the referenced events, and
//! appends outcomes to `embedding_results`. When the queue is empty it
//! scans the database for events missing an embedding. Per-event failures
//! are logged and reported as unsuccessful outcomes; they never stop the
//! loop.

mod queue;

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

pub use queue::{QueueError, RedisTaskQueue, TASK_QUEUE, RESULT_QUEUE, TaskQueue};

use crate::embedding;
use crate::store::{EventStore, STORED_EMBEDDING_DIM, StoreError};
use crate::vectors::pad_to_dim;

/// Default batch size for a one-shot backfill run.
pub const DEFAULT_RUN_ONCE_LIMIT: usize = 100;

/// Errors that abort the worker loop. Per-event failures are handled
/// inside the loop and never surface here.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Database access failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Queue transport failed.
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// The embedding model reported a failure.
    #[error("Embedding failed: {0}")]
    Embedding(String),
}

/// A queued embedding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Embed one event.
    SingleEvent { task_id: String, event_id: String },
    /// Embed a batch of events.
    Batch {
        task_id: String,
        #[serde(default)]
        event_ids: Vec<String>,
    },
}

impl Task {
    pub fn task_id(&self) -> &str {
        match self {
            Task::SingleEvent { task_id, .. } => task_id,
            Task::Batch { task_id, .. } => task_id,
        }
    }
}

/// Outcome of one event inside a batch task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOutcome {
    pub event_id: String,
    pub success: bool,
}

/// Result payload pushed to the result queue, mirroring the task shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskResult {
    Single {
        task_id: String,
        event_id: String,
        success: bool,
        timestamp: f64,
    },
    Batch {
        task_id: String,
        results: Vec<EventOutcome>,
        timestamp: f64,
    },
}

/// Tuning knobs for the continuous loop.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Events fetched per database scan when the queue is empty.
    pub scan_limit: usize,
    /// Sleep after an iteration that found no work.
    pub idle_sleep: Duration,
    /// Sleep after an iteration that failed outright.
    pub error_backoff: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            scan_limit: 50,
            idle_sleep: Duration::from_secs(10),
            error_backoff: Duration::from_secs(5),
        }
    }
}

/// What one loop iteration accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A task or database scan produced work.
    Worked,
    /// Nothing pending; caller should sleep.
    Idle,
}

/// Embedding worker bound to an event store.
pub struct VectorWorker {
    store: EventStore,
}

impl VectorWorker {
    pub fn new(store: EventStore) -> Self {
        Self { store }
    }

    /// Embed one event and store the result. Failures are logged, not
    /// propagated.
    pub fn process_event(&mut self, event_id: &str) -> bool {
        match self.try_process_event(event_id) {
            Ok(()) => true,
            Err(err) => {
                error!("Error processing event {event_id}: {err}");
                false
            }
        }
    }

    fn try_process_event(&mut self, event_id: &str) -> Result<(), WorkerError> {
        let text = self.store.load_event_text(event_id)?;
        let embedding = embed_for_storage(&text)?;
        self.store.store_embedding(event_id, &embedding)?;
        info!("Generated embedding for event {event_id}");
        Ok(())
    }

    /// Embed a batch of events, reporting a per-event outcome.
    pub fn process_batch(&mut self, event_ids: &[String]) -> Vec<EventOutcome> {
        event_ids
            .iter()
            .map(|event_id| EventOutcome {
                event_id: event_id.clone(),
                success: self.process_event(event_id),
            })
            .collect()
    }

    /// One-shot backfill: embed up to `limit` events missing an embedding.
    /// Returns (successes, attempted).
    pub fn run_once(&mut self, limit: Option<usize>) -> Result<(usize, usize), WorkerError> {
        let limit = limit.unwrap_or(DEFAULT_RUN_ONCE_LIMIT);
        let pending = self.store.find_missing_embeddings(limit)?;
        if pending.is_empty() {
            info!("No events without embeddings found");
            return Ok((0, 0));
        }
        info!("Found {} events without embeddings", pending.len());
        let attempted = pending.len();
        let successes = pending
            .iter()
            .filter(|event_id| self.process_event(event_id))
            .count();
        info!("Completed: {successes}/{attempted} successful");
        Ok((successes, attempted))
    }

    /// One iteration of the continuous loop: drain one queued task, else
    /// scan the database for missing embeddings, else report idle.
    pub fn run_iteration(
        &mut self,
        queue: &mut dyn TaskQueue,
        scan_limit: usize,
    ) -> Result<Progress, WorkerError> {
        if let Some(task) = queue.pop_task()? {
            info!("Processing task {}", task.task_id());
            let result = self.execute_task(&task);
            queue.push_result(&result)?;
            return Ok(Progress::Worked);
        }
        let pending = self.store.find_missing_embeddings(scan_limit)?;
        if pending.is_empty() {
            return Ok(Progress::Idle);
        }
        info!("Backfilling {} events without embeddings", pending.len());
        for event_id in &pending {
            self.process_event(event_id);
        }
        Ok(Progress::Worked)
    }

    /// Continuous polling loop. Iteration errors back off and retry; the
    /// loop itself never returns.
    pub fn run_continuous(&mut self, queue: &mut dyn TaskQueue, options: &WorkerOptions) -> ! {
        info!("Vector worker started");
        loop {
            match self.run_iteration(queue, options.scan_limit) {
                Ok(Progress::Worked) => {}
                Ok(Progress::Idle) => thread::sleep(options.idle_sleep),
                Err(err) => {
                    warn!("Worker iteration failed: {err}");
                    thread::sleep(options.error_backoff);
                }
            }
        }
    }

    fn execute_task(&mut self, task: &Task) -> TaskResult {
        match task {
            Task::SingleEvent { task_id, event_id } => TaskResult::Single {
                task_id: task_id.clone(),
                event_id: event_id.clone(),
                success: self.process_event(event_id),
                timestamp: unix_timestamp(),
            },
            Task::Batch { task_id, event_ids } => TaskResult::Batch {
                task_id: task_id.clone(),
                results: self.process_batch(event_ids),
                timestamp: unix_timestamp(),
            },
        }
    }
}

/// Embed event text and pad the vector to the storage dimension. Empty
/// text is stored as a zero vector without invoking the model.
fn embed_for_storage(text: &str) -> Result<Vec<f32>, WorkerError> {
    if text.is_empty() {
        return Ok(vec![0.0; STORED_EMBEDDING_DIM]);
    }
    let result = embedding::embed_text(text, None);
    if let Some(err) = result.error {
        return Err(WorkerError::Embedding(err));
    }
    Ok(pad_to_dim(result.embedding, STORED_EMBEDDING_DIM))
}

fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|time| time.as_secs_f64())
        .unwrap_or(0.0)
}
