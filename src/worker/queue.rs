//! Redis-backed task and result queues.
//!
//! Tasks are consumed with LPOP and results appended with RPUSH, so a
//! popped task is never requeued: delivery is at most once.

use redis::Commands;
use thiserror::Error;

use super::{Task, TaskResult};

/// List holding pending embedding tasks.
pub const TASK_QUEUE: &str = "embedding_tasks";
/// List receiving completed task results.
pub const RESULT_QUEUE: &str = "embedding_results";

/// Errors surfaced by the queue transport.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Redis connection or command failure.
    #[error("Queue operation failed: {0}")]
    Redis(#[from] redis::RedisError),
    /// A queued payload was not valid task JSON.
    #[error("Queue payload parse failed: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Seam over the queue transport so the worker loop can run against an
/// in-memory queue in tests.
pub trait TaskQueue {
    /// Pop the next pending task, if any.
    fn pop_task(&mut self) -> Result<Option<Task>, QueueError>;
    /// Append a completed result to the result queue.
    fn push_result(&mut self, result: &TaskResult) -> Result<(), QueueError>;
}

/// Redis list transport for the worker queues.
pub struct RedisTaskQueue {
    connection: redis::Connection,
    task_queue: String,
    result_queue: String,
}

impl RedisTaskQueue {
    /// Connect to the Redis server and bind the default queue names.
    pub fn connect(redis_url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_connection()?;
        Ok(Self {
            connection,
            task_queue: TASK_QUEUE.to_string(),
            result_queue: RESULT_QUEUE.to_string(),
        })
    }
}

impl TaskQueue for RedisTaskQueue {
    fn pop_task(&mut self) -> Result<Option<Task>, QueueError> {
        let payload: Option<String> = self.connection.lpop(&self.task_queue, None)?;
        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn push_result(&mut self, result: &TaskResult) -> Result<(), QueueError> {
        let payload = serde_json::to_string(result)?;
        self.connection
            .rpush::<_, _, ()>(&self.result_queue, payload)?;
        Ok(())
    }
}
