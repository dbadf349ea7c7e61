// /////////////////////////////////////////////////////////////////////////////
// Dubbing Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-Process Task Broker
//!
//! A single-process, in-memory [`TaskBroker`] adapter: an `enqueue` pushes
//! onto a per-queue FIFO and wakes any waiter; `dequeue` (used by the
//! worker loop, not part of the port trait) blocks until one is
//! available. Suitable for tests, the dev `serve` command, and
//! single-process deployments. A durable, out-of-process broker (backed
//! by Redis or similar) would implement the same [`TaskBroker`] trait
//! without the coordinator or stage runner changing at all.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Notify;
use ulid::Ulid;

use dubbing_orchestrator_domain::error::OrchestratorError;
use dubbing_orchestrator_domain::repositories::{TaskBroker, TaskMessage, TaskName};
use dubbing_orchestrator_domain::value_objects::RetryPolicy;

struct Queues {
    by_name: parking_lot::Mutex<HashMap<String, VecDeque<TaskMessage>>>,
    notify: Notify,
}

pub struct InProcessTaskBroker {
    queues: Arc<Queues>,
}

impl InProcessTaskBroker {
    pub fn new() -> Self {
        Self {
            queues: Arc::new(Queues {
                by_name: parking_lot::Mutex::new(HashMap::new()),
                notify: Notify::new(),
            }),
        }
    }

    fn push(&self, queue: &str, message: TaskMessage) {
        self.queues.by_name.lock().entry(queue.to_string()).or_default().push_back(message);
        self.queues.notify.notify_waiters();
    }

    /// Blocks until a task is available on `queue`, then pops and returns
    /// it. Used by the worker loop, not by the coordinator directly.
    pub async fn dequeue(&self, queue: &str) -> TaskMessage {
        loop {
            if let Some(message) = self.queues.by_name.lock().get_mut(queue).and_then(VecDeque::pop_front) {
                return message;
            }
            self.queues.notify.notified().await;
        }
    }

    pub fn pending_count(&self, queue: &str) -> usize {
        self.queues.by_name.lock().get(queue).map(VecDeque::len).unwrap_or(0)
    }
}

impl Default for InProcessTaskBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskBroker for InProcessTaskBroker {
    async fn enqueue(&self, task: TaskName, kwargs: HashMap<String, JsonValue>, queue: &str) -> Result<String, OrchestratorError> {
        let task_id = Ulid::new().to_string();
        self.push(
            queue,
            TaskMessage {
                task_id: task_id.clone(),
                task,
                kwargs,
                attempt: 1,
            },
        );
        Ok(task_id)
    }

    async fn enqueue_retry(
        &self,
        task: TaskName,
        kwargs: HashMap<String, JsonValue>,
        queue: &str,
        attempt: u32,
        policy: &RetryPolicy,
    ) -> Result<String, OrchestratorError> {
        let delay = policy.backoff_for_attempt(attempt);
        tokio::time::sleep(delay).await;

        let task_id = Ulid::new().to_string();
        self.push(
            queue,
            TaskMessage {
                task_id: task_id.clone(),
                task,
                kwargs,
                attempt,
            },
        );
        Ok(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enqueue_then_dequeue_round_trips_a_task() {
        let broker = InProcessTaskBroker::new();
        broker.enqueue(TaskName::RunAsr, HashMap::new(), "pipeline").await.unwrap();
        assert_eq!(broker.pending_count("pipeline"), 1);

        let message = broker.dequeue("pipeline").await;
        assert_eq!(message.task, TaskName::RunAsr);
        assert_eq!(message.attempt, 1);
        assert_eq!(broker.pending_count("pipeline"), 0);
    }

    #[tokio::test]
    async fn enqueue_retry_carries_the_attempt_number_forward() {
        let broker = InProcessTaskBroker::new();
        let policy = RetryPolicy::new(4, std::time::Duration::from_millis(1), std::time::Duration::from_millis(5), false);
        broker
            .enqueue_retry(TaskName::RunTranslate, HashMap::new(), "pipeline", 2, &policy)
            .await
            .unwrap();

        let message = broker.dequeue("pipeline").await;
        assert_eq!(message.attempt, 2);
    }
}
