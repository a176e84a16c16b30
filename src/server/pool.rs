//! Fixed-size worker pool fed by a bounded queue.
//!
//! `N` long-lived tokio tasks share the receiving end of a bounded mpsc
//! channel. Each worker takes one task and runs it to completion before
//! taking the next. Submission never waits: a full queue hands the task
//! straight back to the caller.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// Why a task could not be queued. The task is returned untouched.
#[derive(Debug, thiserror::Error)]
pub enum PoolError<T> {
    /// The queue is at capacity.
    #[error("worker pool queue is full")]
    Saturated(T),
    /// Every worker has exited.
    #[error("worker pool is closed")]
    Closed(T),
}

impl<T> PoolError<T> {
    pub fn into_inner(self) -> T {
        match self {
            PoolError::Saturated(task) | PoolError::Closed(task) => task,
        }
    }
}

pub struct WorkerPool<T> {
    sender: mpsc::Sender<T>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
}

impl<T> WorkerPool<T>
where
    T: Send + 'static,
{
    /// Spawns `worker_count` workers draining a queue of `capacity` slots.
    ///
    /// `handler` receives the worker's index and one task. Must be called
    /// from within a tokio runtime.
    pub fn new<F, Fut>(worker_count: usize, capacity: usize, handler: F) -> Self
    where
        F: Fn(usize, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let handler = Arc::new(handler);

        let workers = (0..worker_count)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                let handler = Arc::clone(&handler);

                tokio::spawn(async move {
                    loop {
                        // Hold the lock only while waiting, never while working
                        let task = receiver.lock().await.recv().await;

                        match task {
                            Some(task) => handler(id, task).await,
                            None => break,
                        }
                    }
                    tracing::debug!(worker = id, "Worker exiting");
                })
            })
            .collect();

        Self {
            sender,
            workers,
            capacity: capacity.max(1),
        }
    }

    /// Queues a task without waiting.
    pub fn submit(&self, task: T) -> Result<(), PoolError<T>> {
        self.sender.try_send(task).map_err(|e| match e {
            TrySendError::Full(task) => PoolError::Saturated(task),
            TrySendError::Closed(task) => PoolError::Closed(task),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
