//! The serial queue worker.
//!
//! Runs queued tasks strictly one at a time, in submission order, even
//! when the tasks come from independent callers. Heavyweight
//! operations therefore never overlap; a long-running task delays
//! everything queued behind it, which is the intended trade-off.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::result::QueueResult;
use crate::scheduler::{TaskId, TickScheduler};
use crate::task::{QueueTask, TaskConcurrency, TaskState};

/// Handle to the serial worker. Cheap to clone; clones share the queue.
#[derive(Clone)]
pub struct QueueWorker {
    inner: Arc<WorkerState>,
}

struct WorkerState {
    scheduler: TickScheduler,
    queue: Mutex<VecDeque<QueueTask>>,
    current: Mutex<Option<Arc<QueueResult>>>,
    driver: Mutex<Option<TaskId>>,
}

impl QueueWorker {
    /// Create an idle worker driven by `scheduler`.
    pub fn new(scheduler: &TickScheduler) -> Self {
        Self {
            inner: Arc::new(WorkerState {
                scheduler: scheduler.clone(),
                queue: Mutex::new(VecDeque::new()),
                current: Mutex::new(None),
                driver: Mutex::new(None),
            }),
        }
    }

    /// Add a task to the back of the queue. The driver starts
    /// automatically if the worker was idle.
    pub fn add_task(&self, task: QueueTask) {
        self.inner.queue.lock().push_back(task);
        self.ensure_driver();
    }

    /// Add several tasks, preserving their order.
    pub fn add_tasks(&self, tasks: impl IntoIterator<Item = QueueTask>) {
        self.inner.queue.lock().extend(tasks);
        self.ensure_driver();
    }

    /// Number of tasks waiting, not counting one currently running.
    pub fn queued(&self) -> usize {
        self.inner.queue.lock().len()
    }

    fn ensure_driver(&self) {
        let mut driver = self.inner.driver.lock();
        if driver.is_none() {
            let worker = self.clone();
            *driver = Some(self.inner.scheduler.run_repeating(1, 1, move || {
                worker.pump();
            }));
        }
    }

    // Driver body, invoked once per tick while registered.
    fn pump(&self) {
        {
            let current = self.inner.current.lock();
            if let Some(result) = current.as_ref() {
                if !result.state().is_ended() {
                    return;
                }
            }
        }

        loop {
            let task = self.inner.queue.lock().pop_front();

            let Some(task) = task else {
                // Re-check under the driver lock so a task submitted
                // while we are stopping is not stranded.
                let mut driver = self.inner.driver.lock();
                if self.inner.queue.lock().is_empty() {
                    *self.inner.current.lock() = None;
                    if let Some(id) = driver.take() {
                        self.inner.scheduler.cancel(id);
                    }
                    return;
                }
                drop(driver);
                continue;
            };

            if task.result().state() == TaskState::Cancelled {
                debug!("skipping cancelled queue task {}", task.name());
                continue;
            }

            *self.inner.current.lock() = Some(task.result());

            match task.concurrency() {
                TaskConcurrency::MainThread | TaskConcurrency::CurrentThread => task.run(),
                TaskConcurrency::Async => {
                    self.inner.scheduler.run_later(1, move || {
                        tokio::task::spawn_blocking(move || task.run());
                    });
                }
            }
            return;
        }
    }
}
