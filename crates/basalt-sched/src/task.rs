//! Deferred units of work for the queue worker.

use std::sync::Arc;

use crate::result::{QueueResult, TaskFuture};
use crate::scheduler::TickScheduler;

/// How the queue worker runs a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskConcurrency {
    /// Inline on the coordinating (tick) thread.
    MainThread,
    /// Inline on whatever thread the worker's driver runs on.
    CurrentThread,
    /// On a worker thread, dispatched one tick after dequeue.
    Async,
}

/// Lifecycle of a queue task. Completed, Cancelled, and Failed are
/// terminal; once set, the state never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl TaskState {
    /// Whether the task has reached a terminal state.
    pub fn is_ended(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Cancelled | TaskState::Failed
        )
    }
}

/// A named deferred unit of work.
///
/// The job reports its outcome through the [`TaskHandle`] it is given;
/// a job that never signals stalls the queue worker behind it.
pub struct QueueTask {
    name: String,
    concurrency: TaskConcurrency,
    result: Arc<QueueResult>,
    job: Option<Box<dyn FnOnce(TaskHandle) + Send>>,
}

impl QueueTask {
    /// Create a task. Callback scheduling runs through `scheduler`.
    pub fn new(
        scheduler: &TickScheduler,
        name: &str,
        concurrency: TaskConcurrency,
        job: impl FnOnce(TaskHandle) + Send + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            concurrency,
            result: Arc::new(QueueResult::new(scheduler.clone(), name)),
            job: Some(Box::new(job)),
        }
    }

    /// The task name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The task's declared concurrency mode.
    pub fn concurrency(&self) -> TaskConcurrency {
        self.concurrency
    }

    /// Handle for registering outcome callbacks and for cancellation.
    /// Valid before and after the task is submitted to a worker.
    pub fn future(&self) -> TaskFuture {
        TaskFuture::new(self.result.clone())
    }

    pub(crate) fn result(&self) -> Arc<QueueResult> {
        self.result.clone()
    }

    /// Run the job. A task already cancelled is not run.
    pub(crate) fn run(mut self) {
        if self.result.state().is_ended() {
            return;
        }
        self.result.set_running();
        if let Some(job) = self.job.take() {
            job(TaskHandle {
                result: self.result.clone(),
            });
        }
    }
}

/// Handed to a task's job to report the task's outcome.
#[derive(Clone)]
pub struct TaskHandle {
    result: Arc<QueueResult>,
}

impl TaskHandle {
    /// Mark the task completed.
    pub fn complete(&self) {
        self.result.set_complete();
    }

    /// Mark the task cancelled, with an optional reason.
    pub fn cancel(&self, reason: Option<&str>) {
        self.result.set_cancelled(reason);
    }

    /// Mark the task failed, with an optional reason.
    pub fn fail(&self, reason: Option<&str>) {
        self.result.set_failed(reason);
    }

    /// Whether the task was cancelled out from under the job.
    pub fn is_cancelled(&self) -> bool {
        self.result.state() == TaskState::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_marks_running_then_job_signals() {
        let sched = TickScheduler::new();
        let task = QueueTask::new(&sched, "copy", TaskConcurrency::CurrentThread, |handle| {
            handle.complete();
        });
        let future = task.future();

        assert_eq!(future.state(), TaskState::Pending);
        task.run();
        assert_eq!(future.state(), TaskState::Completed);
    }

    #[test]
    fn job_without_signal_leaves_task_running() {
        let sched = TickScheduler::new();
        let task = QueueTask::new(&sched, "copy", TaskConcurrency::CurrentThread, |_| {});
        let future = task.future();

        task.run();
        assert_eq!(future.state(), TaskState::Running);
        assert!(!future.is_ended());
    }

    #[test]
    fn cancelled_task_does_not_run() {
        let sched = TickScheduler::new();
        let task = QueueTask::new(&sched, "copy", TaskConcurrency::CurrentThread, |handle| {
            handle.complete();
        });
        let future = task.future();

        future.cancel(Some("superseded"));
        task.run();
        assert_eq!(future.state(), TaskState::Cancelled);
    }

    #[test]
    fn terminal_state_is_immutable() {
        let sched = TickScheduler::new();
        let task = QueueTask::new(&sched, "copy", TaskConcurrency::CurrentThread, |handle| {
            handle.complete();
            handle.fail(Some("too late"));
            handle.cancel(None);
        });
        let future = task.future();

        task.run();
        assert_eq!(future.state(), TaskState::Completed);
    }
}
