//! Task outcome tracking and callback registration.
//!
//! Every [`QueueTask`](crate::task::QueueTask) owns one `QueueResult`.
//! Callers register reactions instead of blocking; each registered
//! callback fires exactly once, in registration order, and always on a
//! tick following the event rather than in-line with it.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::scheduler::TickScheduler;
use crate::task::TaskState;

type Callback = Box<dyn FnOnce() + Send>;
type ReasonCallback = Box<dyn FnOnce(Option<String>) + Send>;

/// Shared outcome state of a queue task.
pub struct QueueResult {
    name: String,
    scheduler: TickScheduler,
    sync: Mutex<ResultState>,
}

struct ResultState {
    state: TaskState,
    cancel_reason: Option<String>,
    fail_reason: Option<String>,
    on_complete: VecDeque<Callback>,
    on_cancel: VecDeque<ReasonCallback>,
    on_fail: VecDeque<ReasonCallback>,
    on_end: VecDeque<Callback>,
}

impl QueueResult {
    pub(crate) fn new(scheduler: TickScheduler, name: &str) -> Self {
        Self {
            name: name.to_string(),
            scheduler,
            sync: Mutex::new(ResultState {
                state: TaskState::Pending,
                cancel_reason: None,
                fail_reason: None,
                on_complete: VecDeque::new(),
                on_cancel: VecDeque::new(),
                on_fail: VecDeque::new(),
                on_end: VecDeque::new(),
            }),
        }
    }

    /// Current task state.
    pub fn state(&self) -> TaskState {
        self.sync.lock().state
    }

    pub(crate) fn set_running(&self) {
        let mut state = self.sync.lock();
        if state.state == TaskState::Pending {
            state.state = TaskState::Running;
        }
    }

    pub(crate) fn set_complete(self: &Arc<Self>) {
        {
            let mut state = self.sync.lock();
            if state.state.is_ended() {
                return;
            }
            state.state = TaskState::Completed;
        }
        self.schedule_complete_drain();
        self.schedule_end_drain();
    }

    pub(crate) fn set_cancelled(self: &Arc<Self>, reason: Option<&str>) {
        {
            let mut state = self.sync.lock();
            if state.state.is_ended() {
                return;
            }
            state.state = TaskState::Cancelled;
            state.cancel_reason = reason.map(str::to_string);
        }
        self.schedule_cancel_drain();
        self.schedule_end_drain();
    }

    pub(crate) fn set_failed(self: &Arc<Self>, reason: Option<&str>) {
        {
            let mut state = self.sync.lock();
            if state.state.is_ended() {
                return;
            }
            state.state = TaskState::Failed;
            state.fail_reason = reason.map(str::to_string);
        }
        // Failure is never silent, even with no fail callbacks registered.
        debug!(
            "queue task {} failed: {}",
            self.name,
            reason.unwrap_or("no reason given")
        );
        self.schedule_fail_drain();
        self.schedule_end_drain();
    }

    pub(crate) fn add_on_complete(self: &Arc<Self>, callback: impl FnOnce() + Send + 'static) {
        let mut state = self.sync.lock();
        if state.state == TaskState::Completed {
            drop(state);
            self.scheduler.run_next_tick(callback);
        } else {
            state.on_complete.push_back(Box::new(callback));
        }
    }

    pub(crate) fn add_on_cancel(
        self: &Arc<Self>,
        callback: impl FnOnce(Option<String>) + Send + 'static,
    ) {
        let mut state = self.sync.lock();
        if state.state == TaskState::Cancelled {
            let reason = state.cancel_reason.clone();
            drop(state);
            self.scheduler.run_next_tick(move || callback(reason));
        } else {
            state.on_cancel.push_back(Box::new(callback));
        }
    }

    pub(crate) fn add_on_fail(
        self: &Arc<Self>,
        callback: impl FnOnce(Option<String>) + Send + 'static,
    ) {
        let mut state = self.sync.lock();
        if state.state == TaskState::Failed {
            let reason = state.fail_reason.clone();
            drop(state);
            self.scheduler.run_next_tick(move || callback(reason));
        } else {
            state.on_fail.push_back(Box::new(callback));
        }
    }

    pub(crate) fn add_on_end(self: &Arc<Self>, callback: impl FnOnce() + Send + 'static) {
        let mut state = self.sync.lock();
        if state.state.is_ended() {
            drop(state);
            self.scheduler.run_next_tick(callback);
        } else {
            state.on_end.push_back(Box::new(callback));
        }
    }

    // Each drain pops one entry at a time under the monitor and runs it
    // outside, re-checking emptiness so a callback that registers
    // further callbacks is tolerated.

    fn schedule_complete_drain(self: &Arc<Self>) {
        if self.sync.lock().on_complete.is_empty() {
            return;
        }
        let this = Arc::clone(self);
        self.scheduler.run_next_tick(move || loop {
            let callback = this.sync.lock().on_complete.pop_front();
            match callback {
                Some(callback) => callback(),
                None => break,
            }
        });
    }

    fn schedule_cancel_drain(self: &Arc<Self>) {
        if self.sync.lock().on_cancel.is_empty() {
            return;
        }
        let this = Arc::clone(self);
        self.scheduler.run_next_tick(move || loop {
            let entry = {
                let mut state = this.sync.lock();
                let reason = state.cancel_reason.clone();
                state.on_cancel.pop_front().map(|cb| (cb, reason))
            };
            match entry {
                Some((callback, reason)) => callback(reason),
                None => break,
            }
        });
    }

    fn schedule_fail_drain(self: &Arc<Self>) {
        if self.sync.lock().on_fail.is_empty() {
            return;
        }
        let this = Arc::clone(self);
        self.scheduler.run_next_tick(move || loop {
            let entry = {
                let mut state = this.sync.lock();
                let reason = state.fail_reason.clone();
                state.on_fail.pop_front().map(|cb| (cb, reason))
            };
            match entry {
                Some((callback, reason)) => callback(reason),
                None => break,
            }
        });
    }

    fn schedule_end_drain(self: &Arc<Self>) {
        if self.sync.lock().on_end.is_empty() {
            return;
        }
        let this = Arc::clone(self);
        self.scheduler.run_next_tick(move || loop {
            let callback = this.sync.lock().on_end.pop_front();
            match callback {
                Some(callback) => callback(),
                None => break,
            }
        });
    }
}

/// Caller-facing handle to a task's outcome. Cheap to clone.
#[derive(Clone)]
pub struct TaskFuture {
    result: Arc<QueueResult>,
}

impl TaskFuture {
    pub(crate) fn new(result: Arc<QueueResult>) -> Self {
        Self { result }
    }

    /// Current task state.
    pub fn state(&self) -> TaskState {
        self.result.state()
    }

    /// Whether the task has reached a terminal state.
    pub fn is_ended(&self) -> bool {
        self.result.state().is_ended()
    }

    /// Mark the task cancelled. Effective until the worker dispatches
    /// the task; a job already running is not interrupted.
    pub fn cancel(&self, reason: Option<&str>) {
        self.result.set_cancelled(reason);
    }

    /// Run `callback` once when the task completes. If it already has,
    /// the callback runs on the next tick, never in-line.
    pub fn on_complete(&self, callback: impl FnOnce() + Send + 'static) -> &Self {
        self.result.add_on_complete(callback);
        self
    }

    /// Run `callback` once if the task is cancelled, with the reason.
    pub fn on_cancel(&self, callback: impl FnOnce(Option<String>) + Send + 'static) -> &Self {
        self.result.add_on_cancel(callback);
        self
    }

    /// Run `callback` once if the task fails, with the reason.
    pub fn on_fail(&self, callback: impl FnOnce(Option<String>) + Send + 'static) -> &Self {
        self.result.add_on_fail(callback);
        self
    }

    /// Run `callback` once when the task ends, whatever the outcome,
    /// after the outcome-specific callbacks.
    pub fn on_end(&self, callback: impl FnOnce() + Send + 'static) -> &Self {
        self.result.add_on_end(callback);
        self
    }
}
