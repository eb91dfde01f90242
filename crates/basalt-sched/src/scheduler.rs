//! The cooperative tick scheduler.
//!
//! The host calls [`TickScheduler::tick`] once per server tick. Jobs
//! queued with `run_next_tick` drain at the start of the next tick;
//! delayed and repeating jobs count ticks down and fire when due.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

type Job = Box<dyn FnOnce() + Send>;

/// Identifier for a delayed or repeating job, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

enum JobKind {
    Once(Job),
    Repeating {
        interval: u64,
        job: Box<dyn FnMut() + Send>,
    },
}

struct DelayedTask {
    id: u64,
    remaining: u64,
    kind: JobKind,
}

/// Handle to the tick scheduler. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct TickScheduler {
    inner: Arc<SchedulerState>,
}

#[derive(Default)]
struct SchedulerState {
    current_tick: AtomicU64,
    next_id: AtomicU64,
    next_tick: Mutex<VecDeque<Job>>,
    delayed: Mutex<Vec<DelayedTask>>,
    cancelled: Mutex<HashSet<u64>>,
}

impl TickScheduler {
    /// Create a scheduler with an empty job table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks processed so far.
    pub fn current_tick(&self) -> u64 {
        self.inner.current_tick.load(Ordering::Relaxed)
    }

    /// Run a job at the start of the next tick. Jobs run in submission
    /// order; a job submitted while the queue is draining runs on the
    /// following tick.
    pub fn run_next_tick(&self, job: impl FnOnce() + Send + 'static) {
        self.inner.next_tick.lock().push_back(Box::new(job));
    }

    /// Run a job after `delay_ticks` ticks (a delay of 0 still waits
    /// for the next tick).
    pub fn run_later(&self, delay_ticks: u64, job: impl FnOnce() + Send + 'static) -> TaskId {
        self.insert_delayed(delay_ticks, JobKind::Once(Box::new(job)))
    }

    /// Run a job after `delay_ticks`, then every `interval_ticks`.
    pub fn run_repeating(
        &self,
        delay_ticks: u64,
        interval_ticks: u64,
        job: impl FnMut() + Send + 'static,
    ) -> TaskId {
        self.insert_delayed(
            delay_ticks,
            JobKind::Repeating {
                interval: interval_ticks.max(1),
                job: Box::new(job),
            },
        )
    }

    /// Cancel a delayed or repeating job.
    pub fn cancel(&self, id: TaskId) {
        let mut delayed = self.inner.delayed.lock();
        let before = delayed.len();
        delayed.retain(|t| t.id != id.0);
        if delayed.len() == before {
            // Not in the table: the job is being dispatched right now.
            // Flag it so a repeating job is not re-armed.
            self.inner.cancelled.lock().insert(id.0);
        }
    }

    /// Advance one tick: drain the next-tick queue, then fire due
    /// delayed jobs. Jobs run on the calling thread, outside any
    /// scheduler lock.
    pub fn tick(&self) {
        self.inner.current_tick.fetch_add(1, Ordering::Relaxed);

        let jobs: VecDeque<Job> = std::mem::take(&mut *self.inner.next_tick.lock());
        for job in jobs {
            job();
        }

        let due: Vec<DelayedTask> = {
            let mut delayed = self.inner.delayed.lock();
            let mut due = Vec::new();
            let mut i = 0;
            while i < delayed.len() {
                delayed[i].remaining -= 1;
                if delayed[i].remaining == 0 {
                    due.push(delayed.remove(i));
                } else {
                    i += 1;
                }
            }
            due
        };

        for task in due {
            if self.take_cancelled(task.id) {
                continue;
            }
            match task.kind {
                JobKind::Once(job) => job(),
                JobKind::Repeating { interval, mut job } => {
                    job();
                    if self.take_cancelled(task.id) {
                        continue;
                    }
                    self.inner.delayed.lock().push(DelayedTask {
                        id: task.id,
                        remaining: interval,
                        kind: JobKind::Repeating { interval, job },
                    });
                }
            }
        }
    }

    fn insert_delayed(&self, delay: u64, kind: JobKind) -> TaskId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.delayed.lock().push(DelayedTask {
            id,
            remaining: delay.max(1),
            kind,
        });
        TaskId(id)
    }

    fn take_cancelled(&self, id: u64) -> bool {
        self.inner.cancelled.lock().remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let c = Arc::new(AtomicUsize::new(0));
        let read = {
            let c = c.clone();
            move || c.load(Ordering::SeqCst)
        };
        (c, read)
    }

    #[test]
    fn next_tick_runs_on_tick_not_before() {
        let sched = TickScheduler::new();
        let (c, read) = counter();
        let inc = {
            let c = c.clone();
            move || {
                c.fetch_add(1, Ordering::SeqCst);
            }
        };
        sched.run_next_tick(inc);
        assert_eq!(read(), 0);
        sched.tick();
        assert_eq!(read(), 1);
        sched.tick();
        assert_eq!(read(), 1);
    }

    #[test]
    fn next_tick_jobs_run_in_order() {
        let sched = TickScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            sched.run_next_tick(move || log.lock().push(i));
        }
        sched.tick();
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn job_scheduled_during_drain_runs_next_tick() {
        let sched = TickScheduler::new();
        let (c, read) = counter();
        let inner_sched = sched.clone();
        sched.run_next_tick(move || {
            let c = c.clone();
            inner_sched.run_next_tick(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        });
        sched.tick();
        assert_eq!(read(), 0);
        sched.tick();
        assert_eq!(read(), 1);
    }

    #[test]
    fn run_later_counts_ticks() {
        let sched = TickScheduler::new();
        let (c, read) = counter();
        sched.run_later(3, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        sched.tick();
        sched.tick();
        assert_eq!(read(), 0);
        sched.tick();
        assert_eq!(read(), 1);
    }

    #[test]
    fn run_later_zero_delay_waits_for_next_tick() {
        let sched = TickScheduler::new();
        let (c, read) = counter();
        sched.run_later(0, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(read(), 0);
        sched.tick();
        assert_eq!(read(), 1);
    }

    #[test]
    fn repeating_fires_on_interval() {
        let sched = TickScheduler::new();
        let (c, read) = counter();
        let c2 = c.clone();
        sched.run_repeating(1, 2, move || {
            c2.fetch_add(1, Ordering::SeqCst);
        });
        sched.tick(); // fires (delay 1)
        assert_eq!(read(), 1);
        sched.tick();
        assert_eq!(read(), 1);
        sched.tick(); // fires (interval 2)
        assert_eq!(read(), 2);
    }

    #[test]
    fn cancel_pending_job() {
        let sched = TickScheduler::new();
        let (c, read) = counter();
        let id = sched.run_later(2, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        sched.cancel(id);
        sched.tick();
        sched.tick();
        sched.tick();
        assert_eq!(read(), 0);
    }

    #[test]
    fn repeating_job_can_cancel_itself() {
        let sched = TickScheduler::new();
        let (c, read) = counter();
        let id_slot: Arc<Mutex<Option<TaskId>>> = Arc::new(Mutex::new(None));
        let sched2 = sched.clone();
        let id_slot2 = id_slot.clone();
        let id = sched.run_repeating(1, 1, move || {
            c.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *id_slot2.lock() {
                sched2.cancel(id);
            }
        });
        *id_slot.lock() = Some(id);

        sched.tick();
        sched.tick();
        sched.tick();
        assert_eq!(read(), 1);
    }

    #[test]
    fn tick_counter_advances() {
        let sched = TickScheduler::new();
        assert_eq!(sched.current_tick(), 0);
        sched.tick();
        sched.tick();
        assert_eq!(sched.current_tick(), 2);
    }
}
