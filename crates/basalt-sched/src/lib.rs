//! Tick scheduling and the serial queue worker.
//!
//! The host owns a discrete tick (one `TickScheduler::tick()` call per
//! server tick, typically every 50 ms). Deferred callbacks, delayed and
//! repeating jobs, and the queue worker's driver all hang off that
//! tick. Heavyweight operations are modelled as [`QueueTask`]s and fed
//! to the [`QueueWorker`], which runs them strictly one at a time even
//! when submitted by independent callers.

pub mod result;
pub mod scheduler;
pub mod task;
pub mod worker;

pub use result::{QueueResult, TaskFuture};
pub use scheduler::{TaskId, TickScheduler};
pub use task::{QueueTask, TaskConcurrency, TaskHandle, TaskState};
pub use worker::QueueWorker;
