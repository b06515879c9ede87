//! Task control blocks, ready queues, the scheduler, and the
//! context-switch primitive.

pub mod context;
pub mod queue;
pub mod sched;
pub mod tcb;

pub use queue::Policy;
pub use sched::{schedule, spawn, task_exit, task_sleep, task_wakeup, task_yield};
pub use tcb::{TaskEntry, TaskFlags, TaskState};

/// Creates the idle task and marks the scheduler live. Must run after
/// `drivers::init()` (the timer's tick callback is registered here) and
/// before `sched::start()`.
pub fn init() {
    sched::init();
}
