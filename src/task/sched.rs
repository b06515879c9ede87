//! The scheduler. Picks the next runnable task, owns the idle task, and
//! drives [`super::context::context_switch`]. Stands in for a
//! fork/exec/wait/pipe process-model scheduler entirely — this kernel has
//! one flat pool of kernel-mode tasks, no parent/child tree, no page
//! tables to swap.

use super::context::context_switch;
use super::queue::{Policy, ReadyQueues};
use super::tcb::{self, TaskEntry, TaskFlags, TaskState};
use crate::arch::registers::{self, without_interrupts};
use crate::config::{MAX_TASKS, MIN_STACK_SIZE, SCHEDULER_PREEMPTIVE, SCHEDULER_TIME_SLICE};

/// Mutated only with interrupts disabled. Single CPU, no locks.
static mut CURRENT: Option<usize> = None;
static mut IDLE_INDEX: usize = 0;
static mut READY: ReadyQueues = ReadyQueues::new();
static mut RESCHEDULING: bool = false;
static mut SCHEDULER_RUNNING: bool = false;

static mut SCHEDULE_CALLS: u32 = 0;
static mut CONTEXT_SWITCHES: u32 = 0;
static mut IDLE_TICKS: u32 = 0;

/// A stack pointer slot for the boot context's one-way handoff into the
/// first scheduled task. Never read back.
static mut BOOT_SP: usize = 0;

/// Zombies are reaped lazily, with no dedicated reaper task — the idle
/// task reaps on every pass before halting instead. It is the one task
/// guaranteed to run whenever the system has spare cycles, and it runs in
/// ordinary task context so the heap free in [`reap_zombies`] is never
/// called from an interrupt handler.
extern "C" fn idle_main(_arg: usize) {
    loop {
        reap_zombies();
        registers::enable_interrupts();
        registers::hlt();
    }
}

/// Creates the idle task (priority 7, idle flag) and enqueues it. Must run
/// before [`start`]. True idempotence would require tearing down the
/// existing idle task first, which this kernel never does; nothing calls
/// `init()` twice in practice, but we still guard against a second call
/// corrupting the table.
pub fn init() {
    if unsafe { *core::ptr::addr_of!(SCHEDULER_RUNNING) } {
        return;
    }

    let idle = tcb::create(
        "idle",
        idle_main,
        0,
        tcb::IDLE_PRIORITY,
        MIN_STACK_SIZE,
        TaskFlags::KERNEL | TaskFlags::IDLE | TaskFlags::PREEMPTIBLE,
    )
    .expect("idle task creation must not fail this early in boot");

    without_interrupts(|| unsafe {
        let tasks = tcb::raw_table();
        IDLE_INDEX = idle;
        READY.enqueue(tasks, idle);
        SCHEDULER_RUNNING = true;
    });

    crate::drivers::timer::register_tick_callback(on_tick);
}

/// Spawns a new task and enqueues it Ready. Thin wrapper over
/// [`tcb::create`] that also performs the ready-queue enqueue the scheduler
/// owns.
pub fn spawn(name: &str, entry: TaskEntry, arg: usize, priority: u8, stack_size: usize) -> Option<usize> {
    let index = tcb::create(name, entry, arg, priority, stack_size, TaskFlags::PREEMPTIBLE)?;
    without_interrupts(|| unsafe {
        let tasks = tcb::raw_table();
        READY.enqueue(tasks, index);
    });
    Some(index)
}

/// Switches the active ready-queue policy. Tasks already queued stay in
/// their current structure until next re-enqueued.
pub fn set_policy(policy: Policy) {
    without_interrupts(|| unsafe {
        READY.policy = policy;
    });
}

pub fn current_index() -> usize {
    without_interrupts(|| unsafe { *core::ptr::addr_of!(CURRENT) }).expect("schedule() always sets a current task before dispatch")
}

pub fn schedule_calls() -> u32 {
    without_interrupts(|| unsafe { *core::ptr::addr_of!(SCHEDULE_CALLS) })
}

pub fn context_switches() -> u32 {
    without_interrupts(|| unsafe { *core::ptr::addr_of!(CONTEXT_SWITCHES) })
}

pub fn idle_ticks() -> u32 {
    without_interrupts(|| unsafe { *core::ptr::addr_of!(IDLE_TICKS) })
}

/// Hands control to the scheduler for the first time. Never returns: the
/// boot context's stack pointer is stashed in [`BOOT_SP`] and never loaded
/// again.
pub fn start() -> ! {
    schedule();
    loop {
        registers::hlt();
    }
}

/// The core algorithm. Interrupts are disabled for the whole of the state
/// mutation and the context switch itself, including the reentrancy check
/// at the top — doing that check under already-disabled interrupts closes
/// a preemption race a task-context caller would otherwise open between
/// reading the guard and setting it.
pub fn schedule() {
    let was_enabled = registers::interrupts_enabled();
    registers::disable_interrupts();

    let already_running = unsafe { *core::ptr::addr_of!(RESCHEDULING) };
    if already_running || !unsafe { *core::ptr::addr_of!(SCHEDULER_RUNNING) } {
        if was_enabled {
            registers::enable_interrupts();
        }
        return;
    }
    unsafe { *core::ptr::addr_of_mut!(RESCHEDULING) = true };
    unsafe { *core::ptr::addr_of_mut!(SCHEDULE_CALLS) += 1 };

    let current = unsafe { *core::ptr::addr_of!(CURRENT) };
    let tasks = unsafe { tcb::raw_table() };

    if let Some(cur) = current {
        if tasks[cur].state == TaskState::Running {
            tasks[cur].state = TaskState::Ready;
            unsafe { (*core::ptr::addr_of_mut!(READY)).enqueue(tasks, cur) };
        }
    }

    let next = unsafe { (*core::ptr::addr_of_mut!(READY)).dequeue(tasks) }.unwrap_or(unsafe { IDLE_INDEX });

    if Some(next) == current {
        tasks[next].state = TaskState::Running;
        unsafe { *core::ptr::addr_of_mut!(RESCHEDULING) = false };
        registers::enable_interrupts();
        return;
    }

    unsafe { *core::ptr::addr_of_mut!(CONTEXT_SWITCHES) += 1 };
    tasks[next].state = TaskState::Running;
    if tasks[next].time_slice == 0 {
        tasks[next].time_slice = SCHEDULER_TIME_SLICE;
    }

    let out_slot: *mut usize = match current {
        Some(cur) => core::ptr::addr_of_mut!(tasks[cur].saved_sp),
        None => core::ptr::addr_of_mut!(BOOT_SP),
    };
    let in_sp = tasks[next].saved_sp;

    unsafe { *core::ptr::addr_of_mut!(CURRENT) = Some(next) };

    unsafe { context_switch(out_slot, in_sp) };

    // Resumption: lands here only for a task that previously called
    // schedule() and is now being switched back in (never for first-run,
    // which lands in the entry trampoline instead).
    unsafe { *core::ptr::addr_of_mut!(RESCHEDULING) = false };
    registers::enable_interrupts();
}

/// Disables interrupts, stores the code, marks the task a zombie needing
/// cleanup, removes it from the ready queue, then invokes the scheduler,
/// which never returns to this task. The slot itself is reaped lazily by
/// [`reap_zombies`].
pub fn task_exit(code: i32) -> ! {
    registers::disable_interrupts();
    let index = unsafe { *core::ptr::addr_of!(CURRENT) }.expect("task_exit called with no current task");
    unsafe {
        let tasks = tcb::raw_table();
        tasks[index].exit_code = code;
        tasks[index].state = TaskState::Zombie;
        tasks[index].flags.insert(TaskFlags::NEEDS_CLEANUP);
        (*core::ptr::addr_of_mut!(READY)).remove(tasks, index);
    }
    schedule();
    unreachable!("schedule() never returns to an exited task");
}

/// Voluntary yield: current task stays Ready and goes to the back of its
/// queue (handled by `schedule()`'s own re-enqueue of a still-Running task).
pub fn task_yield() {
    schedule();
}

/// Disables interrupts, sets the wake tick, transitions Running ->
/// Sleeping, invokes the scheduler.
pub fn task_sleep(ticks: u32) {
    registers::disable_interrupts();
    let index = unsafe { *core::ptr::addr_of!(CURRENT) }.expect("task_sleep called with no current task");
    unsafe {
        let tasks = tcb::raw_table();
        tasks[index].wake_tick = crate::drivers::timer::ticks().wrapping_add(ticks);
        tasks[index].state = TaskState::Sleeping;
    }
    schedule();
}

/// If `index`'s task is Sleeping or Blocked, transitions it to Ready,
/// clears its wake tick, and re-enqueues it.
pub fn task_wakeup(index: usize) {
    without_interrupts(|| unsafe {
        let tasks = tcb::raw_table();
        if index >= MAX_TASKS {
            return;
        }
        if matches!(tasks[index].state, TaskState::Sleeping | TaskState::Blocked) {
            tasks[index].state = TaskState::Ready;
            tasks[index].wake_tick = 0;
            (*core::ptr::addr_of_mut!(READY)).enqueue(tasks, index);
        }
    });
}

/// Reclaims the stack and slot of every Zombie task flagged needing
/// cleanup. Never called on the currently running task — `task_exit`
/// always calls `schedule()` before a zombie could be reaped while live.
pub fn reap_zombies() {
    loop {
        let victim = without_interrupts(|| unsafe {
            let tasks = tcb::raw_table();
            tasks
                .iter()
                .position(|t| t.state == TaskState::Zombie && t.flags.contains(TaskFlags::NEEDS_CLEANUP))
        });
        match victim {
            Some(index) => tcb::destroy(index),
            None => break,
        }
    }
}

/// The preemption path: runs as the timer's on-tick callback, so it is
/// already in interrupt context with interrupts disabled by the gate. Must
/// not allocate or block.
fn on_tick() {
    let index = unsafe { *core::ptr::addr_of!(CURRENT) };
    let Some(index) = index else { return };

    let tasks = unsafe { tcb::raw_table() };
    if tasks[index].flags.contains(TaskFlags::IDLE) {
        unsafe { *core::ptr::addr_of_mut!(IDLE_TICKS) += 1 };
    }
    tasks[index].cpu_ticks = tasks[index].cpu_ticks.wrapping_add(1);

    let now = crate::drivers::timer::ticks();
    for i in 0..MAX_TASKS {
        if tasks[i].state == TaskState::Sleeping && now.wrapping_sub(tasks[i].wake_tick) < u32::MAX / 2 {
            tasks[i].state = TaskState::Ready;
            tasks[i].wake_tick = 0;
            unsafe { (*core::ptr::addr_of_mut!(READY)).enqueue(tasks, i) };
        }
    }

    if !SCHEDULER_PREEMPTIVE {
        return;
    }

    if tasks[index].time_slice > 0 {
        tasks[index].time_slice -= 1;
    }

    if tasks[index].time_slice == 0 && tasks[index].flags.contains(TaskFlags::PREEMPTIBLE) {
        tasks[index].time_slice = SCHEDULER_TIME_SLICE;
        schedule();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_priority_is_reserved_maximum() {
        assert_eq!(tcb::IDLE_PRIORITY, tcb::MAX_PRIORITY);
    }
}
