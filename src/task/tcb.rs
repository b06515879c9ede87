//! The task table. Fixed-size array of task control blocks with
//! creation, destruction, and lookup. Stands in for a `Process`/`ProcessId`
//! model (fork/exec/page-table/fd-table fields all belong to a
//! process-management layer this kernel doesn't have — no paging, no
//! privilege separation, no filesystem).

use crate::config::{DEFAULT_STACK_SIZE, MAX_TASKS, MIN_STACK_SIZE, PAGE_SIZE};
use crate::memory::heap::HEAP;
use bitflags::bitflags;

pub const NAME_CAPACITY: usize = 32;

/// A task's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Unused,
    Creating,
    Ready,
    Running,
    Blocked,
    Sleeping,
    Terminated,
    Zombie,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TaskFlags: u8 {
        const KERNEL        = 1 << 0;
        const PREEMPTIBLE    = 1 << 1;
        const FIRST_RUN      = 1 << 2;
        const NEEDS_CLEANUP  = 1 << 3;
        const IDLE           = 1 << 4;
    }
}

/// A task's entry point: cdecl, takes the single argument word stashed in
/// its TCB. Called once, from [`task_entry_trampoline`].
pub type TaskEntry = extern "C" fn(usize);

/// Priority 7 is reserved for the idle task.
pub const IDLE_PRIORITY: u8 = 7;
pub const MIN_PRIORITY: u8 = 0;
pub const MAX_PRIORITY: u8 = 7;

#[derive(Clone, Copy)]
pub struct Tcb {
    /// The only execution state the context switch primitive needs.
    pub saved_sp: usize,
    pub stack_base: usize,
    pub stack_size: usize,
    pub pid: u32,
    pub name: [u8; NAME_CAPACITY],
    pub state: TaskState,
    pub priority: u8,
    pub base_priority: u8,
    pub flags: TaskFlags,
    pub time_slice: u32,
    pub cpu_ticks: u32,
    pub creation_tick: u32,
    pub wake_tick: u32,
    pub entry: Option<TaskEntry>,
    pub arg: usize,
    pub exit_code: i32,
    /// Intrusive ready-queue links; indices into the task table.
    pub next: Option<usize>,
    pub prev: Option<usize>,
}

impl Tcb {
    pub(crate) const fn unused() -> Self {
        Tcb {
            saved_sp: 0,
            stack_base: 0,
            stack_size: 0,
            pid: 0,
            name: [0; NAME_CAPACITY],
            state: TaskState::Unused,
            priority: MIN_PRIORITY,
            base_priority: MIN_PRIORITY,
            flags: TaskFlags::empty(),
            time_slice: 0,
            cpu_ticks: 0,
            creation_tick: 0,
            wake_tick: 0,
            entry: None,
            arg: 0,
            exit_code: 0,
            next: None,
            prev: None,
        }
    }

    pub fn name_str(&self) -> &str {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        core::str::from_utf8(&self.name[..len]).unwrap_or("")
    }
}

/// Mutated only with interrupts disabled; a single CPU makes that
/// sufficient without locks.
static mut TASKS: [Tcb; MAX_TASKS] = [Tcb::unused(); MAX_TASKS];
static mut NEXT_PID: u32 = 1;

fn table() -> &'static mut [Tcb; MAX_TASKS] {
    unsafe { &mut *core::ptr::addr_of_mut!(TASKS) }
}

/// Direct access to the task table for the scheduler, which already holds
/// interrupts disabled for the whole of its own state-mutating sections.
///
/// # Safety
/// Caller must already have interrupts disabled.
pub(crate) unsafe fn raw_table() -> &'static mut [Tcb; MAX_TASKS] {
    table()
}

fn find_unused_slot(tasks: &[Tcb; MAX_TASKS]) -> Option<usize> {
    tasks.iter().position(|t| t.state == TaskState::Unused)
}

/// Count of slots with state != Unused.
pub fn task_count() -> usize {
    crate::arch::registers::without_interrupts(|| {
        table().iter().filter(|t| t.state != TaskState::Unused).count()
    })
}

fn copy_name(dst: &mut [u8; NAME_CAPACITY], name: &str) {
    let bytes = name.as_bytes();
    let n = bytes.len().min(NAME_CAPACITY - 1);
    dst[..n].copy_from_slice(&bytes[..n]);
    dst[n] = 0;
    for b in &mut dst[n + 1..] {
        *b = 0;
    }
}

/// Allocates a table slot and a stack for a new task. Runs with interrupts
/// disabled for the table mutation; the heap allocation happens outside
/// that window, since it runs in ordinary task context and must not run
/// with interrupts disabled for an unbounded time.
///
/// Returns the new task's table index, or `None` if the table is full or
/// the stack allocation failed (the slot is reverted to `Unused` either way).
pub fn create(
    name: &str,
    entry: TaskEntry,
    arg: usize,
    priority: u8,
    stack_size: usize,
    flags: TaskFlags,
) -> Option<usize> {
    let index = crate::arch::registers::without_interrupts(|| {
        let tasks = table();
        let index = find_unused_slot(tasks)?;
        tasks[index].state = TaskState::Creating;
        Some(index)
    })?;

    let aligned_size = stack_size.max(MIN_STACK_SIZE).div_ceil(PAGE_SIZE) * PAGE_SIZE;
    let aligned_size = if stack_size == 0 { DEFAULT_STACK_SIZE } else { aligned_size };
    let stack_base = HEAP.lock().alloc(aligned_size) as usize;
    if stack_base == 0 {
        crate::arch::registers::without_interrupts(|| {
            table()[index].state = TaskState::Unused;
        });
        return None;
    }

    let saved_sp = unsafe { build_initial_stack(stack_base, aligned_size) };
    let clamped_priority = priority.clamp(MIN_PRIORITY, MAX_PRIORITY);

    crate::arch::registers::without_interrupts(|| {
        let tasks = table();
        let pid = unsafe {
            let slot = core::ptr::addr_of_mut!(NEXT_PID);
            let pid = *slot;
            *slot = pid.wrapping_add(1);
            pid
        };
        let tcb = &mut tasks[index];
        tcb.saved_sp = saved_sp;
        tcb.stack_base = stack_base;
        tcb.stack_size = aligned_size;
        tcb.pid = pid;
        copy_name(&mut tcb.name, name);
        tcb.priority = clamped_priority;
        tcb.base_priority = clamped_priority;
        tcb.flags = flags | TaskFlags::FIRST_RUN;
        tcb.time_slice = crate::config::SCHEDULER_TIME_SLICE;
        tcb.cpu_ticks = 0;
        tcb.creation_tick = crate::drivers::timer::ticks();
        tcb.wake_tick = 0;
        tcb.entry = Some(entry);
        tcb.arg = arg;
        tcb.exit_code = 0;
        tcb.next = None;
        tcb.prev = None;
        tcb.state = TaskState::Ready;
    });

    Some(index)
}

/// Returns the stack and table slot to the heap / `Unused`. The caller
/// (the scheduler's reaper) must ensure the task is not the running task
/// and is not referenced by any ready queue.
pub fn destroy(index: usize) {
    let stack_base = crate::arch::registers::without_interrupts(|| {
        let tasks = table();
        if index >= MAX_TASKS {
            return 0;
        }
        let tcb = &mut tasks[index];
        let base = tcb.stack_base;
        *tcb = Tcb::unused();
        base
    });
    if stack_base != 0 {
        HEAP.lock().free(stack_base as *mut u8);
    }
}

/// Builds the stack layout [`super::context::context_switch`] expects to
/// restore: from the top of the stack downward, a zeroed `ebx`/`esi`/`edi`/
/// `ebp`, and below those (the slot the final `ret` consumes) the address
/// of [`task_entry_trampoline`]. Returns the resulting stack pointer.
///
/// # Safety
/// `[stack_base, stack_base + stack_size)` must be valid, exclusively-owned
/// memory not otherwise in use.
unsafe fn build_initial_stack(stack_base: usize, stack_size: usize) -> usize {
    let top = (stack_base + stack_size) & !0xF;
    let mut sp = top;

    unsafe {
        sp -= 4;
        (sp as *mut u32).write(task_entry_trampoline as usize as u32);
        sp -= 4;
        (sp as *mut u32).write(0); // ebx
        sp -= 4;
        (sp as *mut u32).write(0); // esi
        sp -= 4;
        (sp as *mut u32).write(0); // edi
        sp -= 4;
        (sp as *mut u32).write(0); // ebp
    }
    sp
}

/// Runs in the new task's context on its first dispatch, landed in by
/// [`super::context::context_switch`]'s final `ret`. Re-enables interrupts
/// (`schedule()` disabled them before the switch), clears the first-run
/// flag, then calls the task's entry function. If it returns, the task
/// exits with code 0.
#[unsafe(no_mangle)]
extern "C" fn task_entry_trampoline() -> ! {
    let index = crate::task::sched::current_index();

    let (entry, arg) = crate::arch::registers::without_interrupts(|| {
        let tasks = table();
        let tcb = &mut tasks[index];
        tcb.flags.remove(TaskFlags::FIRST_RUN);
        (tcb.entry, tcb.arg)
    });

    crate::arch::registers::enable_interrupts();

    if let Some(entry) = entry {
        entry(arg);
    }

    crate::task::sched::task_exit(0);
    unreachable!("task_exit never returns");
}
