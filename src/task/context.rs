//! The context switch primitive, written for IA-32 cdecl — 32-bit
//! callee-saved registers (`ebx`, `esi`, `edi`, `ebp`), no `r8`-`r15`,
//! `ret`/cdecl calling convention instead of a System V x86_64
//! `switch_context`/`restore_context` pair.
//!
//! There is only one routine here, not two: the scheduler always goes
//! through the same primitive, even when the outgoing task is a Zombie
//! about to be reaped — saving its (never-to-be-read-again) stack pointer
//! into a slot that's about to be freed is harmless, so a separate
//! dead-task restore path has no counterpart here.

use core::arch::naked_asm;

/// Saves `ebx`, `esi`, `edi`, `ebp` onto the outgoing task's own stack,
/// stores the resulting stack pointer through `out_sp_slot`, loads `in_sp`
/// into ESP, pops the same four registers off the incoming task's stack,
/// and returns — landing either back in a suspended `schedule()` call, or
/// (first dispatch) in [`super::tcb::task_entry_trampoline`].
///
/// # Safety
/// `in_sp` must be a stack pointer previously produced by this routine or
/// crafted by [`super::tcb::build_initial_stack`], belonging to a task that
/// is not concurrently running anywhere else.
#[unsafe(naked)]
pub unsafe extern "C" fn context_switch(out_sp_slot: *mut usize, in_sp: usize) {
    naked_asm!(
        "push ebx",
        "push esi",
        "push edi",
        "push ebp",
        "mov eax, [esp + 20]", // out_sp_slot: 4 pushes (16) + return addr (4)
        "mov [eax], esp",
        "mov eax, [esp + 24]", // in_sp
        "mov esp, eax",
        "pop ebp",
        "pop edi",
        "pop esi",
        "pop ebx",
        "ret",
    );
}
