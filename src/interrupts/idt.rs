//! The 256-entry interrupt descriptor table and its installation.
//!
//! Hand-rolled IA-32 gate descriptors — `x86_64`'s `InterruptDescriptorTable`
//! can't build a 32-bit table, so this mirrors its *shape* (a `lazy_static`
//! table, one `init()` that loads it) over a plain `[IdtEntry; 256]` instead.

use super::stubs::{self, unhandled_vector_stub};
use core::arch::asm;
use core::mem::size_of;
use lazy_static::lazy_static;
use spin::Mutex;

/// Kernel code segment selector installed by `gdt::init` (index 1, RPL 0).
const KERNEL_CODE_SELECTOR: u16 = 0x08;

/// Present, ring 0, 32-bit interrupt gate (type 0xE) — interrupts stay
/// disabled on entry, since the gate type clears IF for us before the stub
/// runs a single instruction.
const GATE_INTERRUPT_32: u8 = 0x8E;

#[derive(Clone, Copy)]
#[repr(C, packed)]
struct IdtEntry {
    offset_low: u16,
    selector: u16,
    zero: u8,
    type_attr: u8,
    offset_high: u16,
}

impl IdtEntry {
    const fn missing() -> Self {
        IdtEntry { offset_low: 0, selector: 0, zero: 0, type_attr: 0, offset_high: 0 }
    }

    fn new(handler: u32, selector: u16, type_attr: u8) -> Self {
        IdtEntry {
            offset_low: (handler & 0xFFFF) as u16,
            selector,
            zero: 0,
            type_attr,
            offset_high: (handler >> 16) as u16,
        }
    }
}

#[repr(C, packed)]
struct IdtPointer {
    limit: u16,
    base: u32,
}

struct Idt {
    entries: [IdtEntry; 256],
}

unsafe impl Send for Idt {}

impl Idt {
    fn new() -> Self {
        let mut entries = [IdtEntry::missing(); 256];
        let unhandled = unhandled_vector_stub as usize as u32;
        for entry in entries.iter_mut() {
            *entry = IdtEntry::new(unhandled, KERNEL_CODE_SELECTOR, GATE_INTERRUPT_32);
        }
        for (vector, stub) in stubs::STUBS.iter().enumerate() {
            entries[vector] = IdtEntry::new(*stub as usize as u32, KERNEL_CODE_SELECTOR, GATE_INTERRUPT_32);
        }
        Idt { entries }
    }

    fn load(&self) {
        let ptr = IdtPointer {
            limit: (size_of::<[IdtEntry; 256]>() - 1) as u16,
            base: self.entries.as_ptr() as u32,
        };
        unsafe {
            asm!("lidt [{0}]", in(reg) &ptr, options(nostack, preserves_flags));
        }
    }
}

lazy_static! {
    static ref IDT: Mutex<Idt> = Mutex::new(Idt::new());
}

/// Builds the table and loads it into IDTR. Table installation is
/// everything this function does; dispatch itself lives in
/// `exceptions::exception_common_handler` / `irq::irq_common_handler`, the
/// two C entries the stubs in `stubs.rs` call into.
pub fn init() {
    IDT.lock().load();
}
