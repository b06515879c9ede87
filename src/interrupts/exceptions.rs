//! The default fatal exception handler, plus per-vector custom hook
//! registration.

use super::frame::InterruptFrame;
use crate::arch::registers;
use bit_field::BitField;
use lazy_static::lazy_static;
use spin::Mutex;

const VECTOR_COUNT: usize = 32;

pub type ExceptionHandler = fn(&InterruptFrame);

const EXCEPTION_NAMES: [&str; VECTOR_COUNT] = [
    "Divide Error",
    "Debug",
    "Non-Maskable Interrupt",
    "Breakpoint",
    "Overflow",
    "BOUND Range Exceeded",
    "Invalid Opcode",
    "Device Not Available",
    "Double Fault",
    "Coprocessor Segment Overrun",
    "Invalid TSS",
    "Segment Not Present",
    "Stack-Segment Fault",
    "General Protection Fault",
    "Page Fault",
    "Reserved",
    "x87 Floating-Point Exception",
    "Alignment Check",
    "Machine Check",
    "SIMD Floating-Point Exception",
    "Virtualization Exception",
    "Control Protection Exception",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Hypervisor Injection Exception",
    "VMM Communication Exception",
    "Security Exception",
    "Reserved",
];

lazy_static! {
    static ref CUSTOM_HANDLERS: Mutex<[Option<ExceptionHandler>; VECTOR_COUNT]> =
        Mutex::new([None; VECTOR_COUNT]);
}

/// Registers a custom handler for exception `vector` (0-31), replacing the
/// default fatal dump for that vector (a future page-fault handler is the
/// motivating example).
pub fn register_handler(vector: u8, handler: ExceptionHandler) {
    if (vector as usize) < VECTOR_COUNT {
        CUSTOM_HANDLERS.lock()[vector as usize] = Some(handler);
    }
}

/// The single C entry every exception stub in `stubs.rs` calls into.
#[unsafe(no_mangle)]
extern "C" fn exception_common_handler(frame: *mut InterruptFrame) {
    let frame = unsafe { &*frame };
    let vector = frame.vector as usize;
    let handler = if vector < VECTOR_COUNT { CUSTOM_HANDLERS.lock()[vector] } else { None };

    match handler {
        Some(f) => f(frame),
        None => default_fatal_handler(frame),
    }
}

/// Decodes a page-fault error code's present/write/user bits.
pub struct PageFaultError {
    pub present: bool,
    pub write: bool,
    pub user_mode: bool,
}

fn decode_page_fault(error_code: u32) -> PageFaultError {
    PageFaultError {
        present: error_code.get_bit(0),
        write: error_code.get_bit(1),
        user_mode: error_code.get_bit(2),
    }
}

/// Decodes a general-protection-fault error code's selector index and
/// table source.
pub struct ProtectionFaultError {
    pub external: bool,
    pub table: SelectorTable,
    pub selector_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorTable {
    Gdt,
    Idt,
    Ldt,
}

fn decode_protection_fault(error_code: u32) -> ProtectionFaultError {
    let table = if error_code.get_bit(1) {
        SelectorTable::Idt
    } else if error_code.get_bit(2) {
        SelectorTable::Ldt
    } else {
        SelectorTable::Gdt
    };
    ProtectionFaultError {
        external: error_code.get_bit(0),
        table,
        selector_index: error_code.get_bits(3..16),
    }
}

/// Disables interrupts (already disabled by the gate type, but this is the
/// contract's entry point regardless), clears the diagnostic console,
/// prints the exception name/vector/error code/faulting address/register
/// dump, decodes page-fault and protection-fault error codes, then halts
/// forever.
fn default_fatal_handler(frame: &InterruptFrame) -> ! {
    registers::disable_interrupts();
    crate::vga::enter_panic_mode();

    let name = EXCEPTION_NAMES.get(frame.vector as usize).copied().unwrap_or("Unknown");
    crate::println!("*** FATAL EXCEPTION ***");
    crate::println!("{} (vector {})", name, frame.vector);
    crate::println!("error code: {:#010x}", frame.error_code);
    crate::println!("eip={:#010x} cs={:#06x} eflags={:#010x}", frame.eip, frame.cs, frame.eflags);
    crate::println!(
        "eax={:#010x} ebx={:#010x} ecx={:#010x} edx={:#010x}",
        frame.eax, frame.ebx, frame.ecx, frame.edx
    );
    crate::println!(
        "esi={:#010x} edi={:#010x} ebp={:#010x}",
        frame.esi, frame.edi, frame.ebp
    );
    crate::println!(
        "ds={:#06x} es={:#06x} fs={:#06x} gs={:#06x}",
        frame.ds, frame.es, frame.fs, frame.gs
    );

    if frame.vector == 14 {
        let fault_addr = registers::read_cr2();
        let decoded = decode_page_fault(frame.error_code);
        crate::println!(
            "faulting address: {:#010x} present={} write={} user={}",
            fault_addr, decoded.present, decoded.write, decoded.user_mode
        );
    }
    if frame.vector == 13 {
        let decoded = decode_protection_fault(frame.error_code);
        crate::println!(
            "selector index={} table={:?} external={}",
            decoded.selector_index, decoded.table, decoded.external
        );
    }

    crate::log_error!("fatal exception: {} (vector {})", name, frame.vector);

    loop {
        registers::hlt();
    }
}
