//! The IRQ dispatcher: convert vector to line, detect spurious 7/15 with
//! the correct early-EOI policy, count, issue EOI before the handler runs,
//! then call the registered handler (or drop silently).

use super::frame::InterruptFrame;
use super::pic::PICS;
use lazy_static::lazy_static;
use spin::Mutex;

const IRQ_LINES: usize = 16;

pub type IrqHandler = fn(u8);

lazy_static! {
    static ref HANDLERS: Mutex<[Option<IrqHandler>; IRQ_LINES]> = Mutex::new([None; IRQ_LINES]);
}

/// Per-line fire counts. Incremented only from interrupt context, read
/// only with interrupts disabled — a single CPU makes that sufficient, so
/// this is a plain array, not a `Mutex` or `Atomic*`.
static mut COUNTERS: [u32; IRQ_LINES] = [0; IRQ_LINES];

/// Registers the handler invoked after EOI for hardware line `line` (0-15).
pub fn register_handler(line: u8, handler: IrqHandler) {
    if (line as usize) < IRQ_LINES {
        HANDLERS.lock()[line as usize] = Some(handler);
    }
}

pub fn enable(line: u8) {
    PICS.lock().enable(line);
}

pub fn disable(line: u8) {
    PICS.lock().disable(line);
}

/// Number of times `line` has fired a non-spurious interrupt.
pub fn line_count(line: u8) -> u32 {
    crate::arch::registers::without_interrupts(|| {
        let counters = unsafe { &*core::ptr::addr_of!(COUNTERS) };
        counters.get(line as usize).copied().unwrap_or(0)
    })
}

/// The single C entry every IRQ stub in `stubs.rs` calls into.
#[unsafe(no_mangle)]
extern "C" fn irq_common_handler(frame: *mut InterruptFrame) {
    let frame = unsafe { &*frame };
    let line = match frame.irq_line() {
        Some(line) => line,
        None => return,
    };

    if line == 7 || line == 15 {
        let spurious = PICS.lock().is_spurious(line);
        if spurious {
            if line == 15 {
                PICS.lock().send_eoi_master_only();
            }
            return;
        }
    }

    if let Some(counter) = unsafe { (*core::ptr::addr_of_mut!(COUNTERS)).get_mut(line as usize) } {
        *counter = counter.wrapping_add(1);
    }

    PICS.lock().send_eoi(line);

    let handler = HANDLERS.lock()[line as usize];
    if let Some(handler) = handler {
        handler(line);
    }
}
