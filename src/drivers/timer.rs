//! The legacy PIT (8253/8254) programmed as a fixed-rate tick source
//! driving scheduler preemption.

use crate::arch::io::Port;
use crate::arch::registers::without_interrupts;
use crate::config::{PIT_BASE_FREQUENCY_HZ, PIT_CHANNEL0_DATA, PIT_COMMAND, SCHEDULER_TICK_HZ};
use crate::interrupts::irq;
use lazy_static::lazy_static;
use spin::Mutex;

const PIT_CHANNEL0: u8 = 0b00;
const PIT_ACCESS_LOHI: u8 = 0b11;
const PIT_MODE_RATE_GENERATOR: u8 = 0b010;
const PIT_BINARY: u8 = 0;
const TIMER_IRQ_LINE: u8 = 0;

/// Incremented only from interrupt context, read only with interrupts
/// disabled — single CPU, so no `Atomic*` is needed.
static mut TICKS: u32 = 0;

pub type TickCallback = fn();

lazy_static! {
    static ref CALLBACK: Mutex<Option<TickCallback>> = Mutex::new(None);
}

/// Programs channel 0 for mode 2 (rate generator), binary counting,
/// low-then-high byte order, with the divisor computed from `desired_hz`,
/// then registers this driver's own vector-32 handler and unmasks line 0.
pub fn init(desired_hz: u32) {
    let divisor = (PIT_BASE_FREQUENCY_HZ / desired_hz).clamp(1, u16::MAX as u32) as u16;
    let mode_byte = (PIT_CHANNEL0 << 6) | (PIT_ACCESS_LOHI << 4) | (PIT_MODE_RATE_GENERATOR << 1) | PIT_BINARY;

    let mut command: Port<u8> = Port::new(PIT_COMMAND);
    let mut data: Port<u8> = Port::new(PIT_CHANNEL0_DATA);
    unsafe {
        command.write(mode_byte);
        data.write((divisor & 0xFF) as u8);
        data.write((divisor >> 8) as u8);
    }

    irq::register_handler(TIMER_IRQ_LINE, on_irq0);
    irq::enable(TIMER_IRQ_LINE);
}

/// Runs in interrupt context, after EOI. Increments the tick counter, then
/// calls the scheduler's registered callback if one is set. Must not block
/// and must not touch the heap or frame allocator.
fn on_irq0(_line: u8) {
    unsafe {
        let ticks = &mut *core::ptr::addr_of_mut!(TICKS);
        *ticks = ticks.wrapping_add(1);
    }
    if let Some(callback) = *CALLBACK.lock() {
        callback();
    }
}

/// Installs the scheduler's per-tick callback.
pub fn register_tick_callback(callback: TickCallback) {
    *CALLBACK.lock() = Some(callback);
}

pub fn ticks() -> u32 {
    without_interrupts(|| unsafe { *core::ptr::addr_of!(TICKS) })
}

pub fn uptime_ms() -> u64 {
    ticks() as u64 * 1000 / SCHEDULER_TICK_HZ as u64
}

pub fn uptime_s() -> u64 {
    uptime_ms() / 1000
}

/// Busy-waits on the tick counter. Intended for pre-scheduler
/// initialisation only — once tasks exist, sleeping should go through
/// `task::sleep` instead.
pub fn sleep_ms(ms: u32) {
    let target = (ms as u64 * SCHEDULER_TICK_HZ as u64 / 1000) as u32;
    let start = ticks();
    while ticks().wrapping_sub(start) < target {
        core::hint::spin_loop();
    }
}
