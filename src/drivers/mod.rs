//! Driver init glue. Keyboard, ATA, and TTY drivers aren't part of this
//! kernel's scope and were left out.

pub mod timer;

pub fn init() {
    timer::init(crate::config::SCHEDULER_TICK_HZ);
}
