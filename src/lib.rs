#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod arch;
pub mod boot;
pub mod config;
pub mod drivers;
pub mod interrupts;
pub mod memory;
pub mod serial;
pub mod task;
pub mod vga;

use core::panic::PanicInfo;
use core::sync::atomic::{AtomicBool, Ordering};

/// Brings every subsystem up in dependency order and falls into the
/// scheduler, which never returns. Called once, by [`boot::kernel_main`].
pub fn kernel_init(boot_info_addr: usize) -> ! {
    vga::init();
    serial::init();
    log_info!("protokernel booting");

    let boot_info = unsafe { boot::BootInfo::from_addr(boot_info_addr) };

    interrupts::init();
    log_info!("gdt, idt, pic initialised");

    memory::init(boot_info);
    log_info!("frame allocator and heap initialised");

    drivers::init();
    log_info!("timer initialised at {} Hz", config::SCHEDULER_TICK_HZ);

    task::init();
    log_info!("scheduler initialised, {} task slots", config::MAX_TASKS);

    println!("protokernel is running.");

    task::sched::start();
}

/// Guards against re-entering the panic path from within itself (e.g. a
/// panic while formatting the panic message).
static PANICKING: AtomicBool = AtomicBool::new(false);

/// The single fatal-halt path: disables interrupts, paints the diagnostic
/// region red, prints the message and location, and halts. Every
/// allocator/resource-exhaustion fatality in this kernel funnels through
/// here rather than unwinding (there is no unwinder in `no_std`).
pub fn panic_halt(file: &str, line: u32, message: core::fmt::Arguments) -> ! {
    arch::registers::disable_interrupts();
    if !PANICKING.swap(true, Ordering::SeqCst) {
        vga::enter_panic_mode();
        println!("KERNEL PANIC: {} ({}:{})", message, file, line);
    }
    log_error!("panic at {}:{}: {}", file, line, message);
    loop {
        arch::registers::hlt();
    }
}

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    let location = info.location();
    let file = location.map(|l| l.file()).unwrap_or("<unknown>");
    let line = location.map(|l| l.line()).unwrap_or(0);
    panic_halt(file, line, format_args!("{}", info.message()))
}
