//! Init glue: GDT, IDT, the legacy PIC pair, and the IRQ dispatcher layer
//! on top of it.

pub mod exceptions;
pub mod frame;
pub mod gdt;
pub mod idt;
pub mod irq;
pub mod pic;
mod stubs;

pub use frame::InterruptFrame;

pub fn init() {
    gdt::init();
    idt::init();
    pic::init();
}
