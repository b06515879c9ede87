//! Compile-time knobs, collected in one place per the boot contract's
//! "single config header" requirement.

/// Enables timer-driven preemption. With this off, tasks only yield voluntarily.
pub const SCHEDULER_PREEMPTIVE: bool = true;

/// Size of the kernel heap in bytes.
pub const KERNEL_HEAP_SIZE: usize = 64 * 1024;

/// Task table capacity.
pub const MAX_TASKS: usize = 64;

/// Timer interrupt frequency in Hz.
pub const SCHEDULER_TICK_HZ: u32 = 100;

/// Ticks granted to a task per round-robin time slice.
pub const SCHEDULER_TIME_SLICE: u32 = 10;

/// Cap on the physical memory pool the frame allocator will manage.
pub const MAX_PHYSICAL_MEMORY: usize = 128 * 1024 * 1024;

/// Physical frame / page size.
pub const PAGE_SIZE: usize = 4096;

/// Default kernel task stack size.
pub const DEFAULT_STACK_SIZE: usize = 16 * 1024;

/// Minimum kernel task stack size (frame-aligned).
pub const MIN_STACK_SIZE: usize = PAGE_SIZE;

/// Legacy PIC command/data ports.
pub const PIC1_COMMAND: u16 = 0x20;
pub const PIC1_DATA: u16 = 0x21;
pub const PIC2_COMMAND: u16 = 0xA0;
pub const PIC2_DATA: u16 = 0xA1;
pub const PIC_EOI: u8 = 0x20;

/// Remapped hardware IRQ vector base (master/slave).
pub const PIC1_OFFSET: u8 = 32;
pub const PIC2_OFFSET: u8 = 40;

/// PIT (8253/8254) ports.
pub const PIT_CHANNEL0_DATA: u16 = 0x40;
pub const PIT_COMMAND: u16 = 0x43;
pub const PIT_BASE_FREQUENCY_HZ: u32 = 1_193_182;

/// Fixed 32-bit heap block integrity magic.
pub const HEAP_MAGIC: u32 = 0xDEAD_BEEF;

/// Legacy text-mode video buffer physical address, 80x25x2 bytes/cell.
pub const VGA_BUFFER_ADDR: usize = 0xB8000;
pub const VGA_WIDTH: usize = 80;
pub const VGA_HEIGHT: usize = 25;

/// Interrupt vector reserved for system calls (out of scope: no dispatcher here).
pub const SYSCALL_VECTOR: u8 = 0x80;
