//! Init glue: wires the frame allocator's pool over the memory the boot
//! info reports, then hands the heap one contiguous frame run.

pub mod frame_allocator;
pub mod heap;

use crate::boot::BootInfo;
use crate::config::{KERNEL_HEAP_SIZE, PAGE_SIZE};
use frame_allocator::FrameAllocator;
use lazy_static::lazy_static;
use spin::Mutex;

/// Physical memory below this address is reserved unconditionally for the
/// kernel image, the BIOS data area, and legacy video memory — kept as a
/// fixed clamp rather than computed from the kernel's actual end address,
/// since this crate has no symbol table to compute that from.
const RESERVED_PREFIX: usize = 0x20_0000;

lazy_static! {
    pub static ref FRAME_ALLOCATOR: Mutex<FrameAllocator> = Mutex::new(FrameAllocator::new());
}

/// Brings up the frame pool from the boot-reported memory size, reserves the
/// kernel's own low-memory footprint, then carves one contiguous frame run
/// for the kernel heap and installs it as the global allocator's backing.
pub fn init(boot_info: &BootInfo) {
    let total_bytes = boot_info.reported_memory_bytes().unwrap_or(0) as usize;

    let mut frames = FRAME_ALLOCATOR.lock();
    frames.init(0, total_bytes);
    frames.reserve(0, RESERVED_PREFIX);

    let heap_frames = KERNEL_HEAP_SIZE.div_ceil(PAGE_SIZE);
    let heap_base = frames.alloc_contiguous(heap_frames);
    drop(frames);

    if heap_base == 0 {
        crate::panic_halt("memory", line!(), format_args!("kernel heap allocation failed at boot"));
    }

    unsafe { heap::init(heap_base, heap_frames * PAGE_SIZE) };
}
