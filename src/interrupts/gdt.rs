//! Flat kernel-only GDT (null, code, data; no ring-3 selectors, no TSS —
//! this kernel has no privilege separation, so there is nothing to
//! transition into and nothing for a TSS to hold).
//!
//! Stands in for `x86_64::structures::gdt::GlobalDescriptorTable` (which
//! builds 64-bit descriptor formats and a ring-3-aware TSS this kernel has
//! no use for) with hand-rolled IA-32 8-byte descriptors.

use core::arch::asm;
use core::mem::size_of;
use lazy_static::lazy_static;
use spin::Mutex;

pub const KERNEL_CODE_SELECTOR: u16 = 0x08;
pub const KERNEL_DATA_SELECTOR: u16 = 0x10;

const ACCESS_PRESENT: u8 = 1 << 7;
const ACCESS_RING0: u8 = 0 << 5;
const ACCESS_CODE_DATA: u8 = 1 << 4;
const ACCESS_EXECUTABLE: u8 = 1 << 3;
const ACCESS_RW: u8 = 1 << 1;

const FLAGS_GRANULARITY_4K: u8 = 1 << 7;
const FLAGS_SIZE_32BIT: u8 = 1 << 6;

#[derive(Clone, Copy)]
#[repr(C, packed)]
struct GdtEntry {
    limit_low: u16,
    base_low: u16,
    base_mid: u8,
    access: u8,
    limit_high_flags: u8,
    base_high: u8,
}

impl GdtEntry {
    const fn null() -> Self {
        GdtEntry { limit_low: 0, base_low: 0, base_mid: 0, access: 0, limit_high_flags: 0, base_high: 0 }
    }

    /// A flat segment spanning all 4 GiB (base 0, limit 0xFFFFF with 4 KiB
    /// granularity), differing only in code vs. data access bits.
    const fn flat(access: u8) -> Self {
        GdtEntry {
            limit_low: 0xFFFF,
            base_low: 0,
            base_mid: 0,
            access,
            limit_high_flags: 0x0F | FLAGS_GRANULARITY_4K | FLAGS_SIZE_32BIT,
            base_high: 0,
        }
    }
}

#[repr(C, packed)]
struct GdtPointer {
    limit: u16,
    base: u32,
}

struct Gdt {
    entries: [GdtEntry; 3],
}

unsafe impl Send for Gdt {}

impl Gdt {
    fn new() -> Self {
        let code = GdtEntry::flat(ACCESS_PRESENT | ACCESS_RING0 | ACCESS_CODE_DATA | ACCESS_EXECUTABLE | ACCESS_RW);
        let data = GdtEntry::flat(ACCESS_PRESENT | ACCESS_RING0 | ACCESS_CODE_DATA | ACCESS_RW);
        Gdt { entries: [GdtEntry::null(), code, data] }
    }

    fn load(&self) {
        let ptr = GdtPointer {
            limit: (size_of::<[GdtEntry; 3]>() - 1) as u16,
            base: self.entries.as_ptr() as u32,
        };
        unsafe {
            asm!("lgdt [{0}]", in(reg) &ptr, options(nostack, preserves_flags));
            // Reload CS with a far return: push the target selector and the
            // address of the local label, then `retf` into it. 32-bit mode
            // has no RIP-relative addressing, so the label address is taken
            // as a plain (non-PIC) absolute displacement.
            asm!(
                "push {sel:e}",
                "lea eax, [2f]",
                "push eax",
                "retf",
                "2:",
                sel = in(reg) KERNEL_CODE_SELECTOR as u32,
                out("eax") _,
                options(nostack),
            );
            asm!(
                "mov ds, {sel:x}",
                "mov es, {sel:x}",
                "mov fs, {sel:x}",
                "mov gs, {sel:x}",
                "mov ss, {sel:x}",
                sel = in(reg) KERNEL_DATA_SELECTOR,
                options(nostack, preserves_flags),
            );
        }
    }
}

lazy_static! {
    static ref GDT: Mutex<Gdt> = Mutex::new(Gdt::new());
}

pub fn init() {
    GDT.lock().load();
}
