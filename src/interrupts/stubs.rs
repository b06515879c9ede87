//! The 48 assembly entry stubs: one per exception vector (0-31) and one per
//! remapped hardware IRQ line (32-47). Each
//! stub's only job is to make the interrupt frame uniform — push a
//! synthetic error code where the CPU doesn't supply one, push the vector
//! number, then fall into one of two shared tails — before handing off to
//! Rust. Vectors 48-255 are left pointing at a single shared no-op (see
//! `idt.rs`); nothing in this kernel ever raises them.
//!
//! Generated mechanically from the vector list and the seven exception
//! vectors that carry a hardware error code (8, 10-14, 17); kept as one
//! `global_asm!` block, standing in for the `extern "x86-interrupt"`
//! trampolines the `x86_64` crate generates on 64-bit targets, since IA-32
//! has no such calling convention for rustc to emit.

use core::arch::global_asm;

global_asm!(
    r#"
.intel_syntax noprefix
.text

exception_tail:
    pushad
    push ds
    push es
    push fs
    push gs
    mov ax, 0x10
    mov ds, ax
    mov es, ax
    mov fs, ax
    mov gs, ax
    push esp
    call exception_common_handler
    add esp, 4
    pop gs
    pop fs
    pop es
    pop ds
    popad
    add esp, 8
    iretd

irq_tail:
    pushad
    push ds
    push es
    push fs
    push gs
    mov ax, 0x10
    mov ds, ax
    mov es, ax
    mov fs, ax
    mov gs, ax
    push esp
    call irq_common_handler
    add esp, 4
    pop gs
    pop fs
    pop es
    pop ds
    popad
    add esp, 8
    iretd

unhandled_vector_stub:
    iretd

.global isr_stub_0
isr_stub_0:
    push 0
    push 0
    jmp exception_tail

.global isr_stub_1
isr_stub_1:
    push 0
    push 1
    jmp exception_tail

.global isr_stub_2
isr_stub_2:
    push 0
    push 2
    jmp exception_tail

.global isr_stub_3
isr_stub_3:
    push 0
    push 3
    jmp exception_tail

.global isr_stub_4
isr_stub_4:
    push 0
    push 4
    jmp exception_tail

.global isr_stub_5
isr_stub_5:
    push 0
    push 5
    jmp exception_tail

.global isr_stub_6
isr_stub_6:
    push 0
    push 6
    jmp exception_tail

.global isr_stub_7
isr_stub_7:
    push 0
    push 7
    jmp exception_tail

.global isr_stub_8
isr_stub_8:
    push 8
    jmp exception_tail

.global isr_stub_9
isr_stub_9:
    push 0
    push 9
    jmp exception_tail

.global isr_stub_10
isr_stub_10:
    push 10
    jmp exception_tail

.global isr_stub_11
isr_stub_11:
    push 11
    jmp exception_tail

.global isr_stub_12
isr_stub_12:
    push 12
    jmp exception_tail

.global isr_stub_13
isr_stub_13:
    push 13
    jmp exception_tail

.global isr_stub_14
isr_stub_14:
    push 14
    jmp exception_tail

.global isr_stub_15
isr_stub_15:
    push 0
    push 15
    jmp exception_tail

.global isr_stub_16
isr_stub_16:
    push 0
    push 16
    jmp exception_tail

.global isr_stub_17
isr_stub_17:
    push 17
    jmp exception_tail

.global isr_stub_18
isr_stub_18:
    push 0
    push 18
    jmp exception_tail

.global isr_stub_19
isr_stub_19:
    push 0
    push 19
    jmp exception_tail

.global isr_stub_20
isr_stub_20:
    push 0
    push 20
    jmp exception_tail

.global isr_stub_21
isr_stub_21:
    push 0
    push 21
    jmp exception_tail

.global isr_stub_22
isr_stub_22:
    push 0
    push 22
    jmp exception_tail

.global isr_stub_23
isr_stub_23:
    push 0
    push 23
    jmp exception_tail

.global isr_stub_24
isr_stub_24:
    push 0
    push 24
    jmp exception_tail

.global isr_stub_25
isr_stub_25:
    push 0
    push 25
    jmp exception_tail

.global isr_stub_26
isr_stub_26:
    push 0
    push 26
    jmp exception_tail

.global isr_stub_27
isr_stub_27:
    push 0
    push 27
    jmp exception_tail

.global isr_stub_28
isr_stub_28:
    push 0
    push 28
    jmp exception_tail

.global isr_stub_29
isr_stub_29:
    push 0
    push 29
    jmp exception_tail

.global isr_stub_30
isr_stub_30:
    push 0
    push 30
    jmp exception_tail

.global isr_stub_31
isr_stub_31:
    push 0
    push 31
    jmp exception_tail

.global isr_stub_32
isr_stub_32:
    push 0
    push 32
    jmp irq_tail

.global isr_stub_33
isr_stub_33:
    push 0
    push 33
    jmp irq_tail

.global isr_stub_34
isr_stub_34:
    push 0
    push 34
    jmp irq_tail

.global isr_stub_35
isr_stub_35:
    push 0
    push 35
    jmp irq_tail

.global isr_stub_36
isr_stub_36:
    push 0
    push 36
    jmp irq_tail

.global isr_stub_37
isr_stub_37:
    push 0
    push 37
    jmp irq_tail

.global isr_stub_38
isr_stub_38:
    push 0
    push 38
    jmp irq_tail

.global isr_stub_39
isr_stub_39:
    push 0
    push 39
    jmp irq_tail

.global isr_stub_40
isr_stub_40:
    push 0
    push 40
    jmp irq_tail

.global isr_stub_41
isr_stub_41:
    push 0
    push 41
    jmp irq_tail

.global isr_stub_42
isr_stub_42:
    push 0
    push 42
    jmp irq_tail

.global isr_stub_43
isr_stub_43:
    push 0
    push 43
    jmp irq_tail

.global isr_stub_44
isr_stub_44:
    push 0
    push 44
    jmp irq_tail

.global isr_stub_45
isr_stub_45:
    push 0
    push 45
    jmp irq_tail

.global isr_stub_46
isr_stub_46:
    push 0
    push 46
    jmp irq_tail

.global isr_stub_47
isr_stub_47:
    push 0
    push 47
    jmp irq_tail
"#
);

unsafe extern "C" {
    pub fn isr_stub_0();
    pub fn isr_stub_1();
    pub fn isr_stub_2();
    pub fn isr_stub_3();
    pub fn isr_stub_4();
    pub fn isr_stub_5();
    pub fn isr_stub_6();
    pub fn isr_stub_7();
    pub fn isr_stub_8();
    pub fn isr_stub_9();
    pub fn isr_stub_10();
    pub fn isr_stub_11();
    pub fn isr_stub_12();
    pub fn isr_stub_13();
    pub fn isr_stub_14();
    pub fn isr_stub_15();
    pub fn isr_stub_16();
    pub fn isr_stub_17();
    pub fn isr_stub_18();
    pub fn isr_stub_19();
    pub fn isr_stub_20();
    pub fn isr_stub_21();
    pub fn isr_stub_22();
    pub fn isr_stub_23();
    pub fn isr_stub_24();
    pub fn isr_stub_25();
    pub fn isr_stub_26();
    pub fn isr_stub_27();
    pub fn isr_stub_28();
    pub fn isr_stub_29();
    pub fn isr_stub_30();
    pub fn isr_stub_31();
    pub fn isr_stub_32();
    pub fn isr_stub_33();
    pub fn isr_stub_34();
    pub fn isr_stub_35();
    pub fn isr_stub_36();
    pub fn isr_stub_37();
    pub fn isr_stub_38();
    pub fn isr_stub_39();
    pub fn isr_stub_40();
    pub fn isr_stub_41();
    pub fn isr_stub_42();
    pub fn isr_stub_43();
    pub fn isr_stub_44();
    pub fn isr_stub_45();
    pub fn isr_stub_46();
    pub fn isr_stub_47();
    pub fn unhandled_vector_stub();
}

/// Vector addresses in table order, 0..48, for `idt::init` to install.
pub const STUBS: [unsafe extern "C" fn(); 48] = [
    isr_stub_0,
    isr_stub_1,
    isr_stub_2,
    isr_stub_3,
    isr_stub_4,
    isr_stub_5,
    isr_stub_6,
    isr_stub_7,
    isr_stub_8,
    isr_stub_9,
    isr_stub_10,
    isr_stub_11,
    isr_stub_12,
    isr_stub_13,
    isr_stub_14,
    isr_stub_15,
    isr_stub_16,
    isr_stub_17,
    isr_stub_18,
    isr_stub_19,
    isr_stub_20,
    isr_stub_21,
    isr_stub_22,
    isr_stub_23,
    isr_stub_24,
    isr_stub_25,
    isr_stub_26,
    isr_stub_27,
    isr_stub_28,
    isr_stub_29,
    isr_stub_30,
    isr_stub_31,
    isr_stub_32,
    isr_stub_33,
    isr_stub_34,
    isr_stub_35,
    isr_stub_36,
    isr_stub_37,
    isr_stub_38,
    isr_stub_39,
    isr_stub_40,
    isr_stub_41,
    isr_stub_42,
    isr_stub_43,
    isr_stub_44,
    isr_stub_45,
    isr_stub_46,
    isr_stub_47,
];
