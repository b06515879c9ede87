//! The legacy cascaded 8259 pair. Hand-rolled instead of using the
//! `pic8259` crate, whose `ChainedPics` never exposes an in-service-register
//! read, so it can't tell a spurious interrupt from a real one.

use crate::arch::io::{io_wait, Port};
use crate::config::{PIC1_COMMAND, PIC1_DATA, PIC1_OFFSET, PIC2_COMMAND, PIC2_DATA, PIC2_OFFSET, PIC_EOI};
use lazy_static::lazy_static;
use spin::Mutex;

const ICW1_ICW4: u8 = 0x01;
const ICW1_INIT: u8 = 0x10;
const ICW4_8086: u8 = 0x01;

/// OCW3 bit selecting the in-service register on the next read of the
/// command port, vs. the default interrupt-request register.
const OCW3_READ_ISR: u8 = 0x0B;

struct Pic {
    command: Port<u8>,
    data: Port<u8>,
}

impl Pic {
    const fn new(command_port: u16, data_port: u16) -> Self {
        Pic { command: Port::new(command_port), data: Port::new(data_port) }
    }

    unsafe fn read_isr(&mut self) -> u8 {
        unsafe {
            self.command.write(OCW3_READ_ISR);
            self.command.read()
        }
    }
}

pub struct ChainedPics {
    master: Pic,
    slave: Pic,
}

impl ChainedPics {
    const fn new() -> Self {
        ChainedPics {
            master: Pic::new(PIC1_COMMAND, PIC1_DATA),
            slave: Pic::new(PIC2_COMMAND, PIC2_DATA),
        }
    }

    /// Standard four-word initialisation sequence, remapping master
    /// lines 0-7 to vectors 32-39 and slave lines 8-15 to vectors 40-47,
    /// cascade on master line 2 / slave identity 2, then masks everything.
    fn init(&mut self) {
        unsafe {
            self.master.command.write(ICW1_INIT | ICW1_ICW4);
            io_wait();
            self.slave.command.write(ICW1_INIT | ICW1_ICW4);
            io_wait();

            self.master.data.write(PIC1_OFFSET);
            io_wait();
            self.slave.data.write(PIC2_OFFSET);
            io_wait();

            self.master.data.write(1 << 2);
            io_wait();
            self.slave.data.write(2);
            io_wait();

            self.master.data.write(ICW4_8086);
            io_wait();
            self.slave.data.write(ICW4_8086);
            io_wait();

            self.master.data.write(0xFF);
            self.slave.data.write(0xFF);
        }
    }

    /// Clears `line`'s mask bit; if the line lives on the slave, also
    /// unmasks master line 2 (the cascade).
    pub fn enable(&mut self, line: u8) {
        unsafe {
            if line < 8 {
                let mask = self.master.data.read();
                self.master.data.write(mask & !(1 << line));
            } else {
                let slave_line = line - 8;
                let mask = self.slave.data.read();
                self.slave.data.write(mask & !(1 << slave_line));
                let master_mask = self.master.data.read();
                self.master.data.write(master_mask & !(1 << 2));
            }
        }
    }

    pub fn disable(&mut self, line: u8) {
        unsafe {
            if line < 8 {
                let mask = self.master.data.read();
                self.master.data.write(mask | (1 << line));
            } else {
                let slave_line = line - 8;
                let mask = self.slave.data.read();
                self.slave.data.write(mask | (1 << slave_line));
            }
        }
    }

    /// Lines >= 8 require an EOI to both chips; lines < 8, master only.
    pub fn send_eoi(&mut self, line: u8) {
        unsafe {
            if line >= 8 {
                self.slave.command.write(PIC_EOI);
            }
            self.master.command.write(PIC_EOI);
        }
    }

    /// EOI policy for a spurious line 15: the cascade request the master
    /// serviced was real even though the slave's own line wasn't, so only
    /// the master needs acknowledging.
    pub fn send_eoi_master_only(&mut self) {
        unsafe { self.master.command.write(PIC_EOI) };
    }

    /// Only meaningful for lines 7 and 15: reads the in-service register of
    /// the chip that owns `line` and reports whether the line's ISR bit is
    /// clear, meaning no real device raised it.
    pub fn is_spurious(&mut self, line: u8) -> bool {
        match line {
            7 => unsafe { self.master.read_isr() & (1 << 7) == 0 },
            15 => unsafe { self.slave.read_isr() & (1 << 7) == 0 },
            _ => false,
        }
    }
}

lazy_static! {
    pub static ref PICS: Mutex<ChainedPics> = Mutex::new(ChainedPics::new());
}

pub fn init() {
    PICS.lock().init();
}
