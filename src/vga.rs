//! Legacy text-mode VGA console, used by the default exception handler's
//! red-screen diagnostic dump and the boot banner.
//!
//! Not meant as a general-purpose driver — the text console is a
//! diagnostics-only collaborator; kept minimal accordingly — no scrolling
//! beyond simple line-wrap, no cursor hardware programming.

use crate::config::{VGA_BUFFER_ADDR, VGA_HEIGHT, VGA_WIDTH};
use core::fmt;
use lazy_static::lazy_static;
use spin::Mutex;
use volatile::Volatile;

#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(dead_code)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

#[derive(Clone, Copy)]
#[repr(transparent)]
struct ColorCode(u8);

impl ColorCode {
    fn new(fg: Color, bg: Color) -> ColorCode {
        ColorCode((bg as u8) << 4 | (fg as u8))
    }
}

#[derive(Clone, Copy)]
#[repr(C)]
struct ScreenChar {
    ascii: u8,
    color: ColorCode,
}

#[repr(transparent)]
struct Buffer {
    chars: [[Volatile<ScreenChar>; VGA_WIDTH]; VGA_HEIGHT],
}

pub struct Writer {
    col: usize,
    row: usize,
    color: ColorCode,
    buffer: &'static mut Buffer,
}

impl Writer {
    pub fn set_color(&mut self, fg: Color, bg: Color) {
        self.color = ColorCode::new(fg, bg);
    }

    pub fn clear(&mut self) {
        let blank = ScreenChar { ascii: b' ', color: self.color };
        for row in 0..VGA_HEIGHT {
            for col in 0..VGA_WIDTH {
                self.buffer.chars[row][col].write(blank);
            }
        }
        self.col = 0;
        self.row = 0;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            let blank = ScreenChar { ascii: b' ', color: self.color };
            self.buffer.chars[self.row][self.col].write(blank);
        }
    }

    fn newline(&mut self) {
        self.col = 0;
        if self.row + 1 < VGA_HEIGHT {
            self.row += 1;
        } else {
            for row in 1..VGA_HEIGHT {
                for col in 0..VGA_WIDTH {
                    let c = self.buffer.chars[row][col].read();
                    self.buffer.chars[row - 1][col].write(c);
                }
            }
            let blank = ScreenChar { ascii: b' ', color: self.color };
            for col in 0..VGA_WIDTH {
                self.buffer.chars[VGA_HEIGHT - 1][col].write(blank);
            }
        }
    }

    pub fn write_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => self.newline(),
            byte => {
                if self.col >= VGA_WIDTH {
                    self.newline();
                }
                self.buffer.chars[self.row][self.col].write(ScreenChar { ascii: byte, color: self.color });
                self.col += 1;
            }
        }
    }

    pub fn write_str_raw(&mut self, s: &str) {
        for byte in s.bytes() {
            match byte {
                0x20..=0x7e | b'\n' => self.write_byte(byte),
                _ => self.write_byte(0xfe),
            }
        }
    }
}

impl fmt::Write for Writer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_str_raw(s);
        Ok(())
    }
}

lazy_static! {
    pub static ref WRITER: Mutex<Writer> = Mutex::new(Writer {
        col: 0,
        row: 0,
        color: ColorCode::new(Color::LightGray, Color::Black),
        buffer: unsafe { &mut *(VGA_BUFFER_ADDR as *mut Buffer) },
    });
}

pub fn init() {
    WRITER.lock().clear();
}

/// Switches the whole screen to the red-on-black "fatal" palette and clears
/// it, for the kernel panic diagnostic screen.
pub fn enter_panic_mode() {
    let mut w = WRITER.lock();
    w.set_color(Color::White, Color::Red);
    w.clear();
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    WRITER.lock().write_fmt(args).expect("printing to VGA failed");
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => { $crate::vga::_print(format_args!($($arg)*)) };
}

#[macro_export]
macro_rules! println {
    () => { $crate::print!("\n") };
    ($($arg:tt)*) => { $crate::print!("{}\n", format_args!($($arg)*)) };
}
