#![no_std]

use spin::Mutex;

// This struct is used so no one can create a `SerialWriter` from
// outside this crate.
struct Token;

pub struct SerialWriter(Token);

// Debug UART of the target platform: 8250-compatible registers at a
// 32-bit stride, already configured by the previous boot stage.
const UART_BASE: usize = 0x7000_6000;
const UART_THR: usize = UART_BASE;
const UART_LSR: usize = UART_BASE + 0x14;

const LSR_THRE: u32 = 1 << 5;

unsafe fn write_byte(byte: u8) {
    unsafe {
        while core::ptr::read_volatile(UART_LSR as *const u32) & LSR_THRE == 0 {}
        core::ptr::write_volatile(UART_THR as *mut u32, byte as u32);
    }
}

impl core::fmt::Write for SerialWriter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            self.write_char(c)?;
        }

        Ok(())
    }

    fn write_char(&mut self, c: char) -> core::fmt::Result {
        let byte = if c.is_ascii() { c as u8 } else { b'?' };
        unsafe {
            write_byte(byte);
        }
        Ok(())
    }
}

pub static SERIAL_WRITER: Mutex<SerialWriter> = Mutex::new(SerialWriter(Token));
