#![no_std]

use core::ops::Deref;

use arrayvec::ArrayString;
use spin::Mutex;

/// Size in bytes of the in-memory boot log.
///
/// Records past this are dropped; the log exists to be dumped over the
/// UART on panic, not to be complete.
pub const BOOT_LOG_BUFFER_SIZE: usize = 16 * 1024;

static BUFFER: Mutex<ArrayString<BOOT_LOG_BUFFER_SIZE>> = Mutex::new(ArrayString::new_const());

struct BootLogger;

impl log::Log for BootLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        use core::fmt::Write;

        let mut buffer = BUFFER.lock();
        // ignore the result, a full buffer just drops the record
        let _ = write!(buffer, "[{:>5}] {}\n", record.level(), record.args());
    }

    fn flush(&self) {}
}

pub fn init() {
    let _ = log::set_logger(&BootLogger);
    log::set_max_level(log::LevelFilter::Trace);
}

pub fn get<F: FnOnce(&ArrayString<BOOT_LOG_BUFFER_SIZE>) -> ()>(f: F) {
    let guard = BUFFER.lock();
    f(guard.deref())
}
