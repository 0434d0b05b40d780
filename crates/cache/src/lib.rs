#![no_std]

use memory::PhysAddr;

/// Size in bytes of a single data-cache line.
///
/// Fixed for the Cortex-A cores this stage targets. Reading `CTR_EL0`
/// would be more general, but every supported platform reports 64.
pub const CACHE_LINE_SIZE: usize = 64;

/// Data-cache maintenance.
///
/// The previous boot stage runs with the data cache enabled and never
/// cleans the lines it dirties, so freshly arrived memory must have its
/// lines invalidated before the contents can be trusted. Modeling this
/// as a trait keeps the ordering requirements testable on a host.
pub trait CacheOps {
    /// Invalidates the data-cache line containing `addr`.
    fn invalidate_line(&self, addr: PhysAddr);

    /// Invalidates every data-cache line covering `addr..addr + len`.
    fn invalidate_region(&self, addr: PhysAddr, len: usize);
}

/// Cache maintenance backed by the real maintenance instructions.
pub struct DataCache;

impl CacheOps for DataCache {
    fn invalidate_line(&self, addr: PhysAddr) {
        invalidate_line_raw(addr.align_down(CACHE_LINE_SIZE as u64));
        barrier();
    }

    fn invalidate_region(&self, addr: PhysAddr, len: usize) {
        let end = addr + len as u64;
        let mut line = addr.align_down(CACHE_LINE_SIZE as u64);

        while line < end {
            invalidate_line_raw(line);
            line += CACHE_LINE_SIZE as u64;
        }

        barrier();
    }
}

#[cfg(target_arch = "aarch64")]
fn invalidate_line_raw(line: PhysAddr) {
    // Safety: `dc ivac` is permitted at EL1 and above; this stage never
    // runs lower.
    unsafe {
        core::arch::asm!("dc ivac, {}", in(reg) line.to_inner());
    }
}

/// Waits for completion of all outstanding cache maintenance.
#[cfg(target_arch = "aarch64")]
pub fn barrier() {
    unsafe {
        core::arch::asm!("dsb sy");
    }
}

// Host builds only ever exercise `CacheOps` through test doubles; the
// stubs below just keep the crate compiling there.

#[cfg(not(target_arch = "aarch64"))]
fn invalidate_line_raw(_line: PhysAddr) {}

#[cfg(not(target_arch = "aarch64"))]
pub fn barrier() {}
