use log::{info, warn};
use memory::PhysAddr;

/// Magic an AArch64 `Image` header carries at byte offset 56.
const IMAGE_MAGIC: u32 = 0x644d_5241; // "ARM\x64"
const IMAGE_MAGIC_OFFSET: usize = 56;

/// Hands control to a relocated kernel, passing the device tree in the
/// register the boot protocol reserves for it. Never returns; the stack
/// and all remaining state are the kernel's to reuse or tear down.
///
/// ### Safety
/// `kernel` must start with the entry point of a kernel prepared for
/// this machine state, and `tree` must stay untouched until the kernel
/// has consumed it.
pub unsafe fn launch(kernel: &[u8], tree: &[u8]) -> ! {
    let magic = kernel
        .get(IMAGE_MAGIC_OFFSET..IMAGE_MAGIC_OFFSET + 4)
        .map(|bytes| u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));

    if magic != Some(IMAGE_MAGIC) {
        warn!("kernel image has an invalid magic, attempting to boot anyways");
    }

    info!("launching hypervisor kernel...");

    // Everything relocated or patched has to have left this core before
    // the kernel (or another master) looks at it.
    cache::barrier();

    let entry = PhysAddr::new(kernel.as_ptr() as u64);
    let tree_addr = PhysAddr::new(tree.as_ptr() as u64);

    // Safety:
    // Per the function contract `entry` is executable kernel code
    // expecting the boot protocol's register state.
    unsafe {
        let kernel_entry: extern "C" fn(usize) -> ! =
            core::mem::transmute(entry.to_inner() as usize);
        kernel_entry(tree_addr.to_inner() as usize)
    }
}
