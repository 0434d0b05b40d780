#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]
#![deny(unsafe_op_in_unsafe_fn)]

mod launch;

#[cfg(all(target_arch = "aarch64", target_os = "none"))]
mod entry;
#[cfg(all(target_arch = "aarch64", target_os = "none"))]
mod panic_handler;

use cache::DataCache;
use fit_image::{LoadError, TreeBlob};
use log::info;
use memory::{Extent, PhysAddr};

// Paths the image builder gives the boot payloads inside the composite.
const HYPERVISOR_PATH: &str = "/images/xen_kernel@1";
const TARGET_TREE_PATH: &str = "/images/fdt@1";
const KERNEL_PATH: &str = "/images/linux_kernel@1";
const RAMDISK_PATH: &str = "/images/ramdisk@1";

// Module paths the hypervisor discovers its payloads under.
const KERNEL_MODULE_PATH: &str = "/module@0";
const RAMDISK_MODULE_PATH: &str = "/module@1";

#[no_mangle]
pub extern "C" fn rust_entry(handoff_ptr: usize, el: usize) -> ! {
    // Initialize logger
    boot_logger::init();

    info!("initializing boot shim...");
    info!("  current execution level:     EL{}", el);
    info!("  hand-off tree resident at:   {:#x}", handoff_ptr);

    let cache = DataCache;

    // Safety:
    // The pointer is what the previous stage handed over in x0, and the
    // whole address space is exclusively ours until control transfer.
    let handoff = unsafe { TreeBlob::from_addr(&cache, PhysAddr::new(handoff_ptr as u64)) }
        .expect("hand-off blob is not a valid device tree");

    info!("  hand-off tree size:          {} bytes", handoff.total_size());

    let composite =
        fit_image::locate_composite(&cache, &handoff).expect("unable to locate the composite image");

    // A hand-off tree without a composite image means the previous stage
    // already placed a kernel itself; boot that one directly.
    if core::ptr::eq(composite.data().as_ptr(), handoff.data().as_ptr()) {
        boot_preloaded_kernel(&handoff);
    }

    // Safety (here and below):
    // Load addresses come from the composite blob, whose builder owns
    // the platform's memory layout; nothing else runs or claims memory
    // during this stage.
    let hypervisor = unsafe { fit_image::load_component(&cache, &composite, HYPERVISOR_PATH) }
        .expect("unable to load the hypervisor kernel");

    let mut tree = unsafe { fit_image::load_tree(&cache, &composite, TARGET_TREE_PATH) }
        .expect("unable to load the hypervisor device tree");

    let kernel = unsafe { fit_image::load_component(&cache, &composite, KERNEL_PATH) }
        .expect("unable to load the guest kernel");

    fit_image::declare_module(
        &mut tree,
        KERNEL_MODULE_PATH,
        "multiboot,kernel",
        Extent::from_slice(kernel),
    )
    .expect("unable to declare the guest kernel module");

    // The ramdisk is optional; everything else is not.
    match unsafe { fit_image::load_component(&cache, &composite, RAMDISK_PATH) } {
        Ok(ramdisk) => {
            fit_image::declare_module(
                &mut tree,
                RAMDISK_MODULE_PATH,
                "multiboot,ramdisk",
                Extent::from_slice(ramdisk),
            )
            .expect("unable to declare the ramdisk module");
        }
        Err(LoadError::MissingComponent) => info!("no ramdisk bundled, skipping"),
        Err(err) => panic!("unable to load the ramdisk: {:?}", err),
    }

    fit_image::propagate_memory(&mut tree, &handoff)
        .expect("unable to propagate the memory topology");

    // Safety:
    // The hypervisor kernel was just placed at its load address and the
    // patched tree stays untouched from here on.
    unsafe { launch::launch(hypervisor, tree.as_bytes()) }
}

/// Degraded boot: no composite image was bundled, so hand control to the
/// kernel module the previous stage declared in its own tree.
fn boot_preloaded_kernel(handoff: &TreeBlob<'_>) -> ! {
    let module = fit_image::module_extent(handoff, KERNEL_MODULE_PATH)
        .expect("no composite image and no pre-loaded kernel module");

    info!("no composite image, launching the pre-loaded kernel");

    // Safety:
    // The extent was declared by the stage that placed the image there.
    let kernel = unsafe {
        core::slice::from_raw_parts(module.start().as_ptr::<u8>(), module.size() as usize)
    };

    // Safety:
    // The kernel is already resident; the hand-off tree stays valid.
    unsafe { launch::launch(kernel, handoff.data()) }
}

// The workspace also builds on hosts for testing; the real entry point
// is `_start` in entry.rs.
#[cfg(not(target_os = "none"))]
fn main() {}
