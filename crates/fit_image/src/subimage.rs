use cache::CacheOps;
use log::info;
use memory::PhysAddr;

use crate::{blob::TreeBlob, codec::CellValue, LoadError};

/// Node the previous stage stores its boot parameters under.
const CHOSEN_PATH: &str = "/chosen";

/// Property carrying the composite blob's address. The previous stage
/// reuses the Linux initrd convention rather than inventing its own.
const SUBIMAGE_PROP: &str = "linux,initrd-start";

/// Finds and validates the composite blob bundling the boot payloads.
///
/// When the hand-off tree names no composite image, the hand-off blob
/// itself is returned unchanged: being launched without payloads is a
/// supported degraded configuration, not an error. Every other failure
/// is fatal.
pub fn locate_composite<'a, C: CacheOps>(
    cache: &C,
    handoff: &TreeBlob<'a>,
) -> Result<TreeBlob<'a>, LoadError> {
    let chosen = handoff.node(CHOSEN_PATH)?;

    let prop = match chosen.property(SUBIMAGE_PROP) {
        Some(prop) => prop,
        None => {
            info!("no composite image declared, continuing with the hand-off tree");
            return Ok(handoff.clone());
        }
    };

    let addr = match CellValue::parse(prop.value)? {
        CellValue::Single(addr) => PhysAddr::new(addr as u64),
        CellValue::Pair(addr) => PhysAddr::new(addr),
    };

    info!("composite image declared at {:?}", addr);

    // Safety: the address comes from the previous boot stage, which owns
    // the whole memory map at this point; nothing else lives there.
    unsafe { TreeBlob::from_addr(cache, addr) }
}
