use cache::CacheOps;
use dtb_edit::Dtb;
use log::info;
use memory::{Extent, PhysAddr};

use crate::{
    blob::{node_property, TreeBlob},
    codec, component, LoadError,
};

/// Property naming how much room a relocated tree gets to grow into.
const EXTRA_SPACE_PROP: &str = "extra-space";

/// Copies payload bytes to their destination address.
///
/// The destination lines are invalidated BEFORE the copy, never after:
/// the previous stage may have touched the destination with the cache
/// enabled, and a stale dirty line evicted after the copy would silently
/// overwrite it. Source and destination must not intersect; unlike the
/// cache ordering this is checked, since a mis-built image would
/// otherwise shred itself during the copy. Whether the destination is
/// backed by RAM at all is not checked; no memory map exists yet to
/// check it against.
///
/// ### Safety
/// `dest` must be writable for `data.len()` bytes and owned by nothing
/// else, and the written range must stay valid for `'d`.
pub unsafe fn copy_to<'d, C: CacheOps>(
    cache: &C,
    data: &[u8],
    dest: PhysAddr,
) -> Result<&'d [u8], LoadError> {
    let source = Extent::from_slice(data);
    let target = Extent::new(dest, data.len() as u64);

    if source.overlaps_with(target) {
        return Err(LoadError::Overlap);
    }

    cache.invalidate_region(dest, data.len());

    // Safety: the ranges are disjoint (checked above) and the contract
    // makes `dest` writable for the whole length.
    unsafe {
        core::ptr::copy_nonoverlapping(data.as_ptr(), dest.as_ptr_mut::<u8>(), data.len());
        Ok(core::slice::from_raw_parts(dest.as_ptr::<u8>(), data.len()))
    }
}

/// Resolves a component and relocates it to its declared destination.
///
/// ### Safety
/// The `load` addresses declared by the composite blob must point at
/// usable, otherwise unowned memory.
pub unsafe fn load_component<'d, C: CacheOps>(
    cache: &C,
    image: &TreeBlob<'_>,
    path: &str,
) -> Result<&'d [u8], LoadError> {
    let component = component::resolve(image, path)?;

    info!(
        "{}: {} bytes -> {:?}",
        path,
        component.size(),
        component.load_addr
    );

    unsafe { copy_to(cache, component.data, component.load_addr) }
}

/// Expands tree bytes into a destination region and opens the copy for
/// editing. The region is invalidated before it is written, for the same
/// reason as in [`copy_to`].
pub fn expand_into<'d, C: CacheOps>(
    cache: &C,
    data: &[u8],
    region: &'d mut [u8],
) -> Result<Dtb<'d>, LoadError> {
    cache.invalidate_region(PhysAddr::new(region.as_ptr() as u64), region.len());

    Ok(Dtb::open_into(data, region)?)
}

/// Resolves a device-tree component and relocates it, growing it by its
/// declared `extra-space` so later patches have room.
///
/// This is the only load path with a mutable result, by design: the
/// hand-off patcher rewrites the tree before control transfer, and
/// nothing else is ever written again.
///
/// ### Safety
/// As for [`load_component`], for source size plus `extra-space` bytes.
pub unsafe fn load_tree<'d, C: CacheOps>(
    cache: &C,
    image: &TreeBlob<'_>,
    path: &str,
) -> Result<Dtb<'d>, LoadError> {
    let component = component::resolve(image, path)?;

    let extra = node_property(component.node, EXTRA_SPACE_PROP)?;
    let extra = codec::read_cell(extra)? as usize;

    let total = component.size() + extra;
    let source = Extent::from_slice(component.data);
    let target = Extent::new(component.load_addr, total as u64);

    if source.overlaps_with(target) {
        return Err(LoadError::Overlap);
    }

    info!(
        "{}: {} bytes (+{} expansion) -> {:?}",
        path,
        component.size(),
        extra,
        component.load_addr
    );

    // Safety: writable for `total` bytes per the contract and disjoint
    // from the source (checked above).
    let region =
        unsafe { core::slice::from_raw_parts_mut(component.load_addr.as_ptr_mut::<u8>(), total) };

    expand_into(cache, component.data, region)
}
