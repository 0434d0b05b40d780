use dtb_edit::Dtb;
use log::info;
use memory::Extent;

use crate::{
    blob::{node_property, TreeBlob},
    codec, LoadError,
};

/// Second `compatible` entry of every declared module. The consuming
/// hypervisor requires the two-element list and matches on this marker
/// to discover its boot modules.
const MODULE_COMPATIBLE: &str = "multiboot,module";

/// Declares a boot module in the destination tree.
///
/// The node at `path` is created, or reused when it already exists;
/// calling this twice with the same arguments leaves exactly one node
/// carrying them. `compatible` becomes a two-element list of the
/// caller's string and the generic module marker; `reg` is written as
/// the two-cell address with the two-cell size appended.
pub fn declare_module(
    tree: &mut Dtb<'_>,
    path: &str,
    compatible: &str,
    extent: Extent,
) -> Result<(), LoadError> {
    info!(
        "declaring {} ({}) at {:?}, {} bytes",
        path,
        compatible,
        extent.start(),
        extent.size()
    );

    tree.add_node(path)?;

    tree.set_property_string(path, "compatible", compatible)?;
    tree.append_property_string(path, "compatible", MODULE_COMPATIBLE)?;

    tree.set_property(path, "reg", &codec::encode_cell_pair(extent.start().to_inner()))?;
    tree.append_property(path, "reg", &codec::encode_cell_pair(extent.size()))?;

    Ok(())
}

/// Copies the memory topology from the hand-off tree into the
/// destination tree.
///
/// Run-time carve-outs (secure-world reservations and the like) exist
/// only in the previous stage's `/memory` node; the destination tree was
/// built before they did. `reg` is copied verbatim, which assumes both
/// trees agree on address and size cell widths.
pub fn propagate_memory(tree: &mut Dtb<'_>, source: &TreeBlob<'_>) -> Result<(), LoadError> {
    let node = source.node("/memory")?;
    let reg = node_property(node, "reg")?;

    tree.add_node("/memory")?;
    tree.set_property("/memory", "reg", reg)?;

    Ok(())
}
