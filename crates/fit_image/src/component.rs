use fdt::node::FdtNode;
use memory::{Extent, PhysAddr};

use crate::{
    blob::{node_property, TreeBlob},
    codec, LoadError,
};

/// A boot payload resolved from a composite blob: where its bytes sit,
/// where they belong, and the node describing it.
///
/// Resolved once, consumed once by the relocation that loads it.
pub struct Component<'b, 'a> {
    /// The payload's bytes inside the composite blob.
    pub data: &'b [u8],
    /// Physical address the payload wants to be loaded to.
    pub load_addr: PhysAddr,
    /// The node describing this payload, for follow-up property reads.
    pub node: FdtNode<'b, 'a>,
}

impl<'b, 'a> Component<'b, 'a> {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The extent the payload will occupy once relocated.
    pub fn dest_extent(&self) -> Extent {
        Extent::new(self.load_addr, self.data.len() as u64)
    }
}

/// Resolves a component by its slash-separated path, e.g.
/// `/images/xen_kernel@1`.
pub fn resolve<'b, 'a>(
    image: &'b TreeBlob<'a>,
    path: &str,
) -> Result<Component<'b, 'a>, LoadError> {
    let node = image.node(path)?;

    let data = node_property(node, "data")?;
    let load = node_property(node, "load")?;

    // `load` kept the legacy single-cell form when the rest of the
    // metadata grew 64-bit addresses; the hypervisor wants its payloads
    // below 4 GiB anyway.
    let load_addr = PhysAddr::new(codec::read_cell(load)? as u64);

    Ok(Component { data, load_addr, node })
}

/// Reads the extent of an image already placed by the previous stage,
/// from the `reg` property of its module node in the hand-off tree.
///
/// `reg` uses the two-cell form for both address and length.
pub fn module_extent(blob: &TreeBlob<'_>, path: &str) -> Result<Extent, LoadError> {
    let node = blob.node(path)?;
    let reg = node_property(node, "reg")?;

    if reg.len() < 16 {
        return Err(LoadError::Encoding);
    }

    let addr = codec::read_cell_pair(&reg[0..8])?;
    let size = codec::read_cell_pair(&reg[8..16])?;

    Ok(Extent::new(PhysAddr::new(addr), size))
}
