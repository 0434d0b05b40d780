use cache::CacheOps;
use fdt::{node::FdtNode, Fdt, FdtError};
use memory::PhysAddr;

use crate::LoadError;

/// Magic number opening every well-formed tree blob.
const FDT_MAGIC: u32 = 0xd00d_feed;

/// Byte length of the fixed blob header.
const HEADER_LEN: usize = 40;

/// A validated, cache-visible tree blob.
///
/// Wraps the raw bytes together with the parsed view the `fdt` crate
/// provides, so callers never touch an unvalidated byte. All node
/// handles given out borrow from this blob and cannot outlive it or be
/// mixed up with another blob's.
#[derive(Clone)]
pub struct TreeBlob<'a> {
    data: &'a [u8],
    tree: Fdt<'a>,
}

impl<'a> TreeBlob<'a> {
    /// Validates `data` as a well-formed tree blob.
    ///
    /// Use this for memory that is already cache-coherent; blobs left
    /// behind by the previous boot stage go through [`TreeBlob::from_addr`].
    pub fn new(data: &'a [u8]) -> Result<Self, LoadError> {
        let tree = Fdt::new(data)?;
        Ok(Self { data, tree })
    }

    /// Makes the blob at `addr` visible to this core and validates it.
    ///
    /// The previous stage copies images into RAM with the data cache
    /// enabled and never cleans the dirtied lines, so every byte has to
    /// be invalidated before it can be trusted. The declared size itself
    /// may be stale, which forces two passes: one line for the header
    /// first, the remainder once the declared size is readable.
    ///
    /// ### Safety
    /// `addr` must be readable for the blob's declared size, and nothing
    /// else may write the region while the returned blob is alive.
    pub unsafe fn from_addr<C: CacheOps>(cache: &C, addr: PhysAddr) -> Result<TreeBlob<'a>, LoadError> {
        // One line is enough for the magic and the declared size, which
        // sit in the first 8 bytes.
        cache.invalidate_line(addr);

        // Safety: the first header fields are readable per the contract.
        let head = unsafe { core::slice::from_raw_parts(addr.as_ptr::<u8>(), 8) };
        let magic = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);
        let totalsize = u32::from_be_bytes([head[4], head[5], head[6], head[7]]) as usize;

        if magic != FDT_MAGIC {
            return Err(LoadError::Format(FdtError::BadMagic));
        }
        if totalsize < HEADER_LEN {
            return Err(LoadError::Format(FdtError::BufferTooSmall));
        }

        // Now the declared size can be trusted far enough to uncover the
        // rest of the blob.
        cache.invalidate_region(addr, totalsize);

        // Safety: readable for `totalsize` bytes per the contract.
        let data = unsafe { core::slice::from_raw_parts(addr.as_ptr::<u8>(), totalsize) };
        TreeBlob::new(data)
    }

    /// Resolves a slash-separated node path.
    pub fn node(&self, path: &str) -> Result<FdtNode<'_, 'a>, LoadError> {
        self.tree.find_node(path).ok_or(LoadError::MissingComponent)
    }

    /// The blob's declared size in bytes.
    pub fn total_size(&self) -> usize {
        self.tree.total_size()
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn addr(&self) -> PhysAddr {
        PhysAddr::new(self.data.as_ptr() as u64)
    }
}

/// Reads a property's raw bytes from a node.
///
/// Zero-length values count as missing: every property this stage
/// consumes carries one.
pub fn node_property<'b, 'a>(node: FdtNode<'b, 'a>, name: &str) -> Result<&'b [u8], LoadError> {
    let prop = node.property(name).ok_or(LoadError::MissingProperty)?;

    if prop.value.is_empty() {
        return Err(LoadError::MissingProperty);
    }

    Ok(prop.value)
}
