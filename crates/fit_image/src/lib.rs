//! Loading of composite boot images.
//!
//! The previous boot stage hands over a device-tree blob whose `/chosen`
//! node points at a composite image bundling the payloads of the next
//! stages: a hypervisor kernel, the device tree it will run on, a guest
//! kernel and possibly a ramdisk. This crate makes those blobs safely
//! readable (the previous stage leaves stale cache lines behind),
//! resolves each payload's bytes and destination, relocates them, and
//! patches the destination tree so the hypervisor can find its modules.

#![no_std]

#[cfg(test)]
extern crate std;

mod blob;
mod codec;
mod component;
mod error;
mod handoff;
mod load;
mod subimage;

#[cfg(test)]
pub(crate) mod tests;

pub use blob::{node_property, TreeBlob};
pub use codec::{encode_cell, encode_cell_pair, read_cell, read_cell_pair, CellValue};
pub use component::{module_extent, resolve, Component};
pub use error::LoadError;
pub use handoff::{declare_module, propagate_memory};
pub use load::{copy_to, expand_into, load_component, load_tree};
pub use subimage::locate_composite;
