//! Shared fixtures for the crate's unit tests: device-tree builders and
//! cache test doubles.

use core::cell::RefCell;
use std::vec::Vec;

use cache::CacheOps;
use memory::PhysAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Line(u64),
    Region(u64, usize),
}

/// Records every maintenance call it receives.
pub struct RecordingCache {
    events: RefCell<Vec<CacheEvent>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<CacheEvent> {
        self.events.borrow().clone()
    }
}

impl CacheOps for RecordingCache {
    fn invalidate_line(&self, addr: PhysAddr) {
        self.events
            .borrow_mut()
            .push(CacheEvent::Line(addr.to_inner()));
    }

    fn invalidate_region(&self, addr: PhysAddr, len: usize) {
        self.events
            .borrow_mut()
            .push(CacheEvent::Region(addr.to_inner(), len));
    }
}

/// Snapshots the destination's first byte at invalidate time, so tests
/// can prove the invalidate ran strictly before the copy.
pub struct SnoopingCache {
    invalidated: RefCell<Vec<(u64, usize)>>,
    snapshot: RefCell<Option<u8>>,
}

impl SnoopingCache {
    pub fn new() -> Self {
        Self {
            invalidated: RefCell::new(Vec::new()),
            snapshot: RefCell::new(None),
        }
    }

    pub fn invalidated(&self) -> Vec<(u64, usize)> {
        self.invalidated.borrow().clone()
    }

    pub fn snapshot(&self) -> Option<u8> {
        *self.snapshot.borrow()
    }
}

impl CacheOps for SnoopingCache {
    fn invalidate_line(&self, _addr: PhysAddr) {}

    fn invalidate_region(&self, addr: PhysAddr, len: usize) {
        self.invalidated.borrow_mut().push((addr.to_inner(), len));

        // Safety: tests only hand this cache addresses of live buffers.
        let byte = unsafe { *addr.as_ptr::<u8>() };
        *self.snapshot.borrow_mut() = Some(byte);
    }
}

fn memory_reg() -> [u8; 16] {
    let mut reg = [0u8; 16];
    reg[0..8].copy_from_slice(&0x8000_0000u64.to_be_bytes());
    reg[8..16].copy_from_slice(&0x4000_0000u64.to_be_bytes());
    reg
}

/// A hand-off tree as the previous stage would pass it: `/chosen` with
/// boot arguments (plus the composite address when given) and a
/// `/memory` node.
pub fn sample_handoff(initrd_start: Option<u64>) -> Vec<u8> {
    let mut writer = vm_fdt::FdtWriter::new().unwrap();

    let root = writer.begin_node("").unwrap();
    writer.property_string("model", "test-board").unwrap();

    let chosen = writer.begin_node("chosen").unwrap();
    writer.property_string("bootargs", "console=ttyS0").unwrap();
    if let Some(addr) = initrd_start {
        writer.property_u64("linux,initrd-start", addr).unwrap();
    }
    writer.end_node(chosen).unwrap();

    let memory = writer.begin_node("memory").unwrap();
    writer.property("reg", &memory_reg()).unwrap();
    writer.end_node(memory).unwrap();

    writer.end_node(root).unwrap();
    writer.finish().unwrap()
}

/// A tree lacking `/chosen` entirely.
pub fn tree_without_chosen() -> Vec<u8> {
    let mut writer = vm_fdt::FdtWriter::new().unwrap();

    let root = writer.begin_node("").unwrap();
    writer.property_string("model", "test-board").unwrap();

    let memory = writer.begin_node("memory").unwrap();
    writer.property("reg", &memory_reg()).unwrap();
    writer.end_node(memory).unwrap();

    writer.end_node(root).unwrap();
    writer.finish().unwrap()
}

/// A minimal tree with neither `/chosen` nor `/memory`.
pub fn bare_tree() -> Vec<u8> {
    let mut writer = vm_fdt::FdtWriter::new().unwrap();

    let root = writer.begin_node("").unwrap();
    writer.property_string("model", "test-board").unwrap();
    writer.end_node(root).unwrap();

    writer.finish().unwrap()
}

/// A hand-off tree whose previous stage already placed a kernel and
/// declared it under `/module@0`.
pub fn handoff_with_module(addr: u64, size: u64) -> Vec<u8> {
    let mut writer = vm_fdt::FdtWriter::new().unwrap();

    let root = writer.begin_node("").unwrap();

    let chosen = writer.begin_node("chosen").unwrap();
    writer.property_string("bootargs", "console=ttyS0").unwrap();
    writer.end_node(chosen).unwrap();

    let module = writer.begin_node("module@0").unwrap();
    let mut reg = [0u8; 16];
    reg[0..8].copy_from_slice(&addr.to_be_bytes());
    reg[8..16].copy_from_slice(&size.to_be_bytes());
    writer.property("reg", &reg).unwrap();
    writer.end_node(module).unwrap();

    writer.end_node(root).unwrap();
    writer.finish().unwrap()
}

pub struct ImageEntry<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
    pub load: Option<u32>,
    pub extra_space: Option<u32>,
}

/// A composite blob carrying the given payload nodes under `/images`.
pub fn composite_with_images(images: &[ImageEntry<'_>]) -> Vec<u8> {
    let mut writer = vm_fdt::FdtWriter::new().unwrap();

    let root = writer.begin_node("").unwrap();
    writer
        .property_string("description", "boot payload bundle")
        .unwrap();

    let images_node = writer.begin_node("images").unwrap();
    for image in images {
        let node = writer.begin_node(image.name).unwrap();
        writer.property("data", image.data).unwrap();
        if let Some(load) = image.load {
            writer.property_u32("load", load).unwrap();
        }
        if let Some(extra) = image.extra_space {
            writer.property_u32("extra-space", extra).unwrap();
        }
        writer.end_node(node).unwrap();
    }
    writer.end_node(images_node).unwrap();

    writer.end_node(root).unwrap();
    writer.finish().unwrap()
}

/// A composite with a single hypervisor kernel payload.
pub fn sample_composite(load: u32, payload: &[u8]) -> Vec<u8> {
    composite_with_images(&[ImageEntry {
        name: "xen_kernel@1",
        data: payload,
        load: Some(load),
        extra_space: None,
    }])
}
