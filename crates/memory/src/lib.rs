#![no_std]

mod extent;
mod paddr;

pub use extent::*;
pub use paddr::*;
