//! cmsis-packs library
//!
//! Discovery and parsing of installed CMSIS packs.

pub mod error;
pub mod filter;
pub mod index;
pub mod pack;
pub mod pdsc;
pub mod reference;
pub mod root;
pub mod version;

pub use error::{PackError, Result};
pub use filter::Filter;
pub use index::{PackIndex, SkippedPack};
pub use pack::{Component, Device, Pack, PackId};
pub use reference::{ComponentRef, DeviceRef, PackRef};
