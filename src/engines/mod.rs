// engines/mod.rs - Engine registry
// Each backend lives in its own module.

pub mod portable;

#[cfg(feature = "icu")]
pub mod icu;

pub use portable::{PortableCollator, PortableEngine};

#[cfg(feature = "icu")]
pub use icu::{IcuCollator, IcuEngine};

/// Engine behind the C ABI: ICU4C when built with `icu`, otherwise portable.
#[cfg(feature = "icu")]
pub type DefaultEngine = IcuEngine;

/// Engine behind the C ABI: ICU4C when built with `icu`, otherwise portable.
#[cfg(not(feature = "icu"))]
pub type DefaultEngine = PortableEngine;
