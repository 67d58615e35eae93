//! Hash map aliases used across the workspace.
//!
//! FxHash is the default; enable the `std-hash` feature to fall back to the
//! SipHash maps from the standard library.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
}
