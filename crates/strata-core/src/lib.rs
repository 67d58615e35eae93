//! Core building blocks for Strata: hash map aliases, geometry and
//! configuration errors shared by the layout crates.

pub mod collections;
pub mod error;
pub mod geometry;

pub use error::ConfigError;
pub use geometry::{finite_or_zero, sanitize_extent, Size};
