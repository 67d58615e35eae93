//! Foundation layouts for Strata.
//!
//! The [`virtualized`] module holds the viewport virtualization engine:
//! range-indexed columns, round-robin masonry and the sliding-window grid.

pub mod virtualized;

pub use strata_core::{ConfigError, Size};
