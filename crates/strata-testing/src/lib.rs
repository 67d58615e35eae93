//! Testing utilities and harness for Strata layouts

pub mod host;
pub mod test_rule;

pub use host::*;
pub use test_rule::*;
