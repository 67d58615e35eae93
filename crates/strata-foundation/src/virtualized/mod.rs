//! Viewport virtualization for very large collections.
//!
//! Item heights are unknown until an item has been rendered once, so
//! these layouts measure lazily and keep spacer heights above and below a
//! small rendered window.
//!
//! # Architecture
//!
//! - [`ItemMeasurer`] - one-shot invisible measurement probe
//! - [`RangeIndex`] - measured items bucketed by cumulative offset
//! - [`VirtualColumn`] - bucket-driven visible window with spacers
//! - [`VirtualMasonry`] - round-robin columns composed side by side
//! - [`SlidingWindowGrid`] - fixed-batch window for uniform grids
//! - [`InfiniteLoader`] - load-more trigger for growing collections
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use strata_foundation::virtualized::{MasonryConfig, VirtualMasonry};
//! use strata_foundation::Size;
//!
//! let items: Rc<[u32]> = (0..1000).collect::<Vec<_>>().into();
//! let mut masonry = VirtualMasonry::new(
//!     items,
//!     |item: &u32| item.to_string(),
//!     |item: &u32| format!("card {item}"),
//!     MasonryConfig::default(),
//! );
//!
//! let mut host = |_: &String| Some(Size::new(240.0, 180.0));
//! masonry.commit(&mut host, 0.0);
//! masonry.on_scroll(9_000.0);
//! let frame = masonry.compose();
//! assert_eq!(frame.columns.len(), 4);
//! ```

mod infinite_loader;
mod item_measurer;
mod paging;
mod range_index;
mod sliding_window_grid;
mod virtual_column;
mod virtual_masonry;

pub use infinite_loader::*;
pub use item_measurer::*;
pub use paging::*;
pub use range_index::*;
pub use sliding_window_grid::*;
pub use virtual_column::*;
pub use virtual_masonry::*;
