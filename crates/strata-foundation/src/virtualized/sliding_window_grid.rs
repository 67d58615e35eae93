//! Sliding-window virtualization for uniform-column grids.
//!
//! Instead of measurement buckets, the grid keeps one contiguous index
//! window `[start, end)` over a row-major collection. Scroll events move
//! the window by two rows at a time towards the scroll position.
//!
//! A collection swap happens in two phases:
//!
//! 1. [`set_items`](SlidingWindowGrid::set_items) commits the full new
//!    collection and enters [`WindowPhase::PendingShrink`].
//! 2. [`run_deferred`](SlidingWindowGrid::run_deferred), scheduled one tick
//!    later, shrinks large collections back to a single batch and returns
//!    to [`WindowPhase::Committed`].

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use strata_core::error::check_gap;
use strata_core::{finite_or_zero, sanitize_extent, ConfigError};

use super::virtual_column::DEFAULT_GAP;

pub const DEFAULT_GRID_COLUMNS: usize = 4;

/// Default page size. The window holds three pages.
pub const DEFAULT_LIMIT: usize = 12;

#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    pub columns: usize,
    pub limit: usize,
    pub gap: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_GRID_COLUMNS,
            limit: DEFAULT_LIMIT,
            gap: DEFAULT_GAP,
        }
    }
}

impl GridConfig {
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    /// Window size after a collection swap settles.
    pub fn max_batch(&self) -> usize {
        self.limit * 3
    }

    /// Number of indices the window moves per scroll event.
    pub fn step(&self) -> usize {
        self.columns * 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        check_gap(self.gap)
    }

    fn sanitized(mut self) -> Self {
        if self.columns == 0 {
            log::warn!("sliding grid: {}, using {DEFAULT_GRID_COLUMNS}", ConfigError::ZeroColumns);
            self.columns = DEFAULT_GRID_COLUMNS;
        }
        if self.limit == 0 {
            log::warn!("sliding grid: {}, using {DEFAULT_LIMIT}", ConfigError::ZeroLimit);
            self.limit = DEFAULT_LIMIT;
        }
        if let Err(err) = check_gap(self.gap) {
            log::warn!("sliding grid: {err}, using {DEFAULT_GAP}");
            self.gap = DEFAULT_GAP;
        }
        self
    }
}

/// Where the grid is in a collection swap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum WindowPhase {
    /// The window is settled.
    #[default]
    Committed,

    /// The full collection is committed; a follow-up tick will shrink the
    /// window. `previous` is the window from before the swap.
    PendingShrink { previous: Range<usize> },
}

/// A scroll event seen by the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridScroll {
    /// Scroll position of the grid's own scroll container.
    pub scroll_top: f32,

    /// Top edge of the container relative to the viewport. Negative when
    /// the page has scrolled the container past the top.
    pub container_top: f32,
}

impl GridScroll {
    pub fn new(scroll_top: f32) -> Self {
        Self {
            scroll_top,
            container_top: 0.0,
        }
    }

    /// Scroll distance into the grid, including page scroll past its top.
    pub fn effective(&self) -> f32 {
        finite_or_zero(self.scroll_top) - finite_or_zero(self.container_top).min(0.0)
    }
}

/// Renderable output of the grid for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct GridFrame<C> {
    pub columns: usize,
    pub gap: f32,
    pub offset_top: f32,
    pub offset_bottom: f32,

    /// Rendered cells with their collection index.
    pub cells: Vec<(usize, C)>,
}

/// Row-major grid with a contiguous visible window.
pub struct SlidingWindowGrid<T, R> {
    items: Rc<[T]>,
    item_renderer: R,
    config: GridConfig,
    heights: Vec<Option<f32>>,
    window: Range<usize>,
    phase: WindowPhase,
}

impl<T, R> SlidingWindowGrid<T, R> {
    /// Creates a grid showing the whole collection, with the mount-time
    /// shrink already pending.
    pub fn new(items: impl Into<Rc<[T]>>, item_renderer: R, config: GridConfig) -> Self {
        let items = items.into();
        let len = items.len();
        Self {
            items,
            item_renderer,
            config: config.sanitized(),
            heights: vec![None; len],
            window: 0..len,
            phase: WindowPhase::PendingShrink { previous: 0..len },
        }
    }

    pub fn try_new(
        items: impl Into<Rc<[T]>>,
        item_renderer: R,
        config: GridConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(items, item_renderer, config))
    }

    pub fn items(&self) -> &Rc<[T]> {
        &self.items
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn phase(&self) -> &WindowPhase {
        &self.phase
    }

    /// Current `[start, end)` window.
    pub fn visible_window(&self) -> Range<usize> {
        self.window.clone()
    }

    pub fn visible_items(&self) -> &[T] {
        &self.items[self.window.clone()]
    }

    pub fn height_of(&self, index: usize) -> Option<f32> {
        self.heights.get(index).copied().flatten()
    }

    /// Replaces the collection. Phase one of the swap: the window covers
    /// everything until [`run_deferred`](Self::run_deferred) runs.
    ///
    /// Heights are cached by index and survive the swap for indices that
    /// still exist.
    pub fn set_items(&mut self, items: Rc<[T]>) -> bool {
        if Rc::ptr_eq(&self.items, &items) {
            return false;
        }
        let previous = self.window.clone();
        let len = items.len();
        log::debug!(
            "sliding grid: collection changed ({} -> {len} items), window {previous:?} -> full",
            self.items.len()
        );
        self.items = items;
        self.heights.resize(len, None);
        self.window = 0..len;
        self.phase = WindowPhase::PendingShrink { previous };
        true
    }

    /// Phase two of a swap: shrinks the window to one batch.
    ///
    /// Collections shorter than a batch keep the full window. Otherwise the
    /// batch is anchored at the previous window's start when it still fits,
    /// or at the previous end clamped to the collection length.
    pub fn run_deferred(&mut self) -> bool {
        let WindowPhase::PendingShrink { previous } = std::mem::take(&mut self.phase) else {
            return false;
        };
        let len = self.items.len();
        let batch = self.config.max_batch();
        if len < batch {
            log::trace!("sliding grid: {len} items fit in one batch, keeping full window");
            return false;
        }

        let window = if previous.start + batch <= len {
            previous.start..previous.start + batch
        } else {
            let end = previous.end.min(len).max(batch);
            end - batch..end
        };
        log::debug!("sliding grid: deferred shrink {:?} -> {window:?}", self.window);
        let changed = window != self.window;
        self.window = window;
        changed
    }

    /// Records the rendered height of the item at `index`.
    pub fn record_height(&mut self, index: usize, height: f32) {
        if !height.is_finite() || height < 0.0 {
            log::warn!("sliding grid: item {index} reported height {height}, treating as 0");
        }
        if let Some(slot) = self.heights.get_mut(index) {
            *slot = Some(sanitize_extent(height));
        }
    }

    /// Sums per-row maximum heights over `range`, `columns` items per row.
    ///
    /// A row with nothing measured has a maximum of negative infinity;
    /// it contributes 0.
    fn rows_height(&self, range: Range<usize>) -> f32 {
        let columns = self.config.columns;
        let mut total = 0.0;
        let mut row_start = range.start;
        while row_start < range.end {
            let row_end = (row_start + columns).min(range.end);
            let row_max = self.heights[row_start..row_end]
                .iter()
                .flatten()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max);
            total += finite_or_zero(row_max);
            row_start = row_end;
        }
        total
    }

    /// Spacer height for rows before the window.
    pub fn top_offset(&self) -> f32 {
        self.rows_height(0..self.window.start)
    }

    /// Spacer height for rows after the window.
    pub fn bottom_offset(&self) -> f32 {
        self.rows_height(self.window.end..self.items.len())
    }

    /// Rendered height of the window itself.
    pub fn batch_height(&self) -> f32 {
        self.rows_height(self.window.clone())
    }

    /// Slides the window two rows towards the scroll position.
    ///
    /// Past the middle of the window it moves forward, otherwise backward.
    /// Movement is clamped to the collection. Returns `true` if it moved.
    pub fn on_scroll(&mut self, scroll: GridScroll) -> bool {
        let position = scroll.effective() - self.top_offset();
        let forward = position > self.batch_height() / 2.0;
        let step = self.config.step();

        let shift = if forward {
            step.min(self.items.len() - self.window.end)
        } else {
            step.min(self.window.start)
        };
        if shift == 0 {
            return false;
        }
        if forward {
            self.window = self.window.start + shift..self.window.end + shift;
        } else {
            self.window = self.window.start - shift..self.window.end - shift;
        }
        log::trace!("sliding grid: window moved to {:?}", self.window);
        true
    }
}

impl<T, R, C> SlidingWindowGrid<T, R>
where
    R: Fn(&T) -> C,
{
    pub fn compose(&self) -> GridFrame<C> {
        let cells = self
            .window
            .clone()
            .map(|index| (index, (self.item_renderer)(&self.items[index])))
            .collect();
        GridFrame {
            columns: self.config.columns,
            gap: self.config.gap,
            offset_top: self.top_offset(),
            offset_bottom: self.bottom_offset(),
            cells,
        }
    }
}

impl<T, R> fmt::Debug for SlidingWindowGrid<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlidingWindowGrid")
            .field("items", &self.items.len())
            .field("config", &self.config)
            .field("window", &self.window)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
