//! A single virtualized column of variable-height items.
//!
//! Each item is measured once through an [`ItemMeasurer`] probe and filed
//! into a [`RangeIndex`] bucket. On scroll, the column only recomputes when
//! the scroll position enters a different bucket; it then renders the
//! active bucket plus its two neighbours and replaces everything else with
//! top and bottom spacers.
//!
//! # Frame model
//!
//! ```text
//! set_items ──► (reset pending) ──► commit: measure probes, forced recompute
//!                                       │
//! on_scroll ──► bucket changed? ──► recompute
//! ```

use std::fmt;
use std::rc::Rc;

use strata_core::error::{check_gap, check_range_size};
use strata_core::{finite_or_zero, ConfigError};
use web_time::{Duration, Instant};

use super::item_measurer::{ItemMeasurer, MeasureHost, MeasurePhase};
use super::range_index::{RangeIndex, DEFAULT_RANGE_SIZE};

/// Default spacing between items.
pub const DEFAULT_GAP: f32 = 16.0;

/// Items rendered by index before any measurement has completed.
pub const DEFAULT_FIRST_ALWAYS_VISIBLE: usize = 25;

/// Time budget for a single measurement pass.
pub const DEFAULT_MEASURE_BUDGET: Duration = Duration::from_millis(50);

/// Configuration for a [`VirtualColumn`].
#[derive(Clone, Debug, PartialEq)]
pub struct VirtualColumnConfig {
    /// Spacing between consecutive items, counted into every offset.
    pub gap: f32,

    /// Number of leading items shown before the first recompute.
    pub first_always_visible: usize,

    /// Bucket width in layout units.
    pub range_size: f32,

    /// Maximum time spent measuring probes in one pass. Probes that do
    /// not fit stay pending for the next pass.
    pub measure_budget: Duration,
}

impl Default for VirtualColumnConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            first_always_visible: DEFAULT_FIRST_ALWAYS_VISIBLE,
            range_size: DEFAULT_RANGE_SIZE,
            measure_budget: DEFAULT_MEASURE_BUDGET,
        }
    }
}

impl VirtualColumnConfig {
    pub fn with_gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_first_always_visible(mut self, count: usize) -> Self {
        self.first_always_visible = count;
        self
    }

    pub fn with_range_size(mut self, range_size: f32) -> Self {
        self.range_size = range_size;
        self
    }

    pub fn with_measure_budget(mut self, budget: Duration) -> Self {
        self.measure_budget = budget;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range_size(self.range_size)?;
        check_gap(self.gap)
    }

    /// Replaces invalid fields with their defaults.
    pub(crate) fn sanitized(mut self) -> Self {
        if let Err(err) = check_range_size(self.range_size) {
            log::warn!("virtual column: {err}, using {DEFAULT_RANGE_SIZE}");
            self.range_size = DEFAULT_RANGE_SIZE;
        }
        if let Err(err) = check_gap(self.gap) {
            log::warn!("virtual column: {err}, using {DEFAULT_GAP}");
            self.gap = DEFAULT_GAP;
        }
        self
    }
}

/// Derived visibility state of a column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnState {
    /// Indices into the column's collection, in bucket arrival order.
    pub visible: Vec<usize>,

    /// Spacer height above the visible items.
    pub offset_top: f32,

    /// Spacer height below the visible items.
    pub offset_bottom: f32,
}

impl ColumnState {
    fn leading(len: usize, first_always_visible: usize) -> Self {
        Self {
            visible: (0..len.min(first_always_visible)).collect(),
            offset_top: 0.0,
            offset_bottom: 0.0,
        }
    }
}

/// Outcome of a measurement pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeasurePass {
    /// Probes that reported a size in this pass.
    pub measured: usize,

    /// The pass ran out of time before visiting every pending probe.
    pub interrupted: bool,
}

/// Renderable output of a column for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnFrame<C> {
    pub offset_top: f32,
    pub offset_bottom: f32,
    pub gap: f32,

    /// Rendered visible items, in visible order.
    pub items: Vec<C>,

    /// Items still mounted as invisible measurement probes.
    pub probes: Vec<C>,
}

/// A virtualized column.
///
/// `K` derives a stable, unique key for each item; `R` renders an item into
/// the host's content type. Both are expected to be pure.
pub struct VirtualColumn<T, K, R> {
    items: Rc<[T]>,
    item_key: K,
    item_renderer: R,
    config: VirtualColumnConfig,
    index: RangeIndex,
    probes: Vec<ItemMeasurer>,
    list_offset: f32,
    current_bucket: i64,
    state: ColumnState,
    reset_pending: bool,
}

impl<T, K, R> VirtualColumn<T, K, R>
where
    K: Fn(&T) -> String,
{
    /// Creates a column. Invalid configuration fields are logged and
    /// replaced with defaults.
    pub fn new(
        items: impl Into<Rc<[T]>>,
        item_key: K,
        item_renderer: R,
        config: VirtualColumnConfig,
    ) -> Self {
        Self::from_parts(items.into(), item_key, item_renderer, config.sanitized())
    }

    /// Creates a column, rejecting invalid configuration.
    pub fn try_new(
        items: impl Into<Rc<[T]>>,
        item_key: K,
        item_renderer: R,
        config: VirtualColumnConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(items.into(), item_key, item_renderer, config))
    }

    fn from_parts(items: Rc<[T]>, item_key: K, item_renderer: R, config: VirtualColumnConfig) -> Self {
        let state = ColumnState::leading(items.len(), config.first_always_visible);
        Self {
            probes: vec![ItemMeasurer::new(); items.len()],
            index: RangeIndex::new(config.range_size, config.gap),
            items,
            item_key,
            item_renderer,
            config,
            list_offset: 0.0,
            current_bucket: 0,
            state,
            reset_pending: true,
        }
    }

    pub fn items(&self) -> &Rc<[T]> {
        &self.items
    }

    pub fn config(&self) -> &VirtualColumnConfig {
        &self.config
    }

    pub fn range_index(&self) -> &RangeIndex {
        &self.index
    }

    pub fn state(&self) -> &ColumnState {
        &self.state
    }

    /// Key of the bucket the column last recomputed for.
    pub fn current_interval(&self) -> f32 {
        self.index.bucket_key(self.current_bucket)
    }

    /// Whether a collection change is still waiting for its forced recompute.
    pub fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Distance from the top of the scroll container to the column.
    pub fn list_offset(&self) -> f32 {
        self.list_offset
    }

    pub fn set_list_offset(&mut self, offset: f32) {
        self.list_offset = finite_or_zero(offset);
    }

    /// Items currently rendered for real.
    pub fn visible_items(&self) -> impl Iterator<Item = &T> + '_ {
        self.state
            .visible
            .iter()
            .filter_map(move |&index| self.items.get(index))
    }

    /// Height of the buckets around the current interval.
    pub fn visible_extent(&self) -> f32 {
        self.index.sum_buckets(
            self.current_bucket.saturating_sub(1),
            self.current_bucket.saturating_add(2),
        )
    }

    /// Replaces the collection.
    ///
    /// A different `Rc` is a new collection: measurements and buckets are
    /// dropped and a forced recompute is scheduled for the next
    /// [`commit`](Self::commit). Passing the same `Rc` is a no-op.
    pub fn set_items(&mut self, items: Rc<[T]>) -> bool {
        if Rc::ptr_eq(&self.items, &items) {
            return false;
        }
        log::debug!(
            "virtual column: collection changed ({} -> {} items), rebuilding range index",
            self.items.len(),
            items.len()
        );
        self.items = items;
        self.index.clear();
        self.probes = vec![ItemMeasurer::new(); self.items.len()];
        self.state = ColumnState::leading(self.items.len(), self.config.first_always_visible);
        self.reset_pending = true;
        true
    }

    /// Handles a scroll event. Returns `true` when the visible state changed.
    pub fn on_scroll(&mut self, window_scroll: f32) -> bool {
        self.recompute(window_scroll, false)
    }

    /// Recomputes visibility and spacers for `window_scroll`.
    ///
    /// Visible buckets are `n-1..=n+1`; the top spacer covers `[0, n-1)` and
    /// the bottom spacer `[n+2, largest]`, so together they tile the
    /// measured extent. Does nothing when the scroll position is still
    /// inside the current bucket, unless `force` is set.
    pub fn recompute(&mut self, window_scroll: f32, force: bool) -> bool {
        let scroll = (finite_or_zero(window_scroll) - self.list_offset).max(0.0);
        let bucket = self.index.bucket_number(scroll);
        if bucket == self.current_bucket && !force {
            return false;
        }

        let end = self.index.largest_bucket().saturating_add(1);
        let first_visible = bucket.saturating_sub(1).min(end);
        let last_visible = bucket.saturating_add(1).min(end);
        let offset_top = self.index.sum_buckets(0, first_visible);
        let offset_bottom = self.index.sum_buckets(bucket.saturating_add(2), end);
        let visible: Vec<usize> = (first_visible..=last_visible)
            .flat_map(|number| self.index.bucket(number))
            .map(|entry| entry.index)
            .collect();

        log::trace!(
            "virtual column: interval {} -> {}, {} visible, spacers {offset_top}/{offset_bottom}",
            self.index.bucket_key(self.current_bucket),
            self.index.bucket_key(bucket),
            visible.len()
        );

        self.current_bucket = bucket;
        self.state = ColumnState {
            visible,
            offset_top,
            offset_bottom,
        };
        true
    }
}

impl<T, K, R, C> VirtualColumn<T, K, R>
where
    K: Fn(&T) -> String,
    R: Fn(&T) -> C,
{
    /// Runs every pending measurement probe, within the time budget.
    ///
    /// Measurements feed the range index but do not recompute visibility.
    pub fn measure<H>(&mut self, host: &mut H) -> MeasurePass
    where
        H: MeasureHost<C> + ?Sized,
    {
        let started = Instant::now();
        let mut pass = MeasurePass::default();

        for (position, item) in self.items.iter().enumerate() {
            let probe = &mut self.probes[position];
            if probe.phase() != MeasurePhase::Probing {
                continue;
            }
            let key = (self.item_key)(item);
            let cached = self.index.is_measured(&key);
            if !probe.is_probing(cached) {
                continue;
            }
            if started.elapsed() > self.config.measure_budget {
                log::warn!(
                    "virtual column: measurement exceeded time budget ({:?}) at index {position}, resuming next pass",
                    self.config.measure_budget
                );
                pass.interrupted = true;
                break;
            }

            let index = &mut self.index;
            let renderer = &self.item_renderer;
            let reported = probe.measure(cached, || renderer(item), &mut *host, |size| {
                index.insert(position, &key, size.height);
            });
            if reported {
                pass.measured += 1;
            }
        }

        pass
    }

    /// Finishes a frame: measures pending probes, then applies the forced
    /// recompute scheduled by a collection change.
    ///
    /// The reset stays pending while probes remain unvisited, so the next
    /// commit recomputes again once measurement has caught up.
    pub fn commit<H>(&mut self, host: &mut H, window_scroll: f32) -> bool
    where
        H: MeasureHost<C> + ?Sized,
    {
        let pass = self.measure(host);
        if !self.reset_pending {
            return false;
        }
        let changed = self.recompute(window_scroll, true);
        if !pass.interrupted {
            self.reset_pending = false;
        }
        changed
    }

    /// Renders the frame: spacers, visible items and pending probes.
    pub fn compose(&self) -> ColumnFrame<C> {
        let items = self
            .visible_items()
            .map(|item| (self.item_renderer)(item))
            .collect();
        let probes = self
            .items
            .iter()
            .zip(&self.probes)
            .filter(|(item, probe)| {
                probe.phase() == MeasurePhase::Probing
                    && probe.is_probing(self.index.is_measured(&(self.item_key)(*item)))
            })
            .map(|(item, _)| (self.item_renderer)(item))
            .collect();

        ColumnFrame {
            offset_top: self.state.offset_top,
            offset_bottom: self.state.offset_bottom,
            gap: self.config.gap,
            items,
            probes,
        }
    }
}

impl<T, K, R> fmt::Debug for VirtualColumn<T, K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualColumn")
            .field("items", &self.items.len())
            .field("measured", &self.index.len())
            .field("current_bucket", &self.current_bucket)
            .field("state", &self.state)
            .field("reset_pending", &self.reset_pending)
            .finish_non_exhaustive()
    }
}
