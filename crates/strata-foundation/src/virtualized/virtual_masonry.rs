//! Multi-column masonry built from independent virtual columns.
//!
//! Items are dealt round-robin: item `i` goes to column `i % columns`.
//! Columns never reconcile their heights with each other, so they may end
//! at different lengths.

use std::fmt;
use std::rc::Rc;

use strata_core::error::{check_gap, check_range_size};
use strata_core::ConfigError;
use web_time::Duration;

use super::item_measurer::MeasureHost;
use super::range_index::DEFAULT_RANGE_SIZE;
use super::virtual_column::{
    ColumnFrame, MeasurePass, VirtualColumn, VirtualColumnConfig, DEFAULT_FIRST_ALWAYS_VISIBLE,
    DEFAULT_GAP, DEFAULT_MEASURE_BUDGET,
};

/// Default number of masonry columns.
pub const DEFAULT_COLUMNS: usize = 4;

/// Configuration for a [`VirtualMasonry`].
#[derive(Clone, Debug, PartialEq)]
pub struct MasonryConfig {
    pub columns: usize,

    /// Gap between columns and between items inside a column.
    pub gap: f32,

    /// Leading items shown across the whole masonry before the first
    /// recompute. Each column gets `first_always_visible / columns`.
    pub first_always_visible: usize,

    pub range_size: f32,
    pub measure_budget: Duration,
}

impl Default for MasonryConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            gap: DEFAULT_GAP,
            first_always_visible: DEFAULT_FIRST_ALWAYS_VISIBLE,
            range_size: DEFAULT_RANGE_SIZE,
            measure_budget: DEFAULT_MEASURE_BUDGET,
        }
    }
}

impl MasonryConfig {
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

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

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        check_range_size(self.range_size)?;
        check_gap(self.gap)
    }

    fn sanitized(mut self) -> Self {
        if self.columns == 0 {
            log::warn!("virtual masonry: {}, using {DEFAULT_COLUMNS}", ConfigError::ZeroColumns);
            self.columns = DEFAULT_COLUMNS;
        }
        if let Err(err) = check_gap(self.gap) {
            log::warn!("virtual masonry: {err}, using {DEFAULT_GAP}");
            self.gap = DEFAULT_GAP;
        }
        if let Err(err) = check_range_size(self.range_size) {
            log::warn!("virtual masonry: {err}, using {DEFAULT_RANGE_SIZE}");
            self.range_size = DEFAULT_RANGE_SIZE;
        }
        self
    }

    /// Configuration handed to every column.
    pub fn column_config(&self) -> VirtualColumnConfig {
        VirtualColumnConfig {
            gap: self.gap,
            first_always_visible: self.first_always_visible / self.columns.max(1),
            range_size: self.range_size,
            measure_budget: self.measure_budget,
        }
    }
}

/// Deals `items` round-robin into `columns` vectors, keeping relative order.
///
/// Column `j` of `n` items receives `ceil((n - j) / columns)` items.
pub fn partition_round_robin<T: Clone>(items: &[T], columns: usize) -> Vec<Vec<T>> {
    let columns = columns.max(1);
    let per_column = items.len().div_ceil(columns);
    let mut data: Vec<Vec<T>> = (0..columns)
        .map(|_| Vec::with_capacity(per_column))
        .collect();
    for (i, item) in items.iter().enumerate() {
        data[i % columns].push(item.clone());
    }
    data
}

/// Renderable output of a masonry for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct MasonryFrame<C> {
    pub gap: f32,

    /// Share of the container width given to each column.
    pub column_width: f32,

    pub columns: Vec<ColumnFrame<C>>,
}

/// Side-by-side virtual columns fed from one collection.
pub struct VirtualMasonry<T, K, R> {
    items: Rc<[T]>,
    config: MasonryConfig,
    columns: Vec<VirtualColumn<T, K, R>>,
}

impl<T, K, R> VirtualMasonry<T, K, R>
where
    T: Clone,
    K: Fn(&T) -> String + Clone,
    R: Clone,
{
    /// Creates a masonry. Invalid configuration is logged and replaced with
    /// defaults.
    pub fn new(
        items: impl Into<Rc<[T]>>,
        item_key: K,
        item_renderer: R,
        config: MasonryConfig,
    ) -> Self {
        let config = config.sanitized();
        let items = items.into();
        let column_config = config.column_config();
        let columns = partition_round_robin(&items, config.columns)
            .into_iter()
            .map(|slice| {
                VirtualColumn::new(
                    slice,
                    item_key.clone(),
                    item_renderer.clone(),
                    column_config.clone(),
                )
            })
            .collect();
        Self {
            items,
            config,
            columns,
        }
    }

    /// Creates a masonry, rejecting invalid configuration.
    pub fn try_new(
        items: impl Into<Rc<[T]>>,
        item_key: K,
        item_renderer: R,
        config: MasonryConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(items, item_key, item_renderer, config))
    }
}

impl<T, K, R> VirtualMasonry<T, K, R>
where
    T: Clone,
    K: Fn(&T) -> String,
{
    pub fn items(&self) -> &Rc<[T]> {
        &self.items
    }

    pub fn config(&self) -> &MasonryConfig {
        &self.config
    }

    pub fn columns(&self) -> &[VirtualColumn<T, K, R>] {
        &self.columns
    }

    /// Replaces the collection, re-dealing it across columns.
    ///
    /// Every column receives a new slice and therefore a full reset.
    pub fn set_items(&mut self, items: Rc<[T]>) -> bool {
        if Rc::ptr_eq(&self.items, &items) {
            return false;
        }
        let slices = partition_round_robin(&items, self.columns.len());
        for (column, slice) in self.columns.iter_mut().zip(slices) {
            column.set_items(slice.into());
        }
        self.items = items;
        true
    }

    /// Measured height of the tallest column.
    pub fn content_height(&self) -> f32 {
        self.columns
            .iter()
            .map(|column| column.range_index().measured_extent())
            .fold(0.0, f32::max)
    }

    /// Distance from the top of the scroll container to the masonry.
    pub fn set_offset_top(&mut self, offset: f32) {
        for column in &mut self.columns {
            column.set_list_offset(offset);
        }
    }

    /// Forwards a scroll event to every column.
    pub fn on_scroll(&mut self, window_scroll: f32) -> bool {
        self.columns
            .iter_mut()
            .fold(false, |changed, column| column.on_scroll(window_scroll) || changed)
    }
}

impl<T, K, R, C> VirtualMasonry<T, K, R>
where
    T: Clone,
    K: Fn(&T) -> String,
    R: Fn(&T) -> C,
{
    pub fn measure<H>(&mut self, host: &mut H) -> MeasurePass
    where
        H: MeasureHost<C> + ?Sized,
    {
        let mut total = MeasurePass::default();
        for column in &mut self.columns {
            let pass = column.measure(&mut *host);
            total.measured += pass.measured;
            total.interrupted |= pass.interrupted;
        }
        total
    }

    pub fn commit<H>(&mut self, host: &mut H, window_scroll: f32) -> bool
    where
        H: MeasureHost<C> + ?Sized,
    {
        let mut changed = false;
        for column in &mut self.columns {
            changed |= column.commit(&mut *host, window_scroll);
        }
        changed
    }

    pub fn compose(&self) -> MasonryFrame<C> {
        MasonryFrame {
            gap: self.config.gap,
            column_width: 1.0 / self.columns.len().max(1) as f32,
            columns: self.columns.iter().map(VirtualColumn::compose).collect(),
        }
    }
}

impl<T, K, R> fmt::Debug for VirtualMasonry<T, K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualMasonry")
            .field("items", &self.items.len())
            .field("config", &self.config)
            .field("columns", &self.columns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Size;

    fn masonry(count: usize, columns: usize) -> VirtualMasonry<String, fn(&String) -> String, fn(&String) -> String> {
        let items: Vec<String> = (0..count).map(|i| format!("card-{i}")).collect();
        VirtualMasonry::new(
            items,
            String::clone as fn(&String) -> String,
            String::clone as fn(&String) -> String,
            MasonryConfig::default().with_columns(columns),
        )
    }

    #[test]
    fn test_partition_example() {
        let items = ["a", "b", "c", "d", "e", "f", "g"];
        let columns = partition_round_robin(&items, 3);
        assert_eq!(columns, vec![vec!["a", "d", "g"], vec!["b", "e"], vec!["c", "f"]]);
    }

    #[test]
    fn test_partition_sizes() {
        for n in 0..40usize {
            for c in 1..7usize {
                let items: Vec<usize> = (0..n).collect();
                let columns = partition_round_robin(&items, c);
                assert_eq!(columns.len(), c);
                for (j, column) in columns.iter().enumerate() {
                    assert_eq!(column.len(), (n.saturating_sub(j)).div_ceil(c), "n={n} c={c} j={j}");
                    assert!(column.windows(2).all(|w| w[0] < w[1]));
                    assert!(column.iter().all(|i| i % c == j));
                }
            }
        }
    }

    #[test]
    fn test_partition_zero_columns_falls_back_to_one() {
        assert_eq!(partition_round_robin(&[1, 2], 0), vec![vec![1, 2]]);
    }

    #[test]
    fn test_columns_get_share_of_leading_items() {
        let masonry = masonry(100, 4);
        assert_eq!(masonry.columns().len(), 4);
        for column in masonry.columns() {
            assert_eq!(column.items().len(), 25);
            assert_eq!(column.state().visible.len(), 6);
        }
    }

    #[test]
    fn test_fractional_share_truncates() {
        let masonry = VirtualMasonry::new(
            vec![1u32, 2, 3, 4, 5, 6],
            |i: &u32| i.to_string(),
            |i: &u32| *i,
            MasonryConfig::default()
                .with_columns(3)
                .with_first_always_visible(5),
        );
        assert_eq!(masonry.config().column_config().first_always_visible, 1);
        assert!(masonry.columns().iter().all(|c| c.state().visible.len() == 1));
    }

    #[test]
    fn test_scroll_reaches_every_column() {
        let mut masonry = masonry(400, 4);
        let mut host = |_: &String| Some(Size::new(200.0, 100.0));
        masonry.commit(&mut host, 0.0);

        assert!(masonry.on_scroll(3100.0));
        assert!(masonry
            .columns()
            .iter()
            .all(|c| c.current_interval() == 3000.0));
        assert!(!masonry.on_scroll(3200.0));
    }

    #[test]
    fn test_new_collection_resets_columns() {
        let mut masonry = masonry(12, 3);
        let mut host = |_: &String| Some(Size::new(200.0, 100.0));
        masonry.commit(&mut host, 0.0);
        assert!(masonry.columns().iter().all(|c| !c.is_reset_pending()));

        let same = Rc::clone(masonry.items());
        assert!(!masonry.set_items(same));

        let next: Rc<[String]> = (0..7).map(|i| format!("next-{i}")).collect::<Vec<_>>().into();
        assert!(masonry.set_items(next));
        let lengths: Vec<usize> = masonry.columns().iter().map(|c| c.items().len()).collect();
        assert_eq!(lengths, vec![3, 2, 2]);
        assert!(masonry.columns().iter().all(|c| c.is_reset_pending()));
        assert!(masonry.columns().iter().all(|c| c.range_index().is_empty()));
    }

    #[test]
    fn test_compose_frame() {
        let mut masonry = masonry(7, 3);
        let mut host = |_: &String| Some(Size::new(200.0, 100.0));
        masonry.commit(&mut host, 0.0);
        let frame = masonry.compose();
        assert_eq!(frame.columns.len(), 3);
        assert_eq!(frame.gap, 16.0);
        assert!((frame.column_width - 1.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(frame.columns[0].items, vec!["card-0", "card-3", "card-6"]);
        assert_eq!(frame.columns[2].items, vec!["card-2", "card-5"]);
    }

    #[test]
    fn test_invalid_config() {
        let result = VirtualMasonry::try_new(
            vec![1u32],
            |i: &u32| i.to_string(),
            |i: &u32| *i,
            MasonryConfig::default().with_columns(0),
        );
        assert!(matches!(result, Err(ConfigError::ZeroColumns)));
    }
}
