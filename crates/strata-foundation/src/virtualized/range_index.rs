//! Scroll-position buckets for bounded-cost offset math.
//!
//! Measured items are grouped by the bucket their cumulative start offset
//! falls into. Spacer heights are then summed per bucket instead of per
//! item across the whole collection, so recomputation cost is bounded by
//! the number of buckets swept.
//!
//! Offsets are accumulated in **measurement-arrival order**, not collection
//! order. Bucket contents keep that arrival order as well.

use smallvec::SmallVec;
use strata_core::collections::map::HashMap;
use strata_core::sanitize_extent;

/// Default bucket width in layout units.
pub const DEFAULT_RANGE_SIZE: f32 = 3000.0;

/// A measured item stored in a bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BucketEntry {
    /// Index of the item in the owning column's collection.
    pub index: usize,
    /// Measured height. Never changes once recorded.
    pub height: f32,
}

type Bucket = SmallVec<[BucketEntry; 8]>;

/// Bucket table for one column.
///
/// Buckets are addressed by their number `n`; the public bucket key used in
/// scroll math is `n * range_size`.
#[derive(Clone, Debug)]
pub struct RangeIndex {
    range_size: f32,
    gap: f32,
    buckets: HashMap<i64, Bucket>,
    heights: HashMap<String, f32>,
    /// Sum of `height + gap` over everything measured so far.
    measured_extent: f32,
    largest_bucket: i64,
}

impl RangeIndex {
    pub fn new(range_size: f32, gap: f32) -> Self {
        Self {
            range_size,
            gap,
            buckets: HashMap::default(),
            heights: HashMap::default(),
            measured_extent: 0.0,
            largest_bucket: 0,
        }
    }

    pub fn range_size(&self) -> f32 {
        self.range_size
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// Bucket number containing `offset`. Negative offsets map to bucket 0.
    pub fn bucket_number(&self, offset: f32) -> i64 {
        if !offset.is_finite() || offset <= 0.0 {
            return 0;
        }
        (offset / self.range_size).floor() as i64
    }

    /// Bucket key (`floor(offset / range_size) * range_size`) for `offset`.
    pub fn spread(&self, offset: f32) -> f32 {
        self.bucket_key(self.bucket_number(offset))
    }

    /// Converts a bucket number to its key.
    pub fn bucket_key(&self, number: i64) -> f32 {
        number as f32 * self.range_size
    }

    /// Converts a bucket key back to its number.
    pub fn number_of_key(&self, key: f32) -> i64 {
        (key / self.range_size).round() as i64
    }

    /// Number of the first bucket whose key is at or after `key`.
    ///
    /// Keys within rounding error of a bucket key map to that bucket.
    fn first_number_from(&self, key: f32) -> i64 {
        if !key.is_finite() {
            return if key > 0.0 { i64::MAX } else { 0 };
        }
        let ratio = key / self.range_size;
        let nearest = ratio.round();
        if (ratio - nearest).abs() <= 1.0e-4 {
            nearest as i64
        } else {
            ratio.ceil() as i64
        }
    }

    /// Records a measurement and files the item into its bucket.
    ///
    /// The start offset is the sum of `height + gap` over all items measured
    /// before this one. A key that already has a measurement is ignored:
    /// heights are recorded once and never updated. Returns the bucket key
    /// the item landed in, or `None` for a duplicate.
    pub fn insert(&mut self, index: usize, key: &str, height: f32) -> Option<f32> {
        if self.heights.contains_key(key) {
            log::trace!("range index: ignoring repeated measurement for {key:?}");
            return None;
        }
        let height = if height.is_finite() && height >= 0.0 {
            height
        } else {
            log::warn!("range index: item {key:?} reported height {height}, treating as 0");
            sanitize_extent(height)
        };

        let offset = self.measured_extent;
        let number = self.bucket_number(offset);
        self.heights.insert(key.to_owned(), height);
        self.buckets
            .entry(number)
            .or_default()
            .push(BucketEntry { index, height });
        self.measured_extent += height + self.gap;
        if number > self.largest_bucket {
            self.largest_bucket = number;
        }
        Some(self.bucket_key(number))
    }

    /// Recorded height for `key`, if it has been measured.
    pub fn height_of(&self, key: &str) -> Option<f32> {
        self.heights.get(key).copied()
    }

    pub fn is_measured(&self, key: &str) -> bool {
        self.heights.contains_key(key)
    }

    /// Items filed under bucket number `number`, in arrival order.
    pub fn bucket(&self, number: i64) -> &[BucketEntry] {
        self.buckets
            .get(&number)
            .map(|bucket| bucket.as_slice())
            .unwrap_or_default()
    }

    /// Items filed under the bucket with the given key.
    pub fn bucket_at(&self, key: f32) -> &[BucketEntry] {
        self.bucket(self.number_of_key(key))
    }

    /// Sums `height + gap` over buckets numbered `from..to`.
    ///
    /// Only buckets up to the largest one are visited, whatever `to` is.
    pub fn sum_buckets(&self, from: i64, to: i64) -> f32 {
        let mut value = 0.0;
        let end = to.min(self.largest_bucket.saturating_add(1));
        for number in from.max(0)..end {
            for entry in self.bucket(number) {
                value += entry.height + self.gap;
            }
        }
        value
    }

    /// Sums `height + gap` over buckets whose key lies in `[from, to)`.
    pub fn sum_range(&self, from: f32, to: f32) -> f32 {
        self.sum_buckets(self.first_number_from(from), self.first_number_from(to))
    }

    /// Largest bucket number seen so far.
    pub fn largest_bucket(&self) -> i64 {
        self.largest_bucket
    }

    /// Largest bucket key seen so far.
    pub fn largest_interval(&self) -> f32 {
        self.bucket_key(self.largest_bucket)
    }

    /// Total `height + gap` of everything measured.
    pub fn measured_extent(&self) -> f32 {
        self.measured_extent
    }

    /// Number of measured items.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Drops all measurements and buckets.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.heights.clear();
        self.measured_extent = 0.0;
        self.largest_bucket = 0;
    }
}

impl Default for RangeIndex {
    fn default() -> Self {
        Self::new(DEFAULT_RANGE_SIZE, 16.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(count: usize, height: f32) -> RangeIndex {
        let mut index = RangeIndex::new(3000.0, 16.0);
        for i in 0..count {
            index.insert(i, &format!("item-{i}"), height);
        }
        index
    }

    #[test]
    fn test_spread_floors_to_range_size() {
        let index = RangeIndex::new(3000.0, 16.0);
        assert_eq!(index.spread(0.0), 0.0);
        assert_eq!(index.spread(2999.9), 0.0);
        assert_eq!(index.spread(3000.0), 3000.0);
        assert_eq!(index.spread(7500.0), 6000.0);
        assert_eq!(index.spread(-50.0), 0.0);
    }

    #[test]
    fn test_item_past_threshold_lands_in_next_bucket() {
        // 116 units per item: item 25 starts at 2900, item 26 at 3016.
        let index = filled(30, 100.0);
        assert!(index.bucket(0).iter().any(|e| e.index == 25));
        assert!(index.bucket(1).iter().any(|e| e.index == 26));
        assert!(!index.bucket(0).iter().any(|e| e.index == 26));
        assert_eq!(index.largest_interval(), 3000.0);
    }

    #[test]
    fn test_bucket_membership_matches_offsets() {
        let heights = [40.0, 900.0, 1200.0, 10.0, 2500.0, 75.0, 3100.0, 5.0];
        let mut index = RangeIndex::new(3000.0, 16.0);
        let mut offset = 0.0;
        for (i, h) in heights.iter().enumerate() {
            let key = index.insert(i, &i.to_string(), *h).unwrap();
            assert!(key <= offset && offset < key + 3000.0, "item {i} at {offset} in {key}");
            offset += h + 16.0;
        }
    }

    #[test]
    fn test_arrival_order_is_kept() {
        let mut index = RangeIndex::new(3000.0, 0.0);
        index.insert(5, "e", 10.0);
        index.insert(1, "a", 10.0);
        index.insert(3, "c", 10.0);
        let order: Vec<usize> = index.bucket(0).iter().map(|e| e.index).collect();
        assert_eq!(order, vec![5, 1, 3]);
    }

    #[test]
    fn test_repeated_measurement_is_ignored() {
        let mut index = RangeIndex::new(3000.0, 16.0);
        assert_eq!(index.insert(0, "a", 100.0), Some(0.0));
        assert_eq!(index.insert(0, "a", 400.0), None);
        assert_eq!(index.height_of("a"), Some(100.0));
        assert_eq!(index.len(), 1);
        assert_eq!(index.measured_extent(), 116.0);
    }

    #[test]
    fn test_non_finite_height_is_clamped() {
        let mut index = RangeIndex::new(3000.0, 16.0);
        index.insert(0, "a", f32::NAN);
        index.insert(1, "b", -20.0);
        assert_eq!(index.height_of("a"), Some(0.0));
        assert_eq!(index.height_of("b"), Some(0.0));
        assert_eq!(index.sum_buckets(0, 1), 32.0);
    }

    #[test]
    fn test_sum_range_is_half_open() {
        let index = filled(60, 100.0);
        let first = index.bucket(0).len() as f32 * 116.0;
        assert_eq!(index.sum_range(0.0, 3000.0), first);
        assert_eq!(index.sum_range(0.0, 0.0), 0.0);
        assert_eq!(index.sum_range(-3000.0, 3000.0), first);
        let all = index.sum_range(0.0, index.largest_interval() + 3000.0);
        assert_eq!(all, index.measured_extent());
    }

    #[test]
    fn test_sum_range_with_unaligned_bounds() {
        let mut index = RangeIndex::new(3000.0, 0.0);
        for i in 0..60 {
            index.insert(i, &format!("item-{i}"), 100.0);
        }
        assert_eq!(index.sum_range(0.0, 6000.0), 6000.0);
        assert_eq!(index.sum_range(0.0, 4400.0), 6000.0);
        assert_eq!(index.sum_range(0.0, 2999.0), 3000.0);
        assert_eq!(index.sum_range(100.0, 6000.0), 3000.0);
        assert_eq!(index.sum_range(3001.0, 6000.0), 0.0);
    }

    #[test]
    fn test_sum_buckets_stops_at_largest_bucket() {
        let index = filled(60, 100.0);
        assert_eq!(index.sum_buckets(0, i64::MAX), index.measured_extent());
        assert_eq!(index.sum_buckets(i64::MAX - 1, i64::MAX), 0.0);
        assert_eq!(index.sum_range(0.0, f32::MAX), index.measured_extent());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut index = filled(60, 100.0);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.largest_bucket(), 0);
        assert_eq!(index.measured_extent(), 0.0);
        assert!(index.bucket(0).is_empty());
    }
}
