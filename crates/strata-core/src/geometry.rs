//! Geometry primitives for virtual layout.

/// Intrinsic size reported by a measurement probe.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Returns `value` if it is finite, otherwise `0.0`.
///
/// Aggregates over rows or buckets that have nothing measured yet must not
/// leak `NaN` or infinities into spacer offsets.
#[inline]
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Clamps a reported extent to a usable, non-negative finite value.
#[inline]
pub fn sanitize_extent(value: f32) -> f32 {
    finite_or_zero(value).max(0.0)
}
