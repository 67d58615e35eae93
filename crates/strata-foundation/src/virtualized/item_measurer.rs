//! One-shot measurement probes.
//!
//! Every item is mounted off-screen exactly once to learn its intrinsic
//! size. After that the probe is gone and the item is only ever rendered
//! for real inside the visible window.

use strata_core::Size;

/// Something that can mount content invisibly and report its size.
///
/// Returning `None` means the probe could not get a render target. That is
/// not an error: the item simply contributes zero height until it is
/// measured by a later collection.
pub trait MeasureHost<C: ?Sized> {
    fn measure(&mut self, content: &C) -> Option<Size>;
}

impl<C: ?Sized, F> MeasureHost<C> for F
where
    F: FnMut(&C) -> Option<Size>,
{
    fn measure(&mut self, content: &C) -> Option<Size> {
        self(content)
    }
}

/// Lifecycle of a single probe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeasurePhase {
    /// Mounted invisibly, waiting for a size.
    #[default]
    Probing,
    /// Size reported; the probe no longer renders.
    Measured,
    /// No render target was available. Never retried.
    Detached,
}

/// Drives the measurement of one item.
#[derive(Clone, Debug, Default)]
pub struct ItemMeasurer {
    phase: MeasurePhase,
}

impl ItemMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MeasurePhase {
        self.phase
    }

    /// Whether the invisible probe is mounted this frame.
    ///
    /// `no_measure` is set when the item's key already has a cached
    /// measurement, in which case the probe never mounts.
    pub fn is_probing(&self, no_measure: bool) -> bool {
        !no_measure && self.phase == MeasurePhase::Probing
    }

    /// Mounts the probe and reports its size through `on_measure`.
    ///
    /// Runs at most once per probe: after a size is reported, or after the
    /// host fails to provide a render target, further calls do nothing.
    /// Returns `true` when `on_measure` was invoked.
    pub fn measure<C, H, F>(
        &mut self,
        no_measure: bool,
        render: impl FnOnce() -> C,
        host: &mut H,
        on_measure: F,
    ) -> bool
    where
        H: MeasureHost<C> + ?Sized,
        F: FnOnce(Size),
    {
        if !self.is_probing(no_measure) {
            return false;
        }
        let content = render();
        match host.measure(&content) {
            Some(size) => {
                self.phase = MeasurePhase::Measured;
                on_measure(size);
                true
            }
            None => {
                log::warn!("measurement probe has no render target, item stays unmeasured");
                self.phase = MeasurePhase::Detached;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measures_once() {
        let mut measurer = ItemMeasurer::new();
        let mut calls = 0;
        let mut host = |_: &u32| {
            calls += 1;
            Some(Size::new(120.0, 80.0))
        };
        let mut reported = Vec::new();

        assert!(measurer.measure(false, || 3u32, &mut host, |s| reported.push(s)));
        assert!(!measurer.measure(false, || 3u32, &mut host, |s| reported.push(s)));

        assert_eq!(calls, 1);
        assert_eq!(reported, vec![Size::new(120.0, 80.0)]);
        assert_eq!(measurer.phase(), MeasurePhase::Measured);
        assert!(!measurer.is_probing(false));
    }

    #[test]
    fn test_cached_key_never_mounts_probe() {
        let mut measurer = ItemMeasurer::new();
        let mut rendered = false;
        let mut host = |_: &u32| Some(Size::new(1.0, 1.0));

        let reported = measurer.measure(
            true,
            || {
                rendered = true;
                7u32
            },
            &mut host,
            |_| panic!("cached item must not report"),
        );

        assert!(!reported);
        assert!(!rendered);
        assert!(!measurer.is_probing(true));
        assert_eq!(measurer.phase(), MeasurePhase::Probing);
    }

    #[test]
    fn test_missing_render_target_detaches() {
        let mut measurer = ItemMeasurer::new();
        let mut attempts = 0;
        let mut host = |_: &u32| {
            attempts += 1;
            None::<Size>
        };

        assert!(!measurer.measure(false, || 1u32, &mut host, |_| {}));
        assert!(!measurer.measure(false, || 1u32, &mut host, |_| {}));

        assert_eq!(attempts, 1);
        assert_eq!(measurer.phase(), MeasurePhase::Detached);
        assert!(!measurer.is_probing(false));
    }
}
