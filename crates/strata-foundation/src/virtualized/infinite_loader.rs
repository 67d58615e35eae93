//! Load-more trigger for window-scrolled content.
//!
//! The loader wraps a growing layout (usually a masonry) and reports when
//! the bottom of the viewport has moved past the bottom of the content.
//! Fetching the next page is left to the caller.

use strata_core::finite_or_zero;

/// Window scroll position and viewport size for one scroll event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub window_scroll: f32,
    pub viewport_height: f32,
}

impl ScrollMetrics {
    pub fn new(window_scroll: f32, viewport_height: f32) -> Self {
        Self {
            window_scroll,
            viewport_height,
        }
    }
}

/// Whether the viewport bottom has passed the end of the loader's content.
pub fn should_load_more(loader_offset: f32, scroll: ScrollMetrics, content_height: f32) -> bool {
    let current = (finite_or_zero(scroll.window_scroll) - finite_or_zero(loader_offset)).max(0.0);
    current + finite_or_zero(scroll.viewport_height) > content_height
}

/// Stateful load-more trigger.
///
/// The loader's offset in the page is captured once, when it mounts.
#[derive(Clone, Debug, Default)]
pub struct InfiniteLoader {
    offset_top: Option<f32>,
}

impl InfiniteLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the loader's offset in the page. Later calls are ignored.
    pub fn mount(&mut self, offset_top: f32) {
        if self.offset_top.is_none() {
            self.offset_top = Some(finite_or_zero(offset_top));
        }
    }

    pub fn offset_top(&self) -> Option<f32> {
        self.offset_top
    }

    /// Returns `true` when more content should be requested.
    ///
    /// An unmounted loader never triggers.
    pub fn on_scroll(&self, scroll: ScrollMetrics, content_height: f32) -> bool {
        let Some(offset) = self.offset_top else {
            log::trace!("infinite loader: scroll before mount");
            return false;
        };
        should_load_more(offset, scroll, content_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_when_viewport_passes_content() {
        assert!(!should_load_more(0.0, ScrollMetrics::new(0.0, 800.0), 5000.0));
        assert!(!should_load_more(0.0, ScrollMetrics::new(4200.0, 800.0), 5000.0));
        assert!(should_load_more(0.0, ScrollMetrics::new(4201.0, 800.0), 5000.0));
    }

    #[test]
    fn test_offset_is_subtracted() {
        assert!(!should_load_more(300.0, ScrollMetrics::new(4300.0, 800.0), 5000.0));
        assert!(should_load_more(300.0, ScrollMetrics::new(4600.0, 800.0), 5000.0));
    }

    #[test]
    fn test_short_content_triggers_immediately() {
        assert!(should_load_more(0.0, ScrollMetrics::new(0.0, 800.0), 400.0));
    }

    #[test]
    fn test_unmounted_loader_never_triggers() {
        let loader = InfiniteLoader::new();
        assert!(!loader.on_scroll(ScrollMetrics::new(1.0e6, 800.0), 10.0));
    }

    #[test]
    fn test_offset_recorded_once() {
        let mut loader = InfiniteLoader::new();
        loader.mount(120.0);
        loader.mount(900.0);
        assert_eq!(loader.offset_top(), Some(120.0));
        assert!(loader.on_scroll(ScrollMetrics::new(4400.0, 800.0), 5000.0));
    }
}
