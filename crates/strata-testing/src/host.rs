use strata_core::collections::map::{HashMap, HashSet};
use strata_core::Size;
use strata_foundation::virtualized::MeasureHost;

/// Width reported by the test hosts. Layouts only read heights.
pub const TEST_ITEM_WIDTH: f32 = 240.0;

/// Reports the same size for every probe.
#[derive(Clone, Debug)]
pub struct FixedHost {
    size: Size,
    calls: usize,
}

impl FixedHost {
    pub fn new(height: f32) -> Self {
        Self {
            size: Size::new(TEST_ITEM_WIDTH, height),
            calls: 0,
        }
    }

    /// Number of probes measured so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl<C: ?Sized> MeasureHost<C> for FixedHost {
    fn measure(&mut self, _content: &C) -> Option<Size> {
        self.calls += 1;
        Some(self.size)
    }
}

/// Looks heights up by the rendered label.
///
/// Labels without an entry get the default height. Detached labels have no
/// render target. Every probe is appended to the call log.
#[derive(Clone, Debug)]
pub struct TableHost {
    heights: HashMap<String, f32>,
    default_height: f32,
    detached: HashSet<String>,
    log: Vec<String>,
}

impl TableHost {
    pub fn new(default_height: f32) -> Self {
        Self {
            heights: HashMap::default(),
            default_height,
            detached: HashSet::default(),
            log: Vec::new(),
        }
    }

    pub fn with_height(mut self, label: impl Into<String>, height: f32) -> Self {
        self.heights.insert(label.into(), height);
        self
    }

    pub fn with_detached(mut self, label: impl Into<String>) -> Self {
        self.detached.insert(label.into());
        self
    }

    /// Labels measured so far, in call order.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl<C: AsRef<str> + ?Sized> MeasureHost<C> for TableHost {
    fn measure(&mut self, content: &C) -> Option<Size> {
        let label = content.as_ref();
        self.log.push(label.to_owned());
        if self.detached.contains(label) {
            return None;
        }
        let height = self
            .heights
            .get(label)
            .copied()
            .unwrap_or(self.default_height);
        Some(Size::new(TEST_ITEM_WIDTH, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_host_lookup() {
        let mut host = TableHost::new(50.0)
            .with_height("tall", 400.0)
            .with_detached("gone");
        assert_eq!(MeasureHost::<str>::measure(&mut host, "tall").map(|s| s.height), Some(400.0));
        assert_eq!(MeasureHost::<str>::measure(&mut host, "other").map(|s| s.height), Some(50.0));
        assert_eq!(MeasureHost::<str>::measure(&mut host, "gone"), None);
        assert_eq!(host.log(), ["tall", "other", "gone"]);
    }

    #[test]
    fn test_fixed_host_counts_calls() {
        let mut host = FixedHost::new(80.0);
        MeasureHost::<u8>::measure(&mut host, &1);
        MeasureHost::<u8>::measure(&mut host, &2);
        assert_eq!(host.calls(), 2);
    }
}
