//! Per-index delay generators.

use serde::{Deserialize, Serialize};

/// Index-dependent delay: `start + |index - from| * base`.
///
/// With the defaults (`from = 0`, `start = 0`) element `i` waits `i * base`
/// milliseconds, so a collection animates as a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stagger {
    /// Delay added per index step away from `from`.
    pub base_ms: f64,
    /// Index that starts first.
    pub from: usize,
    /// Delay applied to every index before staggering.
    pub start_ms: f64,
}

impl Default for Stagger {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Stagger {
    pub fn new(base_ms: f64) -> Self {
        Self {
            base_ms,
            from: 0,
            start_ms: 0.0,
        }
    }

    /// Spread outwards from `index` instead of from the first element.
    pub fn from(mut self, index: usize) -> Self {
        self.from = index;
        self
    }

    /// Offset the whole cascade.
    pub fn start(mut self, start_ms: f64) -> Self {
        self.start_ms = start_ms;
        self
    }

    /// Delay for the element at `index`.
    pub fn delay_for(&self, index: usize) -> f64 {
        let distance = index.abs_diff(self.from) as f64;
        self.start_ms + distance * self.base_ms
    }

    /// Delays for a collection of `count` elements.
    pub fn delays(&self, count: usize) -> Vec<f64> {
        (0..count).map(|i| self.delay_for(i)).collect()
    }
}

/// Shorthand for [`Stagger::new`].
pub fn stagger(base_ms: f64) -> Stagger {
    Stagger::new(base_ms)
}
