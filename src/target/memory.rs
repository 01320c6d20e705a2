//! In-memory render target

use super::RenderTarget;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Recorded {
    visible: bool,
    fills: Vec<f64>,
    writes: u64,
}

/// Records bar fills instead of drawing them.
///
/// Clones share the same record, so a host can keep one handle for reading
/// while the widget owns the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryTarget {
    inner: Arc<Mutex<Recorded>>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current fill percentages, one per attached bar
    pub fn fills(&self) -> Vec<f64> {
        self.inner
            .lock()
            .map(|recorded| recorded.fills.clone())
            .unwrap_or_default()
    }

    /// Total number of `set_fill` calls received
    pub fn writes(&self) -> u64 {
        self.inner.lock().map(|recorded| recorded.writes).unwrap_or(0)
    }

    /// Add or drop bars behind the widget's back
    pub fn resize(&self, count: usize) {
        if let Ok(mut recorded) = self.inner.lock() {
            recorded.fills.resize(count, 0.0);
        }
    }
}

impl RenderTarget for MemoryTarget {
    fn set_visible(&mut self, visible: bool) {
        if let Ok(mut recorded) = self.inner.lock() {
            recorded.visible = visible;
        }
    }

    fn is_visible(&self) -> bool {
        self.inner.lock().map(|recorded| recorded.visible).unwrap_or(false)
    }

    fn attach_bars(&mut self, count: usize) {
        if let Ok(mut recorded) = self.inner.lock() {
            recorded.fills = vec![0.0; count];
        }
    }

    fn bar_count(&self) -> usize {
        self.inner.lock().map(|recorded| recorded.fills.len()).unwrap_or(0)
    }

    fn set_fill(&mut self, index: usize, percent: f64) {
        if let Ok(mut recorded) = self.inner.lock()
            && let Some(fill) = recorded.fills.get_mut(index)
        {
            *fill = percent;
            recorded.writes += 1;
        }
    }
}
