//! Monitor refresh rate estimation
//!
//! Feed it animation frame timestamps; it averages the last ten frame
//! intervals.

use std::collections::VecDeque;

/// Frame intervals averaged per estimate
const WINDOW_FRAMES: usize = 10;

/// Estimates the display refresh rate from frame timestamps
#[derive(Debug, Clone, Default)]
pub struct RefreshEstimator {
    /// Newest first
    stamps: VecDeque<f64>,
    latest: Option<u32>,
}

impl RefreshEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame timestamp (ms) and return the estimate once enough
    /// frames have been seen
    pub fn push(&mut self, stamp_ms: f64) -> Option<u32> {
        self.stamps.push_front(stamp_ms);
        if self.stamps.len() > WINDOW_FRAMES {
            if let Some(oldest) = self.stamps.pop_back() {
                let elapsed = stamp_ms - oldest;
                if elapsed > 0.0 {
                    let hz = (1000.0 * WINDOW_FRAMES as f64 / elapsed).floor();
                    self.latest = Some(hz as u32);
                }
            }
        }
        self.latest
    }

    /// Most recent estimate
    pub fn estimate(&self) -> Option<u32> {
        self.latest
    }
}
