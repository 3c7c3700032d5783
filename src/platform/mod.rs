//! Platform abstraction layer
//!
//! The controller only needs somewhere to draw:
//! - `Surface`: clear, filled circle, countdown value
//! - `RecordingSurface`: headless surface for native runs and tests
//! - `web::CanvasSurface`: canvas 2D context (WASM only)

use glam::Vec2;

use crate::sim::BallTint;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// A drawable surface with fixed pixel dimensions
pub trait Surface {
    /// Width and height in pixels
    fn size(&self) -> Vec2;
    /// Clear everything
    fn clear(&mut self);
    /// Draw a filled circle
    fn fill_circle(&mut self, center: Vec2, radius: f32, tint: BallTint);
    /// Show a countdown value before the test starts
    fn draw_countdown(&mut self, value: u32);
}

/// A single drawn ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub center: Vec2,
    pub radius: f32,
    pub tint: BallTint,
}

/// Surface that remembers what was drawn
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Vec2,
    pub clears: usize,
    pub frames: Vec<Frame>,
    pub countdown: Vec<u32>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            clears: 0,
            frames: Vec::new(),
            countdown: Vec::new(),
        }
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, tint: BallTint) {
        self.frames.push(Frame {
            center,
            radius,
            tint,
        });
    }

    fn draw_countdown(&mut self, value: u32) {
        self.countdown.push(value);
    }
}
