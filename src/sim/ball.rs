//! Bouncing ball physics
//!
//! The physics ticker is the only writer; the render ticker and event
//! snapshots only read.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Ball color state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallTint {
    #[default]
    Neutral,
    /// Shown while the user holds the button down
    Pressed,
}

/// The bouncing ball
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub tint: BallTint,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: Vec2::new(BALL_START_X, BALL_START_Y),
            vel: Vec2::new(BALL_SPEED_X, BALL_SPEED_Y),
            radius: BALL_RADIUS,
            tint: BallTint::Neutral,
        }
    }
}

impl Ball {
    /// Advance one physics tick inside `bounds` (width, height)
    ///
    /// Reflects each axis whose next position would leave
    /// `[radius, bound - radius]`, then integrates. No sub-step correction:
    /// at high speed the ball can overshoot the bound by up to one step.
    pub fn step(&mut self, bounds: Vec2) {
        let next = self.pos + self.vel;
        if next.x > bounds.x - self.radius || next.x < self.radius {
            self.vel.x = -self.vel.x;
        }
        if next.y > bounds.y - self.radius || next.y < self.radius {
            self.vel.y = -self.vel.y;
        }
        self.pos += self.vel;
    }

    /// Point-in-time copy for the event log
    pub fn snapshot(&self) -> BallSnapshot {
        BallSnapshot {
            position: self.pos.into(),
            speed: self.vel.into(),
        }
    }
}

/// Plain `{x, y}` record used in exports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xy {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for Xy {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Xy> for Vec2 {
    fn from(p: Xy) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Ball position and velocity at the moment an event was recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub position: Xy,
    pub speed: Xy,
}
