//! Deterministic test core
//!
//! All experiment logic lives here. This module must be pure and deterministic:
//! - Time only advances through `TestController::advance_to`
//! - Seeded RNG only
//! - Timers due together fire in scheduling order
//! - No DOM or canvas dependencies (drawing goes through `platform::Surface`)

pub mod ball;
pub mod controller;
pub mod schedule;
pub mod timers;

pub use ball::{Ball, BallSnapshot, BallTint, Xy};
pub use controller::{CompletionListener, RunOptions, TestController, TestPhase, TestRunState};
pub use schedule::{draw_wait_secs, next_rate};
pub use timers::{Fired, TimerId, TimerTask, Timers};
