//! Hz Bounce - A refresh rate perception test
//!
//! Core modules:
//! - `sim`: Deterministic test core (ball physics, rate schedule, timers, controller)
//! - `events`: Append-only log of rate changes and user clicks
//! - `report`: Export payload and chart data derived from the log
//! - `refresh`: Monitor refresh rate estimation
//! - `platform`: Drawable surface abstraction (canvas on web, recording on native)
//! - `config`: Test configuration and persistence

pub mod config;
pub mod error;
pub mod events;
pub mod platform;
pub mod refresh;
pub mod report;
pub mod sim;

pub use config::{DisplaySettings, TestConfig};
pub use error::{ConfigError, SessionError};
pub use events::{Event, EventKind, EventLog};
pub use sim::{RunOptions, TestController, TestPhase, TestRunState};

/// Timing and ball constants
pub mod consts {
    /// Physics tick period (1000 Hz, independent of the display rate)
    pub const PHYSICS_TICK_MS: f64 = 1.0;

    /// First countdown value shown
    pub const COUNTDOWN_FROM: u32 = 5;
    /// Delay before the first countdown value, and between values
    pub const COUNTDOWN_STEP_MS: f64 = 1000.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 50.0;
    pub const BALL_START_X: f32 = 100.0;
    pub const BALL_START_Y: f32 = 100.0;
    pub const BALL_SPEED_X: f32 = 2.0;
    pub const BALL_SPEED_Y: f32 = -2.0;

    /// Padding added to the last timestamp when closing open timeline ranges
    pub const TIMELINE_TAIL_MS: f64 = 1000.0;
}

/// Render cadence for a display rate, in milliseconds
#[inline]
pub fn render_period_ms(rate_hz: u32) -> f64 {
    1000.0 / f64::from(rate_hz.max(1))
}
