//! Test controller
//!
//! Owns the timed experiment: countdown, physics ticks, render ticks at the
//! current display rate, the randomized rate schedule, and the completion
//! signal. Everything runs from [`TestController::advance_to`], which fires
//! due timers one at a time, so no callback ever interleaves with another.

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::ball::{Ball, BallTint};
use super::schedule::{draw_wait_secs, next_rate};
use super::timers::{Fired, TimerId, TimerTask, Timers};
use crate::config::TestConfig;
use crate::consts::*;
use crate::error::{ConfigError, SessionError};
use crate::events::{DisplaySnapshot, Event, EventLog};
use crate::platform::Surface;
use crate::render_period_ms;

/// Shortest wait between rate decisions, so a zero-second wait still lets time move
const MIN_RATE_WAIT_MS: f64 = PHYSICS_TICK_MS;

/// Controller lifecycle. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPhase {
    /// Constructed, waiting for `start`
    Idle,
    /// Counting down; `remaining` is the next value to show (0 = about to run)
    Countdown { remaining: u32 },
    /// Ball moving, rate changing, clicks recorded
    Running,
    /// Test length elapsed (or skipped); listener notified
    Complete,
    /// Surface resized mid-test; the session must be restarted
    Aborted,
}

impl TestPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TestPhase::Complete | TestPhase::Aborted)
    }
}

/// Run state handed to the completion listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TestRunState {
    pub current_rate_hz: u32,
    pub has_counted_down: bool,
    pub is_complete: bool,
}

/// Per-run options that are not part of the test config
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Seed for the rate schedule
    pub seed: u64,
    /// Jump straight to Complete on start (debug)
    pub skip_to_complete: bool,
}

impl RunOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            skip_to_complete: false,
        }
    }
}

/// Receives the final state and log, exactly once
pub type CompletionListener = Box<dyn FnOnce(&TestRunState, &EventLog)>;

/// Drives a single perception test run
pub struct TestController {
    config: TestConfig,
    options: RunOptions,
    phase: TestPhase,
    run: TestRunState,
    ball: Ball,
    bounds: Vec2,
    /// Time of the callback currently running (or last `advance_to` target)
    clock_ms: f64,
    timers: Timers,
    render_timer: Option<TimerId>,
    rng: Pcg32,
    log: EventLog,
    on_complete: Option<CompletionListener>,
}

impl fmt::Debug for TestController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestController")
            .field("phase", &self.phase)
            .field("run", &self.run)
            .field("clock_ms", &self.clock_ms)
            .field("events", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl TestController {
    /// Build a controller; rejects configs that break the invariants
    pub fn new(config: TestConfig, options: RunOptions) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            run: TestRunState {
                current_rate_hz: config.starting_rate_hz,
                has_counted_down: false,
                is_complete: false,
            },
            config,
            options,
            phase: TestPhase::Idle,
            ball: Ball::default(),
            bounds: Vec2::ZERO,
            clock_ms: 0.0,
            timers: Timers::new(),
            render_timer: None,
            rng: Pcg32::seed_from_u64(options.seed),
            log: EventLog::new(),
            on_complete: None,
        })
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    pub fn state(&self) -> TestRunState {
        self.run
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Render cadence at the current rate (None until running)
    pub fn render_period_ms(&self) -> Option<f64> {
        self.render_timer
            .map(|_| render_period_ms(self.run.current_rate_hz))
    }

    /// When the next timer fires, if any
    pub fn next_due(&self) -> Option<f64> {
        self.timers.next_due()
    }

    /// Set the completion listener (replaces an earlier one)
    pub fn register_on_complete(&mut self, listener: CompletionListener) {
        if self.on_complete.is_some() {
            log::warn!("Replacing existing completion listener");
        }
        self.on_complete = Some(listener);
    }

    /// Begin the countdown on a surface of size `bounds`
    ///
    /// Returns false (and does nothing) if already started.
    pub fn start(&mut self, now_ms: f64, bounds: Vec2) -> bool {
        if self.phase != TestPhase::Idle {
            log::debug!("Ignoring start in phase {:?}", self.phase);
            return false;
        }
        self.clock_ms = self.clock_ms.max(now_ms);
        self.bounds = bounds;

        if self.options.skip_to_complete {
            log::info!("Skipping test");
            self.complete();
            return true;
        }

        log::info!(
            "Starting countdown ({}s test, {} Hz start, seed {})",
            self.config.test_length_secs,
            self.config.starting_rate_hz,
            self.options.seed
        );
        self.phase = TestPhase::Countdown {
            remaining: COUNTDOWN_FROM,
        };
        self.timers
            .schedule_once(self.clock_ms, COUNTDOWN_STEP_MS, TimerTask::CountdownStep);
        true
    }

    /// Fire every timer due at or before `now_ms`, in order
    pub fn advance_to(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        while let Some(fired) = self.timers.pop_due(now_ms) {
            self.clock_ms = self.clock_ms.max(fired.due_ms);
            self.dispatch(fired, surface);
        }
        self.clock_ms = self.clock_ms.max(now_ms);
    }

    /// User pressed the button. Returns true if a click was recorded.
    pub fn press(&mut self, now_ms: f64, surface: &mut dyn Surface) -> bool {
        self.advance_to(now_ms, surface);
        if self.phase != TestPhase::Running {
            log::debug!("Ignoring press in phase {:?}", self.phase);
            return false;
        }
        self.ball.tint = BallTint::Pressed;
        let event = Event::UserClick {
            ts: self.clock_ms,
            display: self.display_snapshot(),
        };
        self.log.record(event);
        true
    }

    /// User released the button
    pub fn release(&mut self, now_ms: f64, surface: &mut dyn Surface) {
        self.advance_to(now_ms, surface);
        if self.phase == TestPhase::Running {
            self.ball.tint = BallTint::Neutral;
        }
    }

    /// Surface changed size. Fatal while counting down or running.
    pub fn resize(&mut self, bounds: Vec2) -> Result<(), SessionError> {
        if bounds == self.bounds {
            return Ok(());
        }
        match self.phase {
            TestPhase::Idle => {
                self.bounds = bounds;
                Ok(())
            }
            TestPhase::Countdown { .. } | TestPhase::Running => {
                log::warn!("Surface resized mid-test, aborting");
                self.timers.cancel_all();
                self.render_timer = None;
                self.phase = TestPhase::Aborted;
                Err(SessionError::Resized)
            }
            TestPhase::Complete | TestPhase::Aborted => Ok(()),
        }
    }

    fn dispatch(&mut self, fired: Fired, surface: &mut dyn Surface) {
        if self.phase.is_terminal() {
            return;
        }
        match fired.task {
            TimerTask::CountdownStep => self.countdown_step(surface),
            TimerTask::PhysicsTick => self.ball.step(self.bounds),
            TimerTask::RenderTick => {
                surface.clear();
                surface.fill_circle(self.ball.pos, self.ball.radius, self.ball.tint);
            }
            TimerTask::RateChange => {
                if let Some(hz) = next_rate(self.run.current_rate_hz, &self.config, &mut self.rng) {
                    self.set_rate(hz);
                }
                self.schedule_rate_wait();
            }
            TimerTask::TestTimeout => self.complete(),
        }
    }

    fn countdown_step(&mut self, surface: &mut dyn Surface) {
        let TestPhase::Countdown { remaining } = self.phase else {
            return;
        };
        if remaining > 0 {
            surface.draw_countdown(remaining);
            self.phase = TestPhase::Countdown {
                remaining: remaining - 1,
            };
            self.timers
                .schedule_once(self.clock_ms, COUNTDOWN_STEP_MS, TimerTask::CountdownStep);
        } else {
            self.begin_running();
        }
    }

    fn begin_running(&mut self) {
        log::info!("Countdown finished, test running");
        self.run.has_counted_down = true;
        self.phase = TestPhase::Running;
        self.timers
            .schedule_repeating(self.clock_ms, PHYSICS_TICK_MS, TimerTask::PhysicsTick);
        self.timers.schedule_once(
            self.clock_ms,
            self.config.test_length_ms(),
            TimerTask::TestTimeout,
        );
        self.set_rate(self.config.starting_rate_hz);
        self.schedule_rate_wait();
    }

    /// Swap the render cadence and record the change, as one step
    fn set_rate(&mut self, hz: u32) {
        if let Some(old) = self.render_timer.take() {
            self.timers.cancel(old);
        }
        self.render_timer = Some(self.timers.schedule_repeating(
            self.clock_ms,
            render_period_ms(hz),
            TimerTask::RenderTick,
        ));

        let previous = self.run.current_rate_hz;
        self.run.current_rate_hz = hz;
        log::info!("Display rate {} Hz -> {} Hz", previous, hz);
        let event = Event::RateChange {
            ts: self.clock_ms,
            display: self.display_snapshot(),
            previous,
            current: hz,
        };
        self.log.record(event);
    }

    fn schedule_rate_wait(&mut self) {
        let secs = draw_wait_secs(&self.config, &mut self.rng);
        let wait_ms = (f64::from(secs) * 1000.0).max(MIN_RATE_WAIT_MS);
        self.timers
            .schedule_once(self.clock_ms, wait_ms, TimerTask::RateChange);
    }

    fn complete(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.timers.cancel_all();
        self.render_timer = None;
        self.phase = TestPhase::Complete;
        self.run.is_complete = true;
        log::info!(
            "Test complete: {} events, final rate {} Hz",
            self.log.len(),
            self.run.current_rate_hz
        );
        if let Some(listener) = self.on_complete.take() {
            listener(&self.run, &self.log);
        }
    }

    fn display_snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot {
            hz: self.run.current_rate_hz,
            ball: self.ball.snapshot(),
        }
    }
}
