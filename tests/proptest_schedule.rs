//! Property-based tests for the test core.
//!
//! Verifies:
//! - Rate decisions never leave `[starting_rate_hz, max_rate_hz)`
//! - Waits stay in `[min, max)` whole seconds
//! - Ball physics keeps the ball inside its bounds
//! - Whole sessions: rates in range, timestamps non-decreasing,
//!   clicks only while running

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use hz_bounce::platform::{RecordingSurface, Surface};
use hz_bounce::sim::{Ball, BallTint, draw_wait_secs, next_rate};
use hz_bounce::{Event, EventKind, RunOptions, TestConfig, TestController, TestPhase};

// ────────────────────────────────────────────────────────────────────
// Strategies
// ────────────────────────────────────────────────────────────────────

fn arb_config() -> impl Strategy<Value = TestConfig> {
    (
        1u32..120,
        0u32..120,
        0u32..40,
        any::<bool>(),
        0.0..=1.0_f64,
        0u32..6,
        0u32..6,
    )
        .prop_map(|(start, extra, step, allow, chance, a, b)| TestConfig {
            test_length_secs: 20,
            starting_rate_hz: start,
            max_rate_hz: start + extra,
            update_step_hz: step,
            allow_decrease: allow,
            decrease_chance: chance,
            min_interval_secs: a.min(b),
            max_interval_secs: a.max(b),
        })
}

/// A rate reachable from the start by whole steps, below the max
fn arb_reachable_rate(config: &TestConfig, k: u32) -> u32 {
    let step = config.update_step_hz.max(1);
    let span = config.max_rate_hz.saturating_sub(config.starting_rate_hz + 1);
    config.starting_rate_hz + (k % (span / step + 1)) * step
}

// ────────────────────────────────────────────────────────────────────
// Rate schedule
// ────────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn next_rate_stays_in_range(config in arb_config(), k in 0u32..100, seed in any::<u64>()) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut current = arb_reachable_rate(&config, k);
        for _ in 0..50 {
            if let Some(hz) = next_rate(current, &config, &mut rng) {
                prop_assert!(hz >= config.starting_rate_hz, "{} below start", hz);
                prop_assert!(hz < config.max_rate_hz || hz == config.starting_rate_hz, "{} reached max", hz);
                prop_assert!(hz.abs_diff(current) == config.update_step_hz);
                current = hz;
            }
        }
    }

    #[test]
    fn no_decrease_never_goes_down(config in arb_config(), seed in any::<u64>()) {
        let config = TestConfig { allow_decrease: false, ..config };
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut current = config.starting_rate_hz;
        for _ in 0..50 {
            if let Some(hz) = next_rate(current, &config, &mut rng) {
                prop_assert!(hz > current || config.update_step_hz == 0);
                current = hz;
            }
        }
    }

    #[test]
    fn wait_within_bounds(config in arb_config(), seed in any::<u64>()) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let secs = draw_wait_secs(&config, &mut rng);
        if config.max_interval_secs > config.min_interval_secs {
            prop_assert!(secs >= config.min_interval_secs && secs < config.max_interval_secs);
        } else {
            prop_assert_eq!(secs, config.min_interval_secs);
        }
    }
}

// ────────────────────────────────────────────────────────────────────
// Ball physics
// ────────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ball_stays_inside_bounds(
        w in 200.0..2000.0_f32,
        h in 200.0..2000.0_f32,
        fx in 0.0..=1.0_f32,
        fy in 0.0..=1.0_f32,
        vx in -20.0..20.0_f32,
        vy in -20.0..20.0_f32,
        ticks in 1usize..3000,
    ) {
        let radius = 50.0;
        let bounds = Vec2::new(w, h);
        let mut ball = Ball {
            pos: Vec2::new(radius + fx * (w - 2.0 * radius), radius + fy * (h - 2.0 * radius)),
            vel: Vec2::new(vx, vy),
            radius,
            tint: BallTint::Neutral,
        };
        let speed = ball.vel.abs();
        for _ in 0..ticks {
            ball.step(bounds);
            prop_assert!(ball.pos.x >= radius - 1e-2 && ball.pos.x <= w - radius + 1e-2, "x {}", ball.pos.x);
            prop_assert!(ball.pos.y >= radius - 1e-2 && ball.pos.y <= h - radius + 1e-2, "y {}", ball.pos.y);
            prop_assert_eq!(ball.vel.abs(), speed);
        }
    }
}

// ────────────────────────────────────────────────────────────────────
// Whole sessions
// ────────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn session_invariants(
        config in arb_config(),
        seed in any::<u64>(),
        presses in proptest::collection::vec(0.0..30_000.0_f64, 0..20),
    ) {
        let t0 = 1_000_000.0;
        let mut controller = TestController::new(config.clone(), RunOptions::seeded(seed)).unwrap();
        let mut surface = RecordingSurface::new(1280.0, 720.0);
        controller.start(t0, surface.size());

        let mut presses = presses;
        presses.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut recorded = 0;
        for offset in presses {
            let now = t0 + offset;
            controller.advance_to(now, &mut surface);
            let phase_before = controller.phase();
            if controller.press(now, &mut surface) {
                prop_assert_eq!(phase_before, TestPhase::Running);
                recorded += 1;
            } else {
                prop_assert_ne!(phase_before, TestPhase::Running);
            }
            controller.release(now + 50.0, &mut surface);
        }
        controller.advance_to(t0 + 40_000.0, &mut surface);
        prop_assert_eq!(controller.phase(), TestPhase::Complete);

        let events = controller.events();
        prop_assert_eq!(events.count(EventKind::UserClick), recorded);
        let stamps: Vec<f64> = events.iter().map(Event::timestamp).collect();
        prop_assert!(stamps.windows(2).all(|w| w[0] <= w[1]));

        let run_start = t0 + 6000.0;
        let run_end = run_start + config.test_length_ms();
        for event in events {
            prop_assert!(event.timestamp() >= run_start && event.timestamp() < run_end);
            if let Event::RateChange { current, .. } = *event {
                prop_assert!(current >= config.starting_rate_hz);
                prop_assert!(current < config.max_rate_hz || current == config.starting_rate_hz);
            }
        }
    }
}
