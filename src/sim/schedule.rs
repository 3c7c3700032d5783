//! Randomized display rate schedule
//!
//! Decides how long to wait before the next change and what the next
//! rate should be. Changes that would reach `max_rate_hz` are skipped,
//! never clamped.

use rand::Rng;

use crate::config::TestConfig;

/// Draw the next wait in whole seconds from `[min, max)`
///
/// Returns `min` when the range is empty.
pub fn draw_wait_secs<R: Rng>(config: &TestConfig, rng: &mut R) -> u32 {
    let (min, max) = (config.min_interval_secs, config.max_interval_secs);
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// Pick the next display rate, or `None` to leave it unchanged
///
/// The decrease roll is only drawn when a decrease is possible; when it
/// misses, an increase is still attempted. A zero step never counts as a
/// change.
pub fn next_rate<R: Rng>(current_hz: u32, config: &TestConfig, rng: &mut R) -> Option<u32> {
    pick_rate(current_hz, config, rng).filter(|&hz| hz != current_hz)
}

fn pick_rate<R: Rng>(current_hz: u32, config: &TestConfig, rng: &mut R) -> Option<u32> {
    let step = config.update_step_hz;
    let increased = current_hz
        .checked_add(step)
        .filter(|&hz| hz < config.max_rate_hz);

    let can_decrease = config.allow_decrease
        && current_hz
            .checked_sub(step)
            .is_some_and(|hz| hz > config.starting_rate_hz);

    if can_decrease {
        if rng.random::<f64>() < config.decrease_chance {
            return Some(current_hz - step);
        }
        return increased;
    }
    increased
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn config() -> TestConfig {
        TestConfig::default()
    }

    #[test]
    fn test_increase_from_start() {
        let mut rng = Pcg32::seed_from_u64(1);
        // 30 - 15 is not above 30, so only an increase is possible
        assert_eq!(next_rate(30, &config(), &mut rng), Some(45));
        assert!(matches!(next_rate(60, &config(), &mut rng), Some(45) | Some(75)));
    }

    #[test]
    fn test_increase_suppressed_at_max() {
        let mut rng = Pcg32::seed_from_u64(1);
        let cfg = TestConfig {
            allow_decrease: false,
            ..config()
        };
        // 75 + 15 == 90 is not below the max
        assert_eq!(next_rate(75, &cfg, &mut rng), None);
    }

    #[test]
    fn test_certain_decrease() {
        let mut rng = Pcg32::seed_from_u64(7);
        let cfg = TestConfig {
            decrease_chance: 1.0,
            ..config()
        };
        assert_eq!(next_rate(75, &cfg, &mut rng), Some(60));
        // 45 - 15 == 30 is not above the start, so it increases instead
        assert_eq!(next_rate(45, &cfg, &mut rng), Some(60));
    }

    #[test]
    fn test_never_decrease_with_zero_chance() {
        let mut rng = Pcg32::seed_from_u64(7);
        let cfg = TestConfig {
            decrease_chance: 0.0,
            ..config()
        };
        for _ in 0..100 {
            assert_eq!(next_rate(60, &cfg, &mut rng), Some(75));
            assert_eq!(next_rate(75, &cfg, &mut rng), None);
        }
    }

    #[test]
    fn test_large_step_does_not_underflow() {
        let mut rng = Pcg32::seed_from_u64(3);
        let cfg = TestConfig {
            starting_rate_hz: 10,
            max_rate_hz: 1000,
            update_step_hz: 500,
            ..config()
        };
        assert_eq!(next_rate(10, &cfg, &mut rng), Some(510));
    }

    #[test]
    fn test_zero_step_is_no_change() {
        let mut rng = Pcg32::seed_from_u64(3);
        let cfg = TestConfig {
            update_step_hz: 0,
            ..config()
        };
        assert_eq!(next_rate(30, &cfg, &mut rng), None);
        assert_eq!(next_rate(60, &cfg, &mut rng), None);
    }

    #[test]
    fn test_wait_range() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..500 {
            let secs = draw_wait_secs(&config(), &mut rng);
            assert!((4..8).contains(&secs), "wait {secs} outside [4, 8)");
        }
        let fixed = TestConfig {
            min_interval_secs: 5,
            max_interval_secs: 5,
            ..config()
        };
        assert_eq!(draw_wait_secs(&fixed, &mut rng), 5);
    }
}
