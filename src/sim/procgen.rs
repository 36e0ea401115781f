//! Procedural platform and cloud generation
//!
//! Difficulty is shaped entirely by the current score and speed: gaps widen
//! and grow less predictable, platforms narrow, and heights vary more as a
//! run goes on, while a speed factor keeps every gap jumpable.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Cloud, Platform};
use crate::consts::*;

/// Generate the next platform, appended after `right_edge`.
///
/// The gap draw pushes a uniform sample through a bell-shaped
/// `sin(r·π)^(2·(1-u))` transform: at low scores mid-range gaps dominate, and
/// as the unpredictability term `u` rises toward its cap the curve flattens
/// and extreme gaps become as likely as the middle.
pub fn next_platform(rng: &mut Pcg32, score: f32, game_speed: f32, right_edge: f32) -> Platform {
    // Gap bounds widen with score
    let score_mult = 1.0 + (score / 100.0).min(0.8);
    let min_gap = 50.0 * score_mult;
    let max_gap = 110.0 * score_mult;

    let unpredictability = (0.1 + score / 200.0).min(0.8);
    let r: f32 = rng.random();
    let curved = (r * std::f32::consts::PI)
        .sin()
        .powf(2.0 * (1.0 - unpredictability));

    // Faster world scroll shrinks gaps so they stay clearable
    let speed_factor = (1.2 - (game_speed / BASE_GAME_SPEED) * 0.3).max(0.4);
    let gap = (min_gap + curved * (max_gap - min_gap)) * speed_factor;

    // Platforms narrow with score, floored so there is always a landing spot
    let size_reduction = (score / 5.0).min(30.0);
    let width = rng.random::<f32>() * 60.0 + (90.0 - size_reduction).max(60.0);

    // Height variation grows with score within a fixed band
    let variation = (20.0 + score / 10.0).min(50.0);
    let y = (GROUND_Y + rng.random_range(-variation..=variation))
        .clamp(MIN_PLATFORM_Y, MAX_PLATFORM_Y);

    Platform {
        pos: Vec2::new(right_edge + gap, y),
        width,
    }
}

/// Spawn a cloud at the given x with randomized height, size, and opacity
pub fn spawn_cloud(rng: &mut Pcg32, x: f32) -> Cloud {
    Cloud {
        pos: Vec2::new(x, rng.random::<f32>() * (FIELD_HEIGHT / 2.0)),
        size: rng.random::<f32>() * 60.0 + 40.0,
        opacity: rng.random::<f32>() * 0.4 + 0.2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    proptest! {
        #[test]
        fn platform_bounds_hold_for_all_scores(
            seed in any::<u64>(),
            score in 0.0f32..10_000.0,
            speed in BASE_GAME_SPEED..=MAX_GAME_SPEED,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let right_edge = 800.0;
            let p = next_platform(&mut rng, score, speed, right_edge);

            // Gap is never negative: the new platform starts past the edge
            prop_assert!(p.pos.x >= right_edge);
            prop_assert!(p.width > 0.0);
            prop_assert!(p.pos.y >= MIN_PLATFORM_Y && p.pos.y <= MAX_PLATFORM_Y);
        }

        #[test]
        fn cloud_bounds_hold(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let c = spawn_cloud(&mut rng, FIELD_WIDTH);
            prop_assert!(c.size >= 40.0 && c.size <= 100.0);
            prop_assert!(c.opacity >= 0.2 && c.opacity <= 0.6);
            prop_assert!(c.pos.y >= 0.0 && c.pos.y <= FIELD_HEIGHT / 2.0);
        }
    }

    #[test]
    fn gaps_shrink_with_speed() {
        // Same random draw, higher speed: the resulting gap must not grow
        let mut slow_rng = Pcg32::seed_from_u64(7);
        let mut fast_rng = Pcg32::seed_from_u64(7);
        let slow = next_platform(&mut slow_rng, 0.0, BASE_GAME_SPEED, 0.0);
        let fast = next_platform(&mut fast_rng, 0.0, MAX_GAME_SPEED, 0.0);
        assert!(fast.pos.x <= slow.pos.x);
    }

    #[test]
    fn platforms_narrow_with_score() {
        // Width floor drops by up to 30 px as score rises; with identical
        // draws the high-score platform is never wider
        let mut low_rng = Pcg32::seed_from_u64(11);
        let mut high_rng = Pcg32::seed_from_u64(11);
        let low = next_platform(&mut low_rng, 0.0, BASE_GAME_SPEED, 0.0);
        let high = next_platform(&mut high_rng, 500.0, BASE_GAME_SPEED, 0.0);
        assert!(high.width <= low.width);
    }
}
