//! Drag-to-impulse translation
//!
//! The input system reports drags as an angle in degrees plus a distance in
//! pixels. Distance normalizes into a power of 0 to 100, capped at half the
//! world height of drag. The impulse points opposite the drag: pull back
//! and release, slingshot style. The same translation serves both actions;
//! only the per-action scale differs, which keeps physical tuning
//! centralized instead of spread across per-entity masses.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::polar_to_cartesian;

/// Drag fraction of world height at which power saturates
pub const POWER_CAP_FRAC: f32 = 0.5;
/// Multiplier taking the capped fraction to a 0..=100 power scale
pub const POWER_SCALE: f32 = 200.0;

/// A drag gesture observation from the input system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSample {
    /// Where the drag started, in viewport pixels
    pub start: Vec2,
    /// Current drag angle in degrees
    pub angle_deg: f32,
    /// Current drag distance in pixels
    pub distance_px: f32,
}

/// Normalize a drag distance into power: 0 to 100, saturating once the
/// drag spans half the world height
pub fn power(distance_px: f32, world_height: f32) -> f32 {
    (distance_px / world_height).min(POWER_CAP_FRAC) * POWER_SCALE
}

/// Unit vector along the drag direction
pub fn drag_direction(angle_deg: f32) -> Vec2 {
    polar_to_cartesian(1.0, angle_deg.to_radians())
}

/// Impulse for a released drag: opposite the drag direction, scaled by
/// power and the per-action coefficient
pub fn impulse(angle_deg: f32, power: f32, scale: f32) -> Vec2 {
    -drag_direction(angle_deg) * power * scale
}

/// Projectile spawn point: offset from the character's center along the
/// launch direction, clear of the character's own collision shape
pub fn muzzle_position(character_pos: Vec2, angle_deg: f32, offset: f32) -> Vec2 {
    character_pos - drag_direction(angle_deg) * offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WORLD_HEIGHT: f32 = 720.0;

    #[test]
    fn test_power_formula() {
        assert_eq!(power(0.0, WORLD_HEIGHT), 0.0);
        // Quarter-height drag is half power
        assert!((power(WORLD_HEIGHT * 0.25, WORLD_HEIGHT) - 50.0).abs() < 1e-4);
        // Cap at half the world height
        assert_eq!(power(WORLD_HEIGHT, WORLD_HEIGHT), 100.0);
        assert_eq!(power(WORLD_HEIGHT * 10.0, WORLD_HEIGHT), 100.0);
    }

    #[test]
    fn test_impulse_opposes_drag() {
        // Drag straight down and to the right; impulse goes up-left
        let imp = impulse(45.0, 50.0, 1.0);
        assert!(imp.x < 0.0);
        assert!(imp.y < 0.0);

        // Drag straight down launches straight up
        let imp = impulse(90.0, 50.0, 1.0);
        assert!(imp.x.abs() < 1e-3);
        assert!(imp.y < 0.0);
    }

    #[test]
    fn test_muzzle_clears_character() {
        let pos = Vec2::new(100.0, 200.0);
        let muzzle = muzzle_position(pos, 180.0, 40.0);
        // Drag points left, so the muzzle (and the shot) sit to the right
        assert!((muzzle - pos).length() > 39.0);
        assert!(muzzle.x > pos.x);
    }

    proptest! {
        /// Power is monotonic non-decreasing in distance and capped at 100
        #[test]
        fn prop_power_monotonic_capped(a in 0.0f32..5000.0, b in 0.0f32..5000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p_lo = power(lo, WORLD_HEIGHT);
            let p_hi = power(hi, WORLD_HEIGHT);
            prop_assert!(p_lo <= p_hi);
            prop_assert!((0.0..=100.0).contains(&p_lo));
            prop_assert!((0.0..=100.0).contains(&p_hi));
        }

        /// Impulse magnitude is power times scale
        #[test]
        fn prop_impulse_magnitude(angle in -180.0f32..180.0, pw in 0.0f32..100.0) {
            let imp = impulse(angle, pw, 2.0);
            prop_assert!((imp.length() - pw * 2.0).abs() < 1e-2);
        }
    }
}
