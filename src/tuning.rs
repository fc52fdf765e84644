//! Data-driven game balance
//!
//! Every empirically-tuned constant lives here rather than inline in the
//! sim, so balance can be tweaked (or loaded from JSON) without touching
//! gameplay code. The impulse scales in particular carry no intrinsic
//! meaning; they are matched to an impulse = mass * delta-v engine working
//! in pixels and seconds, and a host with a different unit scale is
//! expected to re-tune them.

use serde::{Deserialize, Serialize};

/// Tunable balance numbers for a match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Turn flow ===
    /// Number of combatants in the roster
    pub character_count: u32,
    /// Drags with power at or below this are discarded as no-ops
    pub min_power: f32,
    /// Ticks between a terrain bounce and the fuse re-arming. Duplicate
    /// notifications for the same contact land inside this window.
    pub bounce_rearm_ticks: u64,
    /// Mirror velocity above which a body is no longer considered at rest
    pub sleep_velocity_threshold: f32,

    // === Impulses ===
    /// Impulse per unit power for a jump. Small: the character takes a hop.
    pub jump_impulse_scale: f32,
    /// Impulse per unit power for a shot. Much larger relative to the
    /// projectile's mass, so the projectile leaves fast and flat.
    pub shot_impulse_scale: f32,
    /// Distance from the character's center to the projectile spawn point
    pub muzzle_offset: f32,

    // === Bodies ===
    pub character_radius: f32,
    pub character_mass: f32,
    pub character_friction: f32,
    pub character_restitution: f32,
    pub projectile_radius: f32,
    pub projectile_mass: f32,
    pub projectile_friction: f32,
    pub projectile_restitution: f32,
    /// Viewport edge collider material
    pub edge_friction: f32,
    pub edge_restitution: f32,

    // === Explosions ===
    /// Blast radius for a full-effect detonation
    pub max_explosion_radius: f32,
    /// Damage per unit of distance inside the blast radius
    pub max_damage_factor: f32,
    /// Knockback impulse = radius / distance * this
    pub knockback_scale: f32,
    /// Explosion visual size multiplier per tick
    pub explosion_growth: f32,
    /// Material applied to characters thrown by a blast
    pub blast_friction: f32,
    pub blast_restitution: f32,

    // === Terrain ===
    /// Fraction of world height between the bottom edge and the lowest
    /// possible surface point
    pub terrain_floor_frac: f32,
    /// Fraction of world height the surface may vary over
    pub terrain_height_frac: f32,
    /// Thickness of the decomposed terrain rectangles
    pub terrain_thickness: f32,

    // === Spawning ===
    /// Horizontal margin (fraction of width) inside which characters spawn
    pub spawn_margin_frac: f32,
    /// Spawn height as a fraction of world height, measured from the top
    pub spawn_height_frac: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            character_count: 2,
            min_power: 10.0,
            bounce_rearm_ticks: 3, // ~25 ms at 120 Hz
            sleep_velocity_threshold: 0.5,

            jump_impulse_scale: 4.0,
            shot_impulse_scale: 0.9,
            muzzle_offset: 40.0,

            character_radius: 12.0,
            character_mass: 1.0,
            character_friction: 0.95,
            character_restitution: 0.0,
            projectile_radius: 8.0,
            projectile_mass: 0.1,
            projectile_friction: 0.1,
            projectile_restitution: 0.5,
            edge_friction: 0.8,
            edge_restitution: 0.99,

            max_explosion_radius: 100.0,
            max_damage_factor: 0.5,
            knockback_scale: 1.5,
            explosion_growth: 1.4,
            blast_friction: 0.0,
            blast_restitution: 1.0,

            terrain_floor_frac: 0.15,
            terrain_height_frac: 0.23,
            terrain_thickness: 1.0,

            spawn_margin_frac: 0.1,
            spawn_height_frac: 0.3,
        }
    }
}

impl Tuning {
    /// Load tuning from a JSON document. Missing fields fall back to the
    /// defaults, so a balance file only needs to name what it overrides.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_partial_override() {
        let tuning = Tuning::from_json(r#"{ "max_explosion_radius": 150.0 }"#).unwrap();
        assert_eq!(tuning.max_explosion_radius, 150.0);
        // Everything else stays at the default
        assert_eq!(tuning.character_count, 2);
        assert_eq!(tuning.min_power, 10.0);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Tuning::from_json("not json").is_err());
    }
}
