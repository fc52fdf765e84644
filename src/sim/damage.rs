//! Area damage and knockback
//!
//! Damage falls off linearly with distance from the blast center; knockback
//! is inversely proportional to it, so near misses throw characters hard.
//! The whole model runs exactly once per explosion, synchronously at
//! detonation. Characters at or beyond the radius are untouched.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::physics::{BodyId, PhysicsCommand, Treatment};
use crate::sim::state::{Character, GameEvent, MatchState};
use crate::tuning::Tuning;
use crate::{cartesian_to_polar, polar_to_cartesian};

/// What one explosion does to one character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlastEffect {
    pub character: BodyId,
    /// Rounded health deduction
    pub damage: i32,
    /// Impulse pointing away from the blast center
    pub knockback: Vec2,
}

/// Compute the effect of an explosion on every living character. Pure, so
/// the falloff curve is testable without a match context.
pub fn blast_effects(
    characters: &[Character],
    center: Vec2,
    radius: f32,
    factor: f32,
    knockback_scale: f32,
) -> Vec<BlastEffect> {
    characters
        .iter()
        .filter(|c| c.alive)
        .filter_map(|c| {
            let (distance, angle) = cartesian_to_polar(c.pos - center);
            if distance >= radius {
                return None;
            }
            let damage = ((radius - distance) * factor).round() as i32;
            // Clamp the divisor so a dead-center hit stays finite
            let magnitude = radius / distance.max(1.0) * knockback_scale;
            Some(BlastEffect {
                character: c.id,
                damage,
                knockback: polar_to_cartesian(magnitude, angle),
            })
        })
        .collect()
}

/// Apply an explosion to the match: damage, knockback, material changes,
/// and the wake-up that restarts settling before the next at-rest check.
pub(crate) fn apply_blast(
    state: &mut MatchState,
    tuning: &Tuning,
    center: Vec2,
    radius: f32,
    factor: f32,
) {
    let effects = blast_effects(
        &state.roster,
        center,
        radius,
        factor,
        tuning.knockback_scale,
    );
    if effects.is_empty() {
        state.bury_dead();
        return;
    }

    state.push_command(PhysicsCommand::WakeAll);
    for effect in effects {
        let Some(character) = state.character_mut(effect.character) else {
            continue;
        };
        character.take_damage(effect.damage);
        character.asleep = false;
        character.treatment = Treatment::Dynamic;
        let health = character.health;

        state.push_command(PhysicsCommand::SetTreatment {
            id: effect.character,
            treatment: Treatment::Dynamic,
        });
        state.push_command(PhysicsCommand::SetMaterial {
            id: effect.character,
            restitution: tuning.blast_restitution,
            friction: tuning.blast_friction,
        });
        state.push_command(PhysicsCommand::ApplyImpulse {
            id: effect.character,
            impulse: effect.knockback,
        });
        state.push_event(GameEvent::CharacterDamaged {
            character: effect.character,
            amount: effect.damage,
            health,
        });
        log::debug!(
            "blast hit {:?}: {} damage, {} health left",
            effect.character,
            effect.damage,
            health
        );
    }

    state.bury_dead();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_HEALTH;
    use proptest::prelude::*;

    fn character_at(id: u32, pos: Vec2) -> Character {
        Character {
            id: BodyId(id),
            name: format!("player{id}"),
            health: MAX_HEALTH,
            alive: true,
            pos,
            vel: Vec2::ZERO,
            asleep: true,
            treatment: Treatment::Static,
        }
    }

    #[test]
    fn test_point_blank_damage() {
        // Distance 0 from a radius-100, factor-0.5 blast: 50 damage
        let chars = vec![character_at(1, Vec2::new(300.0, 300.0))];
        let effects = blast_effects(&chars, Vec2::new(300.0, 300.0), 100.0, 0.5, 1.5);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].damage, 50);
    }

    #[test]
    fn test_no_damage_at_or_beyond_radius() {
        let chars = vec![
            character_at(1, Vec2::new(100.0, 0.0)),
            character_at(2, Vec2::new(150.0, 0.0)),
        ];
        let effects = blast_effects(&chars, Vec2::ZERO, 100.0, 0.5, 1.5);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_dead_characters_ignored() {
        let mut fallen = character_at(1, Vec2::ZERO);
        fallen.alive = false;
        let effects = blast_effects(&[fallen], Vec2::ZERO, 100.0, 0.5, 1.5);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_knockback_points_away_and_scales_inversely() {
        let chars = vec![
            character_at(1, Vec2::new(10.0, 0.0)),
            character_at(2, Vec2::new(50.0, 0.0)),
        ];
        let effects = blast_effects(&chars, Vec2::ZERO, 100.0, 0.5, 1.5);
        assert_eq!(effects.len(), 2);

        // Both thrown in +x, the closer one harder
        assert!(effects[0].knockback.x > 0.0);
        assert!(effects[1].knockback.x > 0.0);
        assert!(effects[0].knockback.length() > effects[1].knockback.length());
    }

    proptest! {
        /// Damage is round((radius - distance) * factor) inside the radius,
        /// zero outside, and monotonically decreasing in distance
        #[test]
        fn prop_damage_falloff(
            d1 in 0.0f32..200.0,
            d2 in 0.0f32..200.0,
            factor in 0.1f32..2.0,
        ) {
            let radius = 100.0;
            let (near, far) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            let damage_at = |dist: f32| {
                let chars = vec![character_at(1, Vec2::new(dist, 0.0))];
                blast_effects(&chars, Vec2::ZERO, radius, factor, 1.0)
                    .first()
                    .map(|e| e.damage)
                    .unwrap_or(0)
            };

            let dmg_near = damage_at(near);
            let dmg_far = damage_at(far);
            prop_assert!(dmg_near >= dmg_far);
            if near < radius {
                prop_assert_eq!(dmg_near, ((radius - near) * factor).round() as i32);
            } else {
                prop_assert_eq!(dmg_near, 0);
            }
        }
    }
}
