//! Projectile lifecycle and impact resolution
//!
//! One projectile exists at a time. The engine may report a single physical
//! contact more than once (both bodies of a pair, or consecutive ticks), so
//! every notification passes the fuse guard before it can have an effect:
//! a detonated fuse swallows duplicates outright, and the bounce re-arm
//! window swallows repeat terrain reports of the contact that caused the
//! bounce. The window is only ever cut short by projectile removal.

use crate::physics::{BodyId, BodyShape, BodySpec, PhysicsCommand, Treatment};
use crate::sim::state::{Explosion, Fuse, GameEvent, MatchState, Projectile, TurnPhase};
use crate::sim::{aim, damage};
use crate::tuning::Tuning;
use glam::Vec2;

/// Fire a shot from the active character's muzzle. Freezes every character
/// for the duration of the flight so only the projectile moves.
pub(crate) fn fire(state: &mut MatchState, tuning: &Tuning, angle_deg: f32, power: f32) {
    if state.projectile.is_some() {
        debug_assert!(false, "fired while a projectile is in flight");
        log::error!("shot dropped: a projectile is already in flight");
        return;
    }
    let Some(player) = state.active_character() else {
        return;
    };
    let player_id = player.id;
    let player_pos = player.pos;

    state.turn.actions_remaining = state.turn.actions_remaining.saturating_sub(1);
    state.turn.phase = TurnPhase::Firing;

    // Only the projectile may move or collide during flight
    let ids: Vec<BodyId> = state.roster.iter().map(|c| c.id).collect();
    for id in ids {
        if let Some(c) = state.character_mut(id) {
            c.treatment = Treatment::Static;
        }
        state.push_command(PhysicsCommand::SetTreatment {
            id,
            treatment: Treatment::Static,
        });
    }

    let pos = aim::muzzle_position(player_pos, angle_deg, tuning.muzzle_offset);
    let id = state.next_body_id();
    state.push_command(PhysicsCommand::SpawnBody {
        id,
        spec: BodySpec {
            shape: BodyShape::Circle {
                radius: tuning.projectile_radius,
            },
            pos,
            mass: tuning.projectile_mass,
            restitution: tuning.projectile_restitution,
            friction: tuning.projectile_friction,
            treatment: Treatment::Dynamic,
        },
    });
    state.push_command(PhysicsCommand::ApplyImpulse {
        id,
        impulse: aim::impulse(angle_deg, power, tuning.shot_impulse_scale),
    });
    state.projectile = Some(Projectile {
        id,
        pos,
        vel: Vec2::ZERO,
        bounce_count: 0,
        fuse: Fuse::Armed,
    });

    log::info!("{player_id:?} fired at {angle_deg:.0} degrees, power {power:.0}");
    state.push_event(GameEvent::ShotFired {
        character: player_id,
        power,
    });
}

/// Resolve one contact notification involving the projectile
pub(crate) fn handle_contact(state: &mut MatchState, tuning: &Tuning, a: BodyId, b: BodyId) {
    let Some(p) = state.projectile.as_ref() else {
        return;
    };
    if p.fuse == Fuse::Detonated {
        return;
    }
    let other = if a == p.id {
        b
    } else if b == p.id {
        a
    } else {
        return;
    };
    let fuse = p.fuse;
    let bounces = p.bounce_count;

    if other == state.edge_body {
        // Off the edge of the world: spend the bounce and fizzle out
        bump_bounce(state);
        detonate(state, tuning, 0.0, 0.0);
    } else if state.character(other).is_some() {
        // Direct hit, full effect no matter the bounce history
        bump_bounce(state);
        detonate(
            state,
            tuning,
            tuning.max_explosion_radius,
            tuning.max_damage_factor,
        );
    } else {
        // Terrain, or any other fixture: one bounce is allowed
        match fuse {
            // Still inside the re-arm window; this is the same physical
            // contact reported again
            Fuse::Bounced { .. } => {}
            Fuse::Armed if bounces == 0 => {
                let at = if let Some(p) = state.projectile.as_mut() {
                    p.fuse = Fuse::Bounced {
                        rearm_at: state.tick + tuning.bounce_rearm_ticks,
                    };
                    p.pos
                } else {
                    return;
                };
                log::debug!("projectile bounced at {at}");
                state.push_event(GameEvent::ProjectileBounced { at });
            }
            _ => detonate(
                state,
                tuning,
                tuning.max_explosion_radius,
                tuning.max_damage_factor,
            ),
        }
    }
}

fn bump_bounce(state: &mut MatchState) {
    if let Some(p) = state.projectile.as_mut() {
        p.bounce_count += 1;
    }
}

/// Re-arm a bounced fuse once its window has elapsed, recording the bounce.
/// Runs once per tick, before the tick's contacts are processed.
pub(crate) fn rearm_fuse(state: &mut MatchState) {
    if let Some(p) = state.projectile.as_mut() {
        if let Fuse::Bounced { rearm_at } = p.fuse {
            if state.tick >= rearm_at {
                p.fuse = Fuse::Armed;
                p.bounce_count = 1;
            }
        }
    }
}

/// Convert the projectile into an explosion: damage once, remove the body,
/// spend the turn's last action, and hand control back to the turn loop.
pub(crate) fn detonate(state: &mut MatchState, tuning: &Tuning, radius: f32, factor: f32) {
    let Some(p) = state.projectile.as_mut() else {
        return;
    };
    if p.fuse == Fuse::Detonated {
        return;
    }
    p.fuse = Fuse::Detonated;
    let id = p.id;
    let at = p.pos;

    state.push_command(PhysicsCommand::RemoveBody { id });
    state.explosions.push(Explosion {
        pos: at,
        max_size: radius,
        size: 1.0,
    });
    log::info!("detonation at {at}, radius {radius:.0}");
    state.push_event(GameEvent::Detonated { at, radius });

    damage::apply_blast(state, tuning, at, radius, factor);

    state.turn.actions_remaining = state.turn.actions_remaining.saturating_sub(1);
    state.turn.phase = TurnPhase::Resolved;
}

/// Drop a spent projectile at the end of the tick, once every duplicate
/// notification for it has been swallowed by the fuse guard.
pub(crate) fn sweep_detonated(state: &mut MatchState) {
    if state
        .projectile
        .as_ref()
        .is_some_and(|p| p.fuse == Fuse::Detonated)
    {
        state.projectile = None;
    }
}
