//! Per-tick turn controller
//!
//! `tick` advances the match by one fixed step: refresh pose mirrors, work
//! through the physics event queue, translate input releases into jumps and
//! shots, and rotate the roster once the turn's actions are spent and the
//! world has settled. Discrete turn progression is coupled to continuous
//! physics settling, so the completion condition is re-evaluated every tick
//! rather than on any single event. A world that never settles stalls the
//! turn; there is deliberately no timeout.

use crate::physics::{BodyId, BodySample, PhysicsCommand, PhysicsEvent, Treatment};
use crate::sim::aim::DragSample;
use crate::sim::state::{AimArrow, GameEvent, MatchState, TurnPhase, TurnState};
use crate::sim::{aim, projectile};
use crate::tuning::Tuning;

/// Actions granted at turn start: one jump, one shot, one resolution
pub const ACTIONS_PER_TURN: u32 = 3;

/// Everything that happened in the outside world since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// In-progress drag, for live aim feedback
    pub drag: Option<DragSample>,
    /// Drag released this tick
    pub release: Option<DragSample>,
    /// Physics notifications, in arrival order
    pub events: Vec<PhysicsEvent>,
    /// Pose mirrors for every tracked dynamic body
    pub bodies: Vec<BodySample>,
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut MatchState, input: &TickInput, tuning: &Tuning) {
    refresh_mirrors(state, input, tuning);
    advance_explosions(state, tuning);

    if state.game_over {
        // The match is decided: explosions keep playing out, turns don't
        state.tick += 1;
        return;
    }

    projectile::rearm_fuse(state);

    for event in &input.events {
        match *event {
            PhysicsEvent::ContactDetected { a, b } => {
                projectile::handle_contact(state, tuning, a, b);
            }
            PhysicsEvent::BodyAtRest { id } => {
                if let Some(c) = state.character_mut(id) {
                    c.asleep = true;
                }
            }
        }
    }

    handle_input(state, input, tuning);

    // The jump impulse went out last tick; hand over to shot aiming
    if state.turn.phase == TurnPhase::Jumping {
        state.turn.phase = TurnPhase::AimingShot;
    }

    projectile::sweep_detonated(state);

    if turn_complete(state) {
        next_turn(state, tuning);
    }

    state.tick += 1;
}

/// Copy engine-authoritative poses onto the tracked entities. A body seen
/// moving faster than the sleep threshold is no longer at rest, whatever
/// the engine reported earlier.
fn refresh_mirrors(state: &mut MatchState, input: &TickInput, tuning: &Tuning) {
    for sample in &input.bodies {
        if let Some(c) = state.character_mut(sample.id) {
            c.pos = sample.pos;
            c.vel = sample.vel;
            if sample.vel.length() > tuning.sleep_velocity_threshold {
                c.asleep = false;
            }
            continue;
        }
        if let Some(p) = state.projectile.as_mut() {
            if p.id == sample.id {
                p.pos = sample.pos;
                p.vel = sample.vel;
            }
        }
    }
}

/// Grow live explosion rings and discard the ones that have played out.
/// Damage was already dealt when each ring was created.
fn advance_explosions(state: &mut MatchState, tuning: &Tuning) {
    for e in &mut state.explosions {
        e.size *= tuning.explosion_growth;
    }
    state.explosions.retain(|e| e.size < e.max_size);
}

fn handle_input(state: &mut MatchState, input: &TickInput, tuning: &Tuning) {
    let aiming = matches!(
        state.turn.phase,
        TurnPhase::AimingJump | TurnPhase::AimingShot
    );
    if !aiming {
        return;
    }

    if let Some(drag) = input.drag {
        state.aim = Some(AimArrow {
            start: drag.start,
            angle_deg: drag.angle_deg,
            power: aim::power(drag.distance_px, state.world.height),
        });
    }

    let Some(release) = input.release else {
        return;
    };
    state.aim = None;

    let power = aim::power(release.distance_px, state.world.height);
    if power <= tuning.min_power {
        // Too weak to count; stay in the same phase and keep listening
        return;
    }

    match state.turn.phase {
        TurnPhase::AimingJump => execute_jump(state, tuning, release.angle_deg, power),
        TurnPhase::AimingShot => projectile::fire(state, tuning, release.angle_deg, power),
        _ => {}
    }
}

/// Launch the active character with the released drag's impulse
fn execute_jump(state: &mut MatchState, tuning: &Tuning, angle_deg: f32, power: f32) {
    let Some(player) = state.active_character() else {
        return;
    };
    let id = player.id;
    let name = player.name.clone();

    state.turn.actions_remaining = state.turn.actions_remaining.saturating_sub(1);
    state.turn.phase = TurnPhase::Jumping;

    if let Some(c) = state.character_mut(id) {
        c.treatment = Treatment::Dynamic;
        c.asleep = false;
    }
    state.push_command(PhysicsCommand::WakeAll);
    state.push_command(PhysicsCommand::SetTreatment {
        id,
        treatment: Treatment::Dynamic,
    });
    state.push_command(PhysicsCommand::ApplyImpulse {
        id,
        impulse: aim::impulse(angle_deg, power, tuning.jump_impulse_scale),
    });

    log::info!("{name} jumps, power {power:.0}");
    state.push_event(GameEvent::JumpExecuted {
        character: id,
        power,
    });
}

/// Both halves of the turn-end condition: all actions spent, and every
/// tracked body settled
fn turn_complete(state: &MatchState) -> bool {
    !state.game_over
        && state.turn.actions_remaining == 0
        && state.projectile.is_none()
        && !state.roster.is_empty()
        && state.roster.iter().all(|c| c.asleep)
}

/// Rotate the roster and open the next turn. The sole rotation point.
fn next_turn(state: &mut MatchState, tuning: &Tuning) {
    debug_assert!(
        state.turn.phase == TurnPhase::Resolved,
        "rotation outside a resolved turn"
    );
    state.rotate_roster();

    // Friction and bounce reset to turn-start defaults for everyone
    let ids: Vec<BodyId> = state.roster.iter().map(|c| c.id).collect();
    for id in ids {
        state.push_command(PhysicsCommand::SetMaterial {
            id,
            restitution: tuning.character_restitution,
            friction: tuning.character_friction,
        });
    }

    state.turn = TurnState {
        phase: TurnPhase::AimingJump,
        actions_remaining: ACTIONS_PER_TURN,
    };
    state.aim = None;

    if let Some(player) = state.active_character() {
        log::info!("turn starts for {}", player.name);
        let id = player.id;
        state.push_event(GameEvent::TurnStarted { character: id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_HEALTH;
    use crate::sim::state::WorldSize;
    use glam::Vec2;

    fn new_match() -> (MatchState, Tuning) {
        let tuning = Tuning::default();
        let world = WorldSize {
            width: 1280.0,
            height: 720.0,
        };
        (MatchState::new(21, world, &tuning), tuning)
    }

    /// At-rest reports for every roster member
    fn settle_events(state: &MatchState) -> Vec<PhysicsEvent> {
        state
            .roster
            .iter()
            .map(|c| PhysicsEvent::BodyAtRest { id: c.id })
            .collect()
    }

    fn release(angle_deg: f32, distance_px: f32) -> TickInput {
        TickInput {
            release: Some(DragSample {
                start: Vec2::new(400.0, 300.0),
                angle_deg,
                distance_px,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_turn_starts_once_settled() {
        let (mut state, tuning) = new_match();
        let tail = state.roster.last().unwrap().id;
        let _ = state.drain_events();

        // Characters still falling: nothing happens
        tick(&mut state, &TickInput::default(), &tuning);
        assert!(state.drain_events().is_empty());

        // Everyone settles: the tail character is promoted and the turn opens
        let input = TickInput {
            events: settle_events(&state),
            ..Default::default()
        };
        tick(&mut state, &input, &tuning);

        assert_eq!(state.turn.phase, TurnPhase::AimingJump);
        assert_eq!(state.turn.actions_remaining, ACTIONS_PER_TURN);
        assert_eq!(state.active_character().unwrap().id, tail);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::TurnStarted { character: tail })
        );
    }

    fn settled_match() -> (MatchState, Tuning) {
        let (mut state, tuning) = new_match();
        let input = TickInput {
            events: settle_events(&state),
            ..Default::default()
        };
        tick(&mut state, &input, &tuning);
        let _ = state.drain_events();
        let _ = state.drain_commands();
        (state, tuning)
    }

    #[test]
    fn test_weak_release_is_a_noop() {
        let (mut state, tuning) = settled_match();

        // 10 pixels of drag on a 720-pixel world is well under min power
        tick(&mut state, &release(45.0, 10.0), &tuning);
        assert_eq!(state.turn.phase, TurnPhase::AimingJump);
        assert_eq!(state.turn.actions_remaining, ACTIONS_PER_TURN);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_drag_publishes_aim_arrow() {
        let (mut state, tuning) = settled_match();

        let input = TickInput {
            drag: Some(DragSample {
                start: Vec2::new(200.0, 200.0),
                angle_deg: 120.0,
                distance_px: 180.0,
            }),
            ..Default::default()
        };
        tick(&mut state, &input, &tuning);
        let arrow = state.aim.expect("aim arrow while dragging");
        assert_eq!(arrow.angle_deg, 120.0);
        assert!((arrow.power - 50.0).abs() < 1e-3);

        // Release clears the arrow even when it is too weak to act on
        tick(&mut state, &release(120.0, 10.0), &tuning);
        assert!(state.aim.is_none());
    }

    #[test]
    fn test_jump_hands_over_to_shot_aiming() {
        let (mut state, tuning) = settled_match();
        let active = state.active_character().unwrap().id;

        tick(&mut state, &release(90.0, 200.0), &tuning);
        assert_eq!(state.turn.phase, TurnPhase::Jumping);
        assert_eq!(state.turn.actions_remaining, 2);

        let commands = state.drain_commands();
        assert!(commands.iter().any(|c| matches!(
            c,
            PhysicsCommand::ApplyImpulse { id, impulse }
                if *id == active && impulse.y < 0.0
        )));
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::JumpExecuted { character, .. } if *character == active))
        );

        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.turn.phase, TurnPhase::AimingShot);
    }

    #[test]
    fn test_full_turn_rotates_after_detonation_and_settling() {
        let (mut state, tuning) = settled_match();
        let shooter = state.active_character().unwrap().id;
        let target = state.roster[1].id;
        let target_pos = state.roster[1].pos;

        // Jump, then fire
        tick(&mut state, &release(90.0, 200.0), &tuning);
        tick(&mut state, &TickInput::default(), &tuning);
        tick(&mut state, &release(45.0, 200.0), &tuning);
        assert_eq!(state.turn.phase, TurnPhase::Firing);
        let proj = state.projectile.as_ref().unwrap().id;

        // The projectile reaches the target; the engine reports the same
        // contact from both bodies of the pair
        let input = TickInput {
            events: vec![
                PhysicsEvent::ContactDetected { a: proj, b: target },
                PhysicsEvent::ContactDetected { a: target, b: proj },
            ],
            bodies: vec![BodySample {
                id: proj,
                pos: target_pos + Vec2::new(10.0, 0.0),
                vel: Vec2::new(300.0, 50.0),
            }],
            ..Default::default()
        };
        tick(&mut state, &input, &tuning);

        assert_eq!(state.turn.phase, TurnPhase::Resolved);
        assert_eq!(state.turn.actions_remaining, 0);
        assert!(state.projectile.is_none());
        assert_eq!(state.character(target).unwrap().health, MAX_HEALTH - 45);

        // Thrown target still flying: no rotation yet
        tick(&mut state, &TickInput::default(), &tuning);
        assert_eq!(state.turn.phase, TurnPhase::Resolved);

        // World settles: the roster rotates and the target goes next
        let input = TickInput {
            events: settle_events(&state),
            ..Default::default()
        };
        tick(&mut state, &input, &tuning);
        assert_eq!(state.turn.phase, TurnPhase::AimingJump);
        assert_eq!(state.active_character().unwrap().id, target);
        assert_eq!(state.roster.len(), 2);
        assert_eq!(state.roster[1].id, shooter);
    }

    #[test]
    fn test_release_ignored_while_projectile_flies() {
        let (mut state, tuning) = settled_match();

        tick(&mut state, &release(90.0, 200.0), &tuning);
        tick(&mut state, &TickInput::default(), &tuning);
        tick(&mut state, &release(45.0, 200.0), &tuning);
        let _ = state.drain_events();

        // A second release mid-flight must not fire again
        tick(&mut state, &release(30.0, 200.0), &tuning);
        assert_eq!(state.turn.phase, TurnPhase::Firing);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_lethal_hit_ends_the_match() {
        let (mut state, tuning) = settled_match();
        let target = state.roster[1].id;
        let target_pos = state.roster[1].pos;
        state.roster[1].health = 30;

        tick(&mut state, &release(90.0, 200.0), &tuning);
        tick(&mut state, &TickInput::default(), &tuning);
        tick(&mut state, &release(45.0, 200.0), &tuning);
        let proj = state.projectile.as_ref().unwrap().id;

        // Direct hit for 45 against 30 health: clamped to zero, dead
        let input = TickInput {
            events: vec![PhysicsEvent::ContactDetected { a: proj, b: target }],
            bodies: vec![BodySample {
                id: proj,
                pos: target_pos + Vec2::new(10.0, 0.0),
                vel: Vec2::ZERO,
            }],
            ..Default::default()
        };
        tick(&mut state, &input, &tuning);

        assert!(state.game_over);
        assert_eq!(state.roster.len(), 1);
        assert_eq!(state.dead.len(), 1);
        assert_eq!(state.dead[0].health, 0);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::CharacterDied { character: target }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));

        // No further turns start once the match is decided
        let input = TickInput {
            events: settle_events(&state),
            ..Default::default()
        };
        tick(&mut state, &input, &tuning);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_explosions_grow_and_expire() {
        let (mut state, tuning) = settled_match();
        state.explosions.push(crate::sim::state::Explosion {
            pos: Vec2::new(100.0, 100.0),
            max_size: 10.0,
            size: 1.0,
        });

        tick(&mut state, &TickInput::default(), &tuning);
        assert!(state.explosions[0].size > 1.0);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), &tuning);
        }
        assert!(state.explosions.is_empty());
    }
}
