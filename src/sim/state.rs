//! Match state and core gameplay types
//!
//! `MatchState` is the single context object for a match: roster, terrain,
//! the in-flight projectile (at most one), explosions, turn bookkeeping, and
//! the outbound command/event queues the host drains each tick. It is
//! created at match start and becomes inert once the game-over flag is set.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::terrain::{Terrain, TerrainParams, generate_terrain};
use crate::consts::{MAX_HEALTH, WORLD_EXTENSION};
use crate::physics::{BodyId, BodyShape, BodySpec, PhysicsCommand, Treatment};
use crate::tuning::Tuning;

/// Phase of the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for the jump drag to be released
    AimingJump,
    /// Jump impulse issued, hand-off to shot aiming next tick
    Jumping,
    /// Waiting for the shot drag to be released
    AimingShot,
    /// Projectile in flight
    Firing,
    /// Projectile gone; waiting for the world to settle before rotating
    Resolved,
}

/// Per-turn bookkeeping
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TurnState {
    pub phase: TurnPhase,
    /// Starts at 3 each turn: jump executed, shot fired, projectile resolved
    pub actions_remaining: u32,
}

/// Live aim feedback while a drag is in progress, for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AimArrow {
    /// Where the drag started, in viewport pixels
    pub start: Vec2,
    /// Drag angle in degrees
    pub angle_deg: f32,
    /// Normalized power, 0 to 100
    pub power: f32,
}

/// Detonation guard for the projectile. Checked before acting on any
/// contact notification, so duplicate reports of one physical contact
/// collapse into exactly one game effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fuse {
    /// Live; the next qualifying contact resolves it
    Armed,
    /// Survived a terrain bounce; terrain contacts are ignored until the
    /// given tick, then the fuse re-arms with the bounce recorded
    Bounced { rearm_at: u64 },
    /// Already converted into an explosion; every further contact is a no-op
    Detonated,
}

/// The single in-flight projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: BodyId,
    /// Pose mirror, refreshed from `BodySample`s
    pub pos: Vec2,
    pub vel: Vec2,
    /// Contacts survived without detonating
    pub bounce_count: u32,
    pub fuse: Fuse,
}

/// Expanding blast ring. Damage was applied once when this was created;
/// the growth is render-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub max_size: f32,
    pub size: f32,
}

/// A combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: BodyId,
    pub name: String,
    /// 0 to 100
    pub health: i32,
    pub alive: bool,
    /// Pose mirror, refreshed from `BodySample`s
    pub pos: Vec2,
    pub vel: Vec2,
    /// Engine-reported at-rest state
    pub asleep: bool,
    /// Mirror of the engine-side treatment
    pub treatment: Treatment,
}

impl Character {
    /// Apply already-rounded damage. Health clamps at zero; reaching zero
    /// marks the character dead (roster removal happens in `bury_dead`).
    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            self.alive = false;
        }
    }
}

/// Viewport dimensions in pixels, fixed for the duration of a match
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WorldSize {
    pub width: f32,
    pub height: f32,
}

/// Observable lifecycle notifications, drained by the host for UI/audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    MatchStarted { seed: u64 },
    TurnStarted { character: BodyId },
    JumpExecuted { character: BodyId, power: f32 },
    ShotFired { character: BodyId, power: f32 },
    ProjectileBounced { at: Vec2 },
    Detonated { at: Vec2, radius: f32 },
    CharacterDamaged { character: BodyId, amount: i32, health: i32 },
    CharacterDied { character: BodyId },
    GameOver { winner: Option<BodyId> },
}

/// Complete match context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    /// Match seed; terrain and spawn layout derive from it
    pub seed: u64,
    /// Simulation tick counter
    pub tick: u64,
    pub world: WorldSize,
    /// Active combatants. Index 0 is always the character whose turn it is.
    pub roster: Vec<Character>,
    /// Fallen combatants, in death order
    pub dead: Vec<Character>,
    pub terrain: Terrain,
    pub terrain_body: BodyId,
    pub edge_body: BodyId,
    /// At most one; a second live projectile is an invariant violation
    pub projectile: Option<Projectile>,
    pub explosions: Vec<Explosion>,
    pub turn: TurnState,
    /// Live aim feedback while a drag is in progress
    pub aim: Option<AimArrow>,
    pub game_over: bool,
    pub winner: Option<BodyId>,
    commands: Vec<PhysicsCommand>,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl MatchState {
    /// Set up a match: generate terrain, spawn the roster and the edge
    /// collider, and queue every spawn command for the host.
    ///
    /// No turn starts here. The first rotation happens through the regular
    /// turn-completion path once the freshly dropped characters settle.
    pub fn new(seed: u64, world: WorldSize, tuning: &Tuning) -> Self {
        let mut state = Self {
            seed,
            tick: 0,
            world,
            roster: Vec::new(),
            dead: Vec::new(),
            terrain: Terrain::default(),
            terrain_body: BodyId(0),
            edge_body: BodyId(0),
            projectile: None,
            explosions: Vec::new(),
            turn: TurnState {
                phase: TurnPhase::Resolved,
                actions_remaining: 0,
            },
            aim: None,
            game_over: false,
            winner: None,
            commands: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };

        let mut rng = Pcg32::seed_from_u64(seed);
        let params = TerrainParams::for_world(world, tuning);
        state.terrain = generate_terrain(&params, &mut rng);

        state.terrain_body = state.next_body_id();
        state.commands.push(PhysicsCommand::SpawnBody {
            id: state.terrain_body,
            spec: BodySpec {
                shape: BodyShape::Segments(state.terrain.segments.clone()),
                pos: Vec2::ZERO,
                mass: 0.0,
                restitution: 0.0,
                friction: 1.0,
                treatment: Treatment::Static,
            },
        });

        // Edge collider with the ceiling raised far above the viewport so
        // shots can arc off the top of the screen and come back down
        state.edge_body = state.next_body_id();
        state.commands.push(PhysicsCommand::SpawnBody {
            id: state.edge_body,
            spec: BodySpec {
                shape: BodyShape::Edge {
                    min: Vec2::new(0.0, -WORLD_EXTENSION),
                    max: Vec2::new(world.width, world.height),
                },
                pos: Vec2::ZERO,
                mass: 0.0,
                restitution: tuning.edge_restitution,
                friction: tuning.edge_friction,
                treatment: Treatment::Static,
            },
        });

        let count = tuning.character_count.max(2);
        for i in 0..count {
            state.spawn_character(i, count, tuning);
        }

        log::info!(
            "match started: seed {seed}, {count} characters, {} terrain segments",
            state.terrain.segments.len()
        );
        state.events.push(GameEvent::MatchStarted { seed });
        state
    }

    /// Allocate a body handle
    pub fn next_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    fn spawn_character(&mut self, index: u32, count: u32, tuning: &Tuning) {
        let t = if count <= 1 {
            0.5
        } else {
            index as f32 / (count - 1) as f32
        };
        let margin = tuning.spawn_margin_frac;
        let pos = Vec2::new(
            self.world.width * (margin + (1.0 - 2.0 * margin) * t),
            self.world.height * tuning.spawn_height_frac,
        );

        let id = self.next_body_id();
        self.commands.push(PhysicsCommand::SpawnBody {
            id,
            spec: BodySpec {
                shape: BodyShape::Circle {
                    radius: tuning.character_radius,
                },
                pos,
                mass: tuning.character_mass,
                restitution: tuning.character_restitution,
                friction: tuning.character_friction,
                treatment: Treatment::Dynamic,
            },
        });
        self.roster.push(Character {
            id,
            name: format!("player{}", index + 1),
            health: MAX_HEALTH,
            alive: true,
            pos,
            vel: Vec2::ZERO,
            asleep: false,
            treatment: Treatment::Dynamic,
        });
    }

    /// The character whose turn it is
    pub fn active_character(&self) -> Option<&Character> {
        self.roster.first()
    }

    pub fn character(&self, id: BodyId) -> Option<&Character> {
        self.roster.iter().find(|c| c.id == id)
    }

    pub(crate) fn character_mut(&mut self, id: BodyId) -> Option<&mut Character> {
        self.roster.iter_mut().find(|c| c.id == id)
    }

    /// Move the tail character to the front. This is the only rotation
    /// point; callers invoke it exactly once per completed turn.
    pub(crate) fn rotate_roster(&mut self) {
        if let Some(tail) = self.roster.pop() {
            self.roster.insert(0, tail);
        }
    }

    /// Sweep dead characters out of the rotation and check for match end
    pub(crate) fn bury_dead(&mut self) {
        let mut i = 0;
        while i < self.roster.len() {
            if self.roster[i].alive {
                i += 1;
                continue;
            }
            let fallen = self.roster.remove(i);
            log::info!("{} is out of the match", fallen.name);
            self.commands.push(PhysicsCommand::RemoveBody { id: fallen.id });
            self.events.push(GameEvent::CharacterDied {
                character: fallen.id,
            });
            self.dead.push(fallen);
        }

        if !self.game_over && self.roster.len() < 2 {
            self.game_over = true;
            self.winner = self.roster.first().map(|c| c.id);
            match self.active_character() {
                Some(winner) => log::info!("game over, {} wins", winner.name),
                None => log::info!("game over, no survivors"),
            }
            self.events.push(GameEvent::GameOver {
                winner: self.winner,
            });
        }
    }

    pub(crate) fn push_command(&mut self, command: PhysicsCommand) {
        self.commands.push(command);
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the physics mutations queued since the last drain
    pub fn drain_commands(&mut self) -> Vec<PhysicsCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Take the lifecycle events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
