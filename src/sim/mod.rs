//! Turn-based combat simulation
//!
//! All gameplay logic lives here. The module owns no motion integration:
//! it reacts to physics events, mirrors engine poses, and answers with
//! commands. Everything is deterministic for a given seed and input
//! sequence.

pub mod aim;
pub mod damage;
pub mod projectile;
pub mod state;
pub mod terrain;
pub mod tick;

pub use aim::DragSample;
pub use damage::{BlastEffect, blast_effects};
pub use state::{
    AimArrow, Character, Explosion, Fuse, GameEvent, MatchState, Projectile, TurnPhase, TurnState,
    WorldSize,
};
pub use terrain::{Terrain, TerrainParams, generate_terrain};
pub use tick::{ACTIONS_PER_TURN, TickInput, tick};
