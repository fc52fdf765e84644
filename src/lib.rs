//! Lobshot - a turn-based artillery combat engine
//!
//! Core modules:
//! - `sim`: Turn state machine, terrain generation, projectile resolution, damage
//! - `physics`: Data-only boundary to the host's rigid-body engine
//! - `tuning`: Data-driven game balance
//!
//! The crate is a pure game-logic core: it owns the turn sequence, the
//! roster, the single in-flight projectile and the explosion effects, while
//! the host shell owns rendering, gesture capture and the physics engine.
//! Each tick the host feeds [`sim::TickInput`] (drag events, physics events,
//! body poses) into [`sim::tick`] and drains the resulting
//! [`physics::PhysicsCommand`]s and [`sim::GameEvent`]s.
//!
//! Coordinates are screen-style: x grows right, y grows down, gravity is +y.
//! Drag angles arrive from the input system in degrees.

pub mod physics;
pub mod sim;
pub mod tuning;

pub use sim::state::MatchState;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz, matches the host tick rate)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Starting (and maximum) character health
    pub const MAX_HEALTH: i32 = 100;

    /// How far terrain and the world ceiling extend past the viewport, so
    /// neither a projectile nor a character can leave the collidable region
    pub const WORLD_EXTENSION: f32 = 10_000.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
