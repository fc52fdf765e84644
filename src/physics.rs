//! Data-only boundary to the host's rigid-body physics engine
//!
//! The core never integrates motion itself. It issues [`PhysicsCommand`]s
//! (spawn, remove, impulse, material changes) that the host applies to its
//! engine, and it consumes [`PhysicsEvent`]s (contacts, at-rest reports)
//! plus per-tick [`BodySample`] pose mirrors coming back the other way.
//! Keeping both directions as plain data makes event ordering and the
//! exactly-once detonation guard auditable in tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Handle for a rigid body. Allocated by the core, mapped to an engine body
/// by the host. Never reused within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Whether the engine integrates a body or pins it in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Treatment {
    /// Moved by gravity, impulses and collisions
    Dynamic,
    /// Collidable but immobile (terrain; characters while another acts)
    Static,
}

/// One thin rotated rectangle of the terrain chain
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmentRect {
    /// Midpoint between the two bridged vertices
    pub center: Vec2,
    /// Euclidean distance between the vertices
    pub length: f32,
    /// Radial thickness (near-zero; the rectangle stands in for a line segment)
    pub thickness: f32,
    /// Rotation in radians
    pub angle: f32,
}

/// Collision shape for a spawned body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BodyShape {
    /// Circle of the given radius (characters, projectiles)
    Circle { radius: f32 },
    /// Static composite of contiguous thin rectangles (terrain)
    Segments(Vec<SegmentRect>),
    /// Inward-facing viewport edge collider covering the given AABB
    Edge { min: Vec2, max: Vec2 },
}

/// Everything the host needs to create an engine body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodySpec {
    pub shape: BodyShape,
    pub pos: Vec2,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub treatment: Treatment,
}

/// Mutation the host must apply to its physics engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PhysicsCommand {
    SpawnBody { id: BodyId, spec: BodySpec },
    RemoveBody { id: BodyId },
    ApplyImpulse { id: BodyId, impulse: Vec2 },
    SetTreatment { id: BodyId, treatment: Treatment },
    SetMaterial { id: BodyId, restitution: f32, friction: f32 },
    /// Rouse every sleeping body so settling restarts
    WakeAll,
}

/// Notification from the physics engine, delivered in arrival order through
/// the single-consumer queue in [`crate::sim::TickInput`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PhysicsEvent {
    /// Narrow-phase contact between two bodies. The same physical contact
    /// may be reported more than once; the resolver deduplicates.
    ContactDetected { a: BodyId, b: BodyId },
    /// The engine considers this body at rest
    BodyAtRest { id: BodyId },
}

/// Per-tick pose mirror for one tracked body. Position and velocity are
/// authoritative in the engine; the core only keeps copies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BodySample {
    pub id: BodyId,
    pub pos: Vec2,
    pub vel: Vec2,
}
