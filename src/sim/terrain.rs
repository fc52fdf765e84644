//! Procedural terrain generation
//!
//! The ground is a randomized heightmap profile connected into a closed
//! outline, then decomposed into a chain of thin rotated rectangles. The
//! decomposition exists because the engine side only accepts convex shapes;
//! a rectangle of near-zero thickness stands in for each line segment of
//! the (concave) outline. The outline extends far past both viewport edges
//! and closes along the world bottom, so no trajectory can find a seam to
//! slip through.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::WORLD_EXTENSION;
use crate::physics::SegmentRect;
use crate::sim::state::WorldSize;
use crate::tuning::Tuning;

/// Inputs to terrain generation
#[derive(Debug, Clone, Copy)]
pub struct TerrainParams {
    /// Distance from the world bottom up to the lowest possible surface point
    pub floor: f32,
    /// Maximum height variance above the floor
    pub height: f32,
    /// Target width; the last generated surface point lands here
    pub width: f32,
    /// World height, for converting heights to y-down coordinates
    pub world_height: f32,
    /// Thickness of the decomposed rectangles
    pub thickness: f32,
}

impl TerrainParams {
    pub fn for_world(world: WorldSize, tuning: &Tuning) -> Self {
        Self {
            floor: world.height * tuning.terrain_floor_frac,
            height: world.height * tuning.terrain_height_frac,
            width: world.width,
            world_height: world.height,
            thickness: tuning.terrain_thickness,
        }
    }
}

/// Generated ground geometry, immutable for the rest of the match
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Terrain {
    /// Closed outline: surface points left to right, then the off-screen
    /// corner extensions. Consecutive points (wrapping) are bridged by
    /// exactly one segment.
    pub outline: Vec<Vec2>,
    /// Number of leading `outline` points that form the visible surface
    pub surface_len: usize,
    /// Convex decomposition of the outline
    pub segments: Vec<SegmentRect>,
}

impl Terrain {
    /// Vertical band the visible surface occupies, as (min_y, max_y)
    pub fn surface_band(&self) -> (f32, f32) {
        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        for p in &self.outline[..self.surface_len] {
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        (min_y, max_y)
    }
}

/// Generate a terrain profile and its collision decomposition
pub fn generate_terrain(params: &TerrainParams, rng: &mut Pcg32) -> Terrain {
    let count: usize = rng.random_range(10..=30);

    // Random peak/valley heights within [floor, floor + height], converted
    // to y-down screen coordinates
    let ys: Vec<f32> = (0..count)
        .map(|_| params.world_height - (params.floor + rng.random::<f32>() * params.height))
        .collect();

    // Increasing x positions with random gaps, then squashed so the last
    // point lands exactly at the target width
    let mut xs = Vec::with_capacity(count);
    let mut x = 0.0;
    for _ in 0..count {
        x += 10.0 + rng.random::<f32>() * 100.0;
        xs.push(x);
    }
    let squash = params.width / x;

    let mut outline: Vec<Vec2> = xs
        .iter()
        .zip(&ys)
        .map(|(&x, &y)| Vec2::new((x * squash).round(), y.round()))
        .collect();
    let surface_len = outline.len();

    // Stretch the shape far beyond both screen edges and close it along the
    // world bottom
    let first = outline[0];
    let last = outline[surface_len - 1];
    outline.push(Vec2::new(params.width + WORLD_EXTENSION, last.y));
    outline.push(Vec2::new(params.width + WORLD_EXTENSION, params.world_height));
    outline.push(Vec2::new(-WORLD_EXTENSION, params.world_height));
    outline.push(Vec2::new(-WORLD_EXTENSION, first.y));

    let segments = decompose_outline(&outline, params.thickness);

    log::debug!(
        "generated terrain: {surface_len} surface points, {} segments",
        segments.len()
    );

    Terrain {
        outline,
        surface_len,
        segments,
    }
}

/// Rasterize a closed outline into a union of convex primitives: one thin
/// rectangle per consecutive vertex pair, positioned and rotated to bridge
/// the two points. The chain wraps, so the outline has no open end.
pub fn decompose_outline(outline: &[Vec2], thickness: f32) -> Vec<SegmentRect> {
    (0..outline.len())
        .map(|i| {
            let a = outline[i];
            let b = outline[(i + 1) % outline.len()];
            let d = b - a;
            SegmentRect {
                center: (a + b) / 2.0,
                length: d.length(),
                thickness,
                angle: d.y.atan2(d.x),
            }
        })
        .collect()
}
