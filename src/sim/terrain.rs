//! Terrain and pickup generation
//!
//! `generate_terrain` is pure: it walks the level in fixed steps and returns
//! the slab and pickup layout. `populate_world` turns a layout into static
//! bodies and sensors.

use glam::Vec2;

use super::collision::Obb;
use super::rng::{GradientNoise, LevelRng};
use super::world::{Body, BodyRole, World};
use crate::consts::{TERRAIN_BASE_Y, TERRAIN_MARGIN, TERRAIN_OVERLAP, TERRAIN_STEP};
use crate::levels::LevelDef;

/// Coins spawn only for x in (COIN_MIN_X, length - COIN_END_MARGIN)
const COIN_MIN_X: f32 = 100.0;
const COIN_END_MARGIN: f32 = 200.0;
/// Fuel and boost spawn only for x in (ITEM_MIN_X, length - ITEM_END_MARGIN)
const ITEM_MIN_X: f32 = 200.0;
const ITEM_END_MARGIN: f32 = 400.0;

/// Coins float this far above the lower end of the slab, plus up to
/// `COIN_JITTER`
const COIN_LIFT: f32 = 40.0;
const COIN_JITTER: f64 = 30.0;
const ITEM_LIFT: f32 = 30.0;

const TERRAIN_FRICTION: f32 = 0.9;

/// Sensor sizes
const COIN_RADIUS: f32 = 10.0;
const FUEL_SIZE: Vec2 = Vec2::new(24.0, 32.0);
const BOOST_SIZE: Vec2 = Vec2::new(24.0, 24.0);
const FINISH_SIZE: Vec2 = Vec2::new(20.0, 80.0);
/// The finish marker is centered this far above the ground at the finish
/// line, inside pickup reach of any chassis driving over it
const FINISH_CLEARANCE: f32 = 40.0;

/// Generated geometry for one level
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainLayout {
    pub segments: Vec<Obb>,
    /// Ground height at every sample, `heights[i]` at `x = i * TERRAIN_STEP`
    pub heights: Vec<f32>,
    pub coins: Vec<Vec2>,
    pub fuels: Vec<Vec2>,
    pub boosts: Vec<Vec2>,
    pub finish_x: f32,
}

impl TerrainLayout {
    /// Ground height at `x`, linear between samples and clamped to the ends
    pub fn surface_y(&self, x: f32) -> f32 {
        let Some(&last) = self.heights.last() else {
            return TERRAIN_BASE_Y;
        };
        let spans = self.heights.len() - 1;
        if spans == 0 {
            return last;
        }
        let i = ((x / TERRAIN_STEP).floor().max(0.0) as usize).min(spans - 1);
        let t = ((x - i as f32 * TERRAIN_STEP) / TERRAIN_STEP).clamp(0.0, 1.0);
        let (y0, y1) = (self.heights[i], self.heights[i + 1]);
        y0 + (y1 - y0) * t
    }

    pub fn finish_position(&self) -> Vec2 {
        Vec2::new(
            self.finish_x,
            self.surface_y(self.finish_x) - FINISH_CLEARANCE,
        )
    }
}

/// Build the terrain and pickup layout for a level.
///
/// Every random draw comes from one RNG seeded with the level seed, in a
/// fixed order per step: noise, coin roll, coin height, fuel roll, boost roll.
pub fn generate_terrain(level: &LevelDef) -> TerrainLayout {
    debug_assert!(level.length > 0.0, "level {} has no length", level.id);
    debug_assert!(TERRAIN_STEP > 0.0);

    let mut rng = LevelRng::new(level.seed);
    let mut noise = GradientNoise::new();

    let length = level.length;
    let step = TERRAIN_STEP;
    let mut layout = TerrainLayout {
        segments: Vec::with_capacity((length / step).ceil() as usize),
        heights: vec![TERRAIN_BASE_Y],
        coins: Vec::new(),
        fuels: Vec::new(),
        boosts: Vec::new(),
        finish_x: length,
    };

    let mut x = 0.0_f32;
    let mut last_y = TERRAIN_BASE_Y;

    while x < length {
        let nx = x as f64 / length as f64;
        let height = noise.sample(nx * level.terrain_frequency as f64, &mut rng);
        let y = TERRAIN_BASE_Y + (height * level.terrain_amplitude as f64) as f32;
        let dy = y - last_y;

        layout.segments.push(Obb::new(
            Vec2::new(x + step / 2.0, (last_y + y) / 2.0),
            Vec2::new(step * TERRAIN_OVERLAP / 2.0, (dy.abs() + TERRAIN_MARGIN) / 2.0),
            dy.atan2(step),
        ));

        let mid_x = x + step / 2.0;
        let surface = last_y.min(y);

        // Rolls are drawn before the bounds check so the stream is the same
        // for every step
        if roll(&mut rng, level.coin_density) && x > COIN_MIN_X && x < length - COIN_END_MARGIN {
            let lift = COIN_LIFT + (rng.next_f64() * COIN_JITTER) as f32;
            layout.coins.push(Vec2::new(mid_x, surface - lift));
        }
        let in_item_zone = x > ITEM_MIN_X && x < length - ITEM_END_MARGIN;
        if roll(&mut rng, level.fuel_density) && in_item_zone {
            layout.fuels.push(Vec2::new(mid_x, surface - ITEM_LIFT));
        }
        if roll(&mut rng, level.boost_density) && in_item_zone {
            layout.boosts.push(Vec2::new(mid_x, surface - ITEM_LIFT));
        }

        let next_x = x + step;
        debug_assert!(next_x > x, "terrain x must advance");
        layout.heights.push(y);
        last_y = y;
        x = next_x;
    }

    layout
}

#[inline]
fn roll(rng: &mut LevelRng, probability: f32) -> bool {
    rng.next_f64() < probability as f64
}

/// Add a layout's slabs, pickups and finish marker to the world
pub fn populate_world(world: &mut World, layout: &TerrainLayout) {
    for slab in &layout.segments {
        let size = slab.half_extents * 2.0;
        world.add(
            Body::rect(BodyRole::Terrain, slab.center, size.x, size.y)
                .with_angle(slab.angle)
                .with_friction(TERRAIN_FRICTION)
                .fixed(),
        );
    }
    for &p in &layout.coins {
        world.add(Body::circle(BodyRole::Coin, p, COIN_RADIUS).sensor());
    }
    for &p in &layout.fuels {
        world.add(Body::rect(BodyRole::Fuel, p, FUEL_SIZE.x, FUEL_SIZE.y).sensor());
    }
    for &p in &layout.boosts {
        world.add(Body::rect(BodyRole::Boost, p, BOOST_SIZE.x, BOOST_SIZE.y).sensor());
    }
    world.add(
        Body::rect(
            BodyRole::Finish,
            layout.finish_position(),
            FINISH_SIZE.x,
            FINISH_SIZE.y,
        )
        .sensor(),
    );

    log::debug!(
        "Terrain: {} slabs, {} coins, {} fuel, {} boost, finish at {}",
        layout.segments.len(),
        layout.coins.len(),
        layout.fuels.len(),
        layout.boosts.len(),
        layout.finish_x
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{LEVELS, level_by_id};

    #[test]
    fn test_same_level_same_layout() {
        let level = level_by_id(1).unwrap();
        let a = generate_terrain(level);
        let b = generate_terrain(level);
        assert_eq!(a, b);
    }

    #[test]
    fn test_country_road_coins() {
        let level = level_by_id(1).unwrap();
        assert_eq!(level.seed, 9973);
        let layout = generate_terrain(level);
        assert_eq!(layout.coins.len(), 11);
        assert_eq!(layout.fuels.len(), 4);
        assert_eq!(layout.boosts.len(), 5);
        assert_eq!(layout.coins[0].x, 180.0);
    }

    #[test]
    fn test_segments_cover_level() {
        for level in &LEVELS {
            let layout = generate_terrain(level);
            let expected = (level.length / TERRAIN_STEP).ceil() as usize;
            assert_eq!(layout.segments.len(), expected, "level {}", level.id);
            for (i, pair) in layout.segments.windows(2).enumerate() {
                let gap = pair[1].center.x - pair[0].center.x;
                assert_eq!(gap, TERRAIN_STEP, "level {} slab {}", level.id, i);
            }
            // Every slab is wider than the step, so neighbours overlap
            assert!(layout.segments.iter().all(|s| s.half_extents.x * 2.0 > TERRAIN_STEP));
            assert!(layout.segments.iter().all(|s| s.half_extents.y > 0.0));
            assert_eq!(layout.finish_x, level.length);
        }
    }

    #[test]
    fn test_pickups_respect_bounds() {
        for level in &LEVELS {
            let layout = generate_terrain(level);
            let half = TERRAIN_STEP / 2.0;
            for c in &layout.coins {
                assert!(c.x - half > COIN_MIN_X && c.x - half < level.length - COIN_END_MARGIN);
            }
            for p in layout.fuels.iter().chain(&layout.boosts) {
                assert!(p.x - half > ITEM_MIN_X && p.x - half < level.length - ITEM_END_MARGIN);
            }
        }
    }

    #[test]
    fn test_first_slab_starts_at_baseline() {
        let layout = generate_terrain(level_by_id(5).unwrap());
        // Noise is zero on the lattice, so the first sample sits on the baseline
        let first = layout.segments[0];
        assert_eq!(first.center, Vec2::new(TERRAIN_STEP / 2.0, TERRAIN_BASE_Y));
        assert_eq!(first.angle, 0.0);
    }

    #[test]
    fn test_surface_follows_samples() {
        let layout = generate_terrain(level_by_id(2).unwrap());
        assert_eq!(layout.heights.len(), layout.segments.len() + 1);
        assert_eq!(layout.surface_y(0.0), TERRAIN_BASE_Y);
        assert_eq!(layout.surface_y(-50.0), TERRAIN_BASE_Y);
        assert_eq!(layout.surface_y(3.0 * TERRAIN_STEP), layout.heights[3]);
        let mid = layout.surface_y(3.5 * TERRAIN_STEP);
        assert!((mid - (layout.heights[3] + layout.heights[4]) / 2.0).abs() < 1e-3);
        // Each slab's top edge runs between its two samples
        for (i, slab) in layout.segments.iter().enumerate() {
            let top_mid = (layout.heights[i] + layout.heights[i + 1]) / 2.0;
            assert!((slab.center.y - top_mid).abs() < 1e-3, "slab {}", i);
        }
    }

    #[test]
    fn test_finish_sits_above_local_ground() {
        for level in &LEVELS {
            let layout = generate_terrain(level);
            let finish = layout.finish_position();
            let ground = layout.surface_y(layout.finish_x);
            assert_eq!(finish.x, level.length);
            assert!((ground - finish.y - FINISH_CLEARANCE).abs() < 1e-3, "level {}", level.id);
            // The marker stands on the ground
            assert!((finish.y + FINISH_SIZE.y / 2.0 - ground).abs() < 1e-3);
        }
    }

    #[test]
    fn test_populate_world_roles() {
        let level = level_by_id(1).unwrap();
        let layout = generate_terrain(level);
        let mut world = World::new();
        populate_world(&mut world, &layout);

        assert_eq!(world.count_role(BodyRole::Terrain), layout.segments.len());
        assert_eq!(world.count_role(BodyRole::Coin), 11);
        assert_eq!(world.count_role(BodyRole::Finish), 1);
        assert!(world.bodies().iter().all(|b| b.is_static));
        let sensors = world.sensors().count();
        assert_eq!(sensors, 11 + 4 + 5 + 1);
    }
}
