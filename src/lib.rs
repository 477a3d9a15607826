//! Hill Climb - a side-scrolling physics driving game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, rigid bodies, vehicle rig, physics step)
//! - `game`: Run controller state machine
//! - `levels` / `vehicles`: Static game data and upgrades
//! - `persistence`: Save/load of player progress
//! - `platform`: Input and presentation collaborator contracts
//! - `settings`: Runtime tunables and preferences

pub mod error;
pub mod game;
pub mod levels;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod vehicles;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::GameError;
pub use game::{RunController, RunSummary};
pub use levels::{Difficulty, LevelDef};
pub use settings::Settings;
pub use vehicles::{EffectiveVehicle, UpgradeLevels, VehicleArchetype};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Horizontal distance between terrain samples
    pub const TERRAIN_STEP: f32 = 40.0;
    /// Terrain baseline height (screen space, y grows downward)
    pub const TERRAIN_BASE_Y: f32 = 400.0;
    /// Extra thickness added to every terrain slab
    pub const TERRAIN_MARGIN: f32 = 20.0;
    /// Slabs overlap their neighbours slightly so wheels never catch a seam
    pub const TERRAIN_OVERLAP: f32 = 1.1;

    /// Vehicle spawn point
    pub const SPAWN_X: f32 = 80.0;
    pub const SPAWN_Y: f32 = 350.0;

    /// Suspension spring parameters
    pub const SUSPENSION_STIFFNESS: f32 = 0.8;
    pub const SUSPENSION_DAMPING: f32 = 0.3;

    /// Torque multipliers relative to the vehicle base torque
    pub const BRAKE_TORQUE_FACTOR: f32 = -0.6;
    pub const BOOST_TORQUE_FACTOR: f32 = 1.5;

    /// Fuel drain coefficients (per 60 Hz frame)
    pub const FUEL_TORQUE_DRAIN: f32 = 0.00004;
    pub const FUEL_IDLE_DRAIN: f32 = 0.03;

    /// Boost gauge
    pub const BOOST_MAX: f32 = 100.0;
    pub const BOOST_DRAIN_PER_SEC: f32 = 20.0;

    /// Pickup effects
    pub const FUEL_PICKUP_AMOUNT: f32 = 30.0;
    pub const BOOST_PICKUP_AMOUNT: f32 = 40.0;

    /// Chassis rotation (radians) at which the vehicle counts as flipped
    pub const FLIP_ANGLE: f32 = std::f32::consts::PI * 0.8;

    /// Wheel angular speed to displayed RPM
    pub const RPM_FACTOR: f32 = 20.0;

    /// Reference frame duration the drain and RPM formulas are expressed in
    pub const FRAME_MS: f32 = 1000.0 / 60.0;

    /// Multiplier applied to a level id to get its terrain seed
    pub const LEVEL_SEED_FACTOR: u32 = 9973;
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// 2D cross product (z component of the 3D cross)
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}
