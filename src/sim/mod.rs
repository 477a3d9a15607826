//! Deterministic simulation module
//!
//! All gameplay physics lives here. This module must be pure and deterministic:
//! - Seeded RNG only, one generator per terrain build
//! - Stable iteration order (by body id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod rig;
pub mod rng;
pub mod state;
pub mod step;
pub mod terrain;
pub mod world;

pub use collision::{Contact, Obb, circle_obb_contact, point_obb_contact};
pub use rig::{VehicleInstance, attach_vehicle};
pub use rng::{GradientNoise, LevelRng};
pub use state::{EndCause, RunPhase, RunState};
pub use step::{Control, StepResult, step_physics};
pub use terrain::{TerrainLayout, generate_terrain, populate_world};
pub use world::{Body, BodyId, BodyRole, Shape, Spring, World};
