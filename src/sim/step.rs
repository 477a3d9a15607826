//! Physics step and resource resolver
//!
//! One call per frame: drive the wheels, drain fuel and boost, advance the
//! world, consume pickups near the chassis and decide whether the run is over.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rig::VehicleInstance;
use super::state::{EndCause, RunState};
use super::world::{BodyId, BodyRole, World};
use crate::consts::*;
use crate::settings::Settings;

/// Control intents for a single step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub gas: bool,
    pub brake: bool,
    pub boost: bool,
}

/// Outcome of one physics step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub rpm: f32,
    pub fuel: f32,
    pub boost: f32,
    pub collected_coins: u32,
    pub collected_fuel: bool,
    pub collected_boost: bool,
    pub used_boost: bool,
    pub low_fuel: bool,
    /// Chassis x this tick, floored at zero
    pub distance: f32,
    pub ended: bool,
    pub reached_finish: bool,
    pub cause: Option<EndCause>,
}

/// Advance the run by `dt` seconds
pub fn step_physics(
    world: &mut World,
    rig: &VehicleInstance,
    run: &RunState,
    control: Control,
    dt: f32,
    settings: &Settings,
) -> StepResult {
    let stats = &run.vehicle.physical;

    // Torque
    let base = stats.torque;
    let mut total_torque = 0.0;
    if control.gas {
        total_torque += base;
    }
    if control.brake {
        total_torque += base * BRAKE_TORQUE_FACTOR;
    }
    if control.boost {
        total_torque += base * BOOST_TORQUE_FACTOR;
    }

    let mut spin = 0.0;
    for wheel in rig.wheels() {
        let Some(body) = world.get(wheel) else {
            continue;
        };
        let radius = body.radius().unwrap_or(stats.wheel_radius);
        spin += body.angular_speed_per_frame().abs();
        world.apply_force(wheel, Vec2::new(total_torque / radius, 0.0));
    }
    let rpm = spin * RPM_FACTOR;

    // Fuel drain uses the attitude before integration
    let (_, angle) = chassis_pose(world, rig);
    let drain = (total_torque.abs() * FUEL_TORQUE_DRAIN + FUEL_IDLE_DRAIN * (1.0 + angle.sin().abs()))
        / stats.fuel_efficiency;
    let mut fuel = (run.fuel - drain * dt * 60.0).max(0.0);

    let mut boost = run.boost;
    let mut used_boost = false;
    if control.boost && boost > 0.0 {
        boost = (boost - BOOST_DRAIN_PER_SEC * dt).max(0.0);
        used_boost = true;
    }

    world.update(dt * 1000.0);

    // Pickups
    let (position, angle) = chassis_pose(world, rig);
    let reach = settings.pickup_radius * settings.pickup_radius;
    let hits: Vec<(BodyId, BodyRole)> = world
        .sensors()
        .filter(|b| b.position.distance_squared(position) <= reach)
        .map(|b| (b.id, b.role))
        .collect();

    let mut result = StepResult::default();
    for (id, role) in hits {
        match role {
            BodyRole::Coin => {
                if consume(world, id, role) {
                    result.collected_coins += 1;
                }
            }
            BodyRole::Fuel => {
                if consume(world, id, role) {
                    fuel = (fuel + FUEL_PICKUP_AMOUNT).min(stats.fuel_capacity);
                    result.collected_fuel = true;
                }
            }
            BodyRole::Boost => {
                if consume(world, id, role) {
                    boost = (boost + BOOST_PICKUP_AMOUNT).min(BOOST_MAX);
                    result.collected_boost = true;
                }
            }
            BodyRole::Finish => result.reached_finish = true,
            BodyRole::Collected | BodyRole::Terrain | BodyRole::Chassis | BodyRole::Wheel => {}
        }
    }
    if result.collected_coins > 0 || result.collected_fuel || result.collected_boost {
        log::debug!(
            "Pickups at x={:.0}: coins {}, fuel {}, boost {}",
            position.x,
            result.collected_coins,
            result.collected_fuel,
            result.collected_boost
        );
    }

    // Termination, finish first
    let head_y = position.y - rig.body_height / 2.0;
    let flipped = head_y > settings.flip_floor_y || angle.abs() >= FLIP_ANGLE;
    result.cause = if result.reached_finish {
        Some(EndCause::Finish)
    } else if flipped {
        Some(EndCause::Flip)
    } else if fuel <= 0.0 {
        Some(EndCause::Fuel)
    } else {
        None
    };
    result.ended = result.cause.is_some();

    result.rpm = rpm;
    result.fuel = fuel;
    result.boost = boost;
    result.used_boost = used_boost;
    result.low_fuel = fuel < stats.fuel_capacity * settings.low_fuel_fraction;
    result.distance = position.x.max(0.0);
    result
}

/// Chassis position and rotation
fn chassis_pose(world: &World, rig: &VehicleInstance) -> (Vec2, f32) {
    let chassis = world.get(rig.chassis);
    debug_assert!(chassis.is_some(), "chassis missing from world");
    chassis.map_or((Vec2::new(SPAWN_X, SPAWN_Y), 0.0), |b| (b.position, b.angle))
}

/// Mark a pickup collected and take it out of the world. Returns false if it
/// was already consumed.
fn consume(world: &mut World, id: BodyId, role: BodyRole) -> bool {
    match world.get_mut(id) {
        Some(body) if body.role == role => body.role = BodyRole::Collected,
        _ => return false,
    }
    world.remove(id);
    true
}
