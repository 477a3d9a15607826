//! Vehicle rig: a chassis box and two wheels on spring-damper suspension

use glam::Vec2;

use super::world::{Body, BodyId, BodyRole, Spring, World};
use crate::consts::{SPAWN_X, SPAWN_Y, SUSPENSION_DAMPING, SUSPENSION_STIFFNESS};
use crate::vehicles::EffectiveVehicle;

const CHASSIS_FRICTION: f32 = 0.8;
const CHASSIS_AIR_FRICTION: f32 = 0.02;
const CHASSIS_RESTITUTION: f32 = 0.1;
const WHEEL_FRICTION: f32 = 1.0;
const WHEEL_RESTITUTION: f32 = 0.1;

/// Handles to the bodies of the controlled vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleInstance {
    pub chassis: BodyId,
    /// Rear wheel
    pub wheel_a: BodyId,
    /// Front wheel
    pub wheel_b: BodyId,
    /// Wheel centers in the chassis frame
    pub wheel_local: [Vec2; 2],
    pub body_height: f32,
}

impl VehicleInstance {
    pub fn wheels(&self) -> [BodyId; 2] {
        [self.wheel_a, self.wheel_b]
    }

    /// Place the whole rig rigidly at `position` with chassis rotation
    /// `angle`, at rest
    #[cfg(test)]
    pub(crate) fn set_pose(&self, world: &mut World, position: Vec2, angle: f32) {
        if let Some(chassis) = world.get_mut(self.chassis) {
            chassis.position = position;
            chassis.angle = angle;
            chassis.velocity = Vec2::ZERO;
            chassis.angular_velocity = 0.0;
        }
        for (id, local) in self.wheels().into_iter().zip(self.wheel_local) {
            if let Some(wheel) = world.get_mut(id) {
                wheel.position = position + crate::rotate(local, angle);
                wheel.angle = angle;
                wheel.velocity = Vec2::ZERO;
                wheel.angular_velocity = 0.0;
            }
        }
    }
}

/// Build the vehicle at the spawn point and add it to the world.
///
/// Each suspension mount sits `suspension_length` above its wheel center,
/// so the rig spawns with both springs at rest length. The wheels slide on
/// the chassis' local vertical axis through their mounts.
pub fn attach_vehicle(world: &mut World, vehicle: &EffectiveVehicle) -> VehicleInstance {
    let p = &vehicle.physical;
    let spawn = Vec2::new(SPAWN_X, SPAWN_Y);
    let half_base = p.wheel_base / 2.0;

    let chassis = world.add(
        Body::rect(BodyRole::Chassis, spawn, p.body_width, p.body_height)
            .with_density(p.density)
            .with_friction(CHASSIS_FRICTION)
            .with_air_friction(CHASSIS_AIR_FRICTION)
            .with_restitution(CHASSIS_RESTITUTION),
    );

    let wheel_local = [
        Vec2::new(-half_base, p.wheel_y_offset),
        Vec2::new(half_base, p.wheel_y_offset),
    ];
    let [wheel_a, wheel_b] = wheel_local.map(|local| {
        world.add(
            Body::circle(BodyRole::Wheel, spawn + local, p.wheel_radius)
                .with_friction(WHEEL_FRICTION)
                .with_restitution(WHEEL_RESTITUTION),
        )
    });

    for (wheel, local) in [wheel_a, wheel_b].into_iter().zip(wheel_local) {
        world.add_spring(Spring {
            body_a: chassis,
            anchor_a: local - Vec2::new(0.0, p.suspension_length),
            body_b: wheel,
            anchor_b: Vec2::ZERO,
            rest_length: p.suspension_length,
            stiffness: SUSPENSION_STIFFNESS,
            damping: SUSPENSION_DAMPING,
            axis: Some(Vec2::Y),
        });
    }

    log::debug!(
        "Attached {} (torque {:.3}, fuel {:.0})",
        vehicle.id,
        p.torque,
        p.fuel_capacity
    );

    VehicleInstance {
        chassis,
        wheel_a,
        wheel_b,
        wheel_local,
        body_height: p.body_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicles::{DEFAULT_VEHICLE_ID, VEHICLES, vehicle_by_id};
    use std::f32::consts::PI;

    fn hatchback() -> EffectiveVehicle {
        EffectiveVehicle::stock(vehicle_by_id(DEFAULT_VEHICLE_ID).unwrap())
    }

    #[test]
    fn test_rig_layout() {
        let mut world = World::new();
        let vehicle = hatchback();
        let rig = attach_vehicle(&mut world, &vehicle);

        assert_eq!(world.len(), 3);
        assert_eq!(world.springs().len(), 2);
        let chassis = world.get(rig.chassis).unwrap();
        assert_eq!(chassis.position, Vec2::new(SPAWN_X, SPAWN_Y));
        assert_eq!(chassis.role, BodyRole::Chassis);

        let a = world.get(rig.wheel_a).unwrap();
        let b = world.get(rig.wheel_b).unwrap();
        assert_eq!(a.position, Vec2::new(SPAWN_X - 37.5, SPAWN_Y + 18.0));
        assert_eq!(b.position, Vec2::new(SPAWN_X + 37.5, SPAWN_Y + 18.0));
        assert_eq!(a.radius(), Some(16.0));
        assert_eq!(a.friction, 1.0);
    }

    #[test]
    fn test_springs_spawn_at_rest() {
        let mut world = World::new();
        let vehicle = hatchback();
        attach_vehicle(&mut world, &vehicle);
        for spring in world.springs() {
            let (a, b) = spring.endpoints(&world).unwrap();
            let length = a.distance(b);
            assert!((length - vehicle.physical.suspension_length).abs() < 1e-4);
            assert_eq!(spring.stiffness, SUSPENSION_STIFFNESS);
            assert_eq!(spring.damping, SUSPENSION_DAMPING);
        }
    }

    #[test]
    fn test_posed_rig_holds_still_without_gravity() {
        let mut world = World::new();
        world.set_gravity(0.0);
        let rig = attach_vehicle(&mut world, &hatchback());
        rig.set_pose(&mut world, Vec2::new(200.0, 300.0), PI * 0.8);
        let before: Vec<_> = world.bodies().iter().map(|b| (b.position, b.angle)).collect();
        world.update(1000.0 / 60.0);
        let after: Vec<_> = world.bodies().iter().map(|b| (b.position, b.angle)).collect();
        assert_eq!(before, after);
    }

    /// Level-1 gravity over a slab whose top face is at y = 400
    fn flat_world() -> World {
        let mut world = World::new();
        world.set_gravity(1.2);
        world.add(
            Body::rect(BodyRole::Terrain, Vec2::new(2000.0, 420.0), 4000.0, 40.0)
                .with_friction(0.9)
                .fixed(),
        );
        world
    }

    /// Chassis center height when both wheels rest on the y = 400 ground
    fn ride_height(vehicle: &EffectiveVehicle) -> f32 {
        400.0 - vehicle.physical.wheel_radius - vehicle.physical.wheel_y_offset
    }

    #[test]
    fn test_rig_settles_on_flat_ground() {
        let mut world = flat_world();
        let vehicle = hatchback();
        let rig = attach_vehicle(&mut world, &vehicle);
        for _ in 0..180 {
            world.update(1000.0 / 60.0);
        }
        let chassis = world.get(rig.chassis).unwrap();
        assert!(chassis.angle.abs() < 0.05, "angle = {}", chassis.angle);
        // Held up by the springs, not lying on the ground
        let expected = ride_height(&vehicle);
        assert!(
            (chassis.position.y - expected).abs() < 2.0,
            "chassis y = {}, expected {}",
            chassis.position.y,
            expected
        );
        for (id, local) in rig.wheels().into_iter().zip(rig.wheel_local) {
            let wheel = world.get(id).unwrap();
            assert!((wheel.position.y - 384.0).abs() < 1.0, "y = {}", wheel.position.y);
            // Still under its mount
            let offset = wheel.position.x - chassis.position.x;
            assert!((offset - local.x).abs() < 0.5, "wheel offset = {}", offset);
        }
    }

    #[test]
    fn test_driven_rig_keeps_ride_height() {
        let mut world = flat_world();
        let vehicle = hatchback();
        let rig = attach_vehicle(&mut world, &vehicle);
        let force = vehicle.physical.torque / vehicle.physical.wheel_radius;
        for _ in 0..300 {
            for id in rig.wheels() {
                world.apply_force(id, Vec2::new(force, 0.0));
            }
            world.update(1000.0 / 60.0);
        }
        let chassis = world.get(rig.chassis).unwrap();
        assert!(chassis.position.x > SPAWN_X + 500.0, "x = {}", chassis.position.x);
        assert!(
            (chassis.position.y - ride_height(&vehicle)).abs() < 2.0,
            "chassis y = {}",
            chassis.position.y
        );
        let spacing = world.get(rig.wheel_b).unwrap().position.x
            - world.get(rig.wheel_a).unwrap().position.x;
        assert!((spacing - vehicle.physical.wheel_base).abs() < 1.0, "spacing = {}", spacing);
    }

    #[test]
    fn test_every_vehicle_stands_on_its_wheels() {
        for archetype in &VEHICLES {
            let mut world = flat_world();
            let vehicle = EffectiveVehicle::stock(archetype);
            let rig = attach_vehicle(&mut world, &vehicle);
            for _ in 0..180 {
                world.update(1000.0 / 60.0);
            }
            let y = world.get(rig.chassis).unwrap().position.y;
            assert!(
                (y - ride_height(&vehicle)).abs() < 3.0,
                "{}: chassis y = {}, expected {}",
                vehicle.id,
                y,
                ride_height(&vehicle)
            );
        }
    }
}
