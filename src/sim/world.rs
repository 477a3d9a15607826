//! Rigid-body world
//!
//! A small 2D engine in screen coordinates (x right, y down) that integrates
//! in milliseconds. Each update is split into substeps; every substep
//! predicts positions, projects spring and contact constraints, derives
//! velocities from the corrected positions, then applies contact friction,
//! restitution and spring damping at the velocity level.
//!
//! Springs may carry a slide axis, which turns them into wheel joints: the
//! wheel is held on the suspension line and only travels along it.
//!
//! Dynamic bodies only collide with static geometry. Sensors never collide;
//! they are found by proximity queries in the physics step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Contact, Obb, circle_obb_contact, point_obb_contact};
use crate::consts::FRAME_MS;
use crate::{cross, rotate};

/// Gravity acceleration per unit of gravity scalar (px/ms²)
pub const GRAVITY_SCALE: f32 = 0.001;
/// Density used when none is given
pub const DEFAULT_DENSITY: f32 = 0.001;
/// Springs within this distance of their rest length (or of their slide
/// axis) are left alone
const SPRING_SLOP: f32 = 1e-3;
/// Approach speeds below this (px/ms) do not bounce
const BOUNCE_THRESHOLD: f32 = 0.05;

/// Stable handle to a body in a [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// What a body represents in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyRole {
    Terrain,
    Coin,
    Fuel,
    Boost,
    Finish,
    Chassis,
    Wheel,
    /// A pickup whose effect has already been applied
    Collected,
}

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

impl Shape {
    pub fn area(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            Shape::Rect { half_extents } => 4.0 * half_extents.x * half_extents.y,
        }
    }

    /// Moment of inertia for unit mass
    fn unit_inertia(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => 0.5 * radius * radius,
            Shape::Rect { half_extents } => {
                let w = 2.0 * half_extents.x;
                let h = 2.0 * half_extents.y;
                (w * w + h * h) / 12.0
            }
        }
    }
}

/// A rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub role: BodyRole,
    pub shape: Shape,
    pub position: Vec2,
    /// Rotation in radians (clockwise on screen, since y points down)
    pub angle: f32,
    /// px/ms
    pub velocity: Vec2,
    /// rad/ms
    pub angular_velocity: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Fraction of velocity lost per 60 Hz frame
    pub air_friction: f32,
    pub is_static: bool,
    pub is_sensor: bool,
    mass: f32,
    inv_mass: f32,
    inv_inertia: f32,
    force: Vec2,
    prev_position: Vec2,
    prev_angle: f32,
}

impl Body {
    fn new(role: BodyRole, shape: Shape, position: Vec2) -> Self {
        let mut body = Self {
            id: BodyId(0),
            role,
            shape,
            position,
            angle: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            friction: 0.1,
            restitution: 0.0,
            air_friction: 0.01,
            is_static: false,
            is_sensor: false,
            mass: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            force: Vec2::ZERO,
            prev_position: position,
            prev_angle: 0.0,
        };
        body.set_density(DEFAULT_DENSITY);
        body
    }

    /// Dynamic circle
    pub fn circle(role: BodyRole, position: Vec2, radius: f32) -> Self {
        Self::new(role, Shape::Circle { radius }, position)
    }

    /// Dynamic rectangle of full size `width` x `height`
    pub fn rect(role: BodyRole, position: Vec2, width: f32, height: f32) -> Self {
        let half_extents = Vec2::new(width / 2.0, height / 2.0);
        Self::new(role, Shape::Rect { half_extents }, position)
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.set_density(density);
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_air_friction(mut self, air_friction: f32) -> Self {
        self.air_friction = air_friction;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self.prev_angle = angle;
        self
    }

    /// Make the body immovable
    pub fn fixed(mut self) -> Self {
        self.is_static = true;
        self.inv_mass = 0.0;
        self.inv_inertia = 0.0;
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self
    }

    /// Make the body a static trigger volume
    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self.fixed()
    }

    fn set_density(&mut self, density: f32) {
        debug_assert!(density > 0.0, "density must be positive");
        self.mass = density * self.shape.area();
        if !self.is_static {
            self.inv_mass = 1.0 / self.mass;
            self.inv_inertia = 1.0 / (self.mass * self.shape.unit_inertia());
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Radius for circles, `None` for rectangles
    pub fn radius(&self) -> Option<f32> {
        match self.shape {
            Shape::Circle { radius } => Some(radius),
            Shape::Rect { .. } => None,
        }
    }

    /// Oriented box for rectangles
    pub fn obb(&self) -> Option<Obb> {
        match self.shape {
            Shape::Rect { half_extents } => Some(Obb::new(self.position, half_extents, self.angle)),
            Shape::Circle { .. } => None,
        }
    }

    /// Transform a body-local point to world space
    #[inline]
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.position + rotate(local, self.angle)
    }

    /// Velocity of a world point attached to this body
    #[inline]
    pub fn point_velocity(&self, r: Vec2) -> Vec2 {
        self.velocity + Vec2::new(-self.angular_velocity * r.y, self.angular_velocity * r.x)
    }

    /// Angular velocity in radians per 60 Hz frame
    pub fn angular_speed_per_frame(&self) -> f32 {
        self.angular_velocity * FRAME_MS
    }

    /// Apply an impulse along `dir` (unit) at offset `r` from the center
    fn apply_impulse(&mut self, r: Vec2, dir: Vec2, magnitude: f32) {
        self.velocity += dir * (magnitude * self.inv_mass);
        self.angular_velocity += self.inv_inertia * cross(r, dir) * magnitude;
    }

    /// Generalized inverse mass along `dir` at offset `r`
    #[inline]
    fn effective_inv_mass(&self, r: Vec2, dir: Vec2) -> f32 {
        let rn = cross(r, dir);
        self.inv_mass + self.inv_inertia * rn * rn
    }
}

/// A spring-damper linking anchor points on two bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub body_a: BodyId,
    /// Anchor in body A's local frame
    pub anchor_a: Vec2,
    pub body_b: BodyId,
    /// Anchor in body B's local frame
    pub anchor_b: Vec2,
    pub rest_length: f32,
    /// Fraction of the length error corrected each substep (0..1)
    pub stiffness: f32,
    /// Fraction of the relative normal velocity removed each substep (0..1)
    pub damping: f32,
    /// Slide axis in body A's frame. When set, B's anchor is held on the
    /// line through `anchor_a` along this axis and the spring acts along it.
    pub axis: Option<Vec2>,
}

impl Spring {
    /// World-space anchor positions, if both bodies exist
    pub fn endpoints(&self, world: &World) -> Option<(Vec2, Vec2)> {
        let a = world.get(self.body_a)?;
        let b = world.get(self.body_b)?;
        Some((a.world_point(self.anchor_a), b.world_point(self.anchor_b)))
    }
}

/// Contact recorded during the positional pass for the velocity pass
#[derive(Debug, Clone, Copy)]
struct ContactPoint {
    body: usize,
    r: Vec2,
    normal: Vec2,
    normal_impulse: f32,
    friction: f32,
    restitution: f32,
    approach_speed: f32,
}

/// The physics world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Bodies sorted by id for deterministic iteration
    bodies: Vec<Body>,
    springs: Vec<Spring>,
    gravity: Vec2,
    substeps: u32,
    next_id: u32,
    #[serde(skip)]
    contacts: Vec<ContactPoint>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            springs: Vec::new(),
            gravity: Vec2::new(0.0, GRAVITY_SCALE),
            substeps: 4,
            next_id: 1,
            contacts: Vec::new(),
        }
    }

    /// Set gravity from a level's gravity scalar
    pub fn set_gravity(&mut self, scalar: f32) {
        self.gravity = Vec2::new(0.0, scalar * GRAVITY_SCALE);
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_substeps(&mut self, substeps: u32) {
        self.substeps = substeps.max(1);
    }

    /// Add a body and return its handle
    pub fn add(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        body.id = id;
        body.prev_position = body.position;
        body.prev_angle = body.angle;
        // Ids are monotonic, so pushing keeps the list sorted
        self.bodies.push(body);
        id
    }

    pub fn add_spring(&mut self, spring: Spring) {
        debug_assert!(self.contains(spring.body_a) && self.contains(spring.body_b));
        self.springs.push(spring);
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id).ok()
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(move |i| &mut self.bodies[i])
    }

    /// Remove a body immediately, along with any springs attached to it
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let index = self.index_of(id)?;
        self.springs.retain(|s| s.body_a != id && s.body_b != id);
        Some(self.bodies.remove(index))
    }

    /// Remove every body and spring
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.springs.clear();
        self.contacts.clear();
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Sensor bodies in id order
    pub fn sensors(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.is_sensor)
    }

    /// Count of bodies with a given role
    #[cfg(test)]
    pub(crate) fn count_role(&self, role: BodyRole) -> usize {
        self.bodies.iter().filter(|b| b.role == role).count()
    }

    /// Accumulate a force at a body's center for the next update
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) {
        if let Some(body) = self.get_mut(id) {
            if !body.is_static {
                body.force += force;
            }
        }
    }

    /// Advance the simulation by `delta_ms` milliseconds
    pub fn update(&mut self, delta_ms: f32) {
        debug_assert!(delta_ms.is_finite(), "non-finite time step");
        if delta_ms > 0.0 {
            let h = delta_ms / self.substeps as f32;
            for _ in 0..self.substeps {
                self.substep(h);
            }
        }
        for body in &mut self.bodies {
            body.force = Vec2::ZERO;
        }
    }

    fn substep(&mut self, h: f32) {
        let gravity = self.gravity;

        // Predict
        for body in self.bodies.iter_mut().filter(|b| !b.is_static) {
            body.prev_position = body.position;
            body.prev_angle = body.angle;
            body.velocity += (gravity + body.force * body.inv_mass) * h;
            body.position += body.velocity * h;
            body.angle += body.angular_velocity * h;
        }

        // Positional pass
        for i in 0..self.springs.len() {
            self.project_spring(i);
        }
        self.contacts.clear();
        self.project_contacts(h);

        // Derive velocities from the corrected positions, keeping the
        // predicted velocity around for the bounce test
        for body in self.bodies.iter_mut().filter(|b| !b.is_static) {
            body.velocity = (body.position - body.prev_position) / h;
            body.angular_velocity = (body.angle - body.prev_angle) / h;
        }

        // Velocity pass
        for i in 0..self.contacts.len() {
            let contact = self.contacts[i];
            solve_contact_velocity(&mut self.bodies[contact.body], &contact);
        }
        for i in 0..self.springs.len() {
            self.damp_spring(i);
        }

        let frames = h / FRAME_MS;
        for body in self.bodies.iter_mut().filter(|b| !b.is_static) {
            let keep = (1.0 - body.air_friction).powf(frames);
            body.velocity *= keep;
            body.angular_velocity *= keep;
        }
    }

    fn spring_pair(&self, index: usize) -> Option<(usize, usize)> {
        let spring = &self.springs[index];
        let a = self.index_of(spring.body_a)?;
        let b = self.index_of(spring.body_b)?;
        (a != b).then_some((a, b))
    }

    fn project_spring(&mut self, index: usize) {
        let Some((ia, ib)) = self.spring_pair(index) else {
            return;
        };
        let spring = self.springs[index].clone();
        let (a, b) = pair_mut(&mut self.bodies, ia, ib);

        let Some(local_axis) = spring.axis else {
            let delta = b.world_point(spring.anchor_b) - a.world_point(spring.anchor_a);
            let len = delta.length();
            // Coincident anchors: push along A's local down axis
            let n = if len > f32::EPSILON {
                delta / len
            } else {
                rotate(Vec2::Y, a.angle)
            };
            project_along(a, b, &spring, n, len - spring.rest_length, spring.stiffness);
            return;
        };

        // Wheel joint: rigid across the axis, springy along it
        let axis = rotate(local_axis, a.angle);
        let side = axis.perp();
        let delta = b.world_point(spring.anchor_b) - a.world_point(spring.anchor_a);
        project_along(a, b, &spring, side, delta.dot(side), 1.0);
        let delta = b.world_point(spring.anchor_b) - a.world_point(spring.anchor_a);
        project_along(
            a,
            b,
            &spring,
            axis,
            delta.dot(axis) - spring.rest_length,
            spring.stiffness,
        );
    }

    fn damp_spring(&mut self, index: usize) {
        let Some((ia, ib)) = self.spring_pair(index) else {
            return;
        };
        let spring = self.springs[index].clone();
        let (a, b) = pair_mut(&mut self.bodies, ia, ib);

        let pa = a.world_point(spring.anchor_a);
        let pb = b.world_point(spring.anchor_b);
        let n = match spring.axis {
            Some(local_axis) => rotate(local_axis, a.angle),
            None => {
                let delta = pb - pa;
                let len = delta.length();
                if len <= f32::EPSILON {
                    return;
                }
                delta / len
            }
        };
        let ra = pa - a.position;
        let rb = pb - b.position;

        let relative = (b.point_velocity(rb) - a.point_velocity(ra)).dot(n);
        let w = a.effective_inv_mass(ra, n) + b.effective_inv_mass(rb, n);
        if w <= 0.0 || relative == 0.0 {
            return;
        }
        let impulse = -relative * spring.damping / w;
        a.apply_impulse(ra, n, -impulse);
        b.apply_impulse(rb, n, impulse);
    }

    /// Push dynamic bodies out of static geometry and record the contacts
    fn project_contacts(&mut self, h: f32) {
        let (statics, dynamics): (Vec<usize>, Vec<usize>) = (0..self.bodies.len())
            .filter(|&i| !self.bodies[i].is_sensor)
            .partition(|&i| self.bodies[i].is_static);

        for &di in &dynamics {
            for &si in &statics {
                let Some(obb) = self.bodies[si].obb() else {
                    continue;
                };
                let friction = self.bodies[si].friction.min(self.bodies[di].friction);
                let restitution = self.bodies[si].restitution.max(self.bodies[di].restitution);

                for contact in body_contacts(&self.bodies[di], &obb) {
                    let body = &mut self.bodies[di];
                    let r = contact.point - body.position;
                    let w = body.effective_inv_mass(r, contact.normal);
                    if w <= 0.0 {
                        continue;
                    }
                    let approach_speed = body.point_velocity(r).dot(contact.normal);
                    let lambda = contact.penetration / w;
                    body.position += contact.normal * (lambda * body.inv_mass);
                    body.angle += body.inv_inertia * cross(r, contact.normal) * lambda;

                    self.contacts.push(ContactPoint {
                        body: di,
                        r,
                        normal: contact.normal,
                        normal_impulse: lambda / h,
                        friction,
                        restitution,
                        approach_speed,
                    });
                }
            }
        }
    }
}

/// Move the spring anchors toward each other along `n` to remove
/// `stiffness` of `error`
fn project_along(a: &mut Body, b: &mut Body, spring: &Spring, n: Vec2, error: f32, stiffness: f32) {
    if error.abs() <= SPRING_SLOP {
        return;
    }
    let ra = a.world_point(spring.anchor_a) - a.position;
    let rb = b.world_point(spring.anchor_b) - b.position;
    let w = a.effective_inv_mass(ra, n) + b.effective_inv_mass(rb, n);
    if w <= 0.0 {
        return;
    }
    let lambda = -stiffness * error / w;

    a.position -= n * (lambda * a.inv_mass);
    a.angle -= a.inv_inertia * cross(ra, n) * lambda;
    b.position += n * (lambda * b.inv_mass);
    b.angle += b.inv_inertia * cross(rb, n) * lambda;
}

/// Contacts of a dynamic body against one static box. Circles test as
/// circles, rectangles test their corners.
fn body_contacts(body: &Body, obb: &Obb) -> Vec<Contact> {
    match body.shape {
        Shape::Circle { radius } => circle_obb_contact(body.position, radius, obb)
            .into_iter()
            .collect(),
        Shape::Rect { .. } => body
            .obb()
            .map(|own| {
                own.corners()
                    .iter()
                    .filter_map(|&corner| point_obb_contact(corner, obb))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn solve_contact_velocity(body: &mut Body, c: &ContactPoint) {
    let v = body.point_velocity(c.r);
    let vn = v.dot(c.normal);

    // Normal: bounce off real impacts, otherwise only stop approach
    let target = if c.approach_speed < -BOUNCE_THRESHOLD {
        -c.restitution * c.approach_speed
    } else {
        0.0
    };
    let dvn = if c.approach_speed < 0.0 {
        target - vn
    } else {
        (-vn).max(0.0)
    };
    if dvn != 0.0 {
        let w = body.effective_inv_mass(c.r, c.normal);
        if w > 0.0 {
            body.apply_impulse(c.r, c.normal, dvn / w);
        }
    }

    // Coulomb friction against the tangential slip
    let v = body.point_velocity(c.r);
    let vt = v - c.normal * v.dot(c.normal);
    let slip = vt.length();
    if slip > 1e-9 {
        let dir = -vt / slip;
        let w = body.effective_inv_mass(c.r, dir);
        if w > 0.0 {
            let impulse = (slip / w).min(c.friction * c.normal_impulse);
            body.apply_impulse(c.r, dir, impulse);
        }
    }
}

/// Borrow two distinct bodies mutably
fn pair_mut(bodies: &mut [Body], a: usize, b: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = bodies.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_ground(world: &mut World) -> BodyId {
        // Top face at y = 400
        world.add(
            Body::rect(BodyRole::Terrain, Vec2::new(0.0, 420.0), 4000.0, 40.0)
                .with_friction(0.9)
                .fixed(),
        )
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut world = World::new();
        let a = world.add(Body::circle(BodyRole::Wheel, Vec2::ZERO, 5.0));
        let b = world.add(Body::circle(BodyRole::Wheel, Vec2::ZERO, 5.0));
        assert!(b > a);
        world.remove(a);
        let c = world.add(Body::circle(BodyRole::Wheel, Vec2::ZERO, 5.0));
        assert!(c > b);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_mass_from_density() {
        let body = Body::rect(BodyRole::Chassis, Vec2::ZERO, 110.0, 35.0).with_density(0.004);
        assert!((body.mass() - 15.4).abs() < 1e-3);
        let fixed = Body::rect(BodyRole::Terrain, Vec2::ZERO, 10.0, 10.0).fixed();
        assert_eq!(fixed.inv_mass(), 0.0);
    }

    #[test]
    fn test_free_fall() {
        let mut world = World::new();
        world.set_gravity(1.0);
        let id = world.add(Body::circle(BodyRole::Wheel, Vec2::ZERO, 5.0).with_air_friction(0.0));
        world.update(100.0);
        let body = world.get(id).unwrap();
        // v = g t = 0.1 px/ms after 100 ms
        assert!((body.velocity.y - 0.1).abs() < 1e-4);
        assert!(body.position.y > 0.0);
        assert_eq!(body.position.x, 0.0);
    }

    #[test]
    fn test_static_bodies_do_not_move() {
        let mut world = World::new();
        let ground = flat_ground(&mut world);
        world.apply_force(ground, Vec2::new(10.0, 0.0));
        world.update(16.0);
        assert_eq!(world.get(ground).unwrap().position, Vec2::new(0.0, 420.0));
    }

    #[test]
    fn test_wheel_rests_on_ground() {
        let mut world = World::new();
        flat_ground(&mut world);
        let wheel = world.add(Body::circle(BodyRole::Wheel, Vec2::new(0.0, 380.0), 16.0).with_friction(1.0));
        for _ in 0..240 {
            world.update(FRAME_MS);
        }
        let body = world.get(wheel).unwrap();
        assert!((body.position.y - 384.0).abs() < 1.0, "y = {}", body.position.y);
        assert!(body.velocity.length() < 0.01);
    }

    #[test]
    fn test_pushed_wheel_rolls() {
        let mut world = World::new();
        flat_ground(&mut world);
        let wheel = world.add(Body::circle(BodyRole::Wheel, Vec2::new(0.0, 384.0), 16.0).with_friction(1.0));
        for _ in 0..120 {
            world.apply_force(wheel, Vec2::new(0.0005, 0.0));
            world.update(FRAME_MS);
        }
        let body = world.get(wheel).unwrap();
        assert!(body.position.x > 0.0);
        // Friction at the contact spins the wheel forward (clockwise on screen)
        assert!(body.angular_velocity > 0.0);
    }

    #[test]
    fn test_spring_pulls_toward_rest_length() {
        let mut world = World::new();
        world.set_gravity(0.0);
        let a = world.add(Body::circle(BodyRole::Chassis, Vec2::ZERO, 5.0));
        let b = world.add(Body::circle(BodyRole::Wheel, Vec2::new(50.0, 0.0), 5.0));
        world.add_spring(Spring {
            body_a: a,
            anchor_a: Vec2::ZERO,
            body_b: b,
            anchor_b: Vec2::ZERO,
            rest_length: 20.0,
            stiffness: 0.8,
            damping: 0.3,
            axis: None,
        });
        for _ in 0..60 {
            world.update(FRAME_MS);
        }
        let (pa, pb) = world.springs()[0].endpoints(&world).unwrap();
        let length = pa.distance(pb);
        assert!((length - 20.0).abs() < 0.5, "length = {}", length);
    }

    #[test]
    fn test_wheel_joint_stays_on_axis() {
        let mut world = World::new();
        world.set_gravity(0.0);
        let mount = world.add(Body::rect(BodyRole::Chassis, Vec2::ZERO, 40.0, 10.0).fixed());
        let wheel = world.add(Body::circle(BodyRole::Wheel, Vec2::new(0.0, 30.0), 5.0));
        world.add_spring(Spring {
            body_a: mount,
            anchor_a: Vec2::ZERO,
            body_b: wheel,
            anchor_b: Vec2::ZERO,
            rest_length: 30.0,
            stiffness: 0.5,
            damping: 0.1,
            axis: Some(Vec2::Y),
        });
        for _ in 0..30 {
            world.apply_force(wheel, Vec2::new(0.001, 0.001));
            world.update(FRAME_MS);
        }
        let p = world.get(wheel).unwrap().position;
        // Sideways push is taken by the joint, the push along the axis
        // stretches the spring
        assert!(p.x.abs() < 0.01, "x = {}", p.x);
        assert!(p.y > 30.0, "y = {}", p.y);
    }

    #[test]
    fn test_remove_drops_attached_springs() {
        let mut world = World::new();
        let a = world.add(Body::circle(BodyRole::Chassis, Vec2::ZERO, 5.0));
        let b = world.add(Body::circle(BodyRole::Wheel, Vec2::new(10.0, 0.0), 5.0));
        world.add_spring(Spring {
            body_a: a,
            anchor_a: Vec2::ZERO,
            body_b: b,
            anchor_b: Vec2::ZERO,
            rest_length: 10.0,
            stiffness: 0.8,
            damping: 0.3,
            axis: None,
        });
        assert!(world.remove(b).is_some());
        assert!(world.springs().is_empty());
        assert!(world.remove(b).is_none());
    }

    #[test]
    fn test_sensors_do_not_collide() {
        let mut world = World::new();
        world.add(
            Body::rect(BodyRole::Coin, Vec2::new(0.0, 420.0), 4000.0, 40.0).sensor(),
        );
        let wheel = world.add(Body::circle(BodyRole::Wheel, Vec2::new(0.0, 395.0), 16.0));
        world.update(FRAME_MS);
        assert!(world.get(wheel).unwrap().position.y > 395.0);
        assert_eq!(world.sensors().count(), 1);
    }

    #[test]
    fn test_clear_empties_world() {
        let mut world = World::new();
        flat_ground(&mut world);
        world.add(Body::circle(BodyRole::Wheel, Vec2::ZERO, 5.0));
        world.clear();
        assert!(world.is_empty());
        assert!(world.springs().is_empty());
    }
}
