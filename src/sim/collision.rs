//! Contact detection against oriented boxes
//!
//! Terrain slabs are rotated rectangles. Wheels test against them as circles
//! and the chassis tests its four corners as points, which is enough to land
//! on the roof after a flip without a full polygon clipper.

use glam::Vec2;

use crate::rotate;

/// An oriented rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec2,
    pub half_extents: Vec2,
    pub angle: f32,
}

impl Obb {
    pub fn new(center: Vec2, half_extents: Vec2, angle: f32) -> Self {
        Self {
            center,
            half_extents,
            angle,
        }
    }

    /// Transform a world point into box-local space
    #[inline]
    pub fn to_local(&self, p: Vec2) -> Vec2 {
        rotate(p - self.center, -self.angle)
    }

    /// Transform a box-local point into world space
    #[inline]
    pub fn to_world(&self, p: Vec2) -> Vec2 {
        self.center + rotate(p, self.angle)
    }

    /// Radius of the circle enclosing the box
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.half_extents.length()
    }

    /// World-space corners, counter-clockwise from the local (-x, -y) corner
    pub fn corners(&self) -> [Vec2; 4] {
        let h = self.half_extents;
        [
            self.to_world(Vec2::new(-h.x, -h.y)),
            self.to_world(Vec2::new(h.x, -h.y)),
            self.to_world(Vec2::new(h.x, h.y)),
            self.to_world(Vec2::new(-h.x, h.y)),
        ]
    }
}

/// A single contact against a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Contact point on the box surface
    pub point: Vec2,
    /// Unit normal pointing out of the box, toward the queried shape
    pub normal: Vec2,
    /// Overlap depth along the normal
    pub penetration: f32,
}

/// Check a circle against an oriented box.
///
/// Returns `None` when they do not overlap. A circle whose center is inside
/// the box is pushed out through the nearest face.
pub fn circle_obb_contact(center: Vec2, radius: f32, obb: &Obb) -> Option<Contact> {
    // Cheap reject before the transform
    let reach = obb.bounding_radius() + radius;
    if center.distance_squared(obb.center) > reach * reach {
        return None;
    }

    let h = obb.half_extents;
    let local = obb.to_local(center);
    let clamped = local.clamp(-h, h);

    let (point_local, normal_local, penetration) = if local != clamped {
        let d = local - clamped;
        let dist = d.length();
        if dist >= radius {
            return None;
        }
        (clamped, d / dist, radius - dist)
    } else {
        // Center inside: exit through the closest face
        let dx = h.x - local.x.abs();
        let dy = h.y - local.y.abs();
        if dx < dy {
            let sign = if local.x >= 0.0 { 1.0 } else { -1.0 };
            (
                Vec2::new(sign * h.x, local.y),
                Vec2::new(sign, 0.0),
                dx + radius,
            )
        } else {
            let sign = if local.y >= 0.0 { 1.0 } else { -1.0 };
            (
                Vec2::new(local.x, sign * h.y),
                Vec2::new(0.0, sign),
                dy + radius,
            )
        }
    };

    Some(Contact {
        point: obb.to_world(point_local),
        normal: rotate(normal_local, obb.angle),
        penetration,
    })
}

/// Check a point against an oriented box
#[inline]
pub fn point_obb_contact(p: Vec2, obb: &Obb) -> Option<Contact> {
    circle_obb_contact(p, 0.0, obb)
}
