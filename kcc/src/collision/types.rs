/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms beyond small accessors. It
defines the data exchanged between:
- the collision query (fold over every triangle of every collider)
- the narrow phase (swept unit sphere vs one triangle)
- the collide-and-slide controller
- ground classification

Everything here except `CollisionPacket`'s world-space fields lives in
ellipsoid space, where the character's ellipsoid is a unit sphere.
*/

use std::sync::Arc;

use nalgebra as na;

use super::plane::Plane;
use crate::collider::MeshCollider;
use crate::space;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Three vertices in counter-clockwise order (front face).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    #[inline]
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unnormalized face normal; its length is twice the area.
    #[inline]
    pub fn scaled_normal(&self) -> Vec3 {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// True when the triangle has (numerically) zero area.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.scaled_normal().norm_squared() <= f32::EPSILON * f32::EPSILON
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    #[inline]
    pub fn plane(&self) -> Plane {
        Plane::from_triangle(self.a, self.b, self.c)
    }

    /// Component-wise divide every vertex by `radius` (world → ellipsoid space).
    #[inline]
    pub fn to_ellipsoid_space(&self, radius: &Vec3) -> Self {
        Self {
            a: space::to_ellipsoid(&self.a, radius),
            b: space::to_ellipsoid(&self.b, radius),
            c: space::to_ellipsoid(&self.c, radius),
        }
    }

    /// Component-wise multiply every vertex by `radius` (ellipsoid → world space).
    #[inline]
    pub fn to_world_space(&self, radius: &Vec3) -> Self {
        Self {
            a: space::to_world(&self.a, radius),
            b: space::to_world(&self.b, radius),
            c: space::to_world(&self.c, radius),
        }
    }
}

/// The nearest contact found by a collision query (ellipsoid space).
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Distance travelled along the velocity before contact: `t * |velocity|`.
    pub distance: f32,
    /// Fraction (0..1) of the tested velocity where the contact occurs.
    pub t: f32,
    /// Point on the struck surface (triangle face, edge, or vertex).
    pub intersection_point: Vec3,
    /// Sphere center at the time of impact: `base_point + t * velocity`.
    pub sphere_center: Vec3,
    /// Plane of the struck triangle.
    pub plane: Plane,
    /// The struck triangle.
    pub triangle: Triangle,
}

/// Per-query sweep record.
///
/// Built from a world-space position and velocity plus the ellipsoid radii;
/// `resolve` fills `contact` with the nearest hit over a collider set.
#[derive(Clone, Copy, Debug)]
pub struct CollisionPacket {
    /// World-space position of the ellipsoid center.
    pub position: Vec3,
    /// World-space translation tested this query.
    pub velocity: Vec3,
    /// Ellipsoid radii (all components > 0).
    pub e_radius: Vec3,
    pub e_velocity: Vec3,
    /// Unit `e_velocity`, or zero when `e_velocity` is zero.
    pub e_normalized_velocity: Vec3,
    pub e_base_point: Vec3,
    /// Nearest contact of the last `resolve`, `None` if nothing was struck.
    pub contact: Option<Contact>,
}

impl CollisionPacket {
    /// Build a packet from world-space inputs.
    ///
    /// `e_radius` must be finite and > 0 on every axis.
    pub fn from_world(position: Vec3, velocity: Vec3, e_radius: Vec3) -> Self {
        Self::from_ellipsoid(
            space::to_ellipsoid(&position, &e_radius),
            space::to_ellipsoid(&velocity, &e_radius),
            e_radius,
        )
    }

    /// Build a packet from ellipsoid-space base point and velocity.
    pub fn from_ellipsoid(e_base_point: Vec3, e_velocity: Vec3, e_radius: Vec3) -> Self {
        debug_assert!(
            space::is_valid_radius(&e_radius),
            "ellipsoid radius must be finite and > 0, got {e_radius:?}"
        );
        Self {
            position: space::to_world(&e_base_point, &e_radius),
            velocity: space::to_world(&e_velocity, &e_radius),
            e_radius,
            e_velocity,
            e_normalized_velocity: e_velocity
                .try_normalize(f32::MIN_POSITIVE)
                .unwrap_or_else(Vec3::zeros),
            e_base_point,
            contact: None,
        }
    }

    /// Whether the last `resolve` found a contact.
    #[inline]
    pub fn found_collision(&self) -> bool {
        self.contact.is_some()
    }

    /// Reset the result and run the collision query over `colliders`.
    pub fn resolve(&mut self, colliders: &[Arc<MeshCollider>]) -> Option<Contact> {
        self.contact = None;
        self.contact = super::query::nearest_contact(colliders, self);
        self.contact
    }
}
