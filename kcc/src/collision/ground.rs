use std::sync::Arc;

use super::{
    kinematic::{MoveRequest, collide_and_slide},
    settings::ControllerSettings,
    types::{CollisionPacket, Contact, Vec3},
};
use crate::collider::MeshCollider;

/// Ground found below a character by [`probe_ground`].
#[derive(Clone, Copy, Debug)]
pub struct GroundHit {
    /// World-space distance travelled along `-up` before contact.
    pub distance: f32,
    /// World-space unit normal of the supporting triangle.
    pub normal: Vec3,
    /// Whether the slope is shallow enough to stand on.
    pub walkable: bool,
}

/// World-space normal of the triangle a contact struck.
///
/// The contact triangle lives in ellipsoid space; scaling it back by the radii
/// before building the plane gives the true surface slope.
#[inline]
pub fn surface_normal(contact: &Contact, e_radius: &Vec3) -> Vec3 {
    contact.triangle.to_world_space(e_radius).plane().normal
}

/// `dot(surface_normal, up) >= walkable_slope`.
#[inline]
pub fn is_walkable(contact: &Contact, e_radius: &Vec3, up: &Vec3, walkable_slope: f32) -> bool {
    surface_normal(contact, e_radius).dot(up) >= walkable_slope
}

/// Sweep the ellipsoid down along `-up` by at most `max_distance` and report
/// the first surface struck. Does not move anything.
///
/// `e_radius` must be finite and > 0 on every axis.
pub fn probe_ground(
    colliders: &[Arc<MeshCollider>],
    position: Vec3,
    e_radius: Vec3,
    max_distance: f32,
    settings: &ControllerSettings,
) -> Option<GroundHit> {
    if max_distance <= 0.0 {
        return None;
    }

    let cast = -settings.up * max_distance;
    let mut packet = CollisionPacket::from_world(position, cast, e_radius);
    let contact = packet.resolve(colliders)?;

    let normal = surface_normal(&contact, &e_radius);
    Some(GroundHit {
        distance: max_distance * contact.t,
        normal,
        walkable: normal.dot(&settings.up) >= settings.walkable_slope,
    })
}

/// Move the ellipsoid down onto walkable ground within `max_distance`.
///
/// Returns the new position and the ground found. Steep or missing ground
/// leaves the position untouched and returns `None`. The ellipsoid stops the
/// usual `very_close_distance` short of the surface. `e_radius` must be finite
/// and > 0 on every axis.
pub fn snap_to_ground(
    colliders: &[Arc<MeshCollider>],
    position: Vec3,
    e_radius: Vec3,
    max_distance: f32,
    settings: &ControllerSettings,
) -> (Vec3, Option<GroundHit>) {
    let hit = match probe_ground(colliders, position, e_radius, max_distance, settings) {
        Some(hit) if hit.walkable => hit,
        _ => return (position, None),
    };

    let drop = collide_and_slide(
        colliders,
        MoveRequest::new(position, -settings.up * max_distance, e_radius).stop_on_walkable(),
        settings,
    );
    (drop.end_pos, Some(hit))
}
