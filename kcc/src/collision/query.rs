use std::sync::Arc;

use super::{
    narrow_phase,
    types::{CollisionPacket, Contact, Triangle},
};
use crate::collider::MeshCollider;

/// Nearest contact of the packet's swept sphere over every triangle of every
/// collider.
///
/// Triangles are scaled into the packet's ellipsoid space on the fly. There is
/// no broad phase: the cost is linear in the triangle count.
pub fn nearest_contact(colliders: &[Arc<MeshCollider>], packet: &CollisionPacket) -> Option<Contact> {
    nearest_contact_in(colliders.iter().flat_map(|c| c.triangles()), packet)
}

/// Same as [`nearest_contact`] over an arbitrary set of world-space triangles.
///
/// Ties keep the first contact found.
pub fn nearest_contact_in(
    triangles: impl IntoIterator<Item = Triangle>,
    packet: &CollisionPacket,
) -> Option<Contact> {
    triangles
        .into_iter()
        .map(|tri| tri.to_ellipsoid_space(&packet.e_radius))
        .filter_map(|tri| narrow_phase::sweep_sphere_triangle(packet, &tri))
        .fold(None, |best: Option<Contact>, hit| match best {
            Some(b) if b.distance <= hit.distance => Some(b),
            _ => Some(hit),
        })
}
