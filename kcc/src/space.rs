//! Ellipsoid-space transforms and small vector helpers.
//!
//! Ellipsoid space divides world coordinates component-wise by the character's
//! radii, which turns the collision ellipsoid into a unit sphere.

use crate::collision::Vec3;

/// World → ellipsoid space.
#[inline]
pub fn to_ellipsoid(v: &Vec3, radius: &Vec3) -> Vec3 {
    v.component_div(radius)
}

/// Ellipsoid → world space.
#[inline]
pub fn to_world(v: &Vec3, radius: &Vec3) -> Vec3 {
    v.component_mul(radius)
}

/// Split `v` into the part perpendicular to `axis` and the part along it.
///
/// `axis` must be unit length. Returns `(lateral, along)` with `lateral + along == v`.
#[inline]
pub fn split_along(v: &Vec3, axis: &Vec3) -> (Vec3, Vec3) {
    let along = axis * v.dot(axis);
    (v - along, along)
}

/// `v` with its length set to `len`, or zero if `v` has no direction.
#[inline]
pub fn with_length(v: &Vec3, len: f32) -> Vec3 {
    v.try_normalize(f32::MIN_POSITIVE)
        .map(|n| n * len)
        .unwrap_or_else(Vec3::zeros)
}

/// True when every component is finite and strictly positive, as ellipsoid
/// radii must be.
#[inline]
pub fn is_valid_radius(radius: &Vec3) -> bool {
    radius.iter().all(|r| r.is_finite() && *r > 0.0)
}

/// True when every component is finite.
#[inline]
pub fn is_finite(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}
