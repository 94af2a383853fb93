//! Static world shapes turned into triangle colliders.
//!
//! Level data describes immutable world geometry with [`WorldStaticDef`] rows.
//! This module tessellates each row with parry (re-exported by Rapier) and
//! bakes its pose into a [`MeshCollider`] snapshot.
//!
//! Conventions
//! - Units are meters.
//! - Rotation is a unit quaternion.
//! - For planes, the normal is pose-derived: `normal = rotation * +Y`.
//! - Every tessellated triangle faces away from the shape's center, so the
//!   front face is the outside.

use std::sync::Arc;

use nalgebra as na;
use rapier3d::{
    na as rna,
    parry::shape::{Ball, Capsule, Cone, Cuboid, Cylinder, TriMesh},
};

use crate::{
    collider::MeshCollider,
    collision::{Iso, Quat, Vec3},
    error::CollisionError,
};

/// Canonical, schema-agnostic definition of an immutable world collider.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic build order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vec3,
    /// World-space rotation (unit quaternion).
    pub rotation: Quat,
    /// Collider shape parameters.
    pub shape: ColliderShapeDef,
}

impl WorldStaticDef {
    #[inline]
    pub fn pose(&self) -> Iso {
        Iso::from_parts(na::Translation3::from(self.translation), self.rotation)
    }
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Square patch of a plane, facing local +Y.
    ///
    /// Collision needs finite triangles, so unlike a half-space the patch has
    /// a size.
    Plane {
        half_size: f32,
        /// Offset along the plane normal (meters).
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },

    /// Y-aligned cone (meters).
    ConeY { radius: f32, half_height: f32 },

    /// Arbitrary triangle mesh in local space, used as-is.
    TriMesh {
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
    },
}

/// Build a triangle collider from a `WorldStaticDef`, with its pose baked in.
///
/// `subdivisions` controls the tessellation of round shapes.
pub fn collider_from_def(
    def: &WorldStaticDef,
    subdivisions: u32,
) -> Result<MeshCollider, CollisionError> {
    let n = subdivisions.max(3);

    let (vertices, triangles, convex) = match &def.shape {
        ColliderShapeDef::Plane {
            half_size,
            offset_along_normal,
        } => {
            let (h, y) = (*half_size, *offset_along_normal);
            let vertices = vec![
                Vec3::new(-h, y, -h),
                Vec3::new(-h, y, h),
                Vec3::new(h, y, h),
                Vec3::new(h, y, -h),
            ];
            (vertices, vec![[0, 1, 2], [0, 2, 3]], false)
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            let (points, indices) = Cuboid::new(to_parry(half_extents)).to_trimesh();
            (from_parry(&points), indices, true)
        }

        ColliderShapeDef::Sphere { radius } => {
            let (points, indices) = Ball::new(*radius).to_trimesh(n, n / 2);
            (from_parry(&points), indices, true)
        }

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => {
            let (points, indices) = Capsule::new_y(*half_height, *radius).to_trimesh(n, n / 2);
            (from_parry(&points), indices, true)
        }

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => {
            let (points, indices) = Cylinder::new(*half_height, *radius).to_trimesh(n);
            (from_parry(&points), indices, true)
        }

        ColliderShapeDef::ConeY {
            radius,
            half_height,
        } => {
            let (points, indices) = Cone::new(*half_height, *radius).to_trimesh(n);
            (from_parry(&points), indices, true)
        }

        ColliderShapeDef::TriMesh { vertices, indices } => {
            (vertices.clone(), indices.clone(), false)
        }
    };

    let triangles = if convex {
        orient_outward(&vertices, triangles)
    } else {
        triangles
    };

    Ok(MeshCollider::from_parts(vertices, triangles)?.transformed(&def.pose()))
}

/// Build colliders for a whole static world.
///
/// The input is sorted by `id` first so the same rows always produce the same
/// collider order.
pub fn colliders_from_defs(
    mut defs: Vec<WorldStaticDef>,
    subdivisions: u32,
) -> Result<Vec<Arc<MeshCollider>>, CollisionError> {
    defs.sort_by_key(|d| d.id);
    defs.iter()
        .map(|def| collider_from_def(def, subdivisions).map(Arc::new))
        .collect()
}

/// Snapshot a parry triangle mesh.
pub fn collider_from_trimesh(trimesh: &TriMesh) -> Result<MeshCollider, CollisionError> {
    MeshCollider::from_parts(from_parry(trimesh.vertices()), trimesh.indices().to_vec())
}

#[inline]
fn to_parry(v: &Vec3) -> rna::Vector3<f32> {
    rna::Vector3::new(v.x, v.y, v.z)
}

#[inline]
fn from_parry(points: &[rna::Point3<f32>]) -> Vec<Vec3> {
    points.iter().map(|p| Vec3::new(p.x, p.y, p.z)).collect()
}

/// Flip triangles of a convex, origin-centered shape so they face away from
/// the origin.
fn orient_outward(vertices: &[Vec3], triangles: Vec<[u32; 3]>) -> Vec<[u32; 3]> {
    triangles
        .into_iter()
        .map(|[a, b, c]| {
            let (pa, pb, pc) = (
                vertices[a as usize],
                vertices[b as usize],
                vertices[c as usize],
            );
            let normal = (pb - pa).cross(&(pc - pa));
            let centroid = (pa + pb + pc) / 3.0;
            if normal.dot(&centroid) < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect()
}
