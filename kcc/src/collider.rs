//! Immutable triangle snapshots used as static collision geometry.
//!
//! A [`MeshCollider`] is captured once from scene geometry (flattened triangle
//! soups, indexed sub-meshes, or tessellated static shapes, see `rapier.rs`)
//! and never changes afterwards. Characters hold it through `Arc`, so the
//! render mesh it came from can be dropped or edited independently.

use nalgebra as na;

use crate::{
    collision::{Iso, Triangle, Vec3},
    error::CollisionError,
    space,
};

/// One renderable sub-mesh as the scene layer hands it over.
///
/// `indices = None` means `positions` is a triangle soup (every three
/// positions form a triangle).
#[derive(Clone, Copy, Debug)]
pub struct SubMesh<'a> {
    pub positions: &'a [[f32; 3]],
    pub indices: Option<&'a [u32]>,
}

impl<'a> SubMesh<'a> {
    #[inline]
    pub fn soup(positions: &'a [[f32; 3]]) -> Self {
        Self {
            positions,
            indices: None,
        }
    }

    #[inline]
    pub fn indexed(positions: &'a [[f32; 3]], indices: &'a [u32]) -> Self {
        Self {
            positions,
            indices: Some(indices),
        }
    }
}

/// Vertex arena plus triangle index list. Degenerate triangles are dropped at
/// build time.
#[derive(Clone, Debug, Default)]
pub struct MeshCollider {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl MeshCollider {
    /// Build from a triangle soup: `positions.len()` must be a multiple of 3.
    pub fn from_triangle_soup(positions: &[Vec3]) -> Result<Self, CollisionError> {
        if positions.len() % 3 != 0 {
            return Err(CollisionError::MalformedVertexList {
                len: positions.len(),
            });
        }
        let indices: Vec<u32> = (0..positions.len() as u32).collect();
        Self::from_indexed(positions.to_vec(), &indices)
    }

    /// Build from a flat `[x0, y0, z0, x1, ...]` list where every nine floats
    /// form one triangle.
    pub fn from_flat_positions(flat: &[f32]) -> Result<Self, CollisionError> {
        if flat.len() % 9 != 0 {
            return Err(CollisionError::MalformedFloatList { len: flat.len() });
        }
        let positions: Vec<Vec3> = flat
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();
        Self::from_triangle_soup(&positions)
    }

    /// Build from a vertex list and a flat index list (three per triangle).
    pub fn from_indexed(vertices: Vec<Vec3>, indices: &[u32]) -> Result<Self, CollisionError> {
        if indices.len() % 3 != 0 {
            return Err(CollisionError::MalformedIndexList { len: indices.len() });
        }
        let triangles: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        Self::from_parts(vertices, triangles)
    }

    /// Build from a vertex arena and index triples.
    pub fn from_parts(
        vertices: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, CollisionError> {
        if let Some(index) = vertices.iter().position(|v| !space::is_finite(v)) {
            return Err(CollisionError::NonFiniteVertex { index });
        }
        if let Some(&index) = triangles
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertices.len())
        {
            return Err(CollisionError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }

        let total = triangles.len();
        let triangles: Vec<[u32; 3]> = triangles
            .into_iter()
            .filter(|t| {
                !Triangle::new(
                    vertices[t[0] as usize],
                    vertices[t[1] as usize],
                    vertices[t[2] as usize],
                )
                .is_degenerate()
            })
            .collect();

        let dropped = total - triangles.len();
        if dropped > 0 {
            log::debug!("mesh collider dropped {dropped} of {total} degenerate triangles");
        }

        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Concatenate several sub-meshes into one snapshot.
    pub fn from_submeshes<'a>(
        submeshes: impl IntoIterator<Item = SubMesh<'a>>,
    ) -> Result<Self, CollisionError> {
        let mut vertices: Vec<Vec3> = Vec::new();
        let mut triangles: Vec<[u32; 3]> = Vec::new();

        for sub in submeshes {
            let base = vertices.len() as u32;
            vertices.extend(sub.positions.iter().map(|p| Vec3::new(p[0], p[1], p[2])));

            match sub.indices {
                Some(indices) => {
                    if indices.len() % 3 != 0 {
                        return Err(CollisionError::MalformedIndexList { len: indices.len() });
                    }
                    triangles.extend(
                        indices
                            .chunks_exact(3)
                            .map(|t| [base + t[0], base + t[1], base + t[2]]),
                    );
                }
                None => {
                    if sub.positions.len() % 3 != 0 {
                        return Err(CollisionError::MalformedVertexList {
                            len: sub.positions.len(),
                        });
                    }
                    let count = sub.positions.len() as u32;
                    triangles.extend((0..count / 3).map(|t| {
                        let i = base + t * 3;
                        [i, i + 1, i + 2]
                    }));
                }
            }
        }

        Self::from_parts(vertices, triangles)
    }

    /// Bake a rigid transform into the snapshot (model → world).
    pub fn transformed(mut self, iso: &Iso) -> Self {
        for v in &mut self.vertices {
            *v = iso.transform_point(&na::Point3::from(*v)).coords;
        }
        self
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[inline]
    pub fn triangle(&self, index: usize) -> Option<Triangle> {
        self.triangles.get(index).map(|t| self.resolve(t))
    }

    /// All triangles in model (or baked world) space.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.triangles.iter().map(|t| self.resolve(t))
    }

    #[inline]
    fn resolve(&self, t: &[u32; 3]) -> Triangle {
        Triangle::new(
            self.vertices[t[0] as usize],
            self.vertices[t[1] as usize],
            self.vertices[t[2] as usize],
        )
    }
}
