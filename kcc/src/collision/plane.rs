use super::types::Vec3;

/// An oriented plane: every point `p` on it satisfies `normal · p + d = 0`.
///
/// The front side is the one `normal` points to. A plane built from a zero
/// normal (e.g. a degenerate triangle) keeps a zero normal and is never
/// front-facing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub origin: Vec3,
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Plane through `origin` with the given normal (normalized here).
    pub fn new(origin: Vec3, normal: Vec3) -> Self {
        let normal = normal
            .try_normalize(f32::MIN_POSITIVE)
            .unwrap_or_else(Vec3::zeros);
        Self {
            origin,
            normal,
            d: -normal.dot(&origin),
        }
    }

    /// Plane through three points; counter-clockwise winding faces the viewer.
    pub fn from_triangle(p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self::new(p1, (p2 - p1).cross(&(p3 - p1)))
    }

    /// `[nx, ny, nz, d]`.
    #[inline]
    pub fn equation(&self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }

    #[inline]
    pub fn signed_distance_to(&self, point: &Vec3) -> f32 {
        point.dot(&self.normal) + self.d
    }

    /// True when travelling along `direction` moves into the front face.
    #[inline]
    pub fn is_front_facing_to(&self, direction: &Vec3) -> bool {
        !self.is_degenerate() && self.normal.dot(direction) <= 0.0
    }

    /// Closest point on the plane to `point`.
    #[inline]
    pub fn project_point(&self, point: &Vec3) -> Vec3 {
        point - self.normal * self.signed_distance_to(point)
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::zeros()
    }
}
