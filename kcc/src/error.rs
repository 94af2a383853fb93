use thiserror::Error;

/// Errors raised while building colliders or characters.
///
/// Collision queries themselves never fail: "no contact" is `None` and an
/// exhausted slide budget keeps the partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CollisionError {
    #[error("ellipsoid radius on axis {axis} must be finite and > 0, got {value}")]
    InvalidRadius { axis: usize, value: f32 },

    #[error("flattened vertex list length {len} is not a multiple of 3")]
    MalformedVertexList { len: usize },

    #[error("flat position list has {len} floats, expected a multiple of 9")]
    MalformedFloatList { len: usize },

    #[error("triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("index list length {len} is not a multiple of 3")]
    MalformedIndexList { len: usize },

    #[error("vertex {index} has a non-finite component")]
    NonFiniteVertex { index: usize },
}
