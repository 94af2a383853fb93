/*!
Collide-and-slide controller settings and tolerances.

These constants centralize the parameters used by the swept-ellipsoid query,
the slide loop, and ground classification. `ControllerSettings::default()`
is built from them; override per character from game data.

Notes
- Distances are in world units unless marked as ellipsoid space.
- Ellipsoid-space tolerances are relative to a unit sphere.
*/

use super::types::Vec3;

/// Minimum `dot(surface_normal, up)` for a contact to count as walkable ground.
/// 0.80 is roughly a 37° slope.
pub const DEFAULT_WALKABLE_SLOPE: f32 = 0.80;

/// Gap kept between the sphere and a contact surface (ellipsoid space).
/// The sphere never touches exactly, so the next pass does not re-detect the
/// same contact through floating-point error.
pub const VERY_CLOSE_DISTANCE: f32 = 0.001;

/// Depth limit of the recursive slide form.
pub const MAX_RECURSION_DEPTH: u32 = 5;

/// Fixed pass count of the two-plane slide form.
pub const TWO_PLANE_PASSES: u32 = 3;

/// Remaining ellipsoid-space velocity below which the slide stops.
pub const MIN_MOVE: f32 = 1.0e-6;

/// Gravity in world units per second squared.
pub const GRAVITY_MPS2: f32 = 9.81;

/// Cap on fall speed along the gravity direction (world units per second).
pub const TERMINAL_FALL_SPEED: f32 = 53.0;

/// A grounded character with a downward speed below this is considered at rest
/// and its vertical velocity is zeroed.
pub const REST_SPEED_EPSILON: f32 = 0.5;

/// How far below a character that was grounded last tick the controller looks
/// for walkable ground to stay attached to (world units). Keeps the character
/// grounded while walking down slopes and small steps.
pub const GROUND_SNAP_DISTANCE: f32 = 0.25;

/// Subdivisions used when tessellating round static shapes into triangles.
pub const DEFAULT_TESSELLATION: u32 = 16;

/// Which slide response the controller runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlideMode {
    /// Project the remaining movement onto each new sliding plane, up to
    /// `max_recursion_depth` passes.
    #[default]
    Recursive,
    /// Fixed `slide_passes` passes; the second distinct plane turns the
    /// movement along the crease of the first two planes.
    TwoPlane,
}

/// Tunables for one character's collide-and-slide step.
#[derive(Clone, Copy, Debug)]
pub struct ControllerSettings {
    pub walkable_slope: f32,
    pub very_close_distance: f32,
    pub max_recursion_depth: u32,
    pub slide_passes: u32,
    pub mode: SlideMode,
    pub min_move: f32,
    /// World up axis; also the axis gravity acts along.
    pub up: Vec3,
    /// Gravity acceleration (world units / s²), applied along `-up`.
    pub gravity: f32,
    pub terminal_speed: f32,
    pub rest_speed_epsilon: f32,
    /// Zero disables ground snapping.
    pub ground_snap_distance: f32,
    /// Subdivisions for round static shapes built from shape definitions.
    pub tessellation: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            walkable_slope: DEFAULT_WALKABLE_SLOPE,
            very_close_distance: VERY_CLOSE_DISTANCE,
            max_recursion_depth: MAX_RECURSION_DEPTH,
            slide_passes: TWO_PLANE_PASSES,
            mode: SlideMode::Recursive,
            min_move: MIN_MOVE,
            up: Vec3::y(),
            gravity: GRAVITY_MPS2,
            terminal_speed: TERMINAL_FALL_SPEED,
            rest_speed_epsilon: REST_SPEED_EPSILON,
            ground_snap_distance: GROUND_SNAP_DISTANCE,
            tessellation: DEFAULT_TESSELLATION,
        }
    }
}

impl ControllerSettings {
    #[inline]
    pub fn with_mode(mut self, mode: SlideMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub fn with_walkable_slope(mut self, walkable_slope: f32) -> Self {
        self.walkable_slope = walkable_slope;
        self
    }

    #[inline]
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    #[inline]
    pub fn with_ground_snap(mut self, distance: f32) -> Self {
        self.ground_snap_distance = distance.max(0.0);
        self
    }

    /// Set the up axis. A zero vector leaves the current axis in place.
    #[inline]
    pub fn with_up(mut self, up: Vec3) -> Self {
        if let Some(n) = up.try_normalize(f32::EPSILON) {
            self.up = n;
        }
        self
    }

    /// Number of slide passes the configured mode may run.
    #[inline]
    pub fn pass_budget(&self) -> u32 {
        match self.mode {
            SlideMode::Recursive => self.max_recursion_depth.max(1),
            SlideMode::TwoPlane => self.slide_passes.max(1),
        }
    }

    /// Gravity as a world-space acceleration vector.
    #[inline]
    pub fn gravity_vector(&self) -> Vec3 {
        -self.up * self.gravity
    }
}
