/*!
Collision root module.

This module implements swept-ellipsoid collide-and-slide against static
triangle geometry. The ellipsoid is handled as a unit sphere in ellipsoid
space (world coordinates divided component-wise by the radii). The code is
split for clarity:

- types:        shared data types (Triangle, Contact, CollisionPacket)
- settings:     controller and tolerance constants
- plane:        oriented plane
- solver:       lowest positive root of a quadratic
- narrow_phase: point-in-triangle and swept sphere vs one triangle
- query:        nearest contact over every triangle of every collider
- kinematic:    collide-and-slide controller
- ground:       walkable-slope classification and ground probe
*/

pub mod ground;
pub mod kinematic;
pub mod narrow_phase;
pub mod plane;
pub mod query;
pub mod settings;
pub mod solver;
pub mod types;

// Re-export commonly used types and functions.
pub use ground::{GroundHit, probe_ground, snap_to_ground};
pub use kinematic::{MoveRequest, MoveResult, collide_and_slide};
pub use plane::Plane;
pub use settings::{ControllerSettings, SlideMode};
pub use types::{CollisionPacket, Contact, Iso, Quat, Triangle, Vec3};
