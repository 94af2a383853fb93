pub mod character;
pub mod collider;
pub mod collision;
pub mod error;
pub mod rapier;
pub mod space;

pub use character::{CharacterEntity, StepOutcome};
pub use collider::{MeshCollider, SubMesh};
pub use collision::{
    CollisionPacket, Contact, ControllerSettings, GroundHit, MoveRequest, MoveResult, Plane,
    SlideMode, Triangle, Vec3, collide_and_slide, probe_ground,
    narrow_phase::{point_in_triangle, sweep_sphere_triangle},
    query::nearest_contact,
    solver::lowest_root,
};
pub use error::CollisionError;
pub use rapier::{ColliderShapeDef, WorldStaticDef, collider_from_def, colliders_from_defs};
