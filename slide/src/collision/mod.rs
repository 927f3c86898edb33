/*!
Collision root module.

Implements capsule collide-and-slide on top of rapier colliders and parry shape casts.
The code is split for clarity:

- types:    shared data types (CapsuleShape, SweepFilter, SweepHit, Resolution)
- world:    rapier-backed static world and the shape-sweep query over it
- sweep:    the query-service trait and the skin-shrunk capsule cast
- surface:  walkable/steep classification and plane projection helpers
- resolver: the bounded collide-and-slide loop
- ground:   downward ground sweep and grounded check
*/

pub mod ground;
pub mod resolver;
pub mod surface;
pub mod sweep;
pub mod types;
pub mod world;

// Re-export commonly used types and functions.
pub use ground::{ground_hit, is_grounded};
pub use resolver::CollideAndSlide;
pub use surface::{SurfaceKind, classify, slope_angle_deg};
pub use sweep::{CapsuleSweeper, ShapeSweep};
pub use types::{
    CapsuleShape, Iso, Quat, Resolution, SweepFilter, SweepHit, TriggerInteraction, Vec3,
};
pub use world::{ColliderShapeDef, CollisionWorld, WorldStaticDef};
