pub mod collision;
pub mod config;
pub mod constants;
pub mod layers;
pub mod motor;

pub use collision::{
    CapsuleShape, CollideAndSlide, ColliderShapeDef, CollisionWorld, Resolution, ShapeSweep,
    SurfaceKind, SweepFilter, SweepHit, TriggerInteraction, Vec3, WorldStaticDef,
};
pub use config::{ConfigError, SlideConfig, SlideConfigFile};
pub use layers::Layer;
pub use motor::{CharacterMotor, StepResult};
