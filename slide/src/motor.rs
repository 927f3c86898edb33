use rapier3d::prelude::ColliderHandle;

use crate::collision::{CapsuleShape, CollideAndSlide, ShapeSweep, Vec3};
use crate::config::{ConfigError, SlideConfig};
use crate::constants::{MIN_MOVE_SQ, world_up};

/// Output of a single [`CharacterMotor::step`] tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
    /// New body position (world space).
    pub translation: Vec3,
    /// Total displacement applied this tick.
    pub displacement: Vec3,
    /// Whether the body ended the tick on walkable ground.
    pub is_grounded: bool,
    /// Sweeps issued by both passes together.
    pub bounces: u32,
    /// Either pass hit the bounce limit with motion left over.
    pub truncated: bool,
}

/// Per-body state driven through collide-and-slide once per tick.
///
/// The motor owns the body position; the resolver only ever returns displacements.
#[derive(Clone, Copy, Debug)]
pub struct CharacterMotor {
    pub position: Vec3,
    pub shape: CapsuleShape,
    /// Signed speed along world up; negative while falling.
    pub vertical_speed: f32,
    pub is_grounded: bool,
    /// The body's own collider, skipped by every sweep.
    pub body_collider: Option<ColliderHandle>,
}

impl CharacterMotor {
    pub fn new(position: Vec3, shape: CapsuleShape, config: &SlideConfig) -> Result<Self, ConfigError> {
        config.validate_shape(&shape)?;
        Ok(Self {
            position,
            shape,
            vertical_speed: 0.0,
            is_grounded: false,
            body_collider: None,
        })
    }

    pub fn with_body_collider(mut self, handle: ColliderHandle) -> Self {
        self.body_collider = Some(handle);
        self
    }

    /// Advance the body by one tick of `dt` seconds.
    ///
    /// Behavior
    /// - Moves by `move_velocity * dt` with a non-gravity pass.
    /// - Polls grounded at the new position; grounded bodies stop falling and are pulled
    ///   down onto the ground with a gravity pass of `grounded_probe_distance`.
    /// - Airborne bodies accelerate downward (clamped to terminal speed) and move with a
    ///   gravity pass, which lands on walkable ground.
    pub fn step<Q: ShapeSweep + ?Sized>(
        &mut self,
        query: &Q,
        config: &SlideConfig,
        move_velocity: Vec3,
        dt: f32,
    ) -> StepResult {
        let dt = dt.max(0.0);
        let start = self.position;

        let mut resolver = CollideAndSlide::new(query, self.shape, config);
        if let Some(handle) = self.body_collider {
            resolver = resolver.excluding(handle);
        }

        let mut bounces = 0;
        let mut truncated = false;

        // 1) Movement pass.
        let motion = move_velocity * dt;
        if motion.norm_squared() > MIN_MOVE_SQ {
            let moved = resolver.resolve_detailed(self.position, motion, false);
            self.position += moved.displacement;
            bounces += moved.bounces;
            truncated |= moved.truncated;
        }

        // 2) Grounded poll after moving.
        self.is_grounded = resolver.is_grounded(self.position);

        // 3) Grounded bodies settle flush onto the ground below them; airborne bodies fall.
        if self.is_grounded {
            self.vertical_speed = 0.0;

            let settle = -world_up() * config.grounded_probe_distance;
            let settled = resolver.resolve_detailed(self.position, settle, true);
            self.position += settled.displacement;
            bounces += settled.bounces;
            truncated |= settled.truncated;
        } else if dt > 0.0 {
            let terminal = config.terminal_fall_speed_mps.max(0.0);
            self.vertical_speed =
                (self.vertical_speed - config.gravity_mps2 * dt).clamp(-terminal, terminal);

            let fall = world_up() * (self.vertical_speed * dt);
            let fell = resolver.resolve_detailed(self.position, fall, true);
            self.position += fell.displacement;
            bounces += fell.bounces;
            truncated |= fell.truncated;

            // 4) Landing resets the fall.
            if resolver.is_grounded(self.position) {
                log::trace!("landed at y={:.4} after falling at {:.3}", self.position.y, self.vertical_speed);
                self.is_grounded = true;
                self.vertical_speed = 0.0;
            }
        }

        StepResult {
            translation: self.position,
            displacement: self.position - start,
            is_grounded: self.is_grounded,
            bounces,
            truncated,
        }
    }
}
