/*!
Core collision types and math aliases shared by the collision submodules.

This module contains no algorithms. It defines the data exchanged between:
- the collision world (rapier colliders and shape casts)
- the sweep adapter (skin-shrunk cast capsule)
- the collide-and-slide resolver
- the grounded check
*/

use nalgebra as na;
use rapier3d::prelude::{ColliderHandle, Group};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Capsule shape of a moving body, relative to the body position.
///
/// The capsule is Y-aligned. `height` is the total height including both caps,
/// so the cylinder section is `height - 2 * radius` long.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleShape {
    pub radius: f32,
    pub height: f32,
    /// Offset of the capsule center from the body position.
    pub center: Vec3,
}

impl CapsuleShape {
    #[inline]
    pub fn new(radius: f32, height: f32, center: Vec3) -> Self {
        Self {
            radius,
            height,
            center,
        }
    }

    /// Half-length of the cylinder section.
    #[inline]
    pub fn half_segment(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }
}

/// What a sweep does with trigger (sensor) colliders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerInteraction {
    /// Triggers never block motion.
    #[default]
    Ignore,
    /// Triggers block like solid geometry.
    Collide,
}

/// Filter applied to every candidate collider of a sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepFilter {
    /// Layers the sweep may hit, one bit per [`Layer`](crate::Layer).
    pub layer_mask: Group,
    pub triggers: TriggerInteraction,
    /// The body's own collider, if it is registered in the world.
    pub exclude_collider: Option<ColliderHandle>,
}

impl Default for SweepFilter {
    fn default() -> Self {
        Self::new(Group::ALL, TriggerInteraction::Ignore)
    }
}

impl SweepFilter {
    pub fn new(layer_mask: Group, triggers: TriggerInteraction) -> Self {
        Self {
            layer_mask,
            triggers,
            exclude_collider: None,
        }
    }

    pub fn excluding(mut self, handle: ColliderHandle) -> Self {
        self.exclude_collider = Some(handle);
        self
    }
}

/// Closest blocking surface reported by a sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit {
    /// Distance travelled along the cast direction before contact (meters).
    pub distance: f32,
    /// World-space unit normal of the surface that was hit, pointing out of the obstacle.
    pub normal: Vec3,
    /// Collider that was hit, when the query service knows it.
    pub collider: Option<ColliderHandle>,
}

impl SweepHit {
    #[inline]
    pub fn new(distance: f32, normal: Vec3) -> Self {
        Self {
            distance,
            normal,
            collider: None,
        }
    }
}

/// Full outcome of one resolve call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    /// Displacement the caller should apply to the body position.
    pub displacement: Vec3,
    /// Number of sweeps issued.
    pub bounces: u32,
    /// True when the bounce limit was reached and leftover velocity was dropped.
    pub truncated: bool,
    /// Last surface hit during the call, if any.
    pub last_hit: Option<SweepHit>,
}
