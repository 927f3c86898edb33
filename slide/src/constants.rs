/*!
Resolver defaults and tolerances.

Distances are in meters, angles in degrees, time in seconds. These are the
values a [`SlideConfig`](crate::SlideConfig) falls back to when a field is
omitted from the configuration file.
*/

use crate::collision::types::Vec3;

/// Separation kept between the swept capsule and any surface it hits (meters).
/// Too large creates visible gaps; too small lets the cast start inside geometry.
pub const DEFAULT_SKIN_WIDTH: f32 = 0.01;

/// Maximum number of sweeps (bounces) per resolve call.
pub const DEFAULT_MAX_BOUNCES: u32 = 3;

/// Steepest surface, measured from world up, that still counts as walkable (degrees).
pub const DEFAULT_MAX_CLIMB_ANGLE_DEG: f32 = 60.0;

/// Upper bound for the climb angle; anything beyond is clamped at load time.
pub const MAX_CLIMB_ANGLE_LIMIT_DEG: f32 = 180.0;

/// Length of the downward sweep used by the grounded check (meters).
pub const DEFAULT_GROUNDED_PROBE_DISTANCE: f32 = 0.1;

/// Gravity magnitude in meters per second squared (positive value).
pub const DEFAULT_GRAVITY_MPS2: f32 = 9.81;

/// Maximum downward speed reached while falling (positive magnitude, m/s).
pub const DEFAULT_TERMINAL_FALL_SPEED_MPS: f32 = 50.0;

/// Motion shorter than this has no usable direction and counts as no motion (meters).
pub const MIN_MOVE: f32 = 1.0e-10;

/// Squared [`MIN_MOVE`] (m^2).
pub const MIN_MOVE_SQ: f32 = MIN_MOVE * MIN_MOVE;

/// Slack applied to the walkable angle comparison so the boundary stays inclusive
/// after `acos` rounding (degrees).
pub const ANGLE_EPS_DEG: f32 = 1.0e-3;

/// Vectors shorter than this are considered degenerate when normalizing.
pub const NORMALIZE_EPS: f32 = 1.0e-6;

/// Highest layer index a collider can be assigned to.
pub const MAX_LAYER: u8 = 31;

/// World up direction. The controller axis is +Y.
#[inline]
pub fn world_up() -> Vec3 {
    Vec3::y()
}
