//! Surface classification and the vector helpers the resolver redistributes velocity with.

use super::types::Vec3;
use crate::constants::{ANGLE_EPS_DEG, NORMALIZE_EPS, world_up};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Shallow enough to stand and walk on.
    Walkable,
    /// Wall or steep slope.
    Steep,
}

/// Angle between world up and `normal`, in degrees.
#[inline]
pub fn slope_angle_deg(normal: &Vec3) -> f32 {
    world_up().angle(normal).to_degrees()
}

/// Classify a surface by its normal. The boundary angle itself is walkable.
pub fn classify(normal: &Vec3, max_climb_angle_deg: f32) -> SurfaceKind {
    if slope_angle_deg(normal) <= max_climb_angle_deg + ANGLE_EPS_DEG {
        SurfaceKind::Walkable
    } else {
        SurfaceKind::Steep
    }
}

#[inline]
pub fn is_walkable(normal: &Vec3, max_climb_angle_deg: f32) -> bool {
    classify(normal, max_climb_angle_deg) == SurfaceKind::Walkable
}

/// Drop the vertical component.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Unit vector along `v`, or zero when `v` is too short to have a direction.
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    v.try_normalize(NORMALIZE_EPS).unwrap_or_else(Vec3::zeros)
}

/// Project `v` onto the plane through the origin with normal `plane_normal`.
///
/// `plane_normal` need not be unit length. A degenerate normal leaves `v` unchanged.
pub fn project_on_plane(v: Vec3, plane_normal: Vec3) -> Vec3 {
    let sq = plane_normal.norm_squared();
    if sq < NORMALIZE_EPS * NORMALIZE_EPS {
        return v;
    }
    v - plane_normal * (v.dot(&plane_normal) / sq)
}

/// Project `v` onto the plane, then restore its original length.
///
/// Changes direction only, so speed is kept when sliding along a surface. If the
/// projection vanishes (motion straight into the plane) the result is zero.
pub fn project_and_scale(v: Vec3, plane_normal: Vec3) -> Vec3 {
    let magnitude = v.norm();
    normalize_or_zero(project_on_plane(v, plane_normal)) * magnitude
}

/// Attenuation for sliding along a steep surface, in `[0, 2]`.
///
/// Compares the horizontal surface normal with the horizontal direction of the motion
/// that started the step: a head-on hit gives 0, a grazing hit gives about 1. Either
/// vector lacking a horizontal direction gives 1.
pub fn facing_scale(normal: &Vec3, initial_velocity: &Vec3) -> f32 {
    let n = normalize_or_zero(horizontal(*normal));
    let v = normalize_or_zero(horizontal(*initial_velocity));
    1.0 - n.dot(&-v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tilted(angle_deg: f32) -> Vec3 {
        // Normal tilted away from +Y toward -X.
        let a = angle_deg.to_radians();
        Vec3::new(-a.sin(), a.cos(), 0.0)
    }

    #[test]
    fn flat_ground_has_zero_slope() {
        assert!(slope_angle_deg(&Vec3::y()).abs() < 1.0e-4);
        assert_eq!(classify(&Vec3::y(), 0.0), SurfaceKind::Walkable);
    }

    #[test]
    fn climb_angle_boundary_is_inclusive() {
        assert_eq!(classify(&tilted(45.0), 45.0), SurfaceKind::Walkable);
        assert_eq!(classify(&tilted(46.0), 45.0), SurfaceKind::Steep);
        assert_eq!(classify(&tilted(60.0), 60.0), SurfaceKind::Walkable);
        assert_eq!(classify(&tilted(61.0), 60.0), SurfaceKind::Steep);
    }

    #[test]
    fn vertical_wall_is_steep_under_default_angle() {
        assert!(!is_walkable(&Vec3::new(1.0, 0.0, 0.0), 60.0));
        assert!(is_walkable(&Vec3::new(1.0, 0.0, 0.0), 90.0));
    }

    #[test]
    fn project_and_scale_keeps_magnitude() {
        let v = Vec3::new(3.0, -4.0, 0.0);
        let out = project_and_scale(v, tilted(30.0));

        assert!((out.norm() - 5.0).abs() < 1.0e-5);
        assert!(out.dot(&tilted(30.0)).abs() < 1.0e-5);
    }

    #[test]
    fn project_and_scale_into_plane_vanishes() {
        let out = project_and_scale(Vec3::new(0.0, -2.0, 0.0), Vec3::y());
        assert_eq!(out, Vec3::zeros());
    }

    #[test]
    fn project_on_degenerate_plane_is_identity() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(project_on_plane(v, Vec3::zeros()), v);
    }

    #[test]
    fn facing_scale_head_on_grazing_and_vertical() {
        let wall = Vec3::new(-1.0, 0.0, 0.0);

        let head_on = facing_scale(&wall, &Vec3::new(4.0, 0.0, 0.0));
        assert!(head_on.abs() < 1.0e-6);

        let grazing = facing_scale(&wall, &Vec3::new(0.01, 0.0, 4.0));
        assert!(grazing > 0.99 && grazing <= 1.0);

        // Pure vertical motion has no horizontal direction to compare.
        let falling = facing_scale(&wall, &Vec3::new(0.0, -9.0, 0.0));
        assert!((falling - 1.0).abs() < 1.0e-6);
    }
}
