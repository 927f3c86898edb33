use super::{
    surface::is_walkable,
    sweep::{CapsuleSweeper, ShapeSweep},
    types::{SweepHit, Vec3},
};
use crate::constants::world_up;

/// Nearest surface directly below `position` within `max_distance`, walkable or not.
pub fn ground_hit<Q: ShapeSweep + ?Sized>(
    sweeper: &CapsuleSweeper<'_, Q>,
    position: Vec3,
    max_distance: f32,
) -> Option<SweepHit> {
    if !(max_distance > 0.0) {
        return None;
    }
    sweeper.sweep(position, -world_up() * max_distance)
}

/// True if a walkable surface lies within `max_distance` below `position`.
pub fn is_grounded<Q: ShapeSweep + ?Sized>(
    sweeper: &CapsuleSweeper<'_, Q>,
    position: Vec3,
    max_distance: f32,
    max_climb_angle_deg: f32,
) -> bool {
    ground_hit(sweeper, position, max_distance)
        .is_some_and(|hit| is_walkable(&hit.normal, max_climb_angle_deg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::types::{CapsuleShape, Quat, SweepFilter};
    use crate::collision::world::{ColliderShapeDef, CollisionWorld, WorldStaticDef};

    const SKIN: f32 = 0.01;
    const REACH: f32 = 0.1;

    fn body() -> CapsuleShape {
        CapsuleShape::new(0.5, 2.0, Vec3::zeros())
    }

    fn plane(tilt_deg: f32) -> WorldStaticDef {
        WorldStaticDef::new(
            1,
            Vec3::zeros(),
            Quat::from_axis_angle(&Vec3::z_axis(), tilt_deg.to_radians()),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )
    }

    #[test]
    fn standing_on_flat_floor_is_grounded() {
        let world = CollisionWorld::build(vec![plane(0.0)]);
        let sweeper = CapsuleSweeper::new(&world, body(), SKIN, SweepFilter::default());

        // Cast capsule bottom rests one skin width above the floor.
        assert!(is_grounded(&sweeper, Vec3::new(0.0, 0.99, 0.0), REACH, 60.0));
    }

    #[test]
    fn floor_beyond_reach_is_airborne() {
        let world = CollisionWorld::build(vec![plane(0.0)]);
        let sweeper = CapsuleSweeper::new(&world, body(), SKIN, SweepFilter::default());

        assert!(!is_grounded(&sweeper, Vec3::new(0.0, 1.5, 0.0), REACH, 60.0));
        assert!(ground_hit(&sweeper, Vec3::new(0.0, 1.5, 0.0), REACH).is_none());
    }

    #[test]
    fn steep_surface_below_is_not_ground() {
        let world = CollisionWorld::build(vec![plane(70.0)]);
        let sweeper = CapsuleSweeper::new(&world, body(), SKIN, SweepFilter::default());

        // Place the body just above the slope, measured along world up.
        let hit = sweeper
            .sweep(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -20.0, 0.0))
            .expect("slope below");
        let resting = Vec3::new(0.0, 10.0 - hit.distance + 0.02, 0.0);

        assert!(ground_hit(&sweeper, resting, REACH).is_some());
        assert!(!is_grounded(&sweeper, resting, REACH, 60.0));
        assert!(is_grounded(&sweeper, resting, REACH, 75.0));
    }

    #[test]
    fn non_positive_reach_never_hits() {
        let world = CollisionWorld::build(vec![plane(0.0)]);
        let sweeper = CapsuleSweeper::new(&world, body(), SKIN, SweepFilter::default());
        assert!(ground_hit(&sweeper, Vec3::new(0.0, 0.99, 0.0), 0.0).is_none());
    }
}
