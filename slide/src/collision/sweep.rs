use nalgebra as na;
use rapier3d::parry::shape::{Capsule, Shape};

use super::types::{CapsuleShape, Iso, SweepFilter, SweepHit, Vec3};
use crate::constants::{MIN_MOVE, world_up};

/// Smallest radius the shrunk cast shape may end up with (meters).
const MIN_CAST_RADIUS: f32 = 1.0e-4;

/// A shape-sweep query service.
///
/// Given a shape, a start pose and a direction + distance, report the nearest blocking
/// surface the shape would touch, or `None` when the whole distance is clear.
/// [`CollisionWorld`](super::world::CollisionWorld) is the rapier-backed implementation.
pub trait ShapeSweep {
    fn sweep(
        &self,
        shape: &dyn Shape,
        start: &Iso,
        direction: &na::Unit<Vec3>,
        max_distance: f32,
        filter: &SweepFilter,
    ) -> Option<SweepHit>;
}

/// Casts a body's capsule through a [`ShapeSweep`] service.
///
/// The cast shape is the body capsule shrunk by `skin_width`: both end-sphere centers move
/// inward along the axis and the radius shrinks, while the cast is extended by the same
/// amount. Distances reported back are measured for the shrunk capsule.
pub struct CapsuleSweeper<'a, Q: ShapeSweep + ?Sized> {
    query: &'a Q,
    cast_shape: Capsule,
    skin_width: f32,
    filter: SweepFilter,
}

impl<'a, Q: ShapeSweep + ?Sized> CapsuleSweeper<'a, Q> {
    pub fn new(query: &'a Q, shape: CapsuleShape, skin_width: f32, filter: SweepFilter) -> Self {
        Self {
            query,
            cast_shape: shrunk_capsule(&shape, skin_width),
            skin_width,
            filter,
        }
    }

    /// Same cast shape, different filter.
    pub fn with_filter(self, filter: SweepFilter) -> Self {
        Self { filter, ..self }
    }

    #[inline]
    pub fn filter(&self) -> &SweepFilter {
        &self.filter
    }

    /// Cast the shrunk capsule from `position` along `motion`.
    ///
    /// Zero-length motion has no direction and never hits.
    pub fn sweep(&self, position: Vec3, motion: Vec3) -> Option<SweepHit> {
        let (direction, length) = na::Unit::try_new_and_get(motion, MIN_MOVE)?;
        let start = Iso::translation(position.x, position.y, position.z);
        self.query.sweep(
            &self.cast_shape,
            &start,
            &direction,
            length + self.skin_width,
            &self.filter,
        )
    }
}

/// Body capsule shrunk by `skin`, expressed relative to the body position.
fn shrunk_capsule(shape: &CapsuleShape, skin: f32) -> Capsule {
    let up = world_up();
    let half = (shape.height * 0.5 - shape.radius - skin).max(0.0);
    let radius = (shape.radius - skin).max(MIN_CAST_RADIUS);

    Capsule::new(
        na::Point3::from(shape.center - up * half),
        na::Point3::from(shape.center + up * half),
        radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every query it receives and never hits anything.
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(Iso, Vec3, f32, f32)>>,
    }

    impl ShapeSweep for Recorder {
        fn sweep(
            &self,
            shape: &dyn Shape,
            start: &Iso,
            direction: &na::Unit<Vec3>,
            max_distance: f32,
            _filter: &SweepFilter,
        ) -> Option<SweepHit> {
            let radius = shape.as_capsule().map(|c| c.radius).unwrap_or(-1.0);
            self.calls
                .borrow_mut()
                .push((*start, direction.into_inner(), max_distance, radius));
            None
        }
    }

    #[test]
    fn cast_shape_is_shrunk_by_skin() {
        let shape = CapsuleShape::new(0.5, 2.0, Vec3::new(0.0, 1.0, 0.0));
        let capsule = shrunk_capsule(&shape, 0.01);

        assert!((capsule.radius - 0.49).abs() < 1.0e-6);
        assert!((capsule.segment.a.y - (1.0 - 0.49)).abs() < 1.0e-6);
        assert!((capsule.segment.b.y - (1.0 + 0.49)).abs() < 1.0e-6);
    }

    #[test]
    fn short_capsule_cast_shape_degenerates_to_a_ball() {
        let shape = CapsuleShape::new(0.5, 1.0, Vec3::zeros());
        let capsule = shrunk_capsule(&shape, 0.01);
        assert_eq!(capsule.segment.a, capsule.segment.b);
    }

    #[test]
    fn cast_is_extended_by_skin_and_starts_at_position() {
        let recorder = Recorder::default();
        let shape = CapsuleShape::new(0.5, 2.0, Vec3::zeros());
        let sweeper = CapsuleSweeper::new(&recorder, shape, 0.01, SweepFilter::default());

        assert!(sweeper
            .sweep(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.0, -4.0))
            .is_none());

        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (start, dir, max_distance, radius) = calls[0];
        assert_eq!(start.translation.vector, Vec3::new(1.0, 2.0, 3.0));
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).norm() < 1.0e-6);
        assert!((max_distance - 4.01).abs() < 1.0e-6);
        assert!((radius - 0.49).abs() < 1.0e-6);
    }

    #[test]
    fn tiny_motion_is_still_cast() {
        let recorder = Recorder::default();
        let shape = CapsuleShape::new(0.5, 2.0, Vec3::zeros());
        let sweeper = CapsuleSweeper::new(&recorder, shape, 0.01, SweepFilter::default());

        assert!(sweeper.sweep(Vec3::zeros(), Vec3::new(0.0, 5.0e-6, 0.0)).is_none());

        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!((calls[0].1 - Vec3::y()).norm() < 1.0e-6);
    }

    #[test]
    fn zero_motion_issues_no_query() {
        let recorder = Recorder::default();
        let shape = CapsuleShape::new(0.5, 2.0, Vec3::zeros());
        let sweeper = CapsuleSweeper::new(&recorder, shape, 0.01, SweepFilter::default());

        assert!(sweeper.sweep(Vec3::zeros(), Vec3::zeros()).is_none());
        assert!(recorder.calls.borrow().is_empty());
    }
}
