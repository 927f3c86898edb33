//! Rapier-backed collision world used as the shape-sweep query service.
//!
//! The world holds immutable static geometry plus, optionally, the moving bodies' own
//! capsule colliders (so that self-exclusion in [`SweepFilter`] has something to exclude).
//!
//! Design goals
//! - Deterministic: statics are inserted sorted by `id`, so identical inputs build identical
//!   sets and equidistant hits always resolve to the same collider.
//! - Query-only: the collision pipeline keeps the broad-phase BVH current; sweeps run through
//!   a borrowed rapier `QueryPipeline` with a `QueryFilter` built from the [`SweepFilter`].

use std::collections::HashMap;

use rapier3d::na::{Translation3, Unit};
use rapier3d::parry::query::{ShapeCastOptions, ShapeCastStatus};
use rapier3d::parry::shape::Shape;
use rapier3d::prelude::{
    BroadPhaseBvh, Collider, ColliderBuilder, ColliderHandle, ColliderSet, CollisionPipeline,
    HalfSpace, NarrowPhase, QueryFilter, QueryPipeline, RigidBodyBuilder, RigidBodySet,
    SharedShape,
};

use super::{
    sweep::ShapeSweep,
    types::{CapsuleShape, Iso, Quat, SweepFilter, SweepHit, TriggerInteraction, Vec3},
};
use crate::constants::NORMALIZE_EPS;
use crate::layers::{Layer, query_groups};

/// Definition of one immutable world collider.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion.
/// - For planes, the normal is derived from the pose as `rotation * +Y` and the plane passes
///   through `translation + normal * offset_along_normal`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
    pub layer: Layer,
    /// Trigger volumes only block sweeps whose filter asks to collide with triggers.
    pub is_trigger: bool,
}

impl WorldStaticDef {
    pub fn new(id: u32, translation: Vec3, rotation: Quat, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation,
            shape,
            layer: Layer::DEFAULT,
            is_trigger: false,
        }
    }

    pub fn on_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space), solid below its normal.
    Plane { offset_along_normal: f32 },
    /// Oriented box with the given half-extents.
    Cuboid { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Capsule aligned with the local Y axis.
    CapsuleY { radius: f32, half_height: f32 },
    /// Cylinder aligned with the local Y axis.
    CylinderY { radius: f32, half_height: f32 },
}

/// Static colliders (and registered body capsules) that sweeps are cast against.
///
/// Statics hang off fixed rigid bodies carrying their pose; body capsules are parentless
/// colliders moved directly. `NarrowPhase` and `BroadPhaseBvh` back the borrowed
/// `QueryPipeline` every sweep runs through.
pub struct CollisionWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    collision_pipeline: CollisionPipeline,
    static_ids: HashMap<ColliderHandle, u32>,
}

impl CollisionWorld {
    /// Build a world from a list of static collider definitions.
    ///
    /// The input is sorted by `id` before insertion. NaN or degenerate values should be
    /// validated by the caller.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut static_ids = HashMap::with_capacity(defs.len());

        for def in &defs {
            let iso = Iso::from_parts(Translation3::from(def.translation), def.rotation);
            let rb_handle = bodies.insert(RigidBodyBuilder::fixed().pose(iso).build());
            let handle = colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
            static_ids.insert(handle, def.id);
        }

        let mut world = Self {
            bodies,
            colliders,
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            collision_pipeline: CollisionPipeline::new(),
            static_ids,
        };
        world.refresh();

        log::debug!("Built collision world with {} statics", defs.len());
        world
    }

    /// Register a moving body's own capsule so it participates in the world.
    ///
    /// Sweeps issued on behalf of that body should exclude the returned handle.
    pub fn insert_body(&mut self, shape: &CapsuleShape, position: Vec3, layer: Layer) -> ColliderHandle {
        let collider = ColliderBuilder::capsule_y(shape.half_segment(), shape.radius)
            .translation(position + shape.center)
            .collision_groups(layer.interaction_groups())
            .build();
        let handle = self.colliders.insert(collider);
        self.refresh();
        handle
    }

    /// Move a registered body collider to follow the body position.
    pub fn set_body_position(&mut self, handle: ColliderHandle, shape: &CapsuleShape, position: Vec3) {
        let Some(collider) = self.colliders.get_mut(handle) else {
            log::warn!("No body collider for handle {:?}", handle);
            return;
        };
        collider.set_translation(position + shape.center);
        self.refresh();
    }

    /// The `id` of the static definition a collider was built from.
    pub fn static_id(&self, handle: ColliderHandle) -> Option<u32> {
        self.static_ids.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Borrowed query view over the current broad-phase BVH.
    fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Bring the broad-phase BVH up to date with inserted or moved colliders.
    fn refresh(&mut self) {
        // Collision detection only, no dynamics. No hooks or events.
        self.collision_pipeline.step(
            0.0,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &(),
            &(),
        );
    }
}

/// Rapier query filter equivalent to `filter`.
fn query_filter(filter: &SweepFilter) -> QueryFilter<'static> {
    let mut query = QueryFilter::default().groups(query_groups(filter.layer_mask));
    if filter.triggers == TriggerInteraction::Ignore {
        query = query.exclude_sensors();
    }
    if let Some(handle) = filter.exclude_collider {
        query = query.exclude_collider(handle);
    }
    query
}

impl ShapeSweep for CollisionWorld {
    fn sweep(
        &self,
        shape: &dyn Shape,
        start: &Iso,
        direction: &Unit<Vec3>,
        max_distance: f32,
        filter: &SweepFilter,
    ) -> Option<SweepHit> {
        if !(max_distance > 0.0) {
            return None;
        }

        let dir = direction.into_inner();
        let mut options = ShapeCastOptions::with_max_time_of_impact(max_distance);
        options.stop_at_penetration = true;

        let (handle, hit) = self
            .query_pipeline(query_filter(filter))
            .cast_shape(start, &dir, shape, options)?;

        // `normal1` is on the moving shape, in its local frame.
        let mut normal = -(start.rotation * hit.normal1.into_inner());

        let penetrating = hit.status == ShapeCastStatus::PenetratingOrWithinTargetDist;
        if penetrating || normal.norm_squared() < NORMALIZE_EPS * NORMALIZE_EPS {
            normal = -dir;
        } else if normal.dot(&dir) > 0.0 {
            // Surface normals must oppose the motion that reached them.
            normal = -normal;
        }

        Some(SweepHit {
            distance: hit.time_of_impact.max(0.0),
            normal: normal.normalize(),
            collider: Some(handle),
        })
    }
}

/// Build a rapier collider in the local frame of its fixed parent body.
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // Local normal is +Y; the parent pose orients it in the world.
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(Vec3::y_axis())))
                .translation(Vec3::y() * *offset_along_normal)
        }
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    };

    builder
        .sensor(def.is_trigger)
        .collision_groups(def.layer.interaction_groups())
        .build()
}
