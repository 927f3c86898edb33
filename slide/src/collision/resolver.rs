use super::{
    ground,
    surface::{SurfaceKind, classify, facing_scale, horizontal, project_and_scale},
    sweep::{CapsuleSweeper, ShapeSweep},
    types::{CapsuleShape, Resolution, SweepHit, Vec3},
};
use crate::config::SlideConfig;
use crate::constants::MIN_MOVE_SQ;
use rapier3d::prelude::ColliderHandle;

/// State threaded through the bounces of one resolve call.
#[derive(Clone, Copy, Debug)]
struct MotionRequest {
    /// Velocity still to be resolved at this bounce.
    velocity: Vec3,
    gravity_pass: bool,
    depth: u32,
    /// Velocity that started the step; unchanged across bounces.
    initial_velocity: Vec3,
}

impl MotionRequest {
    fn new(velocity: Vec3, gravity_pass: bool) -> Self {
        Self {
            velocity,
            gravity_pass,
            depth: 0,
            initial_velocity: velocity,
        }
    }

    fn bounce(self, remaining: Vec3) -> Self {
        Self {
            velocity: remaining,
            depth: self.depth + 1,
            ..self
        }
    }
}

/// Collide-and-slide resolver for one capsule body.
///
/// Given a desired velocity for a step, repeatedly sweeps the capsule along the velocity that
/// is left, advances up to the nearest surface (minus skin), and redistributes the leftover
/// along that surface:
/// - walkable surfaces: slide along the slope keeping speed; a gravity pass lands and stops.
/// - walls and steep slopes: slide along the surface, attenuated by how squarely the step's
///   initial motion faced it.
///
/// At most `max_bounces` sweeps are issued; whatever is left after that is dropped. The
/// resolver never moves the body, it returns the displacement to apply.
pub struct CollideAndSlide<'a, Q: ShapeSweep + ?Sized> {
    sweeper: CapsuleSweeper<'a, Q>,
    config: SlideConfig,
}

impl<'a, Q: ShapeSweep + ?Sized> CollideAndSlide<'a, Q> {
    pub fn new(query: &'a Q, shape: CapsuleShape, config: &SlideConfig) -> Self {
        Self {
            sweeper: CapsuleSweeper::new(query, shape, config.skin_width, config.filter()),
            config: *config,
        }
    }

    /// Skip the body's own collider in every sweep.
    pub fn excluding(self, handle: ColliderHandle) -> Self {
        let filter = self.sweeper.filter().excluding(handle);
        Self {
            sweeper: self.sweeper.with_filter(filter),
            config: self.config,
        }
    }

    /// Displacement for moving a body at `position` by `velocity` this step.
    pub fn resolve(&self, position: Vec3, velocity: Vec3, gravity_pass: bool) -> Vec3 {
        self.resolve_detailed(position, velocity, gravity_pass)
            .displacement
    }

    /// Like [`resolve`](Self::resolve), also reporting bounce count and truncation.
    pub fn resolve_detailed(&self, position: Vec3, velocity: Vec3, gravity_pass: bool) -> Resolution {
        let skin = self.config.skin_width;
        let max_climb = self.config.max_climb_angle_deg;

        let mut out = Resolution {
            displacement: Vec3::zeros(),
            bounces: 0,
            truncated: false,
            last_hit: None,
        };

        let mut pos = position;
        let mut request = MotionRequest::new(velocity, gravity_pass);
        // Grounded state at the start of the step, checked lazily.
        let mut grounded: Option<bool> = None;

        while request.depth < self.config.max_bounces {
            if request.velocity.norm_squared() <= MIN_MOVE_SQ {
                return out;
            }

            out.bounces += 1;
            let Some(hit) = self.sweeper.sweep(pos, request.velocity) else {
                // Clear path for everything that is left.
                out.displacement += request.velocity;
                return out;
            };
            out.last_hit = Some(hit);

            let mut snap = request.velocity.normalize() * (hit.distance - skin);
            if snap.norm() <= skin {
                // Already touching; do not push further into the surface.
                snap = Vec3::zeros();
            }
            let mut remaining = request.velocity - snap;

            match classify(&hit.normal, max_climb) {
                SurfaceKind::Walkable => {
                    if request.gravity_pass {
                        log::trace!(
                            "bounce {}: landed on walkable surface after {:.4}",
                            request.depth,
                            snap.norm()
                        );
                        out.displacement += snap;
                        return out;
                    }
                    remaining = project_and_scale(remaining, hit.normal);
                }
                SurfaceKind::Steep => {
                    let scale = facing_scale(&hit.normal, &request.initial_velocity);
                    let walking = !request.gravity_pass
                        && *grounded.get_or_insert_with(|| self.is_grounded(position));

                    remaining = if walking {
                        project_and_scale(horizontal(remaining), horizontal(hit.normal)) * scale
                    } else {
                        project_and_scale(remaining, hit.normal) * scale
                    };
                }
            }

            log_bounce(&request, &hit, &snap, &remaining);

            out.displacement += snap;
            pos += snap;
            request = request.bounce(remaining);
        }

        out.truncated = request.velocity.norm_squared() > MIN_MOVE_SQ;
        if out.truncated {
            log::debug!(
                "Bounce limit {} reached, dropping {:.4} of leftover motion",
                self.config.max_bounces,
                request.velocity.norm()
            );
        }
        out
    }

    /// True if the body at `position` stands on a walkable surface.
    pub fn is_grounded(&self, position: Vec3) -> bool {
        ground::is_grounded(
            &self.sweeper,
            position,
            self.config.grounded_probe_distance,
            self.config.max_climb_angle_deg,
        )
    }

    /// The surface under the body at `position`, walkable or not.
    pub fn ground_hit(&self, position: Vec3) -> Option<SweepHit> {
        ground::ground_hit(&self.sweeper, position, self.config.grounded_probe_distance)
    }
}

fn log_bounce(request: &MotionRequest, hit: &SweepHit, snap: &Vec3, remaining: &Vec3) {
    log::trace!(
        "bounce {} (gravity: {}): hit at {:.4} normal [{:.3}, {:.3}, {:.3}], snap {:.4}, remaining {:.4}",
        request.depth,
        request.gravity_pass,
        hit.distance,
        hit.normal.x,
        hit.normal.y,
        hit.normal.z,
        snap.norm(),
        remaining.norm()
    );
}
