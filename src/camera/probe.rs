use avian3d::prelude::*;
use bevy::prelude::*;

/// Synchronous, bounded sweep used to keep the camera out of geometry.
pub trait CollisionProbe {
    /// Distance along `direction` at which a sphere of `radius` starting at `origin` first
    /// touches geometry, if it does so within `max_distance`.
    fn cast(&self, origin: Vec3, direction: Dir3, max_distance: f32, radius: f32) -> Option<f32>;
}

/// For hosts without a physics world.
pub struct NoCollision;

impl CollisionProbe for NoCollision {
    fn cast(&self, _: Vec3, _: Dir3, _: f32, _: f32) -> Option<f32> {
        None
    }
}

impl<F> CollisionProbe for F
where
    F: Fn(Vec3, Dir3, f32, f32) -> Option<f32>,
{
    fn cast(&self, origin: Vec3, direction: Dir3, max_distance: f32, radius: f32) -> Option<f32> {
        self(origin, direction, max_distance, radius)
    }
}

/// Sphere cast against the host's avian3d scene.
pub struct PhysicsProbe<'a> {
    pipeline: &'a SpatialQueryPipeline,
    filter: SpatialQueryFilter,
}

impl<'a> PhysicsProbe<'a> {
    /// `ignored` entities (the target and the camera itself) never block the view.
    pub fn new(pipeline: &'a SpatialQueryPipeline, ignored: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            pipeline,
            filter: SpatialQueryFilter::default().with_excluded_entities(ignored),
        }
    }
}

impl CollisionProbe for PhysicsProbe<'_> {
    fn cast(&self, origin: Vec3, direction: Dir3, max_distance: f32, radius: f32) -> Option<f32> {
        self.pipeline
            .cast_shape(
                &Collider::sphere(radius),
                origin,
                Quat::IDENTITY,
                direction,
                &ShapeCastConfig::from_max_distance(max_distance),
                &self.filter,
            )
            .map(|hit| hit.distance)
    }
}
