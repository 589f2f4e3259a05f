use bevy::prelude::*;

use crate::config::DiscoveryConfig;
use crate::error::OverrideError;
use crate::scene::{describe, entity_name, has_component_named};

pub const FALLBACK_CAMERA_NAME: &str = "ThirdPersonOverrideCamera";

/// Marks cameras spawned by the plugin. They never count as the host's primary camera.
#[derive(Component, Default)]
pub struct OverrideCamera;

/// Every camera in the world, active or not, in entity order.
pub fn all_cameras(world: &World) -> Vec<Entity> {
    let Some(mut query) = world.try_query::<(Entity, &Camera)>() else {
        return Vec::new();
    };
    let mut cameras: Vec<Entity> = query.iter(world).map(|(entity, _)| entity).collect();
    cameras.sort();
    cameras
}

fn is_active(world: &World, entity: Entity) -> bool {
    world.get::<Camera>(entity).is_some_and(|camera| camera.is_active)
}

fn is_tagged_main(world: &World, entity: Entity, config: &DiscoveryConfig) -> bool {
    entity_name(world, entity) == Some(config.main_camera_tag)
        || has_component_named(world, entity, &[config.main_camera_tag])
}

/// The camera the host renders its own view with.
///
/// An explicitly tagged camera wins; otherwise the base layer: the active camera with the
/// lowest order, 3d cameras first.
pub fn primary_camera(world: &World, config: &DiscoveryConfig) -> Option<Entity> {
    let candidates: Vec<Entity> = all_cameras(world)
        .into_iter()
        .filter(|entity| is_active(world, *entity) && world.get::<OverrideCamera>(*entity).is_none())
        .collect();

    if let Some(tagged) = candidates
        .iter()
        .find(|entity| is_tagged_main(world, **entity, config))
    {
        return Some(*tagged);
    }

    candidates.into_iter().min_by_key(|entity| {
        let order = world.get::<Camera>(*entity).map_or(0, |camera| camera.order);
        (world.get::<Camera3d>(*entity).is_none(), order, *entity)
    })
}

fn matches_keyword(world: &World, entity: Entity, config: &DiscoveryConfig) -> bool {
    entity_name(world, entity).is_some_and(|name| {
        let lower = name.to_lowercase();
        config.camera_keywords.iter().any(|keyword| lower.contains(keyword))
    })
}

/// Picks a camera other than the primary to draw the override view with.
pub fn resolve(world: &World, primary: Entity, config: &DiscoveryConfig) -> Result<Entity, OverrideError> {
    let others: Vec<Entity> = all_cameras(world)
        .into_iter()
        .filter(|entity| *entity != primary)
        .collect();

    for entity in &others {
        let camera = world.get::<Camera>(*entity);
        debug!(
            "Found camera {} (active: {:?})",
            describe(world, *entity),
            camera.map(|camera| camera.is_active)
        );
    }

    if let Some(matched) = others
        .iter()
        .find(|entity| matches_keyword(world, **entity, config))
    {
        info!("Found override camera by name: {}", describe(world, *matched));
        return Ok(*matched);
    }

    match others.first() {
        Some(first) => {
            info!("Using first non-primary camera: {}", describe(world, *first));
            Ok(*first)
        }
        None => Err(OverrideError::CameraNotFound),
    }
}

/// Spawns a dedicated, initially inactive camera that renders like the primary.
pub fn create_fallback(world: &mut World, primary: Entity) -> Entity {
    let (clear_color, order) = world
        .get::<Camera>(primary)
        .map(|camera| (camera.clear_color.clone(), camera.order))
        .unwrap_or((ClearColorConfig::Default, 0));

    let projection = match world.get::<Projection>(primary) {
        Some(Projection::Perspective(perspective)) => Projection::Perspective(PerspectiveProjection {
            fov: perspective.fov,
            near: perspective.near,
            far: perspective.far,
            ..default()
        }),
        Some(other) => other.clone(),
        None => Projection::default(),
    };

    let entity = world
        .spawn((
            Camera3d::default(),
            Camera {
                is_active: false,
                order,
                clear_color,
                ..default()
            },
            projection,
            Transform::default(),
            Name::new(FALLBACK_CAMERA_NAME),
            OverrideCamera,
        ))
        .id();
    info!("Created fallback camera {entity}");
    entity
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraSearchOutcome {
    Found(Entity),
    Cancelled,
    TimedOut,
}

/// Result of a manual camera search.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraSearchCompleted(pub CameraSearchOutcome);

/// Watches for a hidden camera that the operator reveals through the host's own UI.
///
/// Latches onto the first non-primary camera that becomes active after the search
/// started, including one that was on at the start and got switched off and on again.
/// Gives up after a fixed number of polls.
#[derive(Debug)]
pub struct CameraSearch {
    primary: Option<Entity>,
    baseline: Vec<Entity>,
    frames_left: u32,
}

impl CameraSearch {
    pub fn start(world: &World, config: &DiscoveryConfig, frame_budget: u32) -> Self {
        let primary = primary_camera(world, config);
        let baseline = all_cameras(world)
            .into_iter()
            .filter(|entity| Some(*entity) != primary && is_active(world, *entity))
            .collect();
        Self {
            primary,
            baseline,
            frames_left: frame_budget,
        }
    }

    pub fn frames_left(&self) -> u32 {
        self.frames_left
    }

    /// Call once per frame. Returns the outcome once the search is over.
    pub fn poll(&mut self, world: &World) -> Option<CameraSearchOutcome> {
        // A camera seen switched off can be revealed again.
        self.baseline.retain(|entity| is_active(world, *entity));

        let revealed = all_cameras(world).into_iter().find(|entity| {
            Some(*entity) != self.primary
                && !self.baseline.contains(entity)
                && world.get::<OverrideCamera>(*entity).is_none()
                && is_active(world, *entity)
        });
        if let Some(entity) = revealed {
            return Some(CameraSearchOutcome::Found(entity));
        }

        self.frames_left = self.frames_left.saturating_sub(1);
        (self.frames_left == 0).then_some(CameraSearchOutcome::TimedOut)
    }
}
