use bevy::prelude::*;
use strum_macros::Display;

use crate::config::DiscoveryConfig;
use crate::discovery::camera::primary_camera;
use crate::error::OverrideError;
use crate::scene::{self, describe, has_component_named, world_position};

/// Which heuristic found the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum LocateStrategy {
    CameraHierarchy,
    RoleTag,
    LocomotionScan,
    ConventionalName,
    Proximity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Located {
    pub entity: Entity,
    pub strategy: LocateStrategy,
}

/// A candidate only counts if it sits somewhere other than the origin; template and
/// placeholder instances share the same components but never get moved.
fn is_placed(world: &World, entity: Entity) -> bool {
    world_position(world, entity).is_some_and(|position| position != Vec3::ZERO)
}

fn has_locomotion(world: &World, entity: Entity, config: &DiscoveryConfig) -> bool {
    has_component_named(world, entity, config.locomotion_components) && is_placed(world, entity)
}

/// Finds the player-controlled entity. Tries each heuristic in priority order.
pub fn locate(world: &World, config: &DiscoveryConfig) -> Result<Located, OverrideError> {
    let primary = primary_camera(world, config);

    let found = primary
        .and_then(|camera| from_camera_hierarchy(world, camera, config))
        .map(|entity| (entity, LocateStrategy::CameraHierarchy))
        .or_else(|| by_role_tag(world, config).map(|e| (e, LocateStrategy::RoleTag)))
        .or_else(|| by_locomotion(world, config).map(|e| (e, LocateStrategy::LocomotionScan)))
        .or_else(|| by_name(world, config).map(|e| (e, LocateStrategy::ConventionalName)))
        .or_else(|| {
            primary
                .and_then(|camera| near_camera(world, camera, config))
                .map(|e| (e, LocateStrategy::Proximity))
        });

    match found {
        Some((entity, strategy)) => {
            info!(
                "Found player {} via {strategy} at {:?}",
                describe(world, entity),
                world_position(world, entity)
            );
            Ok(Located { entity, strategy })
        }
        None => {
            log_near_misses(world, primary, config);
            Err(OverrideError::TargetNotFound)
        }
    }
}

/// The primary camera usually hangs below the player, possibly inside a container that
/// sits next to the player body.
fn from_camera_hierarchy(world: &World, camera: Entity, config: &DiscoveryConfig) -> Option<Entity> {
    let parent = scene::parent_of(world, camera)?;
    if has_locomotion(world, parent, config) {
        return Some(parent);
    }

    let grandparent = scene::parent_of(world, parent)?;
    if has_locomotion(world, grandparent, config) {
        return Some(grandparent);
    }

    scene::children_of(world, grandparent)
        .into_iter()
        .filter(|sibling| *sibling != parent)
        .find(|sibling| has_locomotion(world, *sibling, config))
}

fn by_role_tag(world: &World, config: &DiscoveryConfig) -> Option<Entity> {
    scene::spatial_entities(world).into_iter().find(|entity| {
        has_component_named(world, *entity, &[config.role_tag]) && is_placed(world, *entity)
    })
}

fn by_locomotion(world: &World, config: &DiscoveryConfig) -> Option<Entity> {
    scene::spatial_entities(world)
        .into_iter()
        .find(|entity| has_locomotion(world, *entity, config))
}

fn by_name(world: &World, config: &DiscoveryConfig) -> Option<Entity> {
    let named = scene::named_entities(world);
    config.player_names.iter().find_map(|wanted| {
        named
            .iter()
            .find(|(entity, name)| name == wanted && is_placed(world, *entity))
            .map(|(entity, _)| *entity)
    })
}

fn matches_player_pattern(name: &str, config: &DiscoveryConfig) -> bool {
    let lower = name.to_lowercase();
    config.name_patterns.iter().any(|pattern| lower.contains(pattern))
}

fn near_camera(world: &World, camera: Entity, config: &DiscoveryConfig) -> Option<Entity> {
    let camera_position = world_position(world, camera)?;
    scene::named_entities(world)
        .into_iter()
        .filter(|(entity, name)| *entity != camera && matches_player_pattern(name, config))
        .map(|(entity, _)| entity)
        .find(|entity| {
            world_position(world, *entity).is_some_and(|position| {
                position != Vec3::ZERO
                    && position.distance(camera_position) < config.proximity_radius
            })
        })
}

fn log_near_misses(world: &World, primary: Option<Entity>, config: &DiscoveryConfig) {
    warn!("Could not find a valid player entity");

    if let Some(camera) = primary {
        debug!("Primary camera hierarchy:");
        for (depth, entity) in std::iter::once(camera)
            .chain(scene::ancestors(world, camera))
            .enumerate()
        {
            let marker = if has_component_named(world, entity, config.locomotion_components) {
                " [locomotion]"
            } else {
                ""
            };
            debug!(
                "{:indent$}- {} at {:?}{marker}",
                "",
                describe(world, entity),
                world_position(world, entity),
                indent = depth * 2
            );
        }
    }

    let candidates: Vec<(Entity, String)> = scene::named_entities(world)
        .into_iter()
        .filter(|(_, name)| {
            let lower = name.to_lowercase();
            ["player", "character", "controller", "fps"]
                .iter()
                .any(|pattern| lower.contains(pattern))
        })
        .collect();

    if candidates.is_empty() {
        debug!("No potential player entities in the scene");
        return;
    }

    debug!("Potential player entities:");
    for (entity, name) in candidates {
        let position = world_position(world, entity);
        if position == Some(Vec3::ZERO) {
            debug!("  - {name} at origin (skipped)");
        } else {
            debug!("  - {name} at {position:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Component)]
    struct CharacterController;

    #[derive(Component)]
    struct Player;

    fn main_camera(world: &mut World, transform: Transform) -> Entity {
        world
            .spawn((Camera::default(), transform, Name::new("MainCamera")))
            .id()
    }

    fn config() -> DiscoveryConfig {
        DiscoveryConfig::default()
    }

    #[test]
    fn prefers_camera_grandparent_with_locomotion() {
        let mut world = World::new();
        // A scan-order earlier decoy that the hierarchy strategy must win against.
        world.spawn((CharacterController, Transform::from_xyz(50.0, 0.0, 0.0)));
        let player = world
            .spawn((CharacterController, Transform::from_xyz(3.0, 0.0, 4.0)))
            .id();
        let container = world
            .spawn((Transform::from_xyz(0.0, 1.6, 0.0), ChildOf(player)))
            .id();
        let camera = main_camera(&mut world, Transform::default());
        world.entity_mut(camera).insert(ChildOf(container));

        let located = locate(&world, &config()).unwrap();
        assert_eq!(located.entity, player);
        assert_eq!(located.strategy, LocateStrategy::CameraHierarchy);
    }

    #[test]
    fn finds_body_next_to_camera_container() {
        let mut world = World::new();
        let rig = world.spawn(Transform::from_xyz(1.0, 0.0, 1.0)).id();
        let container = world.spawn((Transform::default(), ChildOf(rig))).id();
        let body = world
            .spawn((CharacterController, Transform::default(), ChildOf(rig)))
            .id();
        let camera = main_camera(&mut world, Transform::default());
        world.entity_mut(camera).insert(ChildOf(container));

        let located = locate(&world, &config()).unwrap();
        assert_eq!(located.entity, body);
        assert_eq!(located.strategy, LocateStrategy::CameraHierarchy);
    }

    #[test]
    fn skips_candidates_at_origin() {
        let mut world = World::new();
        world.spawn((CharacterController, Transform::default()));
        let real = world
            .spawn((CharacterController, Transform::from_xyz(0.0, 0.9, 0.0)))
            .id();

        let located = locate(&world, &config()).unwrap();
        assert_eq!(located.entity, real);
        assert_eq!(located.strategy, LocateStrategy::LocomotionScan);
    }

    #[test]
    fn role_tag_beats_locomotion_scan() {
        let mut world = World::new();
        world.spawn((CharacterController, Transform::from_xyz(9.0, 0.0, 0.0)));
        let tagged = world.spawn((Player, Transform::from_xyz(2.0, 0.0, 0.0))).id();

        let located = locate(&world, &config()).unwrap();
        assert_eq!(located.entity, tagged);
        assert_eq!(located.strategy, LocateStrategy::RoleTag);
    }

    #[test]
    fn conventional_names_follow_list_order() {
        let mut world = World::new();
        world.spawn((Name::new("MainPlayer"), Transform::from_xyz(1.0, 0.0, 0.0)));
        let local = world
            .spawn((Name::new("LocalPlayer"), Transform::from_xyz(2.0, 0.0, 0.0)))
            .id();

        let located = locate(&world, &config()).unwrap();
        assert_eq!(located.entity, local);
        assert_eq!(located.strategy, LocateStrategy::ConventionalName);
    }

    #[test]
    fn proximity_needs_pattern_and_radius() {
        let mut world = World::new();
        main_camera(&mut world, Transform::from_xyz(0.0, 1.0, 0.0));
        world.spawn((Name::new("player_far"), Transform::from_xyz(40.0, 0.0, 0.0)));
        world.spawn((Name::new("Crate"), Transform::from_xyz(1.0, 0.0, 0.0)));
        let close = world
            .spawn((Name::new("Character_Rig_01"), Transform::from_xyz(1.0, 0.0, 1.0)))
            .id();

        let located = locate(&world, &config()).unwrap();
        assert_eq!(located.entity, close);
        assert_eq!(located.strategy, LocateStrategy::Proximity);
    }

    #[test]
    fn reports_not_found_for_empty_scene() {
        let mut world = World::new();
        main_camera(&mut world, Transform::from_xyz(0.0, 1.0, 0.0));
        world.spawn((Name::new("Tree"), Transform::from_xyz(1.0, 0.0, 0.0)));

        assert_eq!(locate(&world, &config()), Err(OverrideError::TargetNotFound));
    }
}
