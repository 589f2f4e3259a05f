//! Helpers for poking at a host world whose types the plugin does not link against.

use bevy::prelude::*;

/// Hierarchies deeper than this are treated as broken (or cyclic) and ignored.
const MAX_HIERARCHY_DEPTH: usize = 64;

/// Strips module path and generic arguments: `bevy_tnua::controller::TnuaController` -> `TnuaController`.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// True if the entity carries a component whose short type name is in `names`.
pub fn has_component_named(world: &World, entity: Entity, names: &[&str]) -> bool {
    let Ok(mut infos) = world.inspect_entity(entity) else {
        return false;
    };
    infos.any(|info| {
        let full = info.name().to_string();
        names.contains(&short_type_name(&full))
    })
}

pub fn entity_name(world: &World, entity: Entity) -> Option<&str> {
    world.get::<Name>(entity).map(Name::as_str)
}

/// Name for log lines; falls back to the entity id.
pub fn describe(world: &World, entity: Entity) -> String {
    match entity_name(world, entity) {
        Some(name) => format!("{name} ({entity})"),
        None => entity.to_string(),
    }
}

pub fn parent_of(world: &World, entity: Entity) -> Option<Entity> {
    world.get::<ChildOf>(entity).map(ChildOf::parent)
}

/// Parent, grandparent, ... up to the root.
pub fn ancestors(world: &World, entity: Entity) -> Vec<Entity> {
    let mut chain = Vec::new();
    let mut current = parent_of(world, entity);
    while let Some(ancestor) = current {
        if chain.len() >= MAX_HIERARCHY_DEPTH || chain.contains(&ancestor) {
            break;
        }
        chain.push(ancestor);
        current = parent_of(world, ancestor);
    }
    chain
}

/// Children of `parent` in entity order.
pub fn children_of(world: &World, parent: Entity) -> Vec<Entity> {
    let Some(mut query) = world.try_query::<(Entity, &ChildOf)>() else {
        return Vec::new();
    };
    let mut children: Vec<Entity> = query
        .iter(world)
        .filter(|(_, child_of)| child_of.parent() == parent)
        .map(|(entity, _)| entity)
        .collect();
    children.sort();
    children
}

/// Every entity carrying a `Name`, in entity order.
pub fn named_entities(world: &World) -> Vec<(Entity, String)> {
    let Some(mut query) = world.try_query::<(Entity, &Name)>() else {
        return Vec::new();
    };
    let mut named: Vec<(Entity, String)> = query
        .iter(world)
        .map(|(entity, name)| (entity, name.as_str().to_owned()))
        .collect();
    named.sort_by_key(|(entity, _)| *entity);
    named
}

/// Every entity with a `Transform`, in entity order.
pub fn spatial_entities(world: &World) -> Vec<Entity> {
    let Some(mut query) = world.try_query::<(Entity, &Transform)>() else {
        return Vec::new();
    };
    let mut entities: Vec<Entity> = query.iter(world).map(|(entity, _)| entity).collect();
    entities.sort();
    entities
}

/// World transform composed from the local transforms along the `ChildOf` chain.
///
/// Unlike `GlobalTransform` this is current even before transform propagation has run
/// this frame. Returns `None` if the entity or any ancestor lacks a `Transform`.
pub fn world_transform(world: &World, entity: Entity) -> Option<GlobalTransform> {
    let mut locals = vec![*world.get_entity(entity).ok()?.get::<Transform>()?];
    for ancestor in ancestors(world, entity) {
        locals.push(*world.get::<Transform>(ancestor)?);
    }
    Some(
        locals
            .iter()
            .rev()
            .fold(GlobalTransform::IDENTITY, |acc, local| acc.mul_transform(*local)),
    )
}

pub fn world_position(world: &World, entity: Entity) -> Option<Vec3> {
    world_transform(world, entity).map(|transform| transform.translation())
}

/// Compass heading in degrees: 0 faces -Z, positive turns clockwise seen from above.
pub fn heading_degrees(rotation: Quat) -> f32 {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    -yaw.to_degrees()
}

/// Writes a world-space pose into the entity's local `Transform`, honouring its parent.
pub fn write_world_pose(world: &mut World, entity: Entity, translation: Vec3, rotation: Quat) -> bool {
    let desired = Transform::from_translation(translation).with_rotation(rotation);
    let local = match parent_of(world, entity) {
        Some(parent) => match world_transform(world, parent) {
            Some(parent_global) => GlobalTransform::from(desired).reparented_to(&parent_global),
            None => desired,
        },
        None => desired,
    };
    let Some(mut transform) = world.get_mut::<Transform>(entity) else {
        return false;
    };
    transform.translation = local.translation;
    transform.rotation = local.rotation;
    true
}
