use std::fmt;

use bevy::prelude::*;

use crate::scene::short_type_name;

type SuspendFn = fn(&mut World, Entity) -> Option<SuspendedBehavior>;

/// A host component whose presence lets host systems steer the camera.
#[derive(Clone, Copy)]
pub struct BehaviorHook {
    name: &'static str,
    suspend: SuspendFn,
}

impl BehaviorHook {
    pub fn of<T: Component>() -> Self {
        Self {
            name: short_type_name(std::any::type_name::<T>()),
            suspend: suspend_component::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn suspend(&self, world: &mut World, entity: Entity) -> Option<SuspendedBehavior> {
        (self.suspend)(world, entity)
    }
}

/// Host behaviors the script-suspend strategy is allowed to switch off.
#[derive(Resource, Default, Clone)]
pub struct HostBehaviorRegistry {
    hooks: Vec<BehaviorHook>,
}

impl HostBehaviorRegistry {
    pub fn register<T: Component>(&mut self) {
        let hook = BehaviorHook::of::<T>();
        if !self.hooks.iter().any(|existing| existing.name == hook.name) {
            self.hooks.push(hook);
        }
    }

    pub fn hooks(&self) -> &[BehaviorHook] {
        &self.hooks
    }
}

pub trait HostBehaviorAppExt {
    /// Lets the override suspend `T` on the camera and its ancestors while it owns the view.
    fn register_host_behavior<T: Component>(&mut self) -> &mut Self;
}

impl HostBehaviorAppExt for App {
    fn register_host_behavior<T: Component>(&mut self) -> &mut Self {
        self.world_mut()
            .get_resource_or_init::<HostBehaviorRegistry>()
            .register::<T>();
        self
    }
}

/// A removed host component waiting to be put back.
pub struct SuspendedBehavior {
    entity: Entity,
    name: &'static str,
    restore: Box<dyn FnOnce(&mut World) -> bool + Send + Sync>,
}

impl SuspendedBehavior {
    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Puts the component back. False if the entity is gone.
    pub fn restore(self, world: &mut World) -> bool {
        (self.restore)(world)
    }
}

impl fmt::Debug for SuspendedBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuspendedBehavior")
            .field("entity", &self.entity)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn suspend_component<T: Component>(world: &mut World, entity: Entity) -> Option<SuspendedBehavior> {
    let value = world.get_entity_mut(entity).ok()?.take::<T>()?;
    Some(SuspendedBehavior {
        entity,
        name: short_type_name(std::any::type_name::<T>()),
        restore: Box::new(move |world: &mut World| match world.get_entity_mut(entity) {
            Ok(mut entity) => {
                entity.insert(value);
                true
            }
            Err(_) => false,
        }),
    })
}

/// Suspends every registered behavior on `entities`, in the given order.
pub fn suspend_all(world: &mut World, hooks: &[BehaviorHook], entities: &[Entity]) -> Vec<SuspendedBehavior> {
    let mut suspended = Vec::new();
    for entity in entities {
        for hook in hooks {
            if let Some(behavior) = hook.suspend(world, *entity) {
                debug!("Suspended {} on {entity}", behavior.name());
                suspended.push(behavior);
            }
        }
    }
    suspended
}

/// Re-enables behaviors in the order they were suspended. Returns how many came back.
pub fn restore_all(world: &mut World, suspended: Vec<SuspendedBehavior>) -> usize {
    let mut restored = 0;
    for behavior in suspended {
        let (entity, name) = (behavior.entity(), behavior.name());
        if behavior.restore(world) {
            debug!("Re-enabled {name} on {entity}");
            restored += 1;
        } else {
            warn!("Could not re-enable {name}: {entity} no longer exists");
        }
    }
    restored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Component, Debug, PartialEq)]
    struct MouseLook {
        yaw: f32,
    }

    #[derive(Component, Debug, PartialEq)]
    struct HeadBob(u8);

    fn registry() -> HostBehaviorRegistry {
        let mut registry = HostBehaviorRegistry::default();
        registry.register::<MouseLook>();
        registry.register::<HeadBob>();
        registry.register::<MouseLook>();
        registry
    }

    #[test]
    fn registering_twice_keeps_one_hook() {
        let registry = registry();
        let names: Vec<&str> = registry.hooks().iter().map(BehaviorHook::name).collect();
        assert_eq!(names, vec!["MouseLook", "HeadBob"]);
    }

    #[test]
    fn suspend_and_restore_round_trip_values() {
        let mut world = World::new();
        let camera = world.spawn((MouseLook { yaw: 0.25 }, HeadBob(3))).id();
        let parent = world.spawn(MouseLook { yaw: -1.0 }).id();

        let suspended = suspend_all(&mut world, registry().hooks(), &[camera, parent]);
        assert_eq!(suspended.len(), 3);
        assert!(world.get::<MouseLook>(camera).is_none());
        assert!(world.get::<HeadBob>(camera).is_none());
        assert!(world.get::<MouseLook>(parent).is_none());

        assert_eq!(restore_all(&mut world, suspended), 3);
        assert_eq!(world.get::<MouseLook>(camera), Some(&MouseLook { yaw: 0.25 }));
        assert_eq!(world.get::<HeadBob>(camera), Some(&HeadBob(3)));
        assert_eq!(world.get::<MouseLook>(parent), Some(&MouseLook { yaw: -1.0 }));
    }

    #[test]
    fn restoring_onto_despawned_entity_is_skipped() {
        let mut world = World::new();
        let camera = world.spawn(HeadBob(1)).id();

        let suspended = suspend_all(&mut world, registry().hooks(), &[camera]);
        world.despawn(camera);

        assert_eq!(restore_all(&mut world, suspended), 0);
    }
}
