use bevy::prelude::*;

use crate::config::{OVERLAY_PRIMARY_ORDER, OVERLAY_SECONDARY_ORDER, OwnershipStrategy};
use crate::ownership::behaviors::{BehaviorHook, SuspendedBehavior, restore_all, suspend_all};
use crate::scene::{ancestors, describe, parent_of, world_transform};

/// Everything needed to hand the view back to the host exactly as it was.
#[derive(Debug)]
pub enum OwnershipSnapshot {
    Overlay {
        primary: Entity,
        primary_order: isize,
        secondary: Entity,
        secondary_active: bool,
        secondary_order: isize,
        secondary_local: Transform,
    },
    Reparent {
        camera: Entity,
        parent: Option<Entity>,
        local: Transform,
    },
    ScriptSuspend {
        camera: Entity,
        local: Transform,
        suspended: Vec<SuspendedBehavior>,
    },
}

fn local_transform(world: &World, entity: Entity) -> Transform {
    world.get::<Transform>(entity).copied().unwrap_or_default()
}

fn camera_state(world: &World, entity: Entity) -> (bool, isize) {
    world
        .get::<Camera>(entity)
        .map_or((false, 0), |camera| (camera.is_active, camera.order))
}

fn set_camera_state(world: &mut World, entity: Entity, active: bool, order: isize) {
    if let Some(mut camera) = world.get_mut::<Camera>(entity) {
        if camera.is_active != active {
            camera.is_active = active;
        }
        if camera.order != order {
            camera.order = order;
        }
    }
}

impl OwnershipSnapshot {
    /// Records the host's state and takes the view away from it.
    ///
    /// `secondary` is only used by [`OwnershipStrategy::Overlay`]; the other strategies
    /// drive `primary` directly.
    pub fn take(
        world: &mut World,
        strategy: OwnershipStrategy,
        primary: Entity,
        secondary: Entity,
        hooks: &[BehaviorHook],
    ) -> Self {
        match strategy {
            OwnershipStrategy::Overlay => {
                let (_, primary_order) = camera_state(world, primary);
                let (secondary_active, secondary_order) = camera_state(world, secondary);
                let snapshot = Self::Overlay {
                    primary,
                    primary_order,
                    secondary,
                    secondary_active,
                    secondary_order,
                    secondary_local: local_transform(world, secondary),
                };
                set_camera_state(world, primary, true, OVERLAY_PRIMARY_ORDER);
                snapshot.reassert(world);
                snapshot
            }
            OwnershipStrategy::Reparent => {
                let parent = parent_of(world, primary);
                let local = local_transform(world, primary);
                let global = world_transform(world, primary).map(|global| global.compute_transform());
                if let Ok(mut camera) = world.get_entity_mut(primary) {
                    camera.remove::<ChildOf>();
                    // Keep the camera where it was until the first pose is written.
                    if let Some(global) = global {
                        camera.insert(global);
                    }
                }
                Self::Reparent {
                    camera: primary,
                    parent,
                    local,
                }
            }
            OwnershipStrategy::ScriptSuspend => {
                let local = local_transform(world, primary);
                let mut chain = vec![primary];
                chain.extend(ancestors(world, primary));
                let suspended = suspend_all(world, hooks, &chain);
                info!(
                    "Suspended {} host behaviors on {}",
                    suspended.len(),
                    describe(world, primary)
                );
                Self::ScriptSuspend {
                    camera: primary,
                    local,
                    suspended,
                }
            }
        }
    }

    pub fn strategy(&self) -> OwnershipStrategy {
        match self {
            Self::Overlay { .. } => OwnershipStrategy::Overlay,
            Self::Reparent { .. } => OwnershipStrategy::Reparent,
            Self::ScriptSuspend { .. } => OwnershipStrategy::ScriptSuspend,
        }
    }

    /// The camera whose pose the rig writes.
    pub fn driven_camera(&self) -> Entity {
        match self {
            Self::Overlay { secondary, .. } => *secondary,
            Self::Reparent { camera, .. } | Self::ScriptSuspend { camera, .. } => *camera,
        }
    }

    /// Wins back anything the host may have undone since the last frame.
    pub fn reassert(&self, world: &mut World) {
        if let Self::Overlay { secondary, .. } = self {
            set_camera_state(world, *secondary, true, OVERLAY_SECONDARY_ORDER);
        }
    }

    /// Hands the view back. Entities that no longer exist are skipped.
    pub fn restore(self, world: &mut World) {
        match self {
            Self::Overlay {
                primary,
                primary_order,
                secondary,
                secondary_active,
                secondary_order,
                secondary_local,
            } => {
                if let Some(mut camera) = world.get_mut::<Camera>(primary) {
                    camera.order = primary_order;
                }
                set_camera_state(world, secondary, secondary_active, secondary_order);
                if let Some(mut transform) = world.get_mut::<Transform>(secondary) {
                    *transform = secondary_local;
                }
            }
            Self::Reparent {
                camera,
                parent,
                local,
            } => {
                let parent = parent.filter(|parent| world.get_entity(*parent).is_ok());
                let Ok(mut entity) = world.get_entity_mut(camera) else {
                    return;
                };
                if let Some(parent) = parent {
                    entity.insert(ChildOf(parent));
                }
                entity.insert(local);
            }
            Self::ScriptSuspend {
                camera,
                local,
                suspended,
            } => {
                if let Some(mut transform) = world.get_mut::<Transform>(camera) {
                    *transform = local;
                }
                let restored = restore_all(world, suspended);
                info!("Re-enabled {restored} host behaviors");
            }
        }
    }
}
