pub mod behaviors;
pub mod state;
pub mod strategy;

pub use behaviors::{HostBehaviorAppExt, HostBehaviorRegistry, SuspendedBehavior};
pub use state::{ToggleOutcome, ViewOwnership};
pub use strategy::OwnershipSnapshot;

use bevy::prelude::*;

use crate::discovery::CameraSearchCompleted;
use crate::input::{LookInput, OverrideRecord, key_pressed_edge};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideSystems {
    /// Toggle and camera search handling, in `Update`.
    Early,
    /// Pose write, in `PostUpdate` before transform propagation.
    ///
    /// Only ordered against propagation. A host that moves its camera in `PostUpdate`
    /// (e.g. following an avian body after physics writeback) must order that system
    /// `.before(OverrideSystems::Late)`, otherwise which write wins is up to the executor.
    Late,
}

fn sync_record(world: &mut World, active: bool) {
    if let Some(mut record) = world.get_resource_mut::<OverrideRecord>()
        && record.is_forced() != active
    {
        record.set_forced(active);
    }
}

pub fn on_early_update(world: &mut World) {
    world.try_resource_scope(|world, mut ownership: Mut<ViewOwnership>| {
        let (toggle_key, search_key) = (ownership.config().toggle_key, ownership.config().search_key);

        if key_pressed_edge(world, search_key)
            && let Some(outcome) = ownership.toggle_search(world)
        {
            world.write_message(CameraSearchCompleted(outcome));
        }
        if let Some(outcome) = ownership.poll_search(world) {
            world.write_message(CameraSearchCompleted(outcome));
        }

        if key_pressed_edge(world, toggle_key) {
            let now = world.get_resource::<Time>().map_or(0.0, |time| time.elapsed_secs());
            match ownership.toggle(world, now) {
                ToggleOutcome::Rejected => debug!("Toggle ignored, still cooling down"),
                ToggleOutcome::ActivationFailed(error) => error!("Could not take over the view: {error}"),
                ToggleOutcome::Activated | ToggleOutcome::Deactivated => {}
            }
        }

        sync_record(world, ownership.is_active());
    });
}

pub fn on_late_update(world: &mut World) {
    world.try_resource_scope(|world, mut ownership: Mut<ViewOwnership>| {
        if !ownership.is_active() {
            return;
        }
        let look = LookInput::sample(world, ownership.config().free_look_button);
        if let Err(error) = ownership.drive(world, look) {
            warn!("{error}");
        }
        sync_record(world, ownership.is_active());
    });
}
