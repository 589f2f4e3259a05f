pub mod pointer;
pub mod shim;

pub use pointer::{LookInput, key_pressed_edge};
pub use shim::{KeyMirror, KeyStateSource, OverriddenKeys, OverrideRecord, ShimStatus};

use bevy::ecs::message::Messages;
use bevy::input::InputSystems;
use bevy::input::keyboard::{KeyboardFocusLost, KeyboardInput};
use bevy::prelude::*;

use crate::config::FirstFrameEdge;

/// Holds `key` down for the host whenever [`OverrideRecord`] says so.
pub struct InputOverridePlugin {
    pub key: KeyCode,
    pub first_edge: FirstFrameEdge,
}

impl Plugin for InputOverridePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(OverrideRecord::new(self.key, self.first_edge));
        app.init_resource::<KeyMirror>();
        app.add_systems(
            PreUpdate,
            shim::apply_key_override
                .after(InputSystems)
                .run_if(
                    resource_exists::<Messages<KeyboardInput>>
                        .and(resource_exists::<Messages<KeyboardFocusLost>>),
                ),
        );
    }

    fn finish(&self, app: &mut App) {
        shim::verify_install(app.world_mut());
    }
}
