use bevy::prelude::*;
use bevy::transform::TransformSystems;

use crate::config::OverrideConfig;
use crate::discovery::CameraSearchCompleted;
use crate::input::InputOverridePlugin;
use crate::ownership::{self, HostBehaviorRegistry, OverrideSystems, ViewOwnership};

/// Adds a toggleable third person camera on top of a host app that knows nothing about it.
#[derive(Default)]
pub struct ThirdPersonOverridePlugin {
    pub config: OverrideConfig,
}

impl ThirdPersonOverridePlugin {
    pub fn new(config: OverrideConfig) -> Self {
        Self { config }
    }
}

impl Plugin for ThirdPersonOverridePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ViewOwnership::new(self.config.clone()));
        app.init_resource::<HostBehaviorRegistry>();
        app.add_message::<CameraSearchCompleted>();

        app.configure_sets(Update, OverrideSystems::Early);
        app.configure_sets(
            PostUpdate,
            OverrideSystems::Late.before(TransformSystems::Propagate),
        );
        app.add_systems(Update, ownership::on_early_update.in_set(OverrideSystems::Early));
        app.add_systems(PostUpdate, ownership::on_late_update.in_set(OverrideSystems::Late));

        if let Some(key) = self.config.effective_forced_key() {
            app.add_plugins(InputOverridePlugin {
                key,
                first_edge: self.config.forced_key_first_edge,
            });
        }

        info!(
            "Third person override ready: {:?} toggles, {:?} searches for a camera, strategy {}",
            self.config.toggle_key, self.config.search_key, self.config.strategy
        );
    }
}
