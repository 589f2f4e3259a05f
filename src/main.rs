use avian3d::prelude::*;
use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
#[cfg(not(target_arch = "wasm32"))]
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use bevy_tnua::prelude::*;
use bevy_tnua_avian3d::prelude::*;

use third_person_override::{OverrideConfig, OwnershipStrategy, ThirdPersonOverridePlugin};

mod demo_host;

use crate::demo_host::DemoHostPlugin;

fn main() {
    // `third_person_demo Reparent` picks another way of taking over the view.
    let strategy = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<OwnershipStrategy>().unwrap_or_else(|_| {
            eprintln!("Unknown strategy {arg}, using {}", OwnershipStrategy::default());
            OwnershipStrategy::default()
        }),
        None => OwnershipStrategy::default(),
    };

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Third Person Override".to_string(),
            // Bind to canvas included in `index.html`
            canvas: Some("#bevy".to_owned()),
            fit_canvas_to_parent: true,
            // Tells wasm not to override default event handling, like F5 and Ctrl+R
            prevent_default_event_handling: false,
            ..default()
        }),
        ..default()
    }));
    app.add_plugins(PhysicsPlugins::default());
    app.add_plugins(TnuaControllerPlugin::new(FixedUpdate));
    app.add_plugins(TnuaAvian3dPlugin::new(FixedUpdate));
    app.add_plugins(EguiPlugin::default());

    #[cfg(not(target_arch = "wasm32"))]
    app.add_plugins(WorldInspectorPlugin::new());

    app.add_plugins(DemoHostPlugin);
    app.add_plugins(ThirdPersonOverridePlugin::new(
        OverrideConfig::default().with_strategy(strategy),
    ));
    app.run();
}
