//! A small first person game to try the override against. It knows nothing about the plugin.

use std::f32::consts::{FRAC_PI_2, PI};

use avian3d::prelude::*;
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::light::CascadeShadowConfigBuilder;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions};
use bevy_tnua::prelude::*;
use bevy_tnua_avian3d::prelude::*;

use third_person_override::HostBehaviorAppExt;

pub struct DemoHostPlugin;

#[derive(Component, Default)]
#[require(Transform, InheritedVisibility)]
pub struct PlayerRoot;

/// Host mouse look. Lives on the camera container and steers the player's facing.
#[derive(Component)]
pub struct HostLook {
    pub yaw: f32,
    pub pitch: f32,
    pub sensitivity: f32,
}

impl Default for HostLook {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: 0.003, // radians per pixel
        }
    }
}

/// Pins the first person camera to the eyes, every frame.
#[derive(Component)]
pub struct EyeMount {
    pub offset: Vec3,
}

impl Default for EyeMount {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 0.6, 0.0),
        }
    }
}

/// The host's own over-the-shoulder camera, only shown while V is held.
#[derive(Component)]
pub struct AvatarView;

impl Plugin for DemoHostPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Gravity(Vec3::NEG_Y * 9.0));
        app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.08)));
        app.register_host_behavior::<HostLook>();
        app.register_host_behavior::<EyeMount>();
        app.add_observer(on_player_spawn);
        app.add_systems(Startup, setup);
        app.add_systems(
            Update,
            (grab_cursor, host_look, apply_controls, mount_eyes, avatar_view).chain(),
        );
    }
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut ambient_light: ResMut<AmbientLight>,
) {
    ambient_light.brightness = 100.0;

    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::OVERCAST_DAY,
            shadows_enabled: true,
            ..default()
        },
        Transform {
            translation: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::from_rotation_x(-PI / 4.),
            ..default()
        },
        CascadeShadowConfigBuilder {
            first_cascade_far_bound: 4.0,
            maximum_distance: 100.0,
            ..default()
        }
        .build(),
    ));

    // base
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(24.0, 0.1, 24.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.35, 0.3),
            perceptual_roughness: 1.0,
            ..default()
        })),
        RigidBody::Static,
        Collider::cuboid(24.0, 0.1, 24.0),
        Name::new("Ground"),
    ));

    // Pillars to back the orbit camera into
    let pillar = meshes.add(Cuboid::new(0.8, 3.0, 0.8));
    let stone = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.5, 0.45),
        perceptual_roughness: 1.0,
        ..default()
    });
    for i in 0..8 {
        let angle = i as f32 * PI / 4.0;
        commands.spawn((
            Mesh3d(pillar.clone()),
            MeshMaterial3d(stone.clone()),
            Transform::from_xyz(6.0 * angle.cos(), 1.5, 6.0 * angle.sin()),
            RigidBody::Static,
            Collider::cuboid(0.8, 3.0, 0.8),
            Name::new("Pillar"),
        ));
    }

    commands.spawn((
        PlayerRoot,
        Name::new("LocalPlayer"),
        Mesh3d(meshes.add(Capsule3d::new(0.3, 1.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.4, 0.2))),
        children![
            (
                Name::new("CameraContainer"),
                HostLook::default(),
                Transform::default(),
                Visibility::default(),
                children![(
                    Name::new("MainCamera"),
                    Camera3d::default(),
                    EyeMount::default(),
                    Transform::from_xyz(0.0, 0.6, 0.0),
                )],
            ),
            (
                Name::new("AvatarViewCamera"),
                AvatarView,
                Camera3d::default(),
                Camera {
                    is_active: false,
                    order: 1,
                    ..default()
                },
                Transform::from_xyz(0.6, 1.2, 2.5).looking_at(Vec3::new(0.0, 0.6, 0.0), Vec3::Y),
            ),
        ],
    ));
}

fn on_player_spawn(on: On<Add, PlayerRoot>, mut commands: Commands) {
    commands.entity(on.event_target()).insert((
        // Capsule bottom should be at ground level, so center at 0.05 + 0.8 = 0.85
        Transform::from_xyz(0.0, 0.85, 0.0),
        RigidBody::Dynamic,
        Collider::capsule(0.3, 1.0),
        LockedAxes::ROTATION_LOCKED.unlock_rotation_y(),
        TnuaController::default(),
        TnuaAvian3dSensorShape(Collider::cylinder(0.29, 0.0)),
    ));
}

fn grab_cursor(
    mut cursor_options: Single<&mut CursorOptions>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
) {
    // Lock cursor for better camera control
    if mouse.just_pressed(MouseButton::Middle) {
        cursor_options.grab_mode = CursorGrabMode::Locked;
        cursor_options.visible = false;
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        cursor_options.grab_mode = CursorGrabMode::None;
        cursor_options.visible = true;
    }
}

fn host_look(
    motion: Res<AccumulatedMouseMotion>,
    cursor_options: Single<&CursorOptions>,
    mut looks: Query<(&mut HostLook, &mut Transform)>,
) {
    if cursor_options.grab_mode != CursorGrabMode::Locked {
        return;
    }
    for (mut look, mut transform) in looks.iter_mut() {
        let sensitivity = look.sensitivity;
        look.yaw -= motion.delta.x * sensitivity;
        look.pitch = (look.pitch - motion.delta.y * sensitivity).clamp(-FRAC_PI_2 + 0.1, FRAC_PI_2 - 0.1);
        // Yaw is applied to the player body through the walk basis.
        transform.rotation = Quat::from_rotation_x(look.pitch);
    }
}

fn apply_controls(
    keyboard: Res<ButtonInput<KeyCode>>,
    looks: Query<&HostLook>,
    mut controller_query: Query<(&mut TnuaController, &Transform)>,
) {
    let Ok((mut controller, transform)) = controller_query.single_mut() else {
        return;
    };

    // Without a look component the player keeps whatever facing it has.
    let facing = looks
        .single()
        .map_or(transform.rotation, |look| Quat::from_rotation_y(look.yaw));
    let forward = facing * Vec3::NEG_Z;
    let sideways = facing * Vec3::X;
    const WALK_SPEED: f32 = 3.0;

    let sprint_factor = if keyboard.pressed(KeyCode::ShiftLeft) {
        1.8
    } else {
        1.0
    };

    let mut direction = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        direction += forward * sprint_factor;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        direction -= forward;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        direction += sideways;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        direction -= sideways;
    }

    // Feed the basis every frame, even when standing still, or the collider just falls.
    controller.basis(TnuaBuiltinWalk {
        desired_velocity: direction * WALK_SPEED,
        desired_forward: Dir3::new(forward).ok(),
        // Capsule: radius 0.3, height 1.0 -> center to bottom = 0.8
        float_height: 0.85,
        ..Default::default()
    });
}

fn mount_eyes(mut mounts: Query<(&EyeMount, &mut Transform)>) {
    for (mount, mut transform) in mounts.iter_mut() {
        *transform = Transform::from_translation(mount.offset);
    }
}

/// Holding V swaps to the host's own third person view.
fn avatar_view(keyboard: Res<ButtonInput<KeyCode>>, mut cameras: Query<&mut Camera, With<AvatarView>>) {
    let show = keyboard.pressed(KeyCode::KeyV);
    for mut camera in cameras.iter_mut() {
        if camera.is_active != show {
            camera.is_active = show;
        }
    }
}
