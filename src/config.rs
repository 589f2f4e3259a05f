use bevy::prelude::*;
use strum_macros::{Display, EnumIter, EnumString};

pub const DEFAULT_DISTANCE: f32 = 3.5;
pub const DEFAULT_HEIGHT: f32 = 1.5;
/// Degrees of rotation per pixel of pointer motion.
pub const DEFAULT_SENSITIVITY: f32 = 0.3;
pub const DEFAULT_VERTICAL_MIN: f32 = -10.0;
pub const DEFAULT_VERTICAL_MAX: f32 = 60.0;
pub const DEFAULT_VERTICAL_ANGLE: f32 = 10.0;
pub const DEFAULT_TOGGLE_COOLDOWN_SECS: f32 = 0.5;
pub const DEFAULT_COLLISION_RADIUS: f32 = 0.3;
pub const DEFAULT_CAMERA_SEARCH_FRAMES: u32 = 600;

/// Render order given to the host's primary camera while an overlay camera draws on top.
pub const OVERLAY_PRIMARY_ORDER: isize = -1;
pub const OVERLAY_SECONDARY_ORDER: isize = 10;

pub const LOCOMOTION_COMPONENTS: &[&str] = &[
    "TnuaController",
    "CharacterController",
    "KinematicCharacterController",
];

pub const PLAYER_ROLE_TAG: &str = "Player";

pub const PLAYER_NAMES: &[&str] = &[
    "Player",
    "PlayerController",
    "PlayerCharacter",
    "FPSController",
    "Character",
    "LocalPlayer",
    "FirstPersonController",
    "Player(Clone)",
    "Character(Clone)",
    "PlayerObject",
    "MainPlayer",
];

pub const PLAYER_NAME_PATTERNS: &[&str] = &["player", "character"];
pub const PROXIMITY_RADIUS: f32 = 5.0;

pub const CAMERA_KEYWORDS: &[&str] = &[
    "avatar",
    "third",
    "view",
    "character",
    "secondary",
    "overlay",
];

pub const MAIN_CAMERA_TAG: &str = "MainCamera";

/// How the override takes the render surface away from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum OwnershipStrategy {
    /// Draw a secondary camera over the host's primary camera.
    #[default]
    Overlay,
    /// Detach the primary camera from its parent and drive it in world space.
    Reparent,
    /// Suspend the host behaviors on the camera and its ancestors.
    ScriptSuspend,
}

/// What the target key's pressed-edge query reports on the frame the override engages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
pub enum FirstFrameEdge {
    /// Only ever report the physical press edge.
    #[default]
    Physical,
    /// Report a press edge once when the override engages.
    Forced,
}

/// Name lists used to recognise things in a scene graph the plugin does not own.
#[derive(Clone, Debug)]
pub struct DiscoveryConfig {
    /// Short component type names that mark an entity as player-controlled.
    pub locomotion_components: &'static [&'static str],
    pub role_tag: &'static str,
    pub player_names: &'static [&'static str],
    pub name_patterns: &'static [&'static str],
    pub proximity_radius: f32,
    pub camera_keywords: &'static [&'static str],
    pub main_camera_tag: &'static str,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            locomotion_components: LOCOMOTION_COMPONENTS,
            role_tag: PLAYER_ROLE_TAG,
            player_names: PLAYER_NAMES,
            name_patterns: PLAYER_NAME_PATTERNS,
            proximity_radius: PROXIMITY_RADIUS,
            camera_keywords: CAMERA_KEYWORDS,
            main_camera_tag: MAIN_CAMERA_TAG,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OverrideConfig {
    /// Camera to pivot length
    pub distance: f32,
    /// Pivot offset above the target
    pub height: f32,
    pub sensitivity: f32,
    pub vertical_min: f32,
    pub vertical_max: f32,
    pub initial_vertical: f32,
    pub toggle_cooldown_secs: f32,
    pub collision_radius: f32,
    pub strategy: OwnershipStrategy,
    pub toggle_key: KeyCode,
    pub search_key: KeyCode,
    pub free_look_button: MouseButton,
    /// Key reported as held to the host while an overlay is active. It keeps the host's own
    /// secondary camera switched on, so the other strategies never force it.
    pub forced_key: Option<KeyCode>,
    pub forced_key_first_edge: FirstFrameEdge,
    pub camera_search_frames: u32,
    /// Spawn a dedicated camera when the overlay strategy finds none.
    pub create_fallback_camera: bool,
    pub discovery: DiscoveryConfig,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            height: DEFAULT_HEIGHT,
            sensitivity: DEFAULT_SENSITIVITY,
            vertical_min: DEFAULT_VERTICAL_MIN,
            vertical_max: DEFAULT_VERTICAL_MAX,
            initial_vertical: DEFAULT_VERTICAL_ANGLE,
            toggle_cooldown_secs: DEFAULT_TOGGLE_COOLDOWN_SECS,
            collision_radius: DEFAULT_COLLISION_RADIUS,
            strategy: OwnershipStrategy::default(),
            toggle_key: KeyCode::F6,
            search_key: KeyCode::F8,
            free_look_button: MouseButton::Right,
            forced_key: Some(KeyCode::KeyV),
            forced_key_first_edge: FirstFrameEdge::default(),
            camera_search_frames: DEFAULT_CAMERA_SEARCH_FRAMES,
            create_fallback_camera: true,
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl OverrideConfig {
    pub fn with_strategy(mut self, strategy: OwnershipStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The key to hold for the host under the configured strategy.
    pub fn effective_forced_key(&self) -> Option<KeyCode> {
        match self.strategy {
            OwnershipStrategy::Overlay => self.forced_key,
            OwnershipStrategy::Reparent | OwnershipStrategy::ScriptSuspend => None,
        }
    }
}
