//! Makes the host believe one key is held while the override is active.
//!
//! The host only ever reads `ButtonInput<KeyCode>`. Instead of patching how it reads, a
//! system right after Bevy's own input systems rewrites the state of exactly one key in
//! that resource. What gets written is decided by [`OverriddenKeys`], a decorator over any
//! [`KeyStateSource`], fed from a private mirror of the physical key.

use std::hash::Hash;

use bevy::input::ButtonState;
use bevy::input::keyboard::{KeyboardFocusLost, KeyboardInput};
use bevy::prelude::*;

use crate::config::FirstFrameEdge;
use crate::error::OverrideError;

/// Level and edge queries the host can make about a key.
pub trait KeyStateSource<K> {
    /// Level-triggered: is the key down right now.
    fn held(&self, key: K) -> bool;
    /// Edge-triggered: did the key go down this frame.
    fn pressed_edge(&self, key: K) -> bool;
    /// Edge-triggered: did the key go up this frame.
    fn released_edge(&self, key: K) -> bool;
}

impl<K> KeyStateSource<K> for ButtonInput<K>
where
    K: Copy + Eq + Hash + Send + Sync + 'static,
{
    fn held(&self, key: K) -> bool {
        self.pressed(key)
    }

    fn pressed_edge(&self, key: K) -> bool {
        self.just_pressed(key)
    }

    fn released_edge(&self, key: K) -> bool {
        self.just_released(key)
    }
}

/// Which key to fake and whether to fake it right now.
#[derive(Resource, Clone, Debug)]
pub struct OverrideRecord {
    key: KeyCode,
    forced: bool,
    first_edge: FirstFrameEdge,
}

impl OverrideRecord {
    pub fn new(key: KeyCode, first_edge: FirstFrameEdge) -> Self {
        Self {
            key,
            forced: false,
            first_edge,
        }
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn set_forced(&mut self, forced: bool) {
        self.forced = forced;
    }
}

/// Decorates a key source so the target key reads as held while forced.
pub struct OverriddenKeys<'a, S> {
    inner: &'a S,
    key: KeyCode,
    forced: bool,
    engaging: bool,
}

impl<'a, S: KeyStateSource<KeyCode>> OverriddenKeys<'a, S> {
    pub fn new(inner: &'a S, key: KeyCode, forced: bool) -> Self {
        Self {
            inner,
            key,
            forced,
            engaging: false,
        }
    }

    /// Marks the first forced frame; with [`FirstFrameEdge::Forced`] it reports a press.
    pub fn engaging(mut self, policy: FirstFrameEdge) -> Self {
        self.engaging = self.forced && policy == FirstFrameEdge::Forced;
        self
    }
}

impl<S: KeyStateSource<KeyCode>> KeyStateSource<KeyCode> for OverriddenKeys<'_, S> {
    fn held(&self, key: KeyCode) -> bool {
        (key == self.key && self.forced) || self.inner.held(key)
    }

    fn pressed_edge(&self, key: KeyCode) -> bool {
        (key == self.key && self.engaging) || self.inner.pressed_edge(key)
    }

    fn released_edge(&self, key: KeyCode) -> bool {
        if key == self.key && self.forced {
            return false;
        }
        self.inner.released_edge(key)
    }
}

/// Level and edges of one key for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pub held: bool,
    pub pressed: bool,
    pub released: bool,
}

impl KeyState {
    pub fn sample<K: Copy>(source: &impl KeyStateSource<K>, key: K) -> Self {
        Self {
            held: source.held(key),
            pressed: source.pressed_edge(key),
            released: source.released_edge(key),
        }
    }
}

/// Overwrites the state of `key` in `input` without touching any other key.
pub fn write_key_state(input: &mut ButtonInput<KeyCode>, key: KeyCode, state: KeyState) {
    input.reset(key);
    if state.pressed || state.released {
        // Leaves both edges set and the key up.
        input.press(key);
        input.release(key);
    }
    if state.held {
        input.press(key);
    }
    if !state.pressed {
        input.clear_just_pressed(key);
    }
    if !state.released {
        input.clear_just_released(key);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShimStatus {
    #[default]
    Installed,
    /// The host has no keyboard state to decorate; toggling no longer drives its native view.
    Degraded,
}

/// Private bookkeeping of the shim.
#[derive(Resource, Default)]
pub struct KeyMirror {
    physical: ButtonInput<KeyCode>,
    was_forced: bool,
    status: ShimStatus,
}

impl KeyMirror {
    pub fn status(&self) -> ShimStatus {
        self.status
    }

    fn degrade(&mut self, error: OverrideError) {
        if self.status != ShimStatus::Degraded {
            error!("{error}");
            self.status = ShimStatus::Degraded;
        }
    }
}

/// Checks the hook point exists once every plugin is built.
pub fn verify_install(world: &mut World) {
    if world.contains_resource::<ButtonInput<KeyCode>>() {
        return;
    }
    if let Some(mut mirror) = world.get_resource_mut::<KeyMirror>() {
        mirror.degrade(OverrideError::InputUnavailable("ButtonInput<KeyCode>"));
    }
}

pub fn apply_key_override(
    mut keyboard_events: MessageReader<KeyboardInput>,
    mut focus_lost: MessageReader<KeyboardFocusLost>,
    record: Res<OverrideRecord>,
    mut mirror: ResMut<KeyMirror>,
    keys: Option<ResMut<ButtonInput<KeyCode>>>,
) {
    let mirror = mirror.as_mut();
    let key = record.key();

    mirror.physical.clear();
    for event in keyboard_events.read().filter(|event| event.key_code == key) {
        match event.state {
            ButtonState::Pressed => mirror.physical.press(key),
            ButtonState::Released => mirror.physical.release(key),
        }
    }
    if focus_lost.read().count() > 0 {
        mirror.physical.release_all();
    }

    let Some(mut keys) = keys else {
        mirror.degrade(OverrideError::InputUnavailable("ButtonInput<KeyCode>"));
        return;
    };

    let forced = record.is_forced();
    if !forced && !mirror.was_forced {
        return;
    }

    let engaging = forced && !mirror.was_forced;
    let policy = if engaging {
        record.first_edge
    } else {
        FirstFrameEdge::Physical
    };
    let view = OverriddenKeys::new(&mirror.physical, key, forced).engaging(policy);
    let state = KeyState::sample(&view, key);
    write_key_state(&mut keys, key, state);

    if engaging {
        debug!("Holding {key:?} for the host");
    } else if !forced {
        debug!("Released hold on {key:?}");
    }
    mirror.was_forced = forced;
}

#[cfg(test)]
mod tests {
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    const KEY: KeyCode = KeyCode::KeyV;

    #[test]
    fn forced_key_reads_held_without_physical_press() {
        let physical = ButtonInput::<KeyCode>::default();
        let view = OverriddenKeys::new(&physical, KEY, true);

        assert!(view.held(KEY));
        assert!(!view.pressed_edge(KEY));
        assert!(!view.released_edge(KEY));
    }

    #[test]
    fn physical_release_is_hidden_while_forced() {
        let mut physical = ButtonInput::<KeyCode>::default();
        physical.press(KEY);
        physical.clear();
        physical.release(KEY);
        let view = OverriddenKeys::new(&physical, KEY, true);

        assert!(view.held(KEY));
        assert!(!view.released_edge(KEY));
    }

    #[test]
    fn physical_press_edge_passes_through() {
        let mut physical = ButtonInput::<KeyCode>::default();
        physical.press(KEY);
        let view = OverriddenKeys::new(&physical, KEY, true);

        assert!(view.pressed_edge(KEY));
    }

    #[test]
    fn engaging_edge_follows_policy() {
        let physical = ButtonInput::<KeyCode>::default();

        let physical_policy = OverriddenKeys::new(&physical, KEY, true).engaging(FirstFrameEdge::Physical);
        assert!(!physical_policy.pressed_edge(KEY));

        let forced_policy = OverriddenKeys::new(&physical, KEY, true).engaging(FirstFrameEdge::Forced);
        assert!(forced_policy.pressed_edge(KEY));
    }

    #[test]
    fn other_keys_pass_through() {
        let mut physical = ButtonInput::<KeyCode>::default();
        physical.press(KeyCode::KeyW);
        physical.clear();
        physical.release(KeyCode::KeyW);
        let view = OverriddenKeys::new(&physical, KEY, true);

        assert!(!view.held(KeyCode::KeyW));
        assert!(view.released_edge(KeyCode::KeyW));
        assert!(!view.held(KeyCode::KeyQ));
    }

    #[test]
    fn unforced_view_is_transparent() {
        let mut physical = ButtonInput::<KeyCode>::default();
        physical.press(KEY);
        physical.clear();
        physical.release(KEY);
        let view = OverriddenKeys::new(&physical, KEY, false);

        assert_eq!(KeyState::sample(&view, KEY), KeyState::sample(&physical, KEY));
    }

    #[test]
    fn write_key_state_reproduces_every_combination() {
        for held in [false, true] {
            for pressed in [false, true] {
                for released in [false, true] {
                    let state = KeyState { held, pressed, released };
                    let mut input = ButtonInput::<KeyCode>::default();
                    input.press(KeyCode::KeyW);

                    write_key_state(&mut input, KEY, state);

                    assert_eq!(KeyState::sample(&input, KEY), state);
                    assert!(input.pressed(KeyCode::KeyW));
                }
            }
        }
    }

    fn shim_world(forced: bool) -> World {
        let mut world = World::new();
        world.init_resource::<Messages<KeyboardInput>>();
        world.init_resource::<Messages<KeyboardFocusLost>>();
        world.init_resource::<KeyMirror>();
        let mut record = OverrideRecord::new(KEY, FirstFrameEdge::Physical);
        record.set_forced(forced);
        world.insert_resource(record);
        world
    }

    #[test]
    fn shim_holds_key_in_host_input_and_lets_go_cleanly() {
        let mut world = shim_world(true);
        world.init_resource::<ButtonInput<KeyCode>>();

        world.run_system_once(apply_key_override).unwrap();
        let keys = world.resource::<ButtonInput<KeyCode>>();
        assert!(keys.pressed(KEY));
        assert!(!keys.just_pressed(KEY));

        world.resource_mut::<OverrideRecord>().set_forced(false);
        world.run_system_once(apply_key_override).unwrap();
        let keys = world.resource::<ButtonInput<KeyCode>>();
        assert!(!keys.pressed(KEY));
        assert!(!keys.just_released(KEY));
    }

    #[test]
    fn shim_leaves_input_alone_when_never_forced() {
        let mut world = shim_world(false);
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KEY);
        world.insert_resource(keys);

        world.run_system_once(apply_key_override).unwrap();

        let keys = world.resource::<ButtonInput<KeyCode>>();
        assert!(keys.pressed(KEY));
        assert!(keys.just_pressed(KEY));
    }

    #[test]
    fn missing_keyboard_resource_degrades() {
        let mut world = shim_world(true);

        world.run_system_once(apply_key_override).unwrap();

        assert_eq!(world.resource::<KeyMirror>().status(), ShimStatus::Degraded);
    }
}
