use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;

use crate::input::shim::KeyStateSource;

/// Pointer motion for one frame, Y up-positive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LookInput {
    pub delta: Vec2,
    pub free_look: bool,
}

impl LookInput {
    pub fn sample(world: &World, free_look_button: MouseButton) -> Self {
        // Bevy reports mouse motion with Y pointing down the screen.
        let delta = world
            .get_resource::<AccumulatedMouseMotion>()
            .map_or(Vec2::ZERO, |motion| Vec2::new(motion.delta.x, -motion.delta.y));
        let free_look = world
            .get_resource::<ButtonInput<MouseButton>>()
            .is_some_and(|buttons| buttons.held(free_look_button));
        Self { delta, free_look }
    }
}

/// Rising edge of `key` this frame, false if the host has no keyboard state.
pub fn key_pressed_edge(world: &World, key: KeyCode) -> bool {
    world
        .get_resource::<ButtonInput<KeyCode>>()
        .is_some_and(|keys| keys.pressed_edge(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_vertical_motion_to_up_positive() {
        let mut world = World::new();
        world.insert_resource(AccumulatedMouseMotion {
            delta: Vec2::new(4.0, 3.0),
        });
        let mut buttons = ButtonInput::<MouseButton>::default();
        buttons.press(MouseButton::Right);
        world.insert_resource(buttons);

        let look = LookInput::sample(&world, MouseButton::Right);

        assert_eq!(look.delta, Vec2::new(4.0, -3.0));
        assert!(look.free_look);
    }

    #[test]
    fn missing_input_reads_as_idle() {
        let world = World::new();

        assert_eq!(LookInput::sample(&world, MouseButton::Right), LookInput::default());
        assert!(!key_pressed_edge(&world, KeyCode::F6));
    }
}
