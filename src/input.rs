use lib_input::{AxisBindings, ButtonBindings, InputTable, button_bindings};
use lib_math::{Camera, Vec2, vec2};
use lib_window::{ButtonCode, KeyCode, MouseButton};

/// What the player asked for this frame, in world terms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Controls {
    pub movement: Vec2,
    /// World point the ship should face, if the player is aiming.
    pub aim: Option<Vec2>,
    pub fire: bool,
    pub exit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlBindings {
    pub move_x: AxisBindings,
    pub move_y: AxisBindings,
    pub fire: ButtonBindings,
    pub exit: ButtonBindings,
}

impl Default for ControlBindings {
    fn default() -> Self {
        Self {
            move_x: AxisBindings {
                positive: button_bindings!(
                    KeyCode::KeyD,
                    KeyCode::ArrowRight,
                    ButtonCode::LeftStickRight,
                    ButtonCode::DPadRight,
                ),
                negative: button_bindings!(
                    KeyCode::KeyA,
                    KeyCode::ArrowLeft,
                    ButtonCode::LeftStickLeft,
                    ButtonCode::DPadLeft,
                ),
            },
            move_y: AxisBindings {
                positive: button_bindings!(
                    KeyCode::KeyW,
                    KeyCode::ArrowUp,
                    ButtonCode::LeftStickUp,
                    ButtonCode::DPadUp,
                ),
                negative: button_bindings!(
                    KeyCode::KeyS,
                    KeyCode::ArrowDown,
                    ButtonCode::LeftStickDown,
                    ButtonCode::DPadDown,
                ),
            },
            fire: button_bindings!(KeyCode::Space, MouseButton::Left, ButtonCode::South),
            exit: button_bindings!(KeyCode::Escape, ButtonCode::Start),
        }
    }
}

impl ControlBindings {
    pub fn read(&self, input: &InputTable, camera: &Camera, window_size: Vec2) -> Controls {
        let has_cursor = input.cursor_position() != Vec2::ZERO;

        Controls {
            movement: vec2(input.axis(&self.move_x), input.axis(&self.move_y)),
            aim: has_cursor
                .then(|| camera.screen_to_world(input.cursor_position(), window_size)),
            fire: input.button(&self.fire).is_held,
            exit: input.button(&self.exit).is_pressed,
        }
    }
}
