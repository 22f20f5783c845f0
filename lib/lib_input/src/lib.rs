use std::collections::HashMap;

use lib_math::{Vec2, vec2};
use lib_window::{ButtonCode, ButtonEvent, DeviceEvent, KeyCode, MouseButton};

mod axis;
mod button;
pub use axis::*;
pub use button::*;

/// Pressed/released state for every key, mouse button and gamepad button seen so far.
///
/// Feed it with [`event`](Self::event) as input arrives, query it during update,
/// then call [`next_frame`](Self::next_frame) once the frame's input has been consumed.
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    states: HashMap<Binding, BindingState>,
    cursor_position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Key(KeyCode),
    Mouse(MouseButton),
    Button(ButtonCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct BindingState {
    value: f32,
    is_held: bool,
    was_held: bool,
    is_pressed: bool,
}

/// A stick direction counts as held only within 67.5 degrees of its axis.
const MIN_STICK_DOT: f32 = 0.3827;

const HOLD_THRESHOLD: f32 = 0.5;

impl InputTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Connected => {}
            DeviceEvent::Disconnected => {
                for (binding, state) in &mut self.states {
                    if let Binding::Button(_) = binding {
                        state.value = 0.0;
                        state.is_held = false;
                    }
                }
            }
            DeviceEvent::Key { key, pressed } => self.set(Binding::Key(key), pressed as u8 as f32),
            DeviceEvent::Mouse { button, pressed } => {
                self.set(Binding::Mouse(button), pressed as u8 as f32)
            }
            DeviceEvent::CursorMoved { x, y } => self.cursor_position = vec2(x, y),
            DeviceEvent::Button(ButtonEvent { button, value }) => {
                self.set(Binding::Button(button), value);

                if button.is_stick_direction() {
                    self.refresh_stick(button);
                }
            }
            _ => {}
        }
    }

    /// Ends the current frame: presses become plain holds and releases are forgotten.
    pub fn next_frame(&mut self) {
        for state in self.states.values_mut() {
            state.was_held = state.is_held;
            state.is_pressed = false;
        }
    }

    pub fn button(&self, bindings: &ButtonBindings) -> Button {
        let mut result = Button::default();
        let mut was_held = false;

        for state in bindings.iter().filter_map(|binding| self.states.get(&binding)) {
            result.is_held |= state.is_held;
            result.is_pressed |= state.is_pressed;
            was_held |= state.was_held;
        }

        result.is_released = was_held && !result.is_held;

        result
    }

    /// The strongest value among `bindings`, in `0..=1`. Keys read as 0 or 1.
    pub fn value(&self, bindings: &ButtonBindings) -> f32 {
        bindings
            .iter()
            .filter_map(|binding| self.states.get(&binding))
            .map(|state| state.value)
            .fold(0.0, f32::max)
            .min(1.0)
    }

    /// `positive - negative`, in `-1..=1`.
    pub fn axis(&self, bindings: &AxisBindings) -> f32 {
        self.value(&bindings.positive) - self.value(&bindings.negative)
    }

    /// Cursor position in window pixels, origin top-left.
    pub fn cursor_position(&self) -> Vec2 {
        self.cursor_position
    }

    fn set(&mut self, binding: Binding, value: f32) {
        let state = self.states.entry(binding).or_default();
        let is_held = value >= HOLD_THRESHOLD;

        if is_held && !state.is_held {
            state.is_pressed = true;
        }

        state.value = value;
        state.is_held = is_held;
    }

    fn raw(&self, button: ButtonCode) -> f32 {
        self.states
            .get(&Binding::Button(button))
            .map_or(0.0, |state| state.value)
    }

    fn refresh_stick(&mut self, button: ButtonCode) {
        use ButtonCode::*;

        let [right, left, up, down] = match button {
            LeftStickRight | LeftStickLeft | LeftStickUp | LeftStickDown => {
                [LeftStickRight, LeftStickLeft, LeftStickUp, LeftStickDown]
            }
            _ => [RightStickRight, RightStickLeft, RightStickUp, RightStickDown],
        };

        let direction = vec2(
            self.raw(right) - self.raw(left),
            self.raw(up) - self.raw(down),
        )
        .normalize_or_zero();

        for (button, axis) in [
            (right, Vec2::X),
            (left, Vec2::NEG_X),
            (up, Vec2::Y),
            (down, Vec2::NEG_Y),
        ] {
            let state = self.states.entry(Binding::Button(button)).or_default();
            let is_held = state.value >= HOLD_THRESHOLD && direction.dot(axis) >= MIN_STICK_DOT;

            if is_held && !state.is_held {
                state.is_pressed = true;
            }

            state.is_held = is_held;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button_bindings;

    fn key(key: KeyCode, pressed: bool) -> DeviceEvent {
        DeviceEvent::Key { key, pressed }
    }

    fn stick(button: ButtonCode, value: f32) -> DeviceEvent {
        DeviceEvent::Button(ButtonEvent { button, value })
    }

    #[test]
    fn press_hold_release_cycle() {
        let fire = button_bindings![KeyCode::Space, MouseButton::Left];
        let mut input = InputTable::new();

        input.event(key(KeyCode::Space, true));
        assert_eq!(
            input.button(&fire),
            Button {
                is_held: true,
                is_pressed: true,
                is_released: false
            }
        );

        input.next_frame();
        assert_eq!(
            input.button(&fire),
            Button {
                is_held: true,
                is_pressed: false,
                is_released: false
            }
        );

        input.event(key(KeyCode::Space, false));
        assert!(input.button(&fire).is_released);

        input.next_frame();
        assert_eq!(input.button(&fire), Button::default());
    }

    #[test]
    fn release_waits_for_every_binding() {
        let fire = button_bindings![KeyCode::Space, MouseButton::Left];
        let mut input = InputTable::new();

        input.event(key(KeyCode::Space, true));
        input.event(DeviceEvent::Mouse {
            button: MouseButton::Left,
            pressed: true,
        });
        input.next_frame();

        input.event(key(KeyCode::Space, false));
        let button = input.button(&fire);
        assert!(button.is_held);
        assert!(!button.is_released);
    }

    #[test]
    fn tap_within_one_frame_still_presses() {
        let jump = button_bindings![KeyCode::KeyW];
        let mut input = InputTable::new();

        input.event(key(KeyCode::KeyW, true));
        input.event(key(KeyCode::KeyW, false));

        let button = input.button(&jump);
        assert!(button.is_pressed);
        assert!(!button.is_held);
    }

    #[test]
    fn axis_combines_keys_and_sticks() {
        let horizontal = AxisBindings {
            positive: button_bindings![KeyCode::KeyD, ButtonCode::LeftStickRight],
            negative: button_bindings![KeyCode::KeyA, ButtonCode::LeftStickLeft],
        };
        let mut input = InputTable::new();

        assert_eq!(input.axis(&horizontal), 0.0);

        input.event(stick(ButtonCode::LeftStickLeft, 0.25));
        assert_eq!(input.axis(&horizontal), -0.25);

        input.event(key(KeyCode::KeyD, true));
        assert_eq!(input.axis(&horizontal), 0.75);
    }

    #[test]
    fn diagonal_stick_holds_both_directions_until_too_steep() {
        let right = button_bindings![ButtonCode::LeftStickRight];
        let up = button_bindings![ButtonCode::LeftStickUp];
        let mut input = InputTable::new();

        input.event(stick(ButtonCode::LeftStickRight, 0.7));
        input.event(stick(ButtonCode::LeftStickUp, 0.7));
        assert!(input.button(&right).is_held);
        assert!(input.button(&up).is_held);

        input.event(stick(ButtonCode::LeftStickUp, 1.0));
        input.event(stick(ButtonCode::LeftStickRight, 0.5));
        assert!(input.button(&up).is_held);
        assert!(input.button(&right).is_held);

        input.event(stick(ButtonCode::LeftStickRight, 0.3));
        assert!(!input.button(&right).is_held);
    }

    #[test]
    fn disconnect_releases_gamepad_only() {
        let fire = button_bindings![ButtonCode::South];
        let left = button_bindings![KeyCode::KeyA];
        let mut input = InputTable::new();

        input.event(stick(ButtonCode::South, 1.0));
        input.event(key(KeyCode::KeyA, true));
        input.event(DeviceEvent::Disconnected);

        assert!(!input.button(&fire).is_held);
        assert!(input.button(&left).is_held);
    }

    #[test]
    fn cursor_is_tracked() {
        let mut input = InputTable::new();
        input.event(DeviceEvent::CursorMoved { x: 12.0, y: 34.0 });

        assert_eq!(input.cursor_position(), vec2(12.0, 34.0));
    }
}
