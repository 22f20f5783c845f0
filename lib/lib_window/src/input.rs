use winit::{event::MouseButton, keyboard::KeyCode};

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceId {
    Winit(winit::event::DeviceId),
    Gilrs(gilrs::GamepadId),
}

/// Input from a keyboard, mouse or gamepad, flattened into one stream.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceEvent {
    Connected,
    Disconnected,
    Key { key: KeyCode, pressed: bool },
    Mouse { button: MouseButton, pressed: bool },
    /// Cursor position in window pixels, origin top-left.
    CursorMoved { x: f32, y: f32 },
    Button(ButtonEvent),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonEvent {
    pub button: ButtonCode,
    pub value: f32,
}

/// Gamepad buttons. Each stick direction is its own button carrying a 0..1 value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonCode {
    LeftStickRight,
    LeftStickLeft,
    LeftStickUp,
    LeftStickDown,
    RightStickRight,
    RightStickLeft,
    RightStickUp,
    RightStickDown,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    South,
    East,
    North,
    West,
    LeftTrigger,
    LeftTrigger2,
    RightTrigger,
    RightTrigger2,
    Start,
    Select,
    LeftThumb,
    RightThumb,
    C,
    Z,
    Mode,
    Unknown,
}

impl ButtonCode {
    pub fn from_gilrs(button: gilrs::Button) -> Self {
        match button {
            gilrs::Button::South => Self::South,
            gilrs::Button::East => Self::East,
            gilrs::Button::North => Self::North,
            gilrs::Button::West => Self::West,
            gilrs::Button::C => Self::C,
            gilrs::Button::Z => Self::Z,
            gilrs::Button::LeftTrigger => Self::LeftTrigger,
            gilrs::Button::RightTrigger => Self::RightTrigger,
            gilrs::Button::LeftTrigger2 => Self::LeftTrigger2,
            gilrs::Button::RightTrigger2 => Self::RightTrigger2,
            gilrs::Button::Select => Self::Select,
            gilrs::Button::Start => Self::Start,
            gilrs::Button::Mode => Self::Mode,
            gilrs::Button::LeftThumb => Self::LeftThumb,
            gilrs::Button::RightThumb => Self::RightThumb,
            gilrs::Button::DPadUp => Self::DPadUp,
            gilrs::Button::DPadDown => Self::DPadDown,
            gilrs::Button::DPadLeft => Self::DPadLeft,
            gilrs::Button::DPadRight => Self::DPadRight,
            gilrs::Button::Unknown => Self::Unknown,
        }
    }

    /// The (positive, negative) direction buttons a stick axis drives.
    ///
    /// Axes that are reported as buttons elsewhere (dpad, triggers) return `None`.
    pub fn stick_directions(axis: gilrs::Axis) -> Option<(Self, Self)> {
        match axis {
            gilrs::Axis::LeftStickX => Some((Self::LeftStickRight, Self::LeftStickLeft)),
            gilrs::Axis::LeftStickY => Some((Self::LeftStickUp, Self::LeftStickDown)),
            gilrs::Axis::RightStickX => Some((Self::RightStickRight, Self::RightStickLeft)),
            gilrs::Axis::RightStickY => Some((Self::RightStickUp, Self::RightStickDown)),
            gilrs::Axis::Unknown => Some((Self::Unknown, Self::Unknown)),
            gilrs::Axis::DPadX | gilrs::Axis::DPadY | gilrs::Axis::LeftZ | gilrs::Axis::RightZ => {
                None
            }
        }
    }

    pub fn is_stick_direction(self) -> bool {
        matches!(
            self,
            Self::LeftStickRight
                | Self::LeftStickLeft
                | Self::LeftStickUp
                | Self::LeftStickDown
                | Self::RightStickRight
                | Self::RightStickLeft
                | Self::RightStickUp
                | Self::RightStickDown
        )
    }
}
