use std::collections::HashSet;

use lib_window::{ButtonCode, KeyCode, MouseButton};

use crate::Binding;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Button {
    pub is_held: bool,
    /// Went down since the last frame.
    pub is_pressed: bool,
    /// Was held last frame and no binding is held now.
    pub is_released: bool,
}

/// Every input that drives one logical button.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ButtonBindings {
    pub keys: HashSet<KeyCode>,
    pub mouse: HashSet<MouseButton>,
    pub buttons: HashSet<ButtonCode>,
}

#[macro_export]
macro_rules! button_bindings {
    ($($e:expr),* $(,)*) => {{
        let mut result = $crate::ButtonBindings::default();
        $(
            result.extend(std::iter::once($e));
        )*
        result
    }};
}

impl ButtonBindings {
    pub fn iter(&self) -> impl Iterator<Item = Binding> + '_ {
        self.keys
            .iter()
            .map(|&key| Binding::Key(key))
            .chain(self.mouse.iter().map(|&button| Binding::Mouse(button)))
            .chain(self.buttons.iter().map(|&button| Binding::Button(button)))
    }
}

impl Extend<KeyCode> for ButtonBindings {
    fn extend<T: IntoIterator<Item = KeyCode>>(&mut self, iter: T) {
        self.keys.extend(iter);
    }
}

impl Extend<MouseButton> for ButtonBindings {
    fn extend<T: IntoIterator<Item = MouseButton>>(&mut self, iter: T) {
        self.mouse.extend(iter);
    }
}

impl Extend<ButtonCode> for ButtonBindings {
    fn extend<T: IntoIterator<Item = ButtonCode>>(&mut self, iter: T) {
        self.buttons.extend(iter);
    }
}
