use crate::ButtonBindings;

/// Two opposing sets of bindings read as one signed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisBindings {
    pub positive: ButtonBindings,
    pub negative: ButtonBindings,
}
