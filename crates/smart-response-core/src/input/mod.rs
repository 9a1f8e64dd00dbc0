//! Input abstraction layer.

mod mock;

pub use mock::ScriptedInput;

/// Logical input consumed by the UI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputEvent {
    /// Power button.
    Primary,
    /// Boot button.
    Secondary,
    /// Touch in screen coordinates.
    Tap { x: i16, y: i16 },
}

/// Polled input provider.
pub trait InputProvider {
    type Error: core::fmt::Debug;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonSlot {
    Primary,
    Secondary,
}

impl ButtonSlot {
    pub const fn from_event(event: InputEvent) -> Option<Self> {
        match event {
            InputEvent::Primary => Some(Self::Primary),
            InputEvent::Secondary => Some(Self::Secondary),
            InputEvent::Tap { .. } => None,
        }
    }
}

/// What a physical button does once bindings are registered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonAction {
    /// Standby opens the launcher, the launcher closes back to standby.
    ToggleLauncher,
    /// Leave the launcher or the running app and return to standby.
    Back,
}

/// Action table for the two button slots.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ButtonBindings {
    pub primary: ButtonAction,
    pub secondary: ButtonAction,
}

impl Default for ButtonBindings {
    fn default() -> Self {
        Self {
            primary: ButtonAction::ToggleLauncher,
            secondary: ButtonAction::Back,
        }
    }
}

impl ButtonBindings {
    pub const fn action(&self, slot: ButtonSlot) -> ButtonAction {
        match slot {
            ButtonSlot::Primary => self.primary,
            ButtonSlot::Secondary => self.secondary,
        }
    }
}
