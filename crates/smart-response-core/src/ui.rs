//! Foreground coordination: screens, apps, and the input that moves between
//! them.

use log::debug;

use crate::{
    app::{AppKind, Apps},
    input::{ButtonAction, ButtonBindings, ButtonSlot, InputEvent},
    network::WifiStatus,
    peripherals::{BatteryReading, DateTime},
    render::Toolkit,
    screen::{ScreenContext, ScreenId, Screens},
    time::Clock,
};

/// Snapshot of what the screens and apps display.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeviceStatus {
    pub time: Option<DateTime>,
    pub battery: Option<BatteryReading>,
    pub wifi: WifiStatus,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Foreground {
    Screen(ScreenId),
    App(AppKind),
    Nothing,
}

pub struct Ui<T: Toolkit> {
    screens: Screens<T>,
    apps: Apps<T>,
    bindings: Option<ButtonBindings>,
}

impl<T: Toolkit> Default for Ui<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Toolkit> Ui<T> {
    pub const fn new() -> Self {
        Self {
            screens: Screens::new(),
            apps: Apps::new(),
            bindings: None,
        }
    }

    pub fn screens(&self) -> &Screens<T> {
        &self.screens
    }

    pub fn screens_mut(&mut self) -> &mut Screens<T> {
        &mut self.screens
    }

    pub fn apps(&self) -> &Apps<T> {
        &self.apps
    }

    /// Button presses are ignored until bindings are registered.
    pub fn register_buttons(&mut self, bindings: ButtonBindings) {
        self.bindings = Some(bindings);
    }

    pub fn buttons_registered(&self) -> bool {
        self.bindings.is_some()
    }

    pub fn enable_launching(&mut self) {
        self.screens.launcher_mut().enable_launching();
    }

    pub fn foreground(&self) -> Foreground {
        if let Some(kind) = self.apps.foreground() {
            Foreground::App(kind)
        } else if let Some(id) = self.screens.active() {
            Foreground::Screen(id)
        } else {
            Foreground::Nothing
        }
    }

    /// Applies one input event. Returns whether it changed anything.
    pub fn handle_input<C: Clock>(
        &mut self,
        event: InputEvent,
        ctx: &ScreenContext<'_, T, C>,
        status: &DeviceStatus,
    ) -> bool {
        let foreground = self.foreground();

        // A swap or launch that failed part-way leaves nothing in front; any
        // input brings standby back.
        if foreground == Foreground::Nothing {
            debug!("input: {:?} with nothing in front; showing standby", event);
            return self.screens.show(ScreenId::Standby, ctx, status);
        }

        if let InputEvent::Tap { x, y } = event {
            return match foreground {
                Foreground::Screen(ScreenId::Standby) => {
                    self.screens.show(ScreenId::Launcher, ctx, status)
                }
                Foreground::Screen(ScreenId::Launcher) => {
                    match self.screens.launcher().app_at(ctx.geometry(), x, y) {
                        Some(kind) => self.select_app(kind, ctx, status),
                        None => false,
                    }
                }
                _ => false,
            };
        }

        let Some(slot) = ButtonSlot::from_event(event) else {
            return false;
        };
        let Some(bindings) = self.bindings else {
            debug!("input: {:?} before buttons registered; ignored", slot);
            return false;
        };

        match (bindings.action(slot), foreground) {
            (ButtonAction::ToggleLauncher, Foreground::Screen(ScreenId::Standby)) => {
                self.screens.show(ScreenId::Launcher, ctx, status)
            }
            (
                ButtonAction::ToggleLauncher | ButtonAction::Back,
                Foreground::Screen(ScreenId::Launcher),
            ) => self.screens.show(ScreenId::Standby, ctx, status),
            (ButtonAction::Back, Foreground::App(kind)) => {
                self.apps.stop(kind);
                self.screens.show(ScreenId::Standby, ctx, status);
                true
            }
            _ => false,
        }
    }

    /// Launcher selection: the launcher hides, then the app comes up.
    pub fn select_app<C: Clock>(
        &mut self,
        kind: AppKind,
        ctx: &ScreenContext<'_, T, C>,
        status: &DeviceStatus,
    ) -> bool {
        match self.screens.select_app(kind) {
            Some(kind) => {
                self.apps.launch(kind, ctx, status);
                true
            }
            None => {
                if self.foreground() == Foreground::Nothing {
                    self.screens.show(ScreenId::Standby, ctx, status);
                }
                false
            }
        }
    }

    /// Per-tick refresh of the visible screen and every running app.
    pub fn service<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>, status: &DeviceStatus) {
        self.screens.update_visible(ctx, status);
        self.apps.update_running(ctx, status);
    }
}
