//! Loading, standby, and launcher screens plus the coordinator that keeps at
//! most one of them visible.
//!
//! Screens are built lazily on first `show()` and never torn down. Every
//! toolkit call goes through [`ScreenContext`], which takes the display token
//! for exactly one mutation and turns any failure into a logged no-op.

mod launcher;
mod loading;
mod standby;

pub use launcher::{LAUNCHER_BUTTON_SIZE, LauncherScreen};
pub use loading::{LOADING_INITIAL_MESSAGE, LoadingScreen, clamp_percent};
pub use standby::{StandbyScreen, battery_presentation, status_line};

use log::{debug, warn};

use crate::{
    config::{DeviceConfig, DisplayGeometry},
    display::{DisplayGatekeeper, GateError},
    render::{Color, ElementSpec, Icon, Placement, Toolkit, Wallpaper},
    time::Clock,
    ui::DeviceStatus,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScreenId {
    Loading,
    Standby,
    Launcher,
}

impl ScreenId {
    pub const ALL: [Self; 3] = [Self::Loading, Self::Standby, Self::Launcher];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Standby => "standby",
            Self::Launcher => "launcher",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScreenPhase {
    Uninitialized,
    Hidden,
    Visible,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScreenState {
    pub constructed: bool,
    pub visible: bool,
    pub last_update_ms: Option<u64>,
}

impl ScreenState {
    pub const fn phase(&self) -> ScreenPhase {
        match (self.constructed, self.visible) {
            (false, _) => ScreenPhase::Uninitialized,
            (true, false) => ScreenPhase::Hidden,
            (true, true) => ScreenPhase::Visible,
        }
    }

    /// True at most once per `interval_ms`; records the refresh time.
    pub fn refresh_due(&mut self, now_ms: u64, interval_ms: u64) -> bool {
        if self
            .last_update_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < interval_ms)
        {
            return false;
        }
        self.last_update_ms = Some(now_ms);
        true
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn contains(&self, x: i16, y: i16) -> bool {
        x >= self.x
            && y >= self.y
            && (x as i32) < self.x as i32 + self.width as i32
            && (y as i32) < self.y as i32 + self.height as i32
    }
}

/// Everything a screen needs to touch the display.
pub struct ScreenContext<'a, T, C> {
    pub display: &'a DisplayGatekeeper<T>,
    pub clock: &'a C,
    pub config: &'a DeviceConfig,
}

impl<T, C> Clone for ScreenContext<'_, T, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, C> Copy for ScreenContext<'_, T, C> {}

impl<'a, T: Toolkit, C: Clock> ScreenContext<'a, T, C> {
    pub const fn new(
        display: &'a DisplayGatekeeper<T>,
        clock: &'a C,
        config: &'a DeviceConfig,
    ) -> Self {
        Self {
            display,
            clock,
            config,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn display_ready(&self) -> bool {
        self.display.is_ready()
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.config.display
    }

    /// Runs `f` as one critical section on the toolkit.
    pub fn mutate<R>(
        &self,
        what: &'static str,
        f: impl FnOnce(&mut T) -> Result<R, T::Error>,
    ) -> Option<R> {
        let mut guard = match self
            .display
            .acquire(self.clock, self.config.display_lock_timeout_ms)
        {
            Ok(guard) => guard,
            Err(GateError::SurfaceUnavailable) => return None,
            Err(err) => {
                warn!("display: {} skipped: {:?}", what, err);
                return None;
            }
        };

        match f(&mut *guard) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("display: {} failed: {:?}", what, err);
                None
            }
        }
    }

    pub fn create_surface(&self, wallpaper: Wallpaper) -> Option<T::Surface> {
        self.mutate("create surface", |toolkit| {
            toolkit.create_surface(wallpaper)
        })
    }

    pub fn create_element(
        &self,
        surface: T::Surface,
        spec: ElementSpec<'_>,
        placement: Placement,
    ) -> Option<T::Element> {
        self.mutate("create element", |toolkit| {
            toolkit.create_element(surface, spec, placement)
        })
    }

    pub fn set_text(&self, element: Option<T::Element>, text: &str) {
        if let Some(element) = element {
            self.mutate("set text", |toolkit| toolkit.set_text(element, text));
        }
    }

    pub fn set_color(&self, element: Option<T::Element>, color: Color) {
        if let Some(element) = element {
            self.mutate("set color", |toolkit| toolkit.set_color(element, color));
        }
    }

    pub fn set_value(&self, element: Option<T::Element>, value: u16) {
        if let Some(element) = element {
            self.mutate("set value", |toolkit| toolkit.set_value(element, value));
        }
    }

    pub fn set_icon(&self, element: Option<T::Element>, icon: Icon) {
        if let Some(element) = element {
            self.mutate("set icon", |toolkit| toolkit.set_icon(element, icon));
        }
    }

    pub fn load(&self, surface: T::Surface) -> bool {
        self.mutate("load surface", |toolkit| toolkit.load(surface))
            .is_some()
    }
}

/// Owns the three system screens and tracks which one is active.
pub struct Screens<T: Toolkit> {
    loading: LoadingScreen<T>,
    standby: StandbyScreen<T>,
    launcher: LauncherScreen<T>,
    active: Option<ScreenId>,
}

impl<T: Toolkit> Default for Screens<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Toolkit> Screens<T> {
    pub const fn new() -> Self {
        Self {
            loading: LoadingScreen::new(),
            standby: StandbyScreen::new(),
            launcher: LauncherScreen::new(),
            active: None,
        }
    }

    pub fn loading(&self) -> &LoadingScreen<T> {
        &self.loading
    }

    pub fn loading_mut(&mut self) -> &mut LoadingScreen<T> {
        &mut self.loading
    }

    pub fn standby(&self) -> &StandbyScreen<T> {
        &self.standby
    }

    pub fn launcher(&self) -> &LauncherScreen<T> {
        &self.launcher
    }

    pub fn launcher_mut(&mut self) -> &mut LauncherScreen<T> {
        &mut self.launcher
    }

    pub const fn active(&self) -> Option<ScreenId> {
        self.active
    }

    pub fn state(&self, id: ScreenId) -> ScreenState {
        match id {
            ScreenId::Loading => self.loading.state(),
            ScreenId::Standby => self.standby.state(),
            ScreenId::Launcher => self.launcher.state(),
        }
    }

    pub fn is_visible(&self, id: ScreenId) -> bool {
        self.state(id).visible
    }

    pub fn visible_count(&self) -> usize {
        ScreenId::ALL
            .iter()
            .filter(|id| self.is_visible(**id))
            .count()
    }

    pub fn init<C: Clock>(&mut self, id: ScreenId, ctx: &ScreenContext<'_, T, C>) -> bool {
        match id {
            ScreenId::Loading => self.loading.init(ctx),
            ScreenId::Standby => self.standby.init(ctx),
            ScreenId::Launcher => self.launcher.init(ctx),
        }
    }

    /// Makes `id` the only visible screen. Showing the active screen again
    /// does nothing.
    pub fn show<C: Clock>(
        &mut self,
        id: ScreenId,
        ctx: &ScreenContext<'_, T, C>,
        status: &DeviceStatus,
    ) -> bool {
        if self.active == Some(id) && self.is_visible(id) {
            return true;
        }

        if !self.init(id, ctx) {
            debug!("screen: {} unavailable; show skipped", id.label());
            return false;
        }

        // The previous screen stays active until the new surface is loaded.
        let shown = match id {
            ScreenId::Loading => self.loading.show(ctx),
            ScreenId::Standby => self.standby.show(ctx, status),
            ScreenId::Launcher => self.launcher.show(ctx),
        };
        if !shown {
            debug!("screen: {} load failed; keeping previous", id.label());
            return false;
        }

        if let Some(previous) = self.active.replace(id)
            && previous != id
        {
            self.hide_screen(previous);
        }
        debug!("screen: {} visible", id.label());
        true
    }

    /// Hides `id`; hiding a screen that is not visible does nothing.
    pub fn hide(&mut self, id: ScreenId) {
        if self.active == Some(id) {
            self.active = None;
        }
        self.hide_screen(id);
    }

    /// Hides whatever screen is active so an app surface can take over.
    pub fn deactivate(&mut self) {
        if let Some(id) = self.active.take() {
            self.hide_screen(id);
        }
    }

    /// Routes a launcher selection. The launcher hides itself either way.
    pub fn select_app(&mut self, kind: crate::app::AppKind) -> Option<crate::app::AppKind> {
        let chosen = self.launcher.select(kind);
        if self.active == Some(ScreenId::Launcher) {
            self.active = None;
        }
        chosen
    }

    /// Per-tick refresh of the visible screen.
    pub fn update_visible<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>, status: &DeviceStatus) {
        match self.active {
            Some(ScreenId::Loading) => self.loading.update(ctx),
            Some(ScreenId::Standby) => self.standby.update(ctx, status),
            Some(ScreenId::Launcher) | None => {}
        }
    }

    fn hide_screen(&mut self, id: ScreenId) {
        match id {
            ScreenId::Loading => self.loading.hide(),
            ScreenId::Standby => self.standby.hide(),
            ScreenId::Launcher => self.launcher.hide(),
        }
    }
}

#[cfg(test)]
mod tests;
