//! On-device mini-apps and the dispatch table that keeps one in front.

use core::fmt::Write;

use heapless::String;
use log::info;

use crate::{
    network::WifiStatus,
    render::{Align, Color, ElementSpec, FontSize, Icon, Placement, Toolkit, Wallpaper},
    screen::{ScreenContext, ScreenState},
    time::Clock,
    ui::DeviceStatus,
};

const APP_REFRESH_MS: u64 = 1_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AppKind {
    /// Voice question-and-answer app.
    SmartResponse,
    /// Companion chat app.
    MindMate,
}

impl AppKind {
    pub const COUNT: usize = 2;
    pub const ALL: [Self; Self::COUNT] = [Self::SmartResponse, Self::MindMate];

    pub const fn index(self) -> usize {
        match self {
            Self::SmartResponse => 0,
            Self::MindMate => 1,
        }
    }

    pub const fn descriptor(self) -> AppDescriptor {
        match self {
            Self::SmartResponse => AppDescriptor {
                kind: self,
                title: "Smart Response",
                tagline: "Hold to ask a question",
                icon: Icon::Microphone,
                accent: Color::ACCENT,
            },
            Self::MindMate => AppDescriptor {
                kind: self,
                title: "MindMate",
                tagline: "Your companion",
                icon: Icon::Companion,
                accent: Color(0x9B59B6),
            },
        }
    }
}

/// Static presentation data for an app.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AppDescriptor {
    pub kind: AppKind,
    pub title: &'static str,
    pub tagline: &'static str,
    pub icon: Icon,
    pub accent: Color,
}

/// Session screen shared by both apps; content comes from the descriptor.
pub struct PanelApp<T: Toolkit> {
    kind: AppKind,
    state: ScreenState,
    surface: Option<T::Surface>,
    status: Option<T::Element>,
    session: Option<T::Element>,
    running: bool,
    started_ms: u64,
    shows: u32,
    updates: u32,
}

impl<T: Toolkit> PanelApp<T> {
    pub const fn new(kind: AppKind) -> Self {
        Self {
            kind,
            state: ScreenState {
                constructed: false,
                visible: false,
                last_update_ms: None,
            },
            surface: None,
            status: None,
            session: None,
            running: false,
            started_ms: 0,
            shows: 0,
            updates: 0,
        }
    }

    pub const fn kind(&self) -> AppKind {
        self.kind
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub const fn show_count(&self) -> u32 {
        self.shows
    }

    pub const fn update_count(&self) -> u32 {
        self.updates
    }

    fn init<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>) -> bool {
        if self.state.constructed {
            return true;
        }
        if !ctx.display_ready() {
            return false;
        }
        let Some(surface) = ctx.create_surface(Wallpaper::Session) else {
            return false;
        };
        self.surface = Some(surface);

        let descriptor = self.kind.descriptor();
        ctx.create_element(
            surface,
            ElementSpec::Icon {
                icon: descriptor.icon,
                color: descriptor.accent,
            },
            Placement::new(Align::Center, 0, -110),
        );
        ctx.create_element(
            surface,
            ElementSpec::Label {
                text: descriptor.title,
                size: FontSize::Large,
                color: descriptor.accent,
            },
            Placement::new(Align::Center, 0, -40),
        );
        ctx.create_element(
            surface,
            ElementSpec::Label {
                text: descriptor.tagline,
                size: FontSize::Medium,
                color: Color::DIM,
            },
            Placement::new(Align::Center, 0, 0),
        );
        self.status = ctx.create_element(
            surface,
            ElementSpec::Label {
                text: "",
                size: FontSize::Medium,
                color: Color::WHITE,
            },
            Placement::new(Align::Center, 0, 60),
        );
        self.session = ctx.create_element(
            surface,
            ElementSpec::Label {
                text: "00:00",
                size: FontSize::Small,
                color: Color::GREY,
            },
            Placement::new(Align::BottomMid, 0, -40),
        );

        self.state.constructed = true;
        true
    }

    /// Brings the app to the front and marks it running. Without a display
    /// the app still runs headless.
    pub fn show<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>, status: &DeviceStatus) {
        self.shows = self.shows.saturating_add(1);
        self.running = true;
        self.started_ms = ctx.now_ms();
        self.state.last_update_ms = None;

        if self.init(ctx)
            && let Some(surface) = self.surface
        {
            self.state.visible = ctx.load(surface);
        }
        self.update(ctx, status);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.state.visible = false;
    }

    pub fn update<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>, status: &DeviceStatus) {
        if !self.running {
            return;
        }
        let now_ms = ctx.now_ms();
        if !self.state.refresh_due(now_ms, APP_REFRESH_MS) {
            return;
        }
        self.updates = self.updates.saturating_add(1);

        let line = match status.wifi {
            WifiStatus::Connected => "Listening...",
            WifiStatus::Connecting => "Connecting...",
            WifiStatus::Provisioning | WifiStatus::Offline => "Waiting for network",
        };
        ctx.set_text(self.status, line);

        let elapsed_secs = now_ms.saturating_sub(self.started_ms) / 1_000;
        let mut session: String<8> = String::new();
        let _ = write!(
            session,
            "{:02}:{:02}",
            (elapsed_secs / 60).min(99),
            elapsed_secs % 60
        );
        ctx.set_text(self.session, &session);
    }
}

/// Enum-keyed table of every app. At most one app runs at a time.
pub struct Apps<T: Toolkit> {
    slots: [PanelApp<T>; AppKind::COUNT],
}

impl<T: Toolkit> Default for Apps<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Toolkit> Apps<T> {
    pub const fn new() -> Self {
        Self {
            slots: [
                PanelApp::new(AppKind::SmartResponse),
                PanelApp::new(AppKind::MindMate),
            ],
        }
    }

    pub fn get(&self, kind: AppKind) -> &PanelApp<T> {
        &self.slots[kind.index()]
    }

    fn get_mut(&mut self, kind: AppKind) -> &mut PanelApp<T> {
        &mut self.slots[kind.index()]
    }

    pub fn is_running(&self, kind: AppKind) -> bool {
        self.get(kind).is_running()
    }

    pub fn show_count(&self, kind: AppKind) -> u32 {
        self.get(kind).show_count()
    }

    /// The running app, if any.
    pub fn foreground(&self) -> Option<AppKind> {
        AppKind::ALL.into_iter().find(|kind| self.is_running(*kind))
    }

    /// Stops whatever else is running, then shows `kind`.
    pub fn launch<C: Clock>(
        &mut self,
        kind: AppKind,
        ctx: &ScreenContext<'_, T, C>,
        status: &DeviceStatus,
    ) {
        for other in AppKind::ALL {
            if other != kind && self.is_running(other) {
                info!("app: stopping {} for {}", other.descriptor().title, kind.descriptor().title);
                self.get_mut(other).stop();
            }
        }
        self.get_mut(kind).show(ctx, status);
    }

    pub fn stop(&mut self, kind: AppKind) {
        if self.is_running(kind) {
            info!("app: {} stopped", kind.descriptor().title);
        }
        self.get_mut(kind).stop();
    }

    /// Calls `update()` on every running app.
    pub fn update_running<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>, status: &DeviceStatus) {
        for kind in AppKind::ALL {
            if self.is_running(kind) {
                self.get_mut(kind).update(ctx, status);
            }
        }
    }
}

#[cfg(test)]
mod tests;
