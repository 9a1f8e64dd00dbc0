use log::{info, warn};

use super::{Rect, ScreenContext, ScreenState};
use crate::{
    app::AppKind,
    config::DisplayGeometry,
    render::{Align, Color, ElementSpec, FontSize, Placement, Toolkit, Wallpaper},
    time::Clock,
};

pub const LAUNCHER_BUTTON_SIZE: u16 = 150;

const BUTTON_GAP: i16 = 40;
const FIRST_BUTTON_OFFSET: i16 = -170;

/// App grid. Selecting an app hides the launcher and hands the app back to
/// the caller for launching.
pub struct LauncherScreen<T: Toolkit> {
    state: ScreenState,
    surface: Option<T::Surface>,
    buttons: [Option<T::Element>; AppKind::COUNT],
    launch_enabled: bool,
}

impl<T: Toolkit> LauncherScreen<T> {
    pub const fn new() -> Self {
        Self {
            state: ScreenState {
                constructed: false,
                visible: false,
                last_update_ms: None,
            },
            surface: None,
            buttons: [None; AppKind::COUNT],
            launch_enabled: false,
        }
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// Screen-space bounds of the button for `kind`.
    pub fn button_rect(geometry: DisplayGeometry, kind: AppKind) -> Rect {
        let (center_x, center_y) = geometry.center();
        let size = LAUNCHER_BUTTON_SIZE as i16;
        let row = kind.index() as i16;
        Rect {
            x: center_x - size / 2,
            y: center_y + FIRST_BUTTON_OFFSET + row * (size + BUTTON_GAP),
            width: LAUNCHER_BUTTON_SIZE,
            height: LAUNCHER_BUTTON_SIZE,
        }
    }

    /// Allows selections to launch apps. Set once boot registers the
    /// launch handler.
    pub fn enable_launching(&mut self) {
        self.launch_enabled = true;
    }

    pub fn launch_enabled(&self) -> bool {
        self.launch_enabled
    }

    pub fn init<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>) -> bool {
        if self.state.constructed {
            return true;
        }
        if !ctx.display_ready() {
            return false;
        }
        let Some(surface) = ctx.create_surface(Wallpaper::Apps) else {
            return false;
        };
        self.surface = Some(surface);

        ctx.create_element(
            surface,
            ElementSpec::Label {
                text: "Apps",
                size: FontSize::Large,
                color: Color::WHITE,
            },
            Placement::new(Align::TopMid, 0, 24),
        );

        let geometry = ctx.geometry();
        for kind in AppKind::ALL {
            let descriptor = kind.descriptor();
            let rect = Self::button_rect(geometry, kind);
            self.buttons[kind.index()] = ctx.create_element(
                surface,
                ElementSpec::Button {
                    label: descriptor.title,
                    icon: descriptor.icon,
                    width: rect.width,
                    height: rect.height,
                },
                Placement::top_left(rect.x, rect.y),
            );
        }

        self.state.constructed = true;
        true
    }

    pub fn show<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>) -> bool {
        if !self.init(ctx) {
            return false;
        }
        let Some(surface) = self.surface else {
            return false;
        };
        if !ctx.load(surface) {
            return false;
        }
        self.state.visible = true;
        true
    }

    pub fn hide(&mut self) {
        self.state.visible = false;
    }

    /// App whose button contains the tap, if the launcher is visible.
    pub fn app_at(&self, geometry: DisplayGeometry, x: i16, y: i16) -> Option<AppKind> {
        if !self.state.visible {
            return None;
        }
        AppKind::ALL.into_iter().find(|kind| {
            self.buttons[kind.index()].is_some() && Self::button_rect(geometry, *kind).contains(x, y)
        })
    }

    /// Hides the launcher and returns the app to launch, if launching is
    /// enabled. Selections while hidden are ignored.
    pub fn select(&mut self, kind: AppKind) -> Option<AppKind> {
        if !self.state.visible {
            return None;
        }
        self.hide();

        if !self.launch_enabled {
            warn!("launcher: no launch handler; ignoring {}", kind.descriptor().title);
            return None;
        }
        info!("launcher: launching {}", kind.descriptor().title);
        Some(kind)
    }
}

impl<T: Toolkit> Default for LauncherScreen<T> {
    fn default() -> Self {
        Self::new()
    }
}
