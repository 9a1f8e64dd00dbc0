use heapless::String;

use super::{ScreenContext, ScreenState};
use crate::{
    render::{Align, Color, ElementSpec, FontSize, Placement, Toolkit, Wallpaper, fill_truncated},
    time::Clock,
};

pub const LOADING_INITIAL_MESSAGE: &str = "Initializing...";

const MESSAGE_BYTES: usize = 48;
const SPINNER_STEP_DEGREES: u16 = 5;

/// Clamps a requested percentage into 0..=100.
pub const fn clamp_percent(value: i16) -> u8 {
    if value < 0 {
        0
    } else if value > 100 {
        100
    } else {
        value as u8
    }
}

/// Boot splash: logo, spinner, message line, and progress bar.
pub struct LoadingScreen<T: Toolkit> {
    state: ScreenState,
    surface: Option<T::Surface>,
    spinner: Option<T::Element>,
    message: Option<T::Element>,
    bar: Option<T::Element>,
    message_text: String<MESSAGE_BYTES>,
    progress: u8,
    spinner_angle: u16,
}

impl<T: Toolkit> LoadingScreen<T> {
    pub const fn new() -> Self {
        Self {
            state: ScreenState {
                constructed: false,
                visible: false,
                last_update_ms: None,
            },
            surface: None,
            spinner: None,
            message: None,
            bar: None,
            message_text: String::new(),
            progress: 0,
            spinner_angle: 0,
        }
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn message(&self) -> &str {
        &self.message_text
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn spinner_angle(&self) -> u16 {
        self.spinner_angle
    }

    pub fn init<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>) -> bool {
        if self.state.constructed {
            return true;
        }
        if !ctx.display_ready() {
            return false;
        }
        let Some(surface) = ctx.create_surface(Wallpaper::Boot) else {
            return false;
        };
        self.surface = Some(surface);

        ctx.create_element(
            surface,
            ElementSpec::Label {
                text: "Smart Response",
                size: FontSize::Title,
                color: Color::WHITE,
            },
            Placement::new(Align::Center, 0, -100),
        );
        ctx.create_element(
            surface,
            ElementSpec::Label {
                text: "Designed by MindSpring",
                size: FontSize::Small,
                color: Color::GREY,
            },
            Placement::new(Align::Center, 0, -60),
        );
        self.spinner = ctx.create_element(
            surface,
            ElementSpec::Spinner { diameter: 60 },
            Placement::new(Align::Center, 0, 20),
        );
        self.message = ctx.create_element(
            surface,
            ElementSpec::Label {
                text: LOADING_INITIAL_MESSAGE,
                size: FontSize::Medium,
                color: Color::DIM,
            },
            Placement::new(Align::Center, 0, 90),
        );
        self.bar = ctx.create_element(
            surface,
            ElementSpec::Bar {
                width: 280,
                height: 10,
            },
            Placement::new(Align::Center, 0, 130),
        );

        self.state.constructed = true;
        true
    }

    /// Loads the splash and resets message and progress.
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
        self.state.last_update_ms = None;
        self.set_message(ctx, LOADING_INITIAL_MESSAGE);
        self.progress = 0;
        ctx.set_value(self.bar, 0);
        true
    }

    pub fn hide(&mut self) {
        self.state.visible = false;
    }

    pub fn set_message<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>, text: &str) {
        fill_truncated(&mut self.message_text, text);
        ctx.set_text(self.message, &self.message_text);
    }

    /// Returns the clamped value actually shown.
    pub fn set_progress<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>, percent: i16) -> u8 {
        self.progress = clamp_percent(percent);
        ctx.set_value(self.bar, self.progress as u16);
        self.progress
    }

    /// Spins the indicator; throttled to the configured frame interval.
    pub fn update<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>) {
        if !self.state.visible {
            return;
        }
        if !self
            .state
            .refresh_due(ctx.now_ms(), ctx.config.loading_frame_ms)
        {
            return;
        }
        self.spinner_angle = (self.spinner_angle + SPINNER_STEP_DEGREES) % 360;
        ctx.set_value(self.spinner, self.spinner_angle);
    }
}

impl<T: Toolkit> Default for LoadingScreen<T> {
    fn default() -> Self {
        Self::new()
    }
}
