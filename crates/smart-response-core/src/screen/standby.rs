use core::fmt::Write;

use heapless::String;

use super::{ScreenContext, ScreenState};
use crate::{
    network::WifiStatus,
    peripherals::BatteryReading,
    render::{Align, Color, ElementSpec, FontSize, Icon, Placement, Toolkit, Wallpaper},
    time::Clock,
    ui::DeviceStatus,
};

const TIME_PLACEHOLDER: &str = "--:--:--";
const DATE_PLACEHOLDER: &str = "----------";

/// Label text, label color, and icon for a battery reading.
pub fn battery_presentation(reading: Option<BatteryReading>) -> (String<4>, Color, Icon) {
    let Some(reading) = reading else {
        let mut text = String::new();
        let _ = text.push_str("--%");
        return (text, Color::GREY, Icon::BatteryMedium);
    };

    let mut text = String::new();
    let _ = write!(text, "{}%", reading.level_percent);

    let (color, icon) = if reading.charging {
        (Color::GREEN, Icon::BatteryCharging)
    } else if reading.level_percent > 50 {
        (Color::GREEN, Icon::BatteryFull)
    } else if reading.level_percent > 20 {
        (Color::YELLOW, Icon::BatteryMedium)
    } else {
        (Color::RED, Icon::BatteryLow)
    };
    (text, color, icon)
}

pub const fn status_line(wifi: WifiStatus) -> (&'static str, Color) {
    match wifi {
        WifiStatus::Connected => ("Online", Color::GREEN),
        WifiStatus::Connecting => ("Connecting...", Color::YELLOW),
        WifiStatus::Provisioning => ("Setup mode", Color::YELLOW),
        WifiStatus::Offline => ("Offline", Color::RED),
    }
}

/// Home screen: clock, date, battery, and connectivity.
pub struct StandbyScreen<T: Toolkit> {
    state: ScreenState,
    surface: Option<T::Surface>,
    time: Option<T::Element>,
    date: Option<T::Element>,
    status: Option<T::Element>,
    battery_label: Option<T::Element>,
    battery_icon: Option<T::Element>,
    wifi_icon: Option<T::Element>,
    refreshes: u32,
}

impl<T: Toolkit> StandbyScreen<T> {
    pub const fn new() -> Self {
        Self {
            state: ScreenState {
                constructed: false,
                visible: false,
                last_update_ms: None,
            },
            surface: None,
            time: None,
            date: None,
            status: None,
            battery_label: None,
            battery_icon: None,
            wifi_icon: None,
            refreshes: 0,
        }
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// Number of throttled content refreshes so far.
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    pub fn init<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>) -> bool {
        if self.state.constructed {
            return true;
        }
        if !ctx.display_ready() {
            return false;
        }
        let Some(surface) = ctx.create_surface(Wallpaper::Home) else {
            return false;
        };
        self.surface = Some(surface);

        self.wifi_icon = ctx.create_element(
            surface,
            ElementSpec::Icon {
                icon: Icon::WifiDisconnected,
                color: Color::WHITE,
            },
            Placement::new(Align::TopLeft, 16, 12),
        );
        self.battery_icon = ctx.create_element(
            surface,
            ElementSpec::Icon {
                icon: Icon::BatteryMedium,
                color: Color::WHITE,
            },
            Placement::new(Align::TopRight, -70, 12),
        );
        self.battery_label = ctx.create_element(
            surface,
            ElementSpec::Label {
                text: "--%",
                size: FontSize::Small,
                color: Color::GREY,
            },
            Placement::new(Align::TopRight, -16, 16),
        );
        self.time = ctx.create_element(
            surface,
            ElementSpec::Label {
                text: TIME_PLACEHOLDER,
                size: FontSize::Title,
                color: Color::WHITE,
            },
            Placement::new(Align::Center, 0, -40),
        );
        self.date = ctx.create_element(
            surface,
            ElementSpec::Label {
                text: DATE_PLACEHOLDER,
                size: FontSize::Medium,
                color: Color::DIM,
            },
            Placement::new(Align::Center, 0, 10),
        );
        self.status = ctx.create_element(
            surface,
            ElementSpec::Label {
                text: "Offline",
                size: FontSize::Medium,
                color: Color::RED,
            },
            Placement::new(Align::BottomMid, 0, -40),
        );

        self.state.constructed = true;
        true
    }

    /// Loads the home screen and refreshes its content right away.
    pub fn show<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>, status: &DeviceStatus) -> bool {
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
        self.update(ctx, status);
        true
    }

    pub fn hide(&mut self) {
        self.state.visible = false;
    }

    pub fn update<C: Clock>(&mut self, ctx: &ScreenContext<'_, T, C>, status: &DeviceStatus) {
        if !self.state.visible {
            return;
        }
        if !self
            .state
            .refresh_due(ctx.now_ms(), ctx.config.standby_refresh_ms)
        {
            return;
        }
        self.refreshes = self.refreshes.saturating_add(1);

        match status.time {
            Some(now) => {
                ctx.set_text(self.time, &now.time_string());
                ctx.set_text(self.date, &now.date_string());
            }
            None => {
                ctx.set_text(self.time, TIME_PLACEHOLDER);
                ctx.set_text(self.date, DATE_PLACEHOLDER);
            }
        }

        let (battery_text, battery_color, battery_icon) = battery_presentation(status.battery);
        ctx.set_text(self.battery_label, &battery_text);
        ctx.set_color(self.battery_label, battery_color);
        ctx.set_icon(self.battery_icon, battery_icon);

        let wifi_icon = if status.wifi.is_connected() {
            Icon::WifiConnected
        } else {
            Icon::WifiDisconnected
        };
        ctx.set_icon(self.wifi_icon, wifi_icon);

        let (line, color) = status_line(status.wifi);
        ctx.set_text(self.status, line);
        ctx.set_color(self.status, color);
    }
}

impl<T: Toolkit> Default for StandbyScreen<T> {
    fn default() -> Self {
        Self::new()
    }
}
