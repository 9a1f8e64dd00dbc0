//! Retained-mode widget toolkit interface used by screens and apps.

mod recording;

pub use recording::{
    ElementId, RecordedElement, RecordingError, RecordingToolkit, SurfaceId,
};

/// 24-bit RGB.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Self = Self(0xFFFFFF);
    pub const BLACK: Self = Self(0x000000);
    pub const GREY: Self = Self(0x888888);
    pub const DIM: Self = Self(0xCCCCCC);
    pub const GREEN: Self = Self(0x00FF00);
    pub const YELLOW: Self = Self(0xFFFF00);
    pub const RED: Self = Self(0xFF0000);
    pub const ACCENT: Self = Self(0x4A90D9);

    pub const fn rgb(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Align {
    Center,
    TopLeft,
    TopMid,
    TopRight,
    BottomMid,
}

/// Anchor plus offset, resolved by the toolkit against the surface size.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Placement {
    pub align: Align,
    pub x: i16,
    pub y: i16,
}

impl Placement {
    pub const fn new(align: Align, x: i16, y: i16) -> Self {
        Self { align, x, y }
    }

    pub const fn top_left(x: i16, y: i16) -> Self {
        Self::new(Align::TopLeft, x, y)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FontSize {
    Small,
    Medium,
    Large,
    Title,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Icon {
    BatteryFull,
    BatteryMedium,
    BatteryLow,
    BatteryCharging,
    WifiConnected,
    WifiDisconnected,
    Microphone,
    Companion,
}

/// Background of a surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Wallpaper {
    Boot,
    Home,
    Apps,
    Session,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ElementKind {
    Label,
    Button,
    Bar,
    Spinner,
    Icon,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ElementSpec<'a> {
    Label {
        text: &'a str,
        size: FontSize,
        color: Color,
    },
    Button {
        label: &'a str,
        icon: Icon,
        width: u16,
        height: u16,
    },
    /// Horizontal progress bar, value 0..=100.
    Bar { width: u16, height: u16 },
    /// Value is the arc start angle in degrees.
    Spinner { diameter: u16 },
    Icon { icon: Icon, color: Color },
}

impl ElementSpec<'_> {
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Label { .. } => ElementKind::Label,
            Self::Button { .. } => ElementKind::Button,
            Self::Bar { .. } => ElementKind::Bar,
            Self::Spinner { .. } => ElementKind::Spinner,
            Self::Icon { .. } => ElementKind::Icon,
        }
    }
}

/// Widget toolkit: surfaces own elements, exactly one surface is active.
///
/// Callers must hold the display token (see [`crate::display`]) for every
/// call; implementations do no locking of their own.
pub trait Toolkit {
    type Surface: Copy + Eq + core::fmt::Debug;
    type Element: Copy + Eq + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn create_surface(&mut self, wallpaper: Wallpaper) -> Result<Self::Surface, Self::Error>;
    fn create_element(
        &mut self,
        surface: Self::Surface,
        spec: ElementSpec<'_>,
        placement: Placement,
    ) -> Result<Self::Element, Self::Error>;

    fn set_text(&mut self, element: Self::Element, text: &str) -> Result<(), Self::Error>;
    fn set_color(&mut self, element: Self::Element, color: Color) -> Result<(), Self::Error>;
    fn set_value(&mut self, element: Self::Element, value: u16) -> Result<(), Self::Error>;
    fn set_icon(&mut self, element: Self::Element, icon: Icon) -> Result<(), Self::Error>;

    /// Makes `surface` the active one; the previous surface stops drawing.
    fn load(&mut self, surface: Self::Surface) -> Result<(), Self::Error>;
    fn active(&self) -> Option<Self::Surface>;
}

/// Replaces `dst` with as much of `text` as fits, cut on a char boundary.
pub fn fill_truncated<const N: usize>(dst: &mut heapless::String<N>, text: &str) {
    dst.clear();
    for ch in text.chars() {
        if dst.push(ch).is_err() {
            break;
        }
    }
}
