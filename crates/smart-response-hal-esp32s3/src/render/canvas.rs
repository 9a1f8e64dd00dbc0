use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle},
    pixelcolor::{Rgb565, Rgb888},
    prelude::*,
    primitives::{Arc, Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle},
    text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder},
};
use heapless::{String, Vec};
use log::debug;
use profont::{PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT};
use smart_response_core::render::{
    Align, Color, ElementSpec, FontSize, Icon, Placement, Toolkit, Wallpaper, fill_truncated,
};

const MAX_SURFACES: usize = 8;
const MAX_ELEMENTS: usize = 48;
const TEXT_BYTES: usize = 48;

const ICON_SIZE: u32 = 32;
const BUTTON_ICON_SIZE: u32 = 48;
const SPINNER_STROKE: u32 = 6;
const SPINNER_SWEEP_DEG: f32 = 90.0;

const TOP_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();
const CENTERED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Top)
    .build();

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CanvasSurface(u8);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CanvasElement(u16);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CanvasError {
    OutOfMemory,
    UnknownSurface,
    UnknownElement,
    Draw,
}

#[derive(Clone, Copy, Debug)]
enum Shape {
    Label { size: FontSize },
    Button { width: u16, height: u16 },
    Bar { width: u16, height: u16 },
    Spinner { diameter: u16 },
    Icon,
}

#[derive(Clone, Debug)]
struct Node {
    surface: CanvasSurface,
    shape: Shape,
    placement: Placement,
    text: String<TEXT_BYTES>,
    color: Color,
    value: u16,
    icon: Icon,
}

/// Retained element tree drawn with embedded-graphics.
///
/// Mutations only mark the tree dirty; `flush` repaints the active surface
/// onto the target. Callers hold the display token for both.
pub struct CanvasToolkit<D> {
    target: D,
    surfaces: Vec<Wallpaper, MAX_SURFACES>,
    nodes: Vec<Node, MAX_ELEMENTS>,
    active: Option<CanvasSurface>,
    dirty: bool,
}

impl<D> CanvasToolkit<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            surfaces: Vec::new(),
            nodes: Vec::new(),
            active: None,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    /// Repaints the active surface if anything on it changed. Returns whether
    /// a frame was drawn.
    pub fn flush(&mut self) -> Result<bool, CanvasError> {
        let Some(active) = self.active.filter(|_| self.dirty) else {
            return Ok(false);
        };
        let wallpaper = self
            .surfaces
            .get(active.0 as usize)
            .copied()
            .ok_or(CanvasError::UnknownSurface)?;

        self.target
            .clear(wallpaper_color(wallpaper))
            .map_err(|_| CanvasError::Draw)?;

        let bounds = self.target.bounding_box().size;
        for node in self.nodes.iter().filter(|n| n.surface == active) {
            draw_node(&mut self.target, node, bounds).map_err(|_| CanvasError::Draw)?;
        }

        self.dirty = false;
        debug!("canvas: flushed surface={}", active.0);
        Ok(true)
    }

    fn node_mut(&mut self, element: CanvasElement) -> Result<&mut Node, CanvasError> {
        let active = self.active;
        let node = self
            .nodes
            .get_mut(element.0 as usize)
            .ok_or(CanvasError::UnknownElement)?;
        if active == Some(node.surface) {
            self.dirty = true;
        }
        Ok(node)
    }
}

impl<D> Toolkit for CanvasToolkit<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Surface = CanvasSurface;
    type Element = CanvasElement;
    type Error = CanvasError;

    fn create_surface(&mut self, wallpaper: Wallpaper) -> Result<CanvasSurface, CanvasError> {
        let id = CanvasSurface(self.surfaces.len() as u8);
        self.surfaces
            .push(wallpaper)
            .map_err(|_| CanvasError::OutOfMemory)?;
        Ok(id)
    }

    fn create_element(
        &mut self,
        surface: CanvasSurface,
        spec: ElementSpec<'_>,
        placement: Placement,
    ) -> Result<CanvasElement, CanvasError> {
        if surface.0 as usize >= self.surfaces.len() {
            return Err(CanvasError::UnknownSurface);
        }

        let mut node = Node {
            surface,
            shape: Shape::Icon,
            placement,
            text: String::new(),
            color: Color::WHITE,
            value: 0,
            icon: Icon::Companion,
        };
        match spec {
            ElementSpec::Label { text, size, color } => {
                node.shape = Shape::Label { size };
                fill_truncated(&mut node.text, text);
                node.color = color;
            }
            ElementSpec::Button {
                label,
                icon,
                width,
                height,
            } => {
                node.shape = Shape::Button { width, height };
                fill_truncated(&mut node.text, label);
                node.icon = icon;
            }
            ElementSpec::Bar { width, height } => {
                node.shape = Shape::Bar { width, height };
                node.color = Color::ACCENT;
            }
            ElementSpec::Spinner { diameter } => {
                node.shape = Shape::Spinner { diameter };
                node.color = Color::ACCENT;
            }
            ElementSpec::Icon { icon, color } => {
                node.icon = icon;
                node.color = color;
            }
        }

        let id = CanvasElement(self.nodes.len() as u16);
        self.nodes.push(node).map_err(|_| CanvasError::OutOfMemory)?;
        if self.active == Some(surface) {
            self.dirty = true;
        }
        Ok(id)
    }

    fn set_text(&mut self, element: CanvasElement, text: &str) -> Result<(), CanvasError> {
        fill_truncated(&mut self.node_mut(element)?.text, text);
        Ok(())
    }

    fn set_color(&mut self, element: CanvasElement, color: Color) -> Result<(), CanvasError> {
        self.node_mut(element)?.color = color;
        Ok(())
    }

    fn set_value(&mut self, element: CanvasElement, value: u16) -> Result<(), CanvasError> {
        self.node_mut(element)?.value = value;
        Ok(())
    }

    fn set_icon(&mut self, element: CanvasElement, icon: Icon) -> Result<(), CanvasError> {
        self.node_mut(element)?.icon = icon;
        Ok(())
    }

    fn load(&mut self, surface: CanvasSurface) -> Result<(), CanvasError> {
        if surface.0 as usize >= self.surfaces.len() {
            return Err(CanvasError::UnknownSurface);
        }
        self.active = Some(surface);
        self.dirty = true;
        Ok(())
    }

    fn active(&self) -> Option<CanvasSurface> {
        self.active
    }
}

fn font(size: FontSize) -> &'static MonoFont<'static> {
    match size {
        FontSize::Small => &PROFONT_12_POINT,
        FontSize::Medium => &PROFONT_14_POINT,
        FontSize::Large => &PROFONT_18_POINT,
        FontSize::Title => &PROFONT_24_POINT,
    }
}

fn rgb(color: Color) -> Rgb565 {
    let (r, g, b) = color.rgb();
    Rgb888::new(r, g, b).into()
}

fn wallpaper_color(wallpaper: Wallpaper) -> Rgb565 {
    rgb(match wallpaper {
        Wallpaper::Boot => Color::BLACK,
        Wallpaper::Home => Color(0x0B1A30),
        Wallpaper::Apps => Color(0x181818),
        Wallpaper::Session => Color(0x0E2218),
    })
}

fn text_width(font: &MonoFont<'_>, text: &str) -> u32 {
    let glyphs = text.chars().count() as u32;
    glyphs * (font.character_size.width + font.character_spacing)
}

fn node_size(node: &Node) -> Size {
    match node.shape {
        Shape::Label { size } => {
            let font = font(size);
            Size::new(text_width(font, &node.text), font.character_size.height)
        }
        Shape::Button { width, height } | Shape::Bar { width, height } => {
            Size::new(width as u32, height as u32)
        }
        Shape::Spinner { diameter } => Size::new(diameter as u32, diameter as u32),
        Shape::Icon => Size::new(ICON_SIZE, ICON_SIZE),
    }
}

/// Top-left corner of a `size` box anchored by `placement` inside `bounds`.
fn resolve(placement: Placement, size: Size, bounds: Size) -> Point {
    let free_w = bounds.width as i32 - size.width as i32;
    let free_h = bounds.height as i32 - size.height as i32;
    let (x, y) = match placement.align {
        Align::Center => (free_w / 2, free_h / 2),
        Align::TopLeft => (0, 0),
        Align::TopMid => (free_w / 2, 0),
        Align::TopRight => (free_w, 0),
        Align::BottomMid => (free_w / 2, free_h),
    };
    Point::new(x + placement.x as i32, y + placement.y as i32)
}

fn draw_node<D>(target: &mut D, node: &Node, bounds: Size) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let size = node_size(node);
    let origin = resolve(node.placement, size, bounds);
    let area = Rectangle::new(origin, size);

    match node.shape {
        Shape::Label { size } => {
            let style = MonoTextStyle::new(font(size), rgb(node.color));
            Text::with_text_style(&node.text, origin, style, TOP_LEFT).draw(target)?;
        }
        Shape::Button { .. } => {
            RoundedRectangle::with_equal_corners(area, Size::new(16, 16))
                .into_styled(PrimitiveStyle::with_fill(rgb(Color(0x2A2F38))))
                .draw(target)?;
            let icon_origin = Point::new(
                area.center().x - BUTTON_ICON_SIZE as i32 / 2,
                origin.y + 20,
            );
            draw_icon(target, node.icon, icon_origin, BUTTON_ICON_SIZE, Color::WHITE)?;
            let style = MonoTextStyle::new(&PROFONT_14_POINT, rgb(Color::WHITE));
            let label_y = origin.y + size.height as i32 - 30;
            Text::with_text_style(
                &node.text,
                Point::new(area.center().x, label_y),
                style,
                CENTERED,
            )
            .draw(target)?;
        }
        Shape::Bar { width, .. } => {
            area.into_styled(PrimitiveStyle::with_stroke(rgb(Color::DIM), 2))
                .draw(target)?;
            let filled = width as u32 * node.value.min(100) as u32 / 100;
            if filled > 0 {
                Rectangle::new(origin, Size::new(filled, size.height))
                    .into_styled(PrimitiveStyle::with_fill(rgb(node.color)))
                    .draw(target)?;
            }
        }
        Shape::Spinner { diameter } => {
            Circle::new(origin, diameter as u32)
                .into_styled(PrimitiveStyle::with_stroke(rgb(Color::GREY), SPINNER_STROKE))
                .draw(target)?;
            Arc::new(
                origin,
                diameter as u32,
                Angle::from_degrees((node.value % 360) as f32),
                Angle::from_degrees(SPINNER_SWEEP_DEG),
            )
            .into_styled(PrimitiveStyle::with_stroke(rgb(node.color), SPINNER_STROKE))
            .draw(target)?;
        }
        Shape::Icon => draw_icon(target, node.icon, origin, ICON_SIZE, node.color)?,
    }
    Ok(())
}

fn draw_icon<D>(
    target: &mut D,
    icon: Icon,
    origin: Point,
    size: u32,
    color: Color,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let s = size as i32;
    let stroke = PrimitiveStyle::with_stroke(rgb(color), 2);
    let fill = PrimitiveStyle::with_fill(rgb(color));

    match icon {
        Icon::BatteryFull | Icon::BatteryMedium | Icon::BatteryLow | Icon::BatteryCharging => {
            let body = Rectangle::new(
                Point::new(origin.x, origin.y + s / 4),
                Size::new(size - size / 8, size / 2),
            );
            body.into_styled(stroke).draw(target)?;
            Rectangle::new(
                Point::new(origin.x + s - s / 8, origin.y + s / 2 - s / 8),
                Size::new(size / 8, size / 4),
            )
            .into_styled(fill)
            .draw(target)?;

            let percent = match icon {
                Icon::BatteryFull | Icon::BatteryCharging => 100,
                Icon::BatteryMedium => 55,
                _ => 20,
            };
            let inner = body.offset(-3);
            let width = inner.size.width * percent / 100;
            Rectangle::new(inner.top_left, Size::new(width, inner.size.height))
                .into_styled(fill)
                .draw(target)?;

            if icon == Icon::BatteryCharging {
                let c = body.center();
                Line::new(
                    Point::new(c.x + s / 8, body.top_left.y),
                    Point::new(c.x - s / 8, c.y),
                )
                .into_styled(PrimitiveStyle::with_stroke(rgb(Color::BLACK), 2))
                .draw(target)?;
            }
        }
        Icon::WifiConnected | Icon::WifiDisconnected => {
            let base = Point::new(origin.x + s / 2, origin.y + s - 4);
            for ring in 1..=3 {
                let diameter = (size * ring / 3) as i32;
                Arc::new(
                    Point::new(base.x - diameter / 2, base.y - diameter / 2),
                    diameter as u32,
                    Angle::from_degrees(225.0),
                    Angle::from_degrees(90.0),
                )
                .into_styled(stroke)
                .draw(target)?;
            }
            if icon == Icon::WifiDisconnected {
                Line::new(origin, Point::new(origin.x + s, origin.y + s))
                    .into_styled(PrimitiveStyle::with_stroke(rgb(Color::RED), 3))
                    .draw(target)?;
            }
        }
        Icon::Microphone => {
            let capsule = Rectangle::new(
                Point::new(origin.x + s / 3, origin.y),
                Size::new(size / 3, size * 3 / 5),
            );
            RoundedRectangle::with_equal_corners(capsule, Size::new(size / 6, size / 6))
                .into_styled(fill)
                .draw(target)?;
            Line::new(
                Point::new(origin.x + s / 2, origin.y + s * 4 / 5),
                Point::new(origin.x + s / 2, origin.y + s),
            )
            .into_styled(stroke)
            .draw(target)?;
        }
        Icon::Companion => {
            Circle::new(Point::new(origin.x + s / 3, origin.y), size / 3)
                .into_styled(fill)
                .draw(target)?;
            Arc::new(
                Point::new(origin.x + s / 8, origin.y + s / 2),
                size * 3 / 4,
                Angle::from_degrees(180.0),
                Angle::from_degrees(180.0),
            )
            .into_styled(stroke)
            .draw(target)?;
        }
    }
    Ok(())
}
