use heapless::{String, Vec};

use super::{Color, ElementKind, ElementSpec, Icon, Placement, Toolkit, Wallpaper, fill_truncated};

const MAX_SURFACES: usize = 8;
const MAX_ELEMENTS: usize = 64;
const TEXT_BYTES: usize = 64;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SurfaceId(pub u8);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ElementId(pub u16);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordingError {
    OutOfMemory,
    UnknownSurface,
    UnknownElement,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedElement {
    pub surface: SurfaceId,
    pub kind: ElementKind,
    pub placement: Placement,
    pub text: String<TEXT_BYTES>,
    pub color: Option<Color>,
    pub value: u16,
    pub icon: Option<Icon>,
}

/// Toolkit that keeps the element tree in memory and draws nothing.
#[derive(Debug, Default)]
pub struct RecordingToolkit {
    surfaces: Vec<Wallpaper, MAX_SURFACES>,
    elements: Vec<RecordedElement, MAX_ELEMENTS>,
    active: Option<SurfaceId>,
    loads: u32,
    writes: u32,
    element_budget: Option<usize>,
}

impl RecordingToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Element creation fails once this many elements exist.
    pub fn with_element_budget(mut self, budget: usize) -> Self {
        self.element_budget = Some(budget);
        self
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn wallpaper(&self, surface: SurfaceId) -> Option<Wallpaper> {
        self.surfaces.get(surface.0 as usize).copied()
    }

    pub fn element(&self, id: ElementId) -> Option<&RecordedElement> {
        self.elements.get(id.0 as usize)
    }

    pub fn elements_on(&self, surface: SurfaceId) -> impl Iterator<Item = &RecordedElement> {
        self.elements.iter().filter(move |e| e.surface == surface)
    }

    /// First element on `surface` whose text equals `text`.
    pub fn find_text(&self, surface: SurfaceId, text: &str) -> Option<&RecordedElement> {
        self.elements_on(surface).find(|e| e.text.as_str() == text)
    }

    pub fn load_count(&self) -> u32 {
        self.loads
    }

    /// Property setter calls so far.
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut RecordedElement, RecordingError> {
        self.writes = self.writes.saturating_add(1);
        self.elements
            .get_mut(id.0 as usize)
            .ok_or(RecordingError::UnknownElement)
    }
}

impl Toolkit for RecordingToolkit {
    type Surface = SurfaceId;
    type Element = ElementId;
    type Error = RecordingError;

    fn create_surface(&mut self, wallpaper: Wallpaper) -> Result<SurfaceId, RecordingError> {
        let id = SurfaceId(self.surfaces.len() as u8);
        self.surfaces
            .push(wallpaper)
            .map_err(|_| RecordingError::OutOfMemory)?;
        Ok(id)
    }

    fn create_element(
        &mut self,
        surface: SurfaceId,
        spec: ElementSpec<'_>,
        placement: Placement,
    ) -> Result<ElementId, RecordingError> {
        if surface.0 as usize >= self.surfaces.len() {
            return Err(RecordingError::UnknownSurface);
        }
        if self
            .element_budget
            .is_some_and(|budget| self.elements.len() >= budget)
        {
            return Err(RecordingError::OutOfMemory);
        }

        let mut element = RecordedElement {
            surface,
            kind: spec.kind(),
            placement,
            text: String::new(),
            color: None,
            value: 0,
            icon: None,
        };
        match spec {
            ElementSpec::Label { text, color, .. } => {
                fill_truncated(&mut element.text, text);
                element.color = Some(color);
            }
            ElementSpec::Button { label, icon, .. } => {
                fill_truncated(&mut element.text, label);
                element.icon = Some(icon);
            }
            ElementSpec::Icon { icon, color } => {
                element.icon = Some(icon);
                element.color = Some(color);
            }
            ElementSpec::Bar { .. } | ElementSpec::Spinner { .. } => {}
        }

        let id = ElementId(self.elements.len() as u16);
        self.elements
            .push(element)
            .map_err(|_| RecordingError::OutOfMemory)?;
        Ok(id)
    }

    fn set_text(&mut self, element: ElementId, text: &str) -> Result<(), RecordingError> {
        fill_truncated(&mut self.element_mut(element)?.text, text);
        Ok(())
    }

    fn set_color(&mut self, element: ElementId, color: Color) -> Result<(), RecordingError> {
        self.element_mut(element)?.color = Some(color);
        Ok(())
    }

    fn set_value(&mut self, element: ElementId, value: u16) -> Result<(), RecordingError> {
        self.element_mut(element)?.value = value;
        Ok(())
    }

    fn set_icon(&mut self, element: ElementId, icon: Icon) -> Result<(), RecordingError> {
        self.element_mut(element)?.icon = Some(icon);
        Ok(())
    }

    fn load(&mut self, surface: SurfaceId) -> Result<(), RecordingError> {
        if surface.0 as usize >= self.surfaces.len() {
            return Err(RecordingError::UnknownSurface);
        }
        self.active = Some(surface);
        self.loads = self.loads.saturating_add(1);
        Ok(())
    }

    fn active(&self) -> Option<SurfaceId> {
        self.active
    }
}
