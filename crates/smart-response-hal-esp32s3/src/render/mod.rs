mod canvas;

pub use canvas::{CanvasElement, CanvasError, CanvasSurface, CanvasToolkit};
