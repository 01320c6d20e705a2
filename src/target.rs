//! Render targets the widget paints bar fills onto
//!
//! The widget only needs a handful of operations from whatever displays the
//! bars, so every surface is reached through [`RenderTarget`]:
//! - `memory`: records fills for headless hosts and tests
//! - `terminal`: one indicatif progress bar per widget bar
//! - `canvas`: fixed-size tiny-skia raster, exportable as PNG
//!
//! A target has a single writer: the widget it is attached to.

mod canvas;
mod memory;
mod terminal;

use thiserror::Error;

pub use canvas::{BAR_BACKGROUND, BAR_BORDER, BAR_GAP, CanvasTarget};
pub use memory::MemoryTarget;
pub use terminal::TerminalTarget;

/// Surface that displays a row of bars with individually settable fills
pub trait RenderTarget: Send {
    /// Show or hide the whole bar row
    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Replace any existing bars with exactly `count` empty placeholders
    fn attach_bars(&mut self, count: usize);

    /// Number of bars currently attached
    fn bar_count(&self) -> usize;

    /// Set the fill of one bar as a percentage (0-100) of its extent
    fn set_fill(&mut self, index: usize, percent: f64);
}

/// Render target error types
#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Invalid canvas size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("PNG encoding error: {0}")]
    Encode(String),
    #[error("Render target I/O error: {0}")]
    Io(#[from] std::io::Error),
}
