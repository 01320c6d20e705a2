//! tiny-skia raster render target

use super::{RenderTarget, TargetError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tiny_skia::{Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

/// Bar fill color (#ddd)
pub const BAR_BACKGROUND: [u8; 3] = [221, 221, 221];
/// Bar outline color (#ccc)
pub const BAR_BORDER: [u8; 3] = [204, 204, 204];
/// Horizontal space between neighbouring bars, in pixels
pub const BAR_GAP: f32 = 10.0;

#[derive(Debug)]
struct Frame {
    width: u32,
    height: u32,
    visible: bool,
    fills: Vec<f64>,
}

/// Fixed-size canvas holding a bottom-aligned row of bars.
///
/// Bars share the width equally with [`BAR_GAP`] between them; a bar's
/// height is its fill percentage of the canvas height. Clones share the
/// same frame, so a host can render what the owning widget last wrote.
#[derive(Debug, Clone)]
pub struct CanvasTarget {
    frame: Arc<Mutex<Frame>>,
}

impl CanvasTarget {
    pub fn new(width: u32, height: u32) -> Result<Self, TargetError> {
        if width == 0 || height == 0 {
            return Err(TargetError::InvalidSize { width, height });
        }

        Ok(Self {
            frame: Arc::new(Mutex::new(Frame {
                width,
                height,
                visible: false,
                fills: Vec::new(),
            })),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.frame
            .lock()
            .map(|frame| (frame.width, frame.height))
            .unwrap_or((0, 0))
    }

    /// Rasterize the current frame. A hidden canvas renders fully transparent.
    pub fn render(&self) -> Result<Pixmap, TargetError> {
        let (width, height, visible, fills) = {
            let frame = self
                .frame
                .lock()
                .map_err(|e| TargetError::Encode(format!("Canvas frame poisoned: {}", e)))?;
            (frame.width, frame.height, frame.visible, frame.fills.clone())
        };

        let mut pixmap =
            Pixmap::new(width, height).ok_or(TargetError::InvalidSize { width, height })?;

        if !visible || fills.is_empty() {
            return Ok(pixmap);
        }

        let count = fills.len() as f32;
        let gaps = BAR_GAP * (count - 1.0);
        let bar_width = ((width as f32 - gaps) / count).max(1.0);

        let mut fill_paint = Paint::default();
        fill_paint.set_color_rgba8(BAR_BACKGROUND[0], BAR_BACKGROUND[1], BAR_BACKGROUND[2], 255);

        let mut border_paint = Paint::default();
        border_paint.set_color_rgba8(BAR_BORDER[0], BAR_BORDER[1], BAR_BORDER[2], 255);
        let stroke = Stroke {
            width: 1.0,
            ..Default::default()
        };

        for (i, percent) in fills.iter().enumerate() {
            let bar_height = (height as f32 * (*percent as f32 / 100.0)).clamp(0.0, height as f32);
            let x = i as f32 * (bar_width + BAR_GAP);
            let y = height as f32 - bar_height;

            // An empty bar would otherwise leave a stroked hairline
            if bar_height <= 0.0 {
                continue;
            }

            let Some(rect) = Rect::from_xywh(x, y, bar_width, bar_height) else {
                continue;
            };

            pixmap.fill_rect(rect, &fill_paint, Transform::identity(), None);

            let outline = PathBuilder::from_rect(rect);
            pixmap.stroke_path(&outline, &border_paint, &stroke, Transform::identity(), None);
        }

        Ok(pixmap)
    }

    /// Render the current frame and write it as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), TargetError> {
        let data = self
            .render()?
            .encode_png()
            .map_err(|e| TargetError::Encode(e.to_string()))?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

impl RenderTarget for CanvasTarget {
    fn set_visible(&mut self, visible: bool) {
        if let Ok(mut frame) = self.frame.lock() {
            frame.visible = visible;
        }
    }

    fn is_visible(&self) -> bool {
        self.frame.lock().map(|frame| frame.visible).unwrap_or(false)
    }

    fn attach_bars(&mut self, count: usize) {
        if let Ok(mut frame) = self.frame.lock() {
            frame.fills = vec![0.0; count];
        }
    }

    fn bar_count(&self) -> usize {
        self.frame.lock().map(|frame| frame.fills.len()).unwrap_or(0)
    }

    fn set_fill(&mut self, index: usize, percent: f64) {
        if let Ok(mut frame) = self.frame.lock()
            && let Some(fill) = frame.fills.get_mut(index)
        {
            *fill = percent;
        }
    }
}
