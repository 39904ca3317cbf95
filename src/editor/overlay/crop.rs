// SPDX-License-Identifier: MPL-2.0
//! Crop overlay renderer for interactive crop selection.
//!
//! The overlay is a transparent surface the size of the live canvas. While a
//! crop session is active it is veiled, the selection is punched out and
//! framed, and a dimension label is placed above it. The label text itself
//! is left to the shell, which owns fonts.

use crate::domain::geometry::Size;
use crate::editor::state::CropSession;
use crate::error::{Error, Result};
use tiny_skia::{
    BlendMode, Paint, PathBuilder, Pixmap, PixmapRef, Rect as SkRect, Stroke, StrokeDash,
    Transform,
};

const VEIL_ALPHA: u8 = 128;
const BORDER_COLOR: (u8, u8, u8) = (0x7c, 0x3a, 0xed);
const BORDER_WIDTH: f32 = 2.0;
const DASH: [f32; 2] = [5.0, 5.0];
const HANDLE_SIZE: f32 = 8.0;
const LABEL_OFFSET: f32 = 25.0;
const LABEL_WIDTH: f32 = 80.0;
const LABEL_HEIGHT: f32 = 20.0;
const LABEL_ALPHA: u8 = 204;

#[derive(Debug, Clone, Default)]
pub struct CropOverlay {
    surface: Option<Pixmap>,
    label: Option<String>,
}

impl CropOverlay {
    /// Makes the overlay visible at `size`, cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the surface cannot be allocated.
    pub fn show(&mut self, size: Size) -> Result<()> {
        let pixmap = Pixmap::new(size.width, size.height).ok_or_else(|| {
            Error::Image(format!(
                "invalid overlay size {}x{}",
                size.width, size.height
            ))
        })?;
        self.surface = Some(pixmap);
        self.label = None;
        Ok(())
    }

    pub fn hide(&mut self) {
        self.surface = None;
        self.label = None;
    }

    pub fn is_visible(&self) -> bool {
        self.surface.is_some()
    }

    pub fn size(&self) -> Option<Size> {
        self.surface
            .as_ref()
            .map(|p| Size::new(p.width(), p.height()))
    }

    pub fn as_pixmap(&self) -> Option<PixmapRef<'_>> {
        self.surface.as_ref().map(Pixmap::as_ref)
    }

    /// Text of the live `W × H` label, present while a rectangle exists.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Redraws the feedback for `session`.
    #[allow(clippy::cast_precision_loss)]
    pub fn draw(&mut self, session: &CropSession) {
        let Some(pixmap) = self.surface.as_mut() else {
            return;
        };
        pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.label = None;

        if !session.is_active() {
            return;
        }

        let mut veil = Paint::default();
        veil.set_color_rgba8(0, 0, 0, VEIL_ALPHA);
        veil.anti_alias = false;
        if let Some(full) = SkRect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)
        {
            pixmap.fill_rect(full, &veil, Transform::identity(), None);
        }

        let Some(rect) = session.rect() else {
            return;
        };
        let (x, y, w, h) = (
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        );

        if let Some(window) = SkRect::from_xywh(x, y, w, h) {
            let mut clear = Paint::default();
            clear.blend_mode = BlendMode::Clear;
            clear.anti_alias = false;
            pixmap.fill_rect(window, &clear, Transform::identity(), None);

            let mut border = Paint::default();
            border.set_color_rgba8(BORDER_COLOR.0, BORDER_COLOR.1, BORDER_COLOR.2, 255);
            let stroke = Stroke {
                width: BORDER_WIDTH,
                dash: StrokeDash::new(DASH.to_vec(), 0.0),
                ..Stroke::default()
            };
            let path = PathBuilder::from_rect(window);
            pixmap.stroke_path(&path, &border, &stroke, Transform::identity(), None);
        }

        let mut handle = Paint::default();
        handle.set_color_rgba8(BORDER_COLOR.0, BORDER_COLOR.1, BORDER_COLOR.2, 255);
        handle.anti_alias = false;
        let half = HANDLE_SIZE / 2.0;
        for (cx, cy) in [(x, y), (x + w, y), (x, y + h), (x + w, y + h)] {
            if let Some(r) = SkRect::from_xywh(cx - half, cy - half, HANDLE_SIZE, HANDLE_SIZE) {
                pixmap.fill_rect(r, &handle, Transform::identity(), None);
            }
        }

        let mut label_box = Paint::default();
        label_box.set_color_rgba8(0, 0, 0, LABEL_ALPHA);
        label_box.anti_alias = false;
        if let Some(r) = SkRect::from_xywh(x, y - LABEL_OFFSET, LABEL_WIDTH, LABEL_HEIGHT) {
            pixmap.fill_rect(r, &label_box, Transform::identity(), None);
        }
        self.label = Some(format!("{} × {}", rect.width, rect.height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Point;

    fn alpha_at(overlay: &CropOverlay, x: u32, y: u32) -> u8 {
        let pixmap = overlay.as_pixmap().expect("visible");
        pixmap.pixel(x, y).expect("in bounds").alpha()
    }

    fn selecting() -> CropSession {
        let mut session = CropSession::default();
        session.begin();
        session
    }

    #[test]
    fn hidden_overlay_draws_nothing() {
        let mut overlay = CropOverlay::default();
        overlay.draw(&selecting());
        assert!(!overlay.is_visible());
        assert!(overlay.label().is_none());
    }

    #[test]
    fn veil_covers_surface_before_drag() {
        let mut overlay = CropOverlay::default();
        overlay.show(Size::new(40, 40)).expect("show");
        overlay.draw(&selecting());
        assert_eq!(alpha_at(&overlay, 20, 20), VEIL_ALPHA);
        assert!(overlay.label().is_none());
    }

    #[test]
    fn selection_window_is_cleared_and_labelled() {
        let mut overlay = CropOverlay::default();
        overlay.show(Size::new(100, 100)).expect("show");
        let mut session = selecting();
        session.pointer_down(Point::new(5, 50));
        session.pointer_move(Point::new(40, 10));
        overlay.draw(&session);

        assert_eq!(alpha_at(&overlay, 22, 30), 0);
        assert_eq!(alpha_at(&overlay, 80, 80), VEIL_ALPHA);
        assert_eq!(overlay.label(), Some("35 × 40"));
    }

    #[test]
    fn idle_session_clears_overlay() {
        let mut overlay = CropOverlay::default();
        overlay.show(Size::new(10, 10)).expect("show");
        overlay.draw(&selecting());
        overlay.draw(&CropSession::default());
        assert_eq!(alpha_at(&overlay, 5, 5), 0);
    }

    #[test]
    fn hide_drops_surface() {
        let mut overlay = CropOverlay::default();
        overlay.show(Size::new(10, 10)).expect("show");
        overlay.hide();
        assert!(!overlay.is_visible());
        assert_eq!(overlay.size(), None);
    }
}
