// SPDX-License-Identifier: MPL-2.0
//! Interactive crop selection.

use crate::domain::geometry::{DisplayRect, Point, Rect};
use crate::editor::Editor;
use crate::error::{EditError, Error, Result};
use crate::media::image_transform;
use crate::media::SourceImage;

/// Smallest accepted selection side, in raster pixels.
pub const MIN_CROP_SIDE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropPhase {
    #[default]
    Idle,
    /// The overlay is up; waiting for a drag to start.
    Selecting,
    /// A rectangle exists and can be applied.
    Selected,
}

/// Selection state in raster coordinates of the live canvas.
///
/// `rect` is recomputed from `start` and `end` on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CropSession {
    phase: CropPhase,
    start: Option<Point>,
    end: Option<Point>,
    rect: Option<Rect>,
}

impl CropSession {
    pub fn phase(&self) -> CropPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != CropPhase::Idle
    }

    pub fn start(&self) -> Option<Point> {
        self.start
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// Apply is only offered once a rectangle has been dragged out.
    pub fn can_apply(&self) -> bool {
        self.phase == CropPhase::Selected
    }

    /// Enters selection mode with a clean slate.
    pub fn begin(&mut self) {
        *self = Self {
            phase: CropPhase::Selecting,
            ..Self::default()
        };
    }

    /// Starts a new drag; any previous rectangle is discarded.
    pub fn pointer_down(&mut self, p: Point) {
        if !self.is_active() {
            return;
        }
        self.start = Some(p);
        self.end = None;
        self.rect = None;
        self.phase = CropPhase::Selecting;
    }

    /// Ignored until a drag has started.
    pub fn pointer_move(&mut self, p: Point) {
        if !self.is_active() || self.start.is_none() {
            return;
        }
        self.end = Some(p);
        self.update_rect();
        self.phase = CropPhase::Selected;
    }

    /// Ends a drag; a press followed directly by a release still selects.
    pub fn pointer_up(&mut self, p: Point) {
        if !self.is_active() || self.start.is_none() {
            return;
        }
        self.end = Some(p);
        self.update_rect();
        self.phase = CropPhase::Selected;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The selection if both sides reach [`MIN_CROP_SIDE`].
    ///
    /// # Errors
    ///
    /// Returns [`EditError::SelectionTooSmall`] otherwise.
    pub fn validated_rect(&self) -> std::result::Result<Rect, EditError> {
        match self.rect {
            Some(rect) if rect.is_at_least(MIN_CROP_SIDE) => Ok(rect),
            Some(rect) => Err(EditError::SelectionTooSmall {
                width: rect.width,
                height: rect.height,
            }),
            None => Err(EditError::SelectionTooSmall {
                width: 0,
                height: 0,
            }),
        }
    }

    fn update_rect(&mut self) {
        self.rect = match (self.start, self.end) {
            (Some(a), Some(b)) => Some(Rect::from_corners(a, b)),
            _ => None,
        };
    }
}

impl Editor {
    /// Opens a fresh crop selection over the live canvas.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoImage`] when nothing is loaded.
    pub fn start_crop(&mut self) -> Result<()> {
        let size = self.canvas_size().ok_or(EditError::NoImage)?;
        self.state.crop.begin();
        self.overlay.show(size)?;
        self.overlay.draw(&self.state.crop);
        tracing::debug!(width = size.width, height = size.height, "crop started");
        Ok(())
    }

    pub fn crop_pointer_down(&mut self, client_x: f32, client_y: f32, display: DisplayRect) {
        if let Some(p) = self.to_raster(client_x, client_y, display) {
            self.state.crop.pointer_down(p);
            self.overlay.draw(&self.state.crop);
        }
    }

    pub fn crop_pointer_move(&mut self, client_x: f32, client_y: f32, display: DisplayRect) {
        if let Some(p) = self.to_raster(client_x, client_y, display) {
            self.state.crop.pointer_move(p);
            self.overlay.draw(&self.state.crop);
        }
    }

    pub fn crop_pointer_up(&mut self, client_x: f32, client_y: f32, display: DisplayRect) {
        if let Some(p) = self.to_raster(client_x, client_y, display) {
            self.state.crop.pointer_up(p);
            self.overlay.draw(&self.state.crop);
        }
    }

    fn to_raster(&self, client_x: f32, client_y: f32, display: DisplayRect) -> Option<Point> {
        if !self.state.crop.is_active() {
            return None;
        }
        let size = self.canvas_size()?;
        Some(display.to_raster(client_x, client_y, size))
    }

    /// Replaces the source with the selected region of the rendered canvas.
    ///
    /// On validation failure the session stays open and nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::NoImage`], [`EditError::SelectionTooSmall`], or
    /// [`Error::Image`] if the region cannot be copied.
    pub async fn apply_crop(&mut self) -> Result<()> {
        let canvas = self.canvas.as_ref().ok_or(EditError::NoImage)?;
        let rect = self.state.crop.validated_rect()?;

        let cropped = image_transform::crop(canvas.as_pixmap(), rect).ok_or_else(|| {
            Error::Image(format!(
                "crop region {}x{} at {},{} is outside the canvas",
                rect.width, rect.height, rect.x, rect.y
            ))
        })?;

        tracing::info!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "crop applied"
        );
        self.state.crop.reset();
        self.overlay.hide();
        self.commit_raster(SourceImage::from_pixmap(cropped)).await
    }

    /// Leaves crop mode without touching the image.
    pub fn cancel_crop(&mut self) {
        if self.state.crop.is_active() {
            tracing::debug!("crop cancelled");
        }
        self.state.crop.reset();
        self.overlay.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dragged(a: (u32, u32), b: (u32, u32)) -> CropSession {
        let mut session = CropSession::default();
        session.begin();
        session.pointer_down(Point::new(a.0, a.1));
        session.pointer_move(Point::new(b.0, b.1));
        session.pointer_up(Point::new(b.0, b.1));
        session
    }

    #[test]
    fn rect_is_normalized_either_direction() {
        let expected = Rect::new(5, 10, 35, 40);
        assert_eq!(dragged((5, 50), (40, 10)).rect(), Some(expected));
        assert_eq!(dragged((40, 10), (5, 50)).rect(), Some(expected));
    }

    #[test]
    fn phases_follow_pointer_events() {
        let mut session = CropSession::default();
        assert_eq!(session.phase(), CropPhase::Idle);
        session.begin();
        assert_eq!(session.phase(), CropPhase::Selecting);
        assert!(!session.can_apply());

        // moving before pressing does nothing
        session.pointer_move(Point::new(3, 3));
        assert_eq!(session.phase(), CropPhase::Selecting);
        assert!(session.rect().is_none());

        session.pointer_down(Point::new(1, 1));
        session.pointer_move(Point::new(20, 20));
        assert_eq!(session.phase(), CropPhase::Selected);
        assert!(session.can_apply());
    }

    #[test]
    fn press_and_release_without_move_selects() {
        let mut session = CropSession::default();
        session.begin();
        session.pointer_down(Point::new(40, 10));
        session.pointer_up(Point::new(5, 50));
        assert_eq!(session.phase(), CropPhase::Selected);
        assert_eq!(session.rect(), Some(Rect::new(5, 10, 35, 40)));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut session = CropSession::default();
        session.begin();
        session.pointer_up(Point::new(9, 9));
        assert_eq!(session.phase(), CropPhase::Selecting);
        assert!(session.end().is_none());
    }

    #[test]
    fn pointer_down_clears_previous_selection() {
        let mut session = dragged((0, 0), (30, 30));
        session.pointer_down(Point::new(7, 7));
        assert_eq!(session.start(), Some(Point::new(7, 7)));
        assert!(session.end().is_none());
        assert!(session.rect().is_none());
        assert_eq!(session.phase(), CropPhase::Selecting);
        assert!(!session.can_apply());
    }

    #[test]
    fn idle_session_ignores_pointer() {
        let mut session = CropSession::default();
        session.pointer_down(Point::new(1, 1));
        session.pointer_up(Point::new(9, 9));
        assert_eq!(session, CropSession::default());
    }

    #[test]
    fn validation_threshold() {
        assert_eq!(
            dragged((0, 0), (5, 5)).validated_rect(),
            Err(EditError::SelectionTooSmall {
                width: 5,
                height: 5
            })
        );
        assert_eq!(
            dragged((0, 0), (10, 10)).validated_rect(),
            Ok(Rect::new(0, 0, 10, 10))
        );
        assert!(CropSession::default().validated_rect().is_err());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut session = dragged((0, 0), (30, 30));
        session.reset();
        assert_eq!(session, CropSession::default());
    }
}
