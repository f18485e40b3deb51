//! Viewport and coordinate transformation for the drawing surface.
//!
//! Handles conversion between view pixels and document coordinates, zoom
//! and pan, and the autoscroll that interactive tools trigger while the
//! pointer lingers near an edge of the view. Both coordinate systems have
//! their origin at the top-left with Y growing downward.

use std::fmt;

use diagramkit_core::geometry::{Point, Rect};

/// Represents the viewport transformation state (zoom and pan).
#[derive(Debug, Clone)]
pub struct Viewport {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    view_width: f64,
    view_height: f64,
    autoscrolling: bool,
}

impl Viewport {
    /// Creates a new viewport with the given view size in pixels.
    pub fn new(view_width: f64, view_height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            view_width,
            view_height,
            autoscrolling: false,
        }
    }

    pub fn view_width(&self) -> f64 {
        self.view_width
    }

    pub fn view_height(&self) -> f64 {
        self.view_height
    }

    /// Sets the view dimensions (typically called when the window resizes).
    pub fn set_view_size(&mut self, width: f64, height: f64) {
        self.view_width = width;
        self.view_height = height;
    }

    /// Gets the current zoom level (1.0 = 100%).
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets the zoom level, constrained between 0.1 and 50.0.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > 0.1 && zoom < 50.0 {
            self.zoom = zoom;
        }
    }

    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan_x = x;
        self.pan_y = y;
    }

    /// Pans by a delta in view pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Converts view pixel coordinates to document coordinates.
    ///
    /// ```text
    /// doc = (pixel - pan) / zoom
    /// ```
    pub fn pixel_to_doc(&self, pixel_x: f64, pixel_y: f64) -> Point {
        Point::new(
            (pixel_x - self.pan_x) / self.zoom,
            (pixel_y - self.pan_y) / self.zoom,
        )
    }

    /// Converts document coordinates to view pixel coordinates.
    pub fn doc_to_pixel(&self, point: Point) -> (f64, f64) {
        (
            point.x * self.zoom + self.pan_x,
            point.y * self.zoom + self.pan_y,
        )
    }

    /// The part of the document currently visible.
    pub fn visible_doc_rect(&self) -> Rect {
        let top_left = self.pixel_to_doc(0.0, 0.0);
        Rect::new(
            top_left.x,
            top_left.y,
            self.view_width / self.zoom,
            self.view_height / self.zoom,
        )
    }

    /// Pans the view toward `point` when it lies within `margin` pixels of
    /// an edge, moving `step` pixels per call along each affected axis.
    ///
    /// Returns true while scrolling is in progress.
    pub fn autoscroll_toward(&mut self, point: Point, margin: f64, step: f64) -> bool {
        let (px, py) = self.doc_to_pixel(point);

        let dx = if px < margin {
            step
        } else if px > self.view_width - margin {
            -step
        } else {
            0.0
        };
        let dy = if py < margin {
            step
        } else if py > self.view_height - margin {
            -step
        } else {
            0.0
        };

        if dx == 0.0 && dy == 0.0 {
            self.stop_autoscroll();
            return false;
        }

        if !self.autoscrolling {
            tracing::trace!("Autoscroll started toward ({:.1}, {:.1})", point.x, point.y);
        }
        self.autoscrolling = true;
        self.pan_by(dx, dy);
        true
    }

    pub fn stop_autoscroll(&mut self) {
        self.autoscrolling = false;
    }

    pub fn is_autoscrolling(&self) -> bool {
        self.autoscrolling
    }

    /// Centers the viewport on a document point.
    pub fn center_on(&mut self, point: Point) {
        self.pan_x = self.view_width / 2.0 - point.x * self.zoom;
        self.pan_y = self.view_height / 2.0 - point.y * self.zoom;
    }

    /// Resets viewport to default state (1:1 zoom, no pan).
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.autoscrolling = false;
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.1}, {:.1})",
            self.zoom, self.pan_x, self.pan_y
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1200.0, 800.0)
    }
}
