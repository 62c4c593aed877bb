//! Axis-aligned region geometry shared by pages, blocks, lines, and spans.
//!
//! All coordinates are `f32` in whatever space the owner lives in: pages and
//! blocks carry document-space boxes, while the region extractor rescales
//! them into raster pixel space before cropping. Keeping a single box type
//! for both spaces avoids a parallel type hierarchy; the conversion points
//! are explicit ([`PolygonBox::rescale`]).

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box, `(x0, y0)` top-left to `(x1, y1)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PolygonBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box spanning `(0, 0)` to `(width, height)` — page bounds.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// `(width, height)` pair.
    pub fn size(&self) -> (f32, f32) {
        (self.width(), self.height())
    }

    /// Map the box from one coordinate space to another, scaling each axis
    /// proportionally. `old` and `new` are the `(width, height)` of the two
    /// spaces.
    pub fn rescale(&self, old: (f32, f32), new: (f32, f32)) -> Self {
        let sx = if old.0 > 0.0 { new.0 / old.0 } else { 0.0 };
        let sy = if old.1 > 0.0 { new.1 / old.1 } else { 0.0 };
        Self::new(self.x0 * sx, self.y0 * sy, self.x1 * sx, self.y1 * sy)
    }

    /// Grow the box symmetrically outward by a fraction of its own size on
    /// each axis. The result may extend past the owning raster; clamping is
    /// the crop primitive's job.
    pub fn expand(&self, x_frac: f32, y_frac: f32) -> Self {
        let dx = self.width() * x_frac;
        let dy = self.height() * y_frac;
        Self::new(self.x0 - dx, self.y0 - dy, self.x1 + dx, self.y1 + dy)
    }

    /// Integer pixel rectangle `(x, y, width, height)` for cropping.
    ///
    /// Coordinates below zero vanish in the saturating float→int casts;
    /// overflow past the raster edge is clamped by `crop_imm` itself.
    pub fn pixel_rect(&self) -> (u32, u32, u32, u32) {
        let x0 = self.x0.max(0.0);
        let y0 = self.y0.max(0.0);
        let w = (self.x1 - x0).max(0.0);
        let h = (self.y1 - y0).max(0.0);
        (x0 as u32, y0 as u32, w.ceil() as u32, h.ceil() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_is_proportional_per_axis() {
        let b = PolygonBox::new(10.0, 20.0, 110.0, 70.0);
        let scaled = b.rescale((200.0, 100.0), (100.0, 400.0));
        assert_eq!(scaled, PolygonBox::new(5.0, 80.0, 55.0, 280.0));
    }

    #[test]
    fn expand_grows_symmetrically() {
        let b = PolygonBox::new(100.0, 100.0, 200.0, 150.0);
        let e = b.expand(0.01, 0.01);
        assert!((e.x0 - 99.0).abs() < 1e-4);
        assert!((e.x1 - 201.0).abs() < 1e-4);
        assert!((e.y0 - 99.5).abs() < 1e-4);
        assert!((e.y1 - 150.5).abs() < 1e-4);
    }

    #[test]
    fn pixel_rect_drops_negative_origin() {
        let b = PolygonBox::new(-5.0, -2.0, 30.0, 20.0);
        assert_eq!(b.pixel_rect(), (0, 0, 30, 20));
    }

    #[test]
    fn pixel_rect_of_degenerate_box_is_empty() {
        let b = PolygonBox::new(50.0, 50.0, 40.0, 40.0);
        let (_, _, w, h) = b.pixel_rect();
        assert_eq!((w, h), (0, 0));
    }
}
