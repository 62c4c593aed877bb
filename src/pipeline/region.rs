//! Region extraction: crop a block's image out of the page raster.
//!
//! Block polygons live in document space while the stored raster is a
//! lower-resolution render, so the box is rescaled per axis before cropping.
//! A small margin is added around the box; `crop_imm` clamps whatever falls
//! outside the raster, so no bounds handling happens here.

use crate::schema::{Block, Page};
use image::DynamicImage;
use tracing::trace;

/// Crop the raster region covering `block`, expanded symmetrically by
/// `margin` (a fraction of the box size per axis).
pub fn crop_block_region(page: &Page, block: &Block, margin: f32) -> DynamicImage {
    let raster = &page.lowres_image;
    let raster_size = (raster.width() as f32, raster.height() as f32);

    let (x, y, w, h) = block
        .polygon
        .rescale(page.polygon.size(), raster_size)
        .expand(margin, margin)
        .pixel_rect();

    trace!("Cropping block region at ({x}, {y}) size {w}×{h}");
    raster.crop_imm(x, y, w, h)
}
