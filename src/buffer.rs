//! Annotation buffer: an immutable source image plus the marker and vein
//! layers drawn on top of it.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma, RgbImage};

use crate::error::{AnnotatorError, Result};
use crate::raster::{self, VEIN_RED};
use crate::tool::MarkerStyle;

/// A marker center in buffer coordinates. May lie outside the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerPosition {
    pub x: i32,
    pub y: i32,
}

impl MarkerPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for MarkerPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug)]
struct PlacedMarker {
    position: MarkerPosition,
    style: MarkerStyle,
}

pub struct AnnotationBuffer {
    image_id: String,
    source: RgbImage,
    vein_mask: GrayImage,
    markers: Vec<PlacedMarker>,
    stomata: Vec<MarkerPosition>,
    trichomes: Vec<MarkerPosition>,
    revision: u64,
}

impl AnnotationBuffer {
    /// Wrap a decoded image. Any color layout is normalized to 8-bit RGB.
    pub fn from_image(image_id: impl Into<String>, image: &DynamicImage) -> Self {
        let source = image.to_rgb8();
        let vein_mask = GrayImage::new(source.width(), source.height());
        Self {
            image_id: image_id.into(),
            source,
            vein_mask,
            markers: Vec::new(),
            stomata: Vec::new(),
            trichomes: Vec::new(),
            revision: 0,
        }
    }

    /// Decode an image file. The identifier is the file name.
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|source| AnnotatorError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let image_id = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        Ok(Self::from_image(image_id, &image))
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    pub fn source(&self) -> &RgbImage {
        &self.source
    }

    pub fn stomata_positions(&self) -> &[MarkerPosition] {
        &self.stomata
    }

    pub fn trichome_positions(&self) -> &[MarkerPosition] {
        &self.trichomes
    }

    /// Bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn add_stomata(&mut self, position: MarkerPosition, style: MarkerStyle) {
        self.stomata.push(position);
        self.markers.push(PlacedMarker { position, style });
        self.revision += 1;
    }

    pub fn add_trichome(&mut self, position: MarkerPosition, style: MarkerStyle) {
        self.trichomes.push(position);
        self.markers.push(PlacedMarker { position, style });
        self.revision += 1;
    }

    pub fn paint_vein(&mut self, center: MarkerPosition, radius: u32) {
        raster::composite_filled_disc(&mut self.vein_mask, center, radius, Luma([255]));
        self.revision += 1;
    }

    /// Source with the vein mask painted in brush red. Markers are left out.
    pub fn vein_layer(&self) -> RgbImage {
        let mut out = self.source.clone();
        for (dst, m) in out.pixels_mut().zip(self.vein_mask.pixels()) {
            if m.0[0] != 0 {
                *dst = VEIN_RED;
            }
        }
        out
    }

    /// Full display image: source, vein mask, then marker outlines.
    pub fn composite(&self) -> RgbImage {
        let mut out = self.vein_layer();
        for marker in &self.markers {
            raster::composite_circle(
                &mut out,
                marker.position,
                marker.style.radius,
                marker.style.color,
                marker.style.stroke_width,
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::STOMATA_GREEN;
    use image::Rgb;

    fn style() -> MarkerStyle {
        MarkerStyle {
            radius: 5,
            color: STOMATA_GREEN,
            stroke_width: 3,
        }
    }

    #[test]
    fn grayscale_source_is_normalized_to_rgb() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 3, image::Luma([90])));
        let buffer = AnnotationBuffer::from_image("g.png", &gray);
        assert_eq!(buffer.dimensions(), (4, 3));
        assert_eq!(*buffer.source().get_pixel(0, 0), Rgb([90, 90, 90]));
    }

    #[test]
    fn painting_leaves_source_untouched() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([10, 10, 10])));
        let mut buffer = AnnotationBuffer::from_image("a.png", &img);
        buffer.paint_vein(MarkerPosition::new(10, 10), 3);
        buffer.add_stomata(MarkerPosition::new(5, 5), style());

        assert!(buffer.source().pixels().all(|p| *p == Rgb([10, 10, 10])));
        assert_eq!(*buffer.vein_layer().get_pixel(10, 10), VEIN_RED);
        assert_eq!(*buffer.composite().get_pixel(10, 5), STOMATA_GREEN);
        assert_eq!(buffer.revision(), 2);
    }

    #[test]
    fn vein_layer_excludes_markers() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(20, 20));
        let mut buffer = AnnotationBuffer::from_image("a.png", &img);
        buffer.add_trichome(MarkerPosition::new(10, 10), style());
        assert_eq!(buffer.vein_layer(), *buffer.source());
        assert_ne!(buffer.composite(), *buffer.source());
    }
}
