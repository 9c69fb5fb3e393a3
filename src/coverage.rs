//! Vein coverage and marker counts.

use image::{Rgb, RgbImage};

use crate::buffer::AnnotationBuffer;
use crate::error::{AnnotatorError, Result};
use crate::ledger::MeasurementRow;

/// Color test for brush-painted pixels. Only saturated red qualifies, so the
/// green and blue circle outlines never count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VeinSignature {
    /// Red channel must be strictly above this.
    pub red_min: u8,
    /// Green channel must be strictly below this.
    pub green_max: u8,
    /// Blue channel must be strictly below this.
    pub blue_max: u8,
}

impl Default for VeinSignature {
    fn default() -> Self {
        Self {
            red_min: 200,
            green_max: 50,
            blue_max: 50,
        }
    }
}

impl VeinSignature {
    #[inline]
    pub fn matches(&self, pixel: &Rgb<u8>) -> bool {
        let [r, g, b] = pixel.0;
        r > self.red_min && g < self.green_max && b < self.blue_max
    }
}

/// Percentage of pixels matching `signature`, rounded to two decimals.
/// An empty image has 0% coverage.
pub fn coverage_percent(image: &RgbImage, signature: &VeinSignature) -> f64 {
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let marked = image.pixels().filter(|p| signature.matches(p)).count() as u64;
    round2(marked as f64 / total as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reduce a buffer to a measurement row. Counts are the marker list lengths;
/// coverage is measured on the source plus vein layer only.
pub fn calculate(buffer: Option<&AnnotationBuffer>, signature: &VeinSignature) -> Result<MeasurementRow> {
    let buffer = buffer.ok_or(AnnotatorError::NoImageLoaded)?;
    Ok(MeasurementRow {
        image_id: buffer.image_id().to_string(),
        stomata_count: buffer.stomata_positions().len(),
        trichome_count: buffer.trichome_positions().len(),
        vein_coverage: coverage_percent(&buffer.vein_layer(), signature),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{STOMATA_GREEN, TRICHOME_BLUE, VEIN_RED};

    #[test]
    fn blank_image_has_zero_coverage() {
        let img = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));
        assert_eq!(coverage_percent(&img, &VeinSignature::default()), 0.0);
    }

    #[test]
    fn fully_red_image_has_full_coverage() {
        let img = RgbImage::from_pixel(50, 50, VEIN_RED);
        assert_eq!(coverage_percent(&img, &VeinSignature::default()), 100.0);
    }

    #[test]
    fn marker_colors_do_not_qualify() {
        let sig = VeinSignature::default();
        assert!(!sig.matches(&STOMATA_GREEN));
        assert!(!sig.matches(&TRICHOME_BLUE));
        assert!(sig.matches(&VEIN_RED));
    }

    #[test]
    fn thresholds_are_strict() {
        let sig = VeinSignature::default();
        assert!(!sig.matches(&Rgb([200, 0, 0])));
        assert!(sig.matches(&Rgb([201, 49, 49])));
        assert!(!sig.matches(&Rgb([255, 50, 0])));
        assert!(!sig.matches(&Rgb([255, 0, 50])));
    }

    #[test]
    fn rounds_to_two_decimals() {
        // 1 of 3 pixels -> 33.333...%
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(0, 0, VEIN_RED);
        assert_eq!(coverage_percent(&img, &VeinSignature::default()), 33.33);
    }

    #[test]
    fn empty_image_is_zero() {
        let img = RgbImage::new(0, 0);
        assert_eq!(coverage_percent(&img, &VeinSignature::default()), 0.0);
    }

    #[test]
    fn missing_buffer_is_an_error() {
        assert!(matches!(
            calculate(None, &VeinSignature::default()),
            Err(AnnotatorError::NoImageLoaded)
        ));
    }
}
