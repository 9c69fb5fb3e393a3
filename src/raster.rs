//! Shape compositing onto image buffers (RGB display images and gray masks).
//!
//! Shapes are clipped to the image: any part of a circle or disc that falls
//! outside the image bounds is dropped without error.

use image::{ImageBuffer, Pixel, Rgb};

use crate::buffer::MarkerPosition;

pub const VEIN_RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const STOMATA_GREEN: Rgb<u8> = Rgb([0, 128, 0]);
pub const TRICHOME_BLUE: Rgb<u8> = Rgb([0, 0, 255]);

/// Visit every in-bounds pixel of the square `center ± radius`, passing the
/// squared distance from the center.
fn for_each_in_square(
    width: u32,
    height: u32,
    center: MarkerPosition,
    radius: u32,
    mut f: impl FnMut(u32, u32, i64),
) {
    let (w, h) = (width as i64, height as i64);
    let (cx, cy, r) = (center.x as i64, center.y as i64, radius as i64);

    let x0 = (cx - r).max(0);
    let x1 = (cx + r).min(w - 1);
    let y0 = (cy - r).max(0);
    let y1 = (cy + r).min(h - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }

    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = px - cx;
            let dy = py - cy;
            f(px as u32, py as u32, dx * dx + dy * dy);
        }
    }
}

/// Draw an unfilled ring. The stroke grows inward from `radius`; a stroke at
/// least as wide as the radius yields a filled disc.
pub fn composite_circle<P: Pixel>(
    img: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    center: MarkerPosition,
    radius: u32,
    color: P,
    stroke_width: u32,
) {
    let outer = radius as i64;
    let inner = outer - stroke_width as i64;
    let (w, h) = img.dimensions();
    for_each_in_square(w, h, center, radius, |px, py, d2| {
        if d2 <= outer * outer && (inner < 0 || d2 > inner * inner) {
            img.put_pixel(px, py, color);
        }
    });
}

/// Draw a filled disc. Radius 0 paints the single center pixel.
pub fn composite_filled_disc<P: Pixel>(
    img: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    center: MarkerPosition,
    radius: u32,
    color: P,
) {
    let r2 = (radius as i64) * (radius as i64);
    let (w, h) = img.dimensions();
    for_each_in_square(w, h, center, radius, |px, py, d2| {
        if d2 <= r2 {
            img.put_pixel(px, py, color);
        }
    });
}
