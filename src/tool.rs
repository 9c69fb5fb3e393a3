use image::Rgb;

use crate::config::{MARKER_STROKE_WIDTH, STOMATA_RADIUS, TRICHOME_RADIUS};
use crate::raster::{STOMATA_GREEN, TRICHOME_BLUE};

/// The active marking behavior. Exactly one is selected at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToolMode {
    #[default]
    StomataCircle,
    TrichomeCircle,
    VeinBrush,
}

impl ToolMode {
    pub const ALL: [ToolMode; 3] = [
        ToolMode::StomataCircle,
        ToolMode::TrichomeCircle,
        ToolMode::VeinBrush,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolMode::StomataCircle => "Stomata",
            ToolMode::TrichomeCircle => "Trichome",
            ToolMode::VeinBrush => "Vein Brush",
        }
    }

    /// Outline style for the circle tools, `None` for the brush.
    pub fn marker_style(self) -> Option<MarkerStyle> {
        match self {
            ToolMode::StomataCircle => Some(MarkerStyle::STOMATA),
            ToolMode::TrichomeCircle => Some(MarkerStyle::TRICHOME),
            ToolMode::VeinBrush => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerStyle {
    pub radius: u32,
    pub color: Rgb<u8>,
    pub stroke_width: u32,
}

impl MarkerStyle {
    pub const STOMATA: MarkerStyle = MarkerStyle {
        radius: STOMATA_RADIUS,
        color: STOMATA_GREEN,
        stroke_width: MARKER_STROKE_WIDTH,
    };

    pub const TRICHOME: MarkerStyle = MarkerStyle {
        radius: TRICHOME_RADIUS,
        color: TRICHOME_BLUE,
        stroke_width: MARKER_STROKE_WIDTH,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tool_is_stomata() {
        assert_eq!(ToolMode::default(), ToolMode::StomataCircle);
    }

    #[test]
    fn circle_tools_have_distinct_colors() {
        let stomata = ToolMode::StomataCircle.marker_style().unwrap();
        let trichome = ToolMode::TrichomeCircle.marker_style().unwrap();
        assert_ne!(stomata.color, trichome.color);
        assert_eq!(stomata.stroke_width, 3);
        assert_eq!(trichome.radius, 40);
        assert!(ToolMode::VeinBrush.marker_style().is_none());
    }
}
