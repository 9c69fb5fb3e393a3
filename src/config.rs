//! Marker geometry constants and the user-adjustable brush default

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnnotatorError, Result};

pub const STOMATA_RADIUS: u32 = 40;
pub const TRICHOME_RADIUS: u32 = 40;
/// Outline width of circle markers, fixed regardless of radius.
pub const MARKER_STROKE_WIDTH: u32 = 3;
pub const DEFAULT_BRUSH_SIZE: u32 = 10;
pub const MAX_BRUSH_SIZE: u32 = 100;

/// Settings readable from a JSON file. Marker radii, outline width and the
/// vein color test are constants and cannot be set here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnnotatorConfig {
    pub default_brush_size: u32,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            default_brush_size: DEFAULT_BRUSH_SIZE,
        }
    }
}

impl AnnotatorConfig {
    /// Read a JSON config file. Missing fields fall back to the defaults,
    /// unknown fields are rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| AnnotatorError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&data).map_err(|source| AnnotatorError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.default_brush_size = config.default_brush_size.min(MAX_BRUSH_SIZE);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leafmark.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn empty_object_keeps_defaults() {
        let (_dir, path) = write_config("{}");
        assert_eq!(AnnotatorConfig::load(&path).unwrap(), AnnotatorConfig::default());
    }

    #[test]
    fn brush_default_is_read_and_clamped() {
        let (_dir, path) = write_config(r#"{ "default_brush_size": 25 }"#);
        assert_eq!(AnnotatorConfig::load(&path).unwrap().default_brush_size, 25);

        let (_dir, path) = write_config(r#"{ "default_brush_size": 500 }"#);
        assert_eq!(
            AnnotatorConfig::load(&path).unwrap().default_brush_size,
            MAX_BRUSH_SIZE
        );
    }

    #[test]
    fn fixed_marker_and_vein_settings_are_rejected() {
        for contents in [
            r#"{ "vein_signature": { "red_min": 0, "green_max": 255, "blue_max": 255 } }"#,
            r#"{ "marker_stroke_width": 0 }"#,
            r#"{ "stomata_radius": 4 }"#,
            r#"{ "trichome_radius": 4 }"#,
        ] {
            let (_dir, path) = write_config(contents);
            assert!(
                matches!(
                    AnnotatorConfig::load(&path),
                    Err(AnnotatorError::ConfigParse { .. })
                ),
                "accepted {contents}"
            );
        }
    }

    #[test]
    fn malformed_json_is_reported() {
        let (_dir, path) = write_config("{ not json");
        assert!(matches!(
            AnnotatorConfig::load(&path),
            Err(AnnotatorError::ConfigParse { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            AnnotatorConfig::load(&path),
            Err(AnnotatorError::Config { .. })
        ));
    }
}
