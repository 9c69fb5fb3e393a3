//! The annotation session: everything a single window edits, in one place.

use std::path::Path;

use image::DynamicImage;

use crate::buffer::{AnnotationBuffer, MarkerPosition};
use crate::config::{AnnotatorConfig, MAX_BRUSH_SIZE};
use crate::coverage::{self, VeinSignature};
use crate::error::Result;
use crate::export;
use crate::ledger::{Ledger, MeasurementRow};
use crate::tool::{MarkerStyle, ToolMode};

pub struct Session {
    buffer: Option<AnnotationBuffer>,
    tool: ToolMode,
    brush_size: u32,
    ledger: Ledger,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(AnnotatorConfig::default())
    }
}

impl Session {
    pub fn new(config: AnnotatorConfig) -> Self {
        let brush_size = config.default_brush_size.min(MAX_BRUSH_SIZE);
        Self {
            buffer: None,
            tool: ToolMode::default(),
            brush_size,
            ledger: Ledger::new(),
        }
    }

    pub fn buffer(&self) -> Option<&AnnotationBuffer> {
        self.buffer.as_ref()
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stomata_positions(&self) -> &[MarkerPosition] {
        self.buffer
            .as_ref()
            .map(AnnotationBuffer::stomata_positions)
            .unwrap_or(&[])
    }

    pub fn trichome_positions(&self) -> &[MarkerPosition] {
        self.buffer
            .as_ref()
            .map(AnnotationBuffer::trichome_positions)
            .unwrap_or(&[])
    }

    /// Decode and install an image file. On failure the current buffer is kept.
    pub fn open_image(&mut self, path: &Path) -> Result<()> {
        let buffer = AnnotationBuffer::open(path)?;
        log::info!("image loaded: {}", path.display());
        self.install(buffer);
        Ok(())
    }

    /// Install an already decoded image under `image_id`.
    pub fn load_image(&mut self, image_id: impl Into<String>, image: &DynamicImage) {
        self.install(AnnotationBuffer::from_image(image_id, image));
    }

    // Marker lists live inside the buffer, so replacing it clears them too.
    fn install(&mut self, buffer: AnnotationBuffer) {
        let (w, h) = buffer.dimensions();
        log::debug!("new buffer {} ({w}x{h})", buffer.image_id());
        self.buffer = Some(buffer);
    }

    pub fn select_tool(&mut self, tool: ToolMode) {
        if self.tool != tool {
            log::info!("switched to {} tool", tool.label());
        }
        self.tool = tool;
    }

    pub fn set_brush_size(&mut self, size: u32) {
        let size = size.min(MAX_BRUSH_SIZE);
        if self.brush_size != size {
            log::info!("brush size set to {size}");
        }
        self.brush_size = size;
    }

    /// A discrete click. Circle tools place (and record) one marker; the
    /// brush paints a single dab.
    pub fn on_pointer_down(&mut self, position: MarkerPosition) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        match self.tool {
            ToolMode::StomataCircle => {
                buffer.add_stomata(position, MarkerStyle::STOMATA)
            }
            ToolMode::TrichomeCircle => {
                buffer.add_trichome(position, MarkerStyle::TRICHOME)
            }
            ToolMode::VeinBrush => buffer.paint_vein(position, self.brush_size),
        }
        log::trace!("{} at ({}, {})", self.tool.label(), position.x, position.y);
    }

    /// Continuous pointer motion with the button held. Only the brush reacts.
    pub fn on_pointer_drag(&mut self, position: MarkerPosition) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        match self.tool {
            ToolMode::VeinBrush => buffer.paint_vein(position, self.brush_size),
            ToolMode::StomataCircle | ToolMode::TrichomeCircle => {}
        }
    }

    /// Measure the current buffer and append the result to the ledger.
    /// Without an image nothing is appended and `NoImageLoaded` is returned.
    pub fn calculate(&mut self) -> Result<&MeasurementRow> {
        let row = match coverage::calculate(self.buffer.as_ref(), &VeinSignature::default()) {
            Ok(row) => row,
            Err(e) => {
                log::warn!("cannot calculate: {e}");
                return Err(e);
            }
        };
        log::info!(
            "{}: stomata={} trichomes={} vein coverage={:.2}%",
            row.image_id,
            row.stomata_count,
            row.trichome_count,
            row.vein_coverage
        );
        Ok(self.ledger.append(row))
    }

    /// See [`export::export_to`].
    pub fn export_csv(&self, destination: Option<&Path>) -> Result<bool> {
        export::export_to(&self.ledger, destination)
    }
}
