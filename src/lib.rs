//! Manual annotation of leaf-surface micrographs.
//!
//! Stomata and trichomes are marked with circle outlines, veins are painted
//! with a red brush. A [`Session`] turns the annotations into a
//! [`MeasurementRow`] (marker counts and vein coverage) and collects rows in a
//! [`Ledger`] that can be exported as CSV.

pub mod buffer;
pub mod config;
pub mod coverage;
pub mod error;
pub mod export;
pub mod ledger;
pub mod raster;
pub mod session;
pub mod tool;

pub use buffer::{AnnotationBuffer, MarkerPosition};
pub use config::AnnotatorConfig;
pub use coverage::VeinSignature;
pub use error::{AnnotatorError, Result};
pub use ledger::{Ledger, MeasurementRow};
pub use session::Session;
pub use tool::{MarkerStyle, ToolMode};
