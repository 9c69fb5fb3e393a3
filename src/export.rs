//! CSV export of the measurement ledger.
//!
//! Rows are dumped positionally under a fixed header whose labels do not match
//! the row fields: image id lands under "Mask Type", stomata count under
//! "Area (%)", and so on.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{AnnotatorError, Result};
use crate::ledger::{Ledger, MeasurementRow};

pub const EXPORT_HEADER: [&str; 4] = ["Mask Type", "Area (%)", "Count", "Density"];

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn write_record<W: Write>(out: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    // records end in CRLF
    out.write_all(line.as_bytes())?;
    out.write_all(b"\r\n")
}

fn row_fields(row: &MeasurementRow) -> [String; 4] {
    [
        row.image_id.clone(),
        row.stomata_count.to_string(),
        row.trichome_count.to_string(),
        format!("{:.2}", row.vein_coverage),
    ]
}

/// Write the header and every ledger row, in ledger order.
pub fn write_csv<W: Write>(ledger: &Ledger, mut out: W) -> std::io::Result<()> {
    write_record(&mut out, &EXPORT_HEADER)?;
    for row in ledger.rows() {
        let fields = row_fields(row);
        let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
        write_record(&mut out, &refs)?;
    }
    out.flush()
}

/// Export to `destination`. `None` means the user cancelled the save dialog:
/// nothing is written and `Ok(false)` is returned.
pub fn export_to(ledger: &Ledger, destination: Option<&Path>) -> Result<bool> {
    let Some(path) = destination else {
        log::debug!("export cancelled, no destination chosen");
        return Ok(false);
    };

    let to_export_error = |source| AnnotatorError::Export {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_export_error)?;
    write_csv(ledger, BufWriter::new(file)).map_err(to_export_error)?;

    log::info!("exported {} rows to {}", ledger.len(), path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, stomata: usize, trichome: usize, coverage: f64) -> MeasurementRow {
        MeasurementRow {
            image_id: id.to_string(),
            stomata_count: stomata,
            trichome_count: trichome,
            vein_coverage: coverage,
        }
    }

    fn render(ledger: &Ledger) -> String {
        let mut out = Vec::new();
        write_csv(ledger, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_ledger_writes_header_only() {
        assert_eq!(render(&Ledger::new()), "Mask Type,Area (%),Count,Density\r\n");
    }

    #[test]
    fn rows_are_dumped_positionally() {
        let mut ledger = Ledger::new();
        ledger.append(row("leaf_01.png", 3, 2, 10.0));
        ledger.append(row("leaf_02.png", 0, 7, 4.5));

        let text = render(&ledger);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "leaf_01.png,3,2,10.00");
        assert_eq!(lines[2], "leaf_02.png,0,7,4.50");
    }

    #[test]
    fn awkward_image_names_are_quoted() {
        let mut ledger = Ledger::new();
        ledger.append(row("leaf, \"upper\".png", 1, 1, 0.0));
        let text = render(&ledger);
        assert!(text.contains("\"leaf, \"\"upper\"\".png\",1,1,0.00"));
    }

    #[test]
    fn cancelled_export_writes_nothing() {
        let ledger = Ledger::new();
        assert!(!export_to(&ledger, None).unwrap());
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        assert!(matches!(
            export_to(&Ledger::new(), Some(path.as_path())),
            Err(AnnotatorError::Export { .. })
        ));
    }
}
