/// Display column names, in row field order.
pub const COLUMNS: [&str; 4] = ["Image ID", "Stomata Count", "Trichome Count", "Vein Coverage"];

/// One calculated result. Rows are never edited after being appended.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementRow {
    pub image_id: String,
    pub stomata_count: usize,
    pub trichome_count: usize,
    /// Percentage of vein-marked pixels, two decimals.
    pub vein_coverage: f64,
}

/// Append-only list of measurement rows for the lifetime of the program.
/// Recalculating an image adds a new row instead of replacing the old one.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    rows: Vec<MeasurementRow>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, row: MeasurementRow) -> &MeasurementRow {
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, stomata: usize) -> MeasurementRow {
        MeasurementRow {
            image_id: id.to_string(),
            stomata_count: stomata,
            trichome_count: 0,
            vein_coverage: 0.0,
        }
    }

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let mut ledger = Ledger::new();
        ledger.append(row("a.png", 1));
        ledger.append(row("b.png", 2));
        ledger.append(row("a.png", 1));

        let ids: Vec<_> = ledger.rows().iter().map(|r| r.image_id.as_str()).collect();
        assert_eq!(ids, ["a.png", "b.png", "a.png"]);
        assert_eq!(ledger.len(), 3);
    }
}
