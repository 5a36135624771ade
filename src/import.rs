//! One-shot dataset import: CSV file → `medicines` table.
//!
//! Column mapping follows the published A–Z medicines dataset:
//! `price(₹)` becomes `price`, `Is_discontinued` becomes a boolean and
//! `name_lower` is derived from `name`. Existing rows are replaced in a
//! single transaction.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;

use crate::db::{self, DatabaseError};
use crate::models::MedicineRecord;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Cannot read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Result of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Positions of the dataset columns in the CSV header.
struct ColumnMap {
    id: usize,
    name: usize,
    price: Option<usize>,
    discontinued: Option<usize>,
    manufacturer: Option<usize>,
    medicine_type: Option<usize>,
    pack_size: Option<usize>,
    composition1: Option<usize>,
    composition2: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |aliases: &[&str]| header_position(headers, aliases);
        Ok(Self {
            id: find(&["id"][..]).ok_or(ImportError::MissingColumn("id"))?,
            name: find(&["name"][..]).ok_or(ImportError::MissingColumn("name"))?,
            price: find(&["price(₹)", "price"][..]),
            discontinued: find(&["Is_discontinued"][..]),
            manufacturer: find(&["manufacturer_name"][..]),
            medicine_type: find(&["type"][..]),
            pack_size: find(&["pack_size_label"][..]),
            composition1: find(&["short_composition1"][..]),
            composition2: find(&["short_composition2"][..]),
        })
    }

    fn record(&self, row: &csv::StringRecord) -> Option<MedicineRecord> {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let id = field(Some(self.id))?.parse::<i64>().ok()?;
        let name = field(Some(self.name))?;

        let mut record = MedicineRecord::new(id, name);
        record.price = field(self.price).and_then(|p| p.parse::<f64>().ok());
        record.is_discontinued = field(self.discontinued).map(parse_flag).unwrap_or(false);
        record.manufacturer_name = field(self.manufacturer).unwrap_or_default().to_string();
        record.medicine_type = field(self.medicine_type).unwrap_or_default().to_string();
        record.pack_size_label = field(self.pack_size).unwrap_or_default().to_string();
        record.composition1 = field(self.composition1).map(String::from);
        record.composition2 = field(self.composition2).map(String::from);
        Some(record)
    }
}

fn header_position(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim();
        aliases.iter().any(|a| h.eq_ignore_ascii_case(a))
    })
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "t"
    )
}

/// Import `csv_path` into the catalog at `db_path`, creating it if needed.
pub fn import_csv(csv_path: &Path, db_path: &Path) -> Result<ImportSummary, ImportError> {
    let file = File::open(csv_path)?;
    let mut conn = db::create_database(db_path)?;
    let summary = import_reader(file, &mut conn)?;
    tracing::info!(
        source = %csv_path.display(),
        target = %db_path.display(),
        imported = summary.imported,
        skipped = summary.skipped,
        "Dataset imported"
    );
    Ok(summary)
}

/// Replace the catalog contents with the rows read from `reader`.
pub fn import_reader<R: Read>(reader: R, conn: &mut Connection) -> Result<ImportSummary, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnMap::from_headers(csv_reader.headers()?)?;

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let replaced = db::clear_medicines(&tx)?;
    if replaced > 0 {
        tracing::info!(replaced, "Replacing existing catalog rows");
    }

    let mut summary = ImportSummary::default();
    let mut seen_ids = HashSet::new();
    for (line, row) in csv_reader.records().enumerate() {
        let row = row?;
        match columns.record(&row) {
            Some(record) if seen_ids.insert(record.id) => {
                if summary.imported < 5 {
                    tracing::debug!(id = record.id, name = %record.name, "Sample row");
                }
                db::insert_medicine(&tx, &record)?;
                summary.imported += 1;
            }
            Some(record) => {
                tracing::warn!(line = line + 2, id = record.id, "Duplicate id skipped");
                summary.skipped += 1;
            }
            None => {
                tracing::warn!(line = line + 2, "Row without usable id or name skipped");
                summary.skipped += 1;
            }
        }
    }

    tx.commit().map_err(DatabaseError::from)?;
    Ok(summary)
}
