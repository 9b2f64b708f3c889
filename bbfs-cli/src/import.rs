use anyhow::{Context, Result};
use std::path::Path;

use bbfs_db::models::Draw;

pub struct ImportResult {
    pub total_records: u32,
    pub added: u32,
    pub rejected: u32,
}

/// Reads results from the first field of each record. Rejected records are
/// reported and skipped.
pub fn import_file(path: &Path, delimiter: u8) -> Result<(Vec<Draw>, ImportResult)> {
    let reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;
    read_records(reader)
}

fn read_records<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<(Vec<Draw>, ImportResult)> {
    let mut draws = Vec::new();
    let mut result = ImportResult {
        total_records: 0,
        added: 0,
        rejected: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Cannot read record {}: {}", result.total_records, e);
                result.rejected += 1;
                continue;
            }
        };
        let field = record.get(0).unwrap_or_default().trim();
        match field.parse::<Draw>() {
            Ok(draw) => {
                draws.push(draw);
                result.added += 1;
            }
            Err(e) => {
                log::warn!("Record {}: {}", result.total_records, e);
                result.rejected += 1;
            }
        }
    }

    Ok((draws, result))
}
