//! CSV and JSON output

use crate::error::LedgerError;
use crate::ledger::LedgerEntry;
use crate::processor::LedgerReport;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// UTF-8 byte-order mark; spreadsheet importers use it to detect the encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column headers: sequence, name, amount, notes
pub const CSV_HEADER: [&str; 4] = ["번호", "성명", "금액", "비고"];

/// Write entries to `path`, replacing any existing file
pub fn write_csv(entries: &[LedgerEntry], path: &Path) -> Result<(), LedgerError> {
    let file = File::create(path)
        .map_err(|e| LedgerError::WriteError(format!("{}: {}", path.display(), e)))?;

    write_csv_to(entries, BufWriter::new(file))
        .map_err(|e| LedgerError::WriteError(format!("{}: {}", path.display(), e)))?;

    tracing::info!("Wrote {} rows to {}", entries.len(), path.display());
    Ok(())
}

/// Write the BOM, header and one CRLF-terminated row per entry
pub fn write_csv_to<W: Write>(entries: &[LedgerEntry], mut writer: W) -> Result<(), LedgerError> {
    writer
        .write_all(UTF8_BOM)
        .map_err(|e| LedgerError::WriteError(e.to_string()))?;

    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    csv_writer
        .write_record(CSV_HEADER)
        .map_err(|e| LedgerError::WriteError(e.to_string()))?;

    for (idx, entry) in entries.iter().enumerate() {
        let sequence = (idx + 1).to_string();
        csv_writer
            .write_record([
                sequence.as_str(),
                entry.name.as_str(),
                entry.amount.as_str(),
                entry.notes.as_str(),
            ])
            .map_err(|e| LedgerError::WriteError(e.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|e| LedgerError::WriteError(e.to_string()))?;
    Ok(())
}

/// Pretty-printed JSON of a whole run
pub fn write_report(report: &LedgerReport, path: &Path) -> Result<(), LedgerError> {
    let file = File::create(path)
        .map_err(|e| LedgerError::WriteError(format!("{}: {}", path.display(), e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| LedgerError::WriteError(format!("{}: {}", path.display(), e)))?;
    writer
        .flush()
        .map_err(|e| LedgerError::WriteError(format!("{}: {}", path.display(), e)))?;

    tracing::info!("Wrote report to {}", path.display());
    Ok(())
}
