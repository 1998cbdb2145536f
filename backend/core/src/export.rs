//! Session log export to an XLSX workbook.

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::PlateError;
use crate::session::SessionLog;

/// File name offered to the export consumer.
pub const EXPORT_FILE_NAME: &str = "matriculas.xlsx";

/// MIME type of the exported workbook.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Name of the single worksheet.
pub const SHEET_NAME: &str = "Sheet1";

/// Header row: record id, plate text, detection time.
pub const EXPORT_COLUMNS: [&str; 3] = ["GUID", "Matricula", "Fecha"];

/// Render the log as an XLSX workbook held in memory.
///
/// One header row followed by one row per record, in log order. Fails with
/// [`PlateError::EmptyLog`] when there is nothing to export.
pub fn export_xlsx(log: &SessionLog) -> Result<Vec<u8>, PlateError> {
    if log.is_empty() {
        return Err(PlateError::EmptyLog);
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in EXPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, record) in log.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, record.id())?;
        sheet.write_string(row, 1, record.plate_text())?;
        sheet.write_string(row, 2, record.detected_at_display())?;
    }

    sheet.set_column_width(0, 12)?;
    sheet.set_column_width(1, 16)?;
    sheet.set_column_width(2, 21)?;

    let buffer = workbook.save_to_buffer()?;
    info!(rows = log.len(), bytes = buffer.len(), "Exported session log");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectionRecord;
    use calamine::{Data, Range, Reader, Xlsx};
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn read_back(bytes: Vec<u8>) -> Range<Data> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        workbook.worksheet_range(SHEET_NAME).unwrap()
    }

    fn cells(range: &Range<Data>) -> Vec<Vec<String>> {
        range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn sample_log() -> SessionLog {
        let at = NaiveDate::from_ymd_opt(2025, 1, 31)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        let mut log = SessionLog::new();
        for plate in ["1234BCD", "M5678ZX", "1234BCD"] {
            log.append(DetectionRecord::at(plate, at).unwrap());
        }
        log
    }

    #[test]
    fn test_empty_log_is_refused() {
        assert!(matches!(export_xlsx(&SessionLog::new()), Err(PlateError::EmptyLog)));
    }

    #[test]
    fn test_export_has_header_plus_one_row_per_record() {
        let log = sample_log();
        let range = read_back(export_xlsx(&log).unwrap());

        assert_eq!(range.height(), log.len() + 1);
        assert_eq!(range.width(), EXPORT_COLUMNS.len());

        let rows = cells(&range);
        assert_eq!(rows[0], EXPORT_COLUMNS);

        for (row, record) in rows[1..].iter().zip(log.iter()) {
            assert_eq!(row[0], record.id());
            assert_eq!(row[1], record.plate_text());
            assert_eq!(row[2], "2025-01-31 23:59:01");
        }
    }

    #[test]
    fn test_export_cells_are_deterministic() {
        let log = sample_log();
        let first = read_back(export_xlsx(&log).unwrap());
        let second = read_back(export_xlsx(&log).unwrap());
        assert_eq!(cells(&first), cells(&second));
    }
}
