use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::models::LedgerRow;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const BOOKING_HEADERS: &[&str] = &[
    "Timestamp",
    "Service",
    "Date",
    "Time",
    "First Name",
    "Email",
    "Phone",
    "Message",
];

const ADMIN_HEADERS: &[&str] = &[
    "Name",
    "Room No",
    "Address",
    "Contact",
    "Payment Mode",
    "Time In",
    "Time Out",
    "Therapy Name",
    "Duration",
    "Therapist",
    "Date",
    "Membership",
    "Price",
];

#[derive(Debug, Error)]
#[error("spreadsheet export failed: {0}")]
pub struct ExportError(#[from] XlsxError);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Bookings,
    AdminVisits,
}

impl ReportKind {
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            ReportKind::Bookings => BOOKING_HEADERS,
            ReportKind::AdminVisits => ADMIN_HEADERS,
        }
    }

    fn sheet_name(self) -> &'static str {
        match self {
            ReportKind::Bookings => "Bookings",
            ReportKind::AdminVisits => "Customer Visits",
        }
    }
}

/// Regenerates the header row and maps every data row onto it. The ledger's
/// own header (row 0) is dropped; short rows are padded, extra cells cut.
pub fn table(kind: ReportKind, rows: &[LedgerRow]) -> Vec<Vec<String>> {
    let headers = kind.headers();
    let header = headers.iter().map(|name| name.to_string()).collect();

    std::iter::once(header)
        .chain(rows.iter().skip(1).map(|row| {
            (0..headers.len())
                .map(|column| row.get(column).cloned().unwrap_or_default())
                .collect()
        }))
        .collect()
}

pub fn export(kind: ReportKind, rows: &[LedgerRow]) -> Result<Vec<u8>, ExportError> {
    let table = table(kind, rows);
    let bold = Format::new().set_bold();

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(kind.sheet_name())?;

    for (row_index, row) in table.iter().enumerate() {
        for (column, value) in row.iter().enumerate() {
            let (row_index, column) = (row_index as u32, column as u16);
            if row_index == 0 {
                worksheet.write_string_with_format(row_index, column, value, &bold)?;
            } else {
                worksheet.write_string(row_index, column, value)?;
            }
        }
    }

    for column in 0..kind.headers().len() {
        worksheet.set_column_width(column as u16, 20)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> LedgerRow {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn booking_table_regenerates_header() {
        let rows = vec![
            row(&["ts", "svc", "d", "t", "name", "email", "phone", "msg"]),
            row(&["2025-01-01T08:00:00.000Z", "Massage", "2025-01-01", "10:00", "Ana", "N/A", "555-1234", ""]),
        ];

        let table = table(ReportKind::Bookings, &rows);
        assert_eq!(table.len(), 2);
        assert_eq!(table[0][0], "Timestamp");
        assert_eq!(table[0][4], "First Name");
        assert_eq!(table[1][4], "Ana");
    }

    #[test]
    fn admin_rows_are_padded_and_trimmed_to_headers() {
        let rows = vec![
            row(&["header"]),
            row(&["Mali", "12"]),
            row(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "extra"]),
        ];

        let table = table(ReportKind::AdminVisits, &rows);
        assert_eq!(table[0].len(), 13);
        assert_eq!(table[0][12], "Price");
        assert_eq!(table[1], {
            let mut expected = vec!["Mali".to_string(), "12".to_string()];
            expected.resize(13, String::new());
            expected
        });
        assert_eq!(table[2].len(), 13);
        assert_eq!(table[2][12], "m");
    }

    #[test]
    fn empty_input_still_builds_a_workbook() {
        let bytes = export(ReportKind::Bookings, &[]).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let header_only = export(ReportKind::AdminVisits, &[row(&["Name"])]).unwrap();
        assert!(header_only.starts_with(b"PK"));
    }

    #[test]
    fn export_produces_xlsx_archive() {
        let rows = vec![row(&["h"]), row(&["Mali", "3", "", "", "Cash"])];
        let bytes = export(ReportKind::AdminVisits, &rows).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 1000);
    }
}
