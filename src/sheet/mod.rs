pub mod memory;
pub mod sqlite;

use chrono::NaiveDate;

use crate::error::StoreError;

pub use memory::MemorySheet;
pub use sqlite::SqliteSheet;

pub const COLUMNS: usize = 5;

/// Display format applied to the posted-date cell of every appended row.
pub const DATE_FORMAT: &str = "MM/dd/yyyy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Company,
    Role,
    Location,
    Link,
    Posted,
}

impl Column {
    pub const ALL: [Column; COLUMNS] = [
        Column::Company,
        Column::Role,
        Column::Location,
        Column::Link,
        Column::Posted,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    pub fn from_letter(letter: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| letter.len() == 1 && letter.starts_with(c.letter()))
    }
}

/// A populated sheet row as returned by a full-range read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based row number.
    pub row: usize,
    pub cells: [String; COLUMNS],
    pub formats: [Option<String>; COLUMNS],
}

impl SheetRow {
    pub fn cell(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }

    /// Cell text as a spreadsheet would show it: date values go through the
    /// cell's number format, everything else is shown verbatim.
    pub fn display(&self, column: Column) -> String {
        let value = self.cell(column);
        match (&self.formats[column.index()], parse_date_cell(value)) {
            (Some(format), Some(date)) => render_date(date, format),
            _ => value.to_string(),
        }
    }
}

/// The tabular store postings are appended to. Rows are 1-based.
pub trait Sheet {
    /// Cells of one column as `(row, value)` pairs for every stored row, in
    /// row order. Rows that were never written are absent.
    fn column(&self, column: Column) -> Result<Vec<(usize, String)>, StoreError>;

    /// All populated rows in row order.
    fn range(&self) -> Result<Vec<SheetRow>, StoreError>;

    fn write_row(&mut self, row: usize, values: &[String; COLUMNS]) -> Result<(), StoreError>;

    fn set_number_format(
        &mut self,
        row: usize,
        column: Column,
        format: &str,
    ) -> Result<(), StoreError>;
}

/// Row number of the last non-empty company cell, 0 for an empty sheet.
pub fn last_filled_row(sheet: &dyn Sheet) -> Result<usize, StoreError> {
    let companies = sheet.column(Column::Company)?;
    Ok(companies
        .iter()
        .rev()
        .find(|(_, cell)| !cell.trim().is_empty())
        .map_or(0, |(row, _)| *row))
}

/// Most recent posting date already in the sheet. Cells that are not dates
/// (a header row, blanks) are ignored.
pub fn high_water_mark(sheet: &dyn Sheet) -> Result<Option<NaiveDate>, StoreError> {
    let dates = sheet.column(Column::Posted)?;
    Ok(dates.iter().filter_map(|(_, cell)| parse_date_cell(cell)).max())
}

/// Date cells are stored as ISO dates; hand-entered US-style dates are
/// accepted too.
pub fn parse_date_cell(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()
}

/// Render a date through a spreadsheet number format such as `MM/dd/yyyy`.
pub fn render_date(date: NaiveDate, format: &str) -> String {
    let pattern = format
        .replace("yyyy", "%Y")
        .replace("MM", "%m")
        .replace("dd", "%d");
    date.format(&pattern).to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(company: &str, posted: &str) -> [String; COLUMNS] {
        [
            company.to_string(),
            "Intern".to_string(),
            "NYC".to_string(),
            "https://x.co".to_string(),
            posted.to_string(),
        ]
    }

    #[test]
    fn column_letters() {
        assert_eq!(Column::Company.letter(), 'A');
        assert_eq!(Column::Posted.letter(), 'E');
        assert_eq!(Column::from_letter("D"), Some(Column::Link));
        assert_eq!(Column::from_letter("F"), None);
        assert_eq!(Column::from_letter("AB"), None);
    }

    #[test]
    fn renders_us_date_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(render_date(date, DATE_FORMAT), "03/01/2025");
        assert_eq!(render_date(date, "yyyy-MM-dd"), "2025-03-01");
    }

    #[test]
    fn date_cells_accept_both_layouts() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert_eq!(parse_date_cell("2025-03-01"), d);
        assert_eq!(parse_date_cell("03/01/2025"), d);
        assert_eq!(parse_date_cell("Date Posted"), None);
        assert_eq!(parse_date_cell(""), None);
    }

    #[test]
    fn empty_sheet_has_no_mark_and_no_rows() {
        let sheet = MemorySheet::default();
        assert_eq!(last_filled_row(&sheet).unwrap(), 0);
        assert_eq!(high_water_mark(&sheet).unwrap(), None);
    }

    #[test]
    fn mark_ignores_header_and_takes_max() {
        let mut sheet = MemorySheet::default();
        sheet
            .write_row(1, &cells("Company", "Date Posted"))
            .unwrap();
        sheet.write_row(2, &cells("Acme", "2025-03-05")).unwrap();
        sheet.write_row(3, &cells("Globex", "2025-03-01")).unwrap();
        assert_eq!(
            high_water_mark(&sheet).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 5)
        );
        assert_eq!(last_filled_row(&sheet).unwrap(), 3);
    }

    #[test]
    fn last_row_scans_from_the_end_past_gaps() {
        let mut sheet = MemorySheet::default();
        sheet.write_row(2, &cells("Acme", "2025-03-05")).unwrap();
        sheet.write_row(5, &cells("Initech", "2025-03-06")).unwrap();
        sheet.write_row(6, &cells("", "2025-03-07")).unwrap();
        assert_eq!(last_filled_row(&sheet).unwrap(), 5);
    }

    #[test]
    fn far_away_row_number_is_cheap() {
        let mut sheet = MemorySheet::default();
        sheet.write_row(2, &cells("Acme", "2025-03-05")).unwrap();
        sheet
            .write_row(1_000_000_000, &cells("Initech", "2025-03-06"))
            .unwrap();
        assert_eq!(sheet.column(Column::Company).unwrap().len(), 2);
        assert_eq!(last_filled_row(&sheet).unwrap(), 1_000_000_000);
        assert_eq!(
            high_water_mark(&sheet).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 6)
        );
    }

    #[test]
    fn display_uses_format_only_for_dates() {
        let row = SheetRow {
            row: 1,
            cells: cells("Acme", "2025-03-01"),
            formats: [None, Some(DATE_FORMAT.into()), None, None, Some(DATE_FORMAT.into())],
        };
        assert_eq!(row.display(Column::Posted), "03/01/2025");
        assert_eq!(row.display(Column::Role), "Intern");
        assert_eq!(row.display(Column::Company), "Acme");
    }
}
