use chrono::NaiveDate;
use serde::Serialize;

use crate::sheet::COLUMNS;

/// One open posting as written to the sheet, columns A through E.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingRecord {
    pub company: String,
    pub role: String,
    pub location: String,
    pub link: String,
    pub posted: NaiveDate,
}

impl PostingRecord {
    /// Cell values in column order. The date is stored as an ISO value and
    /// rendered through the cell's number format.
    pub fn to_cells(&self) -> [String; COLUMNS] {
        [
            self.company.clone(),
            self.role.clone(),
            self.location.clone(),
            self.link.clone(),
            self.posted.format("%Y-%m-%d").to_string(),
        ]
    }
}
