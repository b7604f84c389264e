use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::parser::{extract_link, parse_posting_date, strip_markup, table_rows, RawRow};
use crate::posting::PostingRecord;
use crate::sheet::{self, Column, MemorySheet, Sheet, COLUMNS, DATE_FORMAT};

pub const DEFAULT_CLOSED_MARKER: &str = "🔒";

/// Index of the "Date Posted" cell in a listings row.
const DATE_CELL: usize = 4;

/// What to do with postings dated on the high-water mark day itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameDayPolicy {
    /// Only strictly newer dates are appended.
    #[default]
    Drop,
    /// Same-day postings are appended unless an identical row is already in
    /// the sheet.
    Keep,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Year assumed for the "Mon DD" dates in the listings.
    pub reference_year: i32,
    pub closed_marker: String,
    pub same_day: SameDayPolicy,
}

impl SyncOptions {
    pub fn new(reference_year: i32) -> Self {
        Self {
            reference_year,
            closed_marker: DEFAULT_CLOSED_MARKER.to_string(),
            same_day: SameDayPolicy::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub high_water_mark: Option<NaiveDate>,
    /// Row the first new posting went to (or would go to).
    pub first_row: usize,
    pub appended: Vec<PostingRecord>,
    pub closed: usize,
    pub already_seen: usize,
    pub malformed: usize,
    pub bad_dates: usize,
}

impl SyncReport {
    pub fn skipped(&self) -> usize {
        self.closed + self.already_seen + self.malformed + self.bad_dates
    }
}

/// Verdict for a single listings row.
#[derive(Debug, PartialEq, Eq)]
enum Decision {
    Append(PostingRecord),
    Closed,
    AlreadySeen,
    Malformed,
    BadDate,
}

/// Append every open, unseen posting from `markdown` to the sheet.
///
/// Rows are taken bottom-up so the oldest listings land first. Each accepted
/// row is written on its own; a store error aborts the pass and leaves rows
/// already written in place.
pub fn run(
    markdown: &str,
    sheet: &mut dyn Sheet,
    options: &SyncOptions,
) -> Result<SyncReport, StoreError> {
    let mut rows: Vec<RawRow> = table_rows(markdown).collect();
    rows.reverse();

    let high_water_mark = sheet::high_water_mark(sheet)?;
    let mut next_row = sheet::last_filled_row(sheet)? + 1;
    info!(
        rows = rows.len(),
        high_water_mark = ?high_water_mark,
        next_row,
        "Starting sync"
    );

    // Full-range read only needed for the same-day duplicate check.
    let mut existing: Vec<[String; COLUMNS]> = match options.same_day {
        SameDayPolicy::Keep => sheet.range()?.into_iter().map(|r| r.cells).collect(),
        SameDayPolicy::Drop => Vec::new(),
    };

    let mut report = SyncReport {
        high_water_mark,
        first_row: next_row,
        ..Default::default()
    };

    for row in &rows {
        match decide(row, high_water_mark, options, &existing) {
            Decision::Append(record) => {
                sheet.write_row(next_row, &record.to_cells())?;
                sheet.set_number_format(next_row, Column::Posted, DATE_FORMAT)?;
                debug!(row = next_row, company = %record.company, "Appended posting");
                if options.same_day == SameDayPolicy::Keep {
                    existing.push(record.to_cells());
                }
                next_row += 1;
                report.appended.push(record);
            }
            Decision::Closed => report.closed += 1,
            Decision::AlreadySeen => report.already_seen += 1,
            Decision::Malformed => report.malformed += 1,
            Decision::BadDate => report.bad_dates += 1,
        }
    }

    info!(
        appended = report.appended.len(),
        skipped = report.skipped(),
        "Sync finished"
    );
    Ok(report)
}

/// Run the pass against an in-memory copy of `sheet`. The report lists what
/// would be appended; `sheet` itself is only read.
pub fn dry_run(
    markdown: &str,
    sheet: &dyn Sheet,
    options: &SyncOptions,
) -> Result<SyncReport, StoreError> {
    let mut snapshot = MemorySheet::from_rows(sheet.range()?);
    run(markdown, &mut snapshot, options)
}

fn decide(
    row: &[String],
    high_water_mark: Option<NaiveDate>,
    options: &SyncOptions,
    existing: &[[String; COLUMNS]],
) -> Decision {
    if is_closed(row, &options.closed_marker) {
        return Decision::Closed;
    }
    if row.len() < COLUMNS {
        warn!(cells = row.len(), row = ?row, "Skipping short table row");
        return Decision::Malformed;
    }

    let posted = match parse_posting_date(&row[DATE_CELL], options.reference_year) {
        Ok(date) => date,
        Err(e) => {
            warn!(company = %row[0], "Skipping row with bad date: {}", e);
            return Decision::BadDate;
        }
    };

    let fresh = match (high_water_mark, options.same_day) {
        (None, _) => true,
        (Some(mark), SameDayPolicy::Drop) => posted > mark,
        (Some(mark), SameDayPolicy::Keep) => posted >= mark,
    };
    if !fresh {
        return Decision::AlreadySeen;
    }

    let record = build_record(row, posted);
    if options.same_day == SameDayPolicy::Keep && existing.contains(&record.to_cells()) {
        return Decision::AlreadySeen;
    }
    Decision::Append(record)
}

fn is_closed(row: &[String], marker: &str) -> bool {
    !marker.is_empty() && row.iter().any(|cell| cell.contains(marker))
}

/// Expects at least five cells.
fn build_record(row: &[String], posted: NaiveDate) -> PostingRecord {
    PostingRecord {
        company: strip_markup(&row[0]),
        role: row[1].clone(),
        location: strip_markup(&row[2]),
        link: extract_link(&row[3]),
        posted,
    }
}

// ── Tests ──
