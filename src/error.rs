use thiserror::Error;

/// Failure retrieving the listings document. Always fatal for a run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// A posting date cell that could not be turned into a calendar date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("Date {0:?} has no day part")]
    MissingDay(String),

    #[error("Unknown month name {0:?}")]
    UnknownMonth(String),

    #[error("Day {0:?} is not a number")]
    BadDay(String),

    #[error("{month} {day} is not a valid date in {year}")]
    OutOfRange { month: String, day: u32, year: i32 },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Sheet rows are 1-based, got row {0}")]
    InvalidRow(usize),
}
