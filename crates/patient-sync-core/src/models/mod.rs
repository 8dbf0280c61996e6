//! Domain models for the patient capture system.

mod assessment;
mod patient;
mod pending;
mod vitals;

pub use assessment::*;
pub use patient::*;
pub use pending::*;
pub use vitals::*;

use chrono::NaiveDate;

/// Wire and storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
}
