use chrono::{Local, NaiveDate};
use serde::Serialize;

/// `YYYY-MM-DD`, the format the backend uses for `plannedDate`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's date on the local clock, formatted like `plannedDate`.
pub fn today() -> String {
    format_date(Local::now().date_naive())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
