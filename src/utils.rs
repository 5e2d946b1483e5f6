//! Utility functions for the kiosk service

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Generate a unique id for one board render request
pub fn generate_request_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Today's calendar date in the upstream API's `YYYY-MM-DD` format
pub fn today_date_string() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` schedule date
pub fn parse_schedule_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
