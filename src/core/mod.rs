pub mod category;
pub mod query;
pub mod settings;
pub mod stats;
pub mod task;

use chrono::{DateTime, Local, NaiveDate, Utc};
use thiserror::Error;

/// Presence checks applied when a record is first created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("category name must not be empty")]
    EmptyName,
}

/// Truncate a timestamp to the calendar day it falls on in local time.
pub fn local_day(ts: &DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
