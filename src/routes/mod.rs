pub mod admin;
pub mod public;

use chrono::{Local, NaiveDate};

/// Calendar day used for booking validation and the admin "today" tab.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
