use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

const MIN_NAME_CHARS: usize = 2;
const MIN_PHONE_CHARS: usize = 10;
const MIN_MESSAGE_CHARS: usize = 10;

/// A user-correctable problem with a submitted form. `Display` is the text
/// shown next to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid name.")]
    Name,
    #[error("Please enter a valid email address.")]
    Email,
    #[error("Please enter a valid phone number.")]
    Phone,
    #[error("Please select a service type.")]
    Service,
    #[error("Please select a preferred date.")]
    Date,
    #[error("Please select a preferred time.")]
    Time,
    #[error("Please select a future date.")]
    PastDate,
    #[error("Please enter a message (at least 10 characters).")]
    Message,
    #[error("Please enter feedback (at least 10 characters).")]
    Feedback,
}

fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

pub fn name(value: &str) -> Result<(), ValidationError> {
    if trimmed_len(value) < MIN_NAME_CHARS {
        return Err(ValidationError::Name);
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    if !EMAIL.is_match(value) {
        return Err(ValidationError::Email);
    }
    Ok(())
}

pub fn phone(value: &str) -> Result<(), ValidationError> {
    if trimmed_len(value) < MIN_PHONE_CHARS {
        return Err(ValidationError::Phone);
    }
    Ok(())
}

pub fn service(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Service);
    }
    Ok(())
}

pub fn contact_message(value: &str) -> Result<(), ValidationError> {
    if trimmed_len(value) < MIN_MESSAGE_CHARS {
        return Err(ValidationError::Message);
    }
    Ok(())
}

pub fn feedback_message(value: &str) -> Result<(), ValidationError> {
    if trimmed_len(value) < MIN_MESSAGE_CHARS {
        return Err(ValidationError::Feedback);
    }
    Ok(())
}

/// Parses a `YYYY-MM-DD` form value.
pub fn date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ValidationError::Date)
}

/// Parses an `HH:MM` form value; browsers may append seconds.
pub fn time(value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ValidationError::Time)
}

/// Only the calendar day is compared, so any time today is accepted.
pub fn not_before(day: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if day < today {
        return Err(ValidationError::PastDate);
    }
    Ok(())
}
