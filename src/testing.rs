//! Record builders shared by unit tests.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Booking, BookingStatus, ContactMessage, Feedback, Service};

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn instant(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
}

pub fn booking(name: &str, day: &str, time: &str) -> Booking {
    Booking {
        id: String::new(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "0400123456".to_string(),
        service: Service::Individual,
        date: date(day),
        time: time.to_string(),
        message: None,
        status: BookingStatus::Pending,
        created_at: Utc::now(),
        updated_at: None,
    }
}

pub fn feedback(name: &str, approved: bool) -> Feedback {
    Feedback {
        id: String::new(),
        name: name.to_string(),
        location: "Bengaluru".to_string(),
        kind: "Client".to_string(),
        message: format!("{name} found the sessions helpful."),
        approved,
        timestamp: Utc::now(),
        approved_at: None,
    }
}

pub fn contact(name: &str, at: &str) -> ContactMessage {
    ContactMessage {
        id: String::new(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: None,
        message: "Could you call me back about sessions?".to_string(),
        timestamp: instant(at),
    }
}
