use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub const KEY_BOOKINGS: &str = "bookings";
pub const KEY_FEEDBACK: &str = "feedback";
pub const KEY_CONTACT: &str = "contactSubmissions";

/// A record kept in one of the named storage slots.
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync + 'static {
    const KEY: &'static str;

    fn id(&self) -> &str;

    /// Slot elements written before identifiers existed come back with an empty id.
    fn set_id(&mut self, id: String);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    /// Button caption for moving a booking into this status.
    pub fn action_label(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Reopen",
            BookingStatus::Confirmed => "Confirm",
            BookingStatus::Completed => "Complete",
            BookingStatus::Cancelled => "Cancel",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown booking status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value.trim())
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// The six services offered on the booking form. Anything else passes through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Service {
    Individual,
    Couples,
    Student,
    Behaviour,
    Speech,
    Professional,
    Other(String),
}

impl Service {
    pub const KNOWN: [Service; 6] = [
        Service::Individual,
        Service::Couples,
        Service::Student,
        Service::Behaviour,
        Service::Speech,
        Service::Professional,
    ];

    pub fn value(&self) -> &str {
        match self {
            Service::Individual => "individual",
            Service::Couples => "couples",
            Service::Student => "student",
            Service::Behaviour => "behaviour",
            Service::Speech => "speech",
            Service::Professional => "professional",
            Service::Other(raw) => raw,
        }
    }

    /// Name used on the public page and in confirmation emails.
    pub fn label(&self) -> &str {
        match self {
            Service::Individual => "Individual Counselling",
            Service::Couples => "Couples & Family Therapy",
            Service::Student => "Student Counselling",
            Service::Behaviour => "Behaviour Modification",
            Service::Speech => "Speech & Stuttering Therapy",
            Service::Professional => "Professional Support",
            Service::Other(raw) => raw,
        }
    }

    /// Compact name for admin tables.
    pub fn short_label(&self) -> &str {
        match self {
            Service::Individual => "Individual",
            Service::Couples => "Couples & Family",
            Service::Student => "Student",
            Service::Behaviour => "Behaviour",
            Service::Speech => "Speech & Stuttering",
            Service::Professional => "Professional",
            Service::Other(raw) => raw,
        }
    }
}

impl From<String> for Service {
    fn from(value: String) -> Self {
        match value.as_str() {
            "individual" => Service::Individual,
            "couples" => Service::Couples,
            "student" => Service::Student,
            "behaviour" => Service::Behaviour,
            "speech" => Service::Speech,
            "professional" => Service::Professional,
            _ => Service::Other(value),
        }
    }
}

impl From<Service> for String {
    fn from(service: Service) -> Self {
        match service {
            Service::Other(raw) => raw,
            known => known.value().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: Service,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Parsed appointment time. Older records may hold `9:30` or `09:30:00`.
    pub fn slot(&self) -> Option<NaiveTime> {
        let value = self.time.trim();
        NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .ok()
    }

    pub fn sort_key(&self) -> (NaiveDate, Option<NaiveTime>) {
        (self.date, self.slot())
    }
}

impl Record for Booking {
    const KEY: &'static str = KEY_BOOKINGS;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub approved: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
}

impl Feedback {
    /// Testimonials are ordered by approval time, falling back to submission time.
    pub fn recency(&self) -> DateTime<Utc> {
        self.approved_at.unwrap_or(self.timestamp)
    }

    /// `"{type}, {location}"`, skipping blank parts. Empty when both are blank.
    pub fn attribution(&self) -> String {
        [self.kind.trim(), self.location.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Record for Feedback {
    const KEY: &'static str = KEY_FEEDBACK;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Record for ContactMessage {
    const KEY: &'static str = KEY_CONTACT;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{booking, feedback};

    #[test]
    fn short_hours_sort_by_clock_time() {
        let early = booking("Early", "2026-10-19", "9:30");
        let late = booking("Late", "2026-10-19", "10:00");
        assert_eq!(early.slot(), NaiveTime::from_hms_opt(9, 30, 0));
        assert!(early.sort_key() < late.sort_key());
    }

    #[test]
    fn attribution_skips_blank_parts() {
        let mut item = feedback("Meera", true);
        assert_eq!(item.attribution(), "Client, Bengaluru");
        item.kind = "  ".into();
        assert_eq!(item.attribution(), "Bengaluru");
        item.location.clear();
        assert_eq!(item.attribution(), "");
    }

    #[test]
    fn legacy_booking_without_id_or_status_decodes() {
        let raw = r#"{
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "0400123456",
            "service": "couples",
            "date": "2026-10-21",
            "time": "14:30",
            "message": null,
            "createdAt": "2026-10-19T09:15:00.000Z",
            "timestamp": "2026-10-19T09:15:00.010Z"
        }"#;
        let booking: Booking = serde_json::from_str(raw).unwrap();
        assert!(booking.id.is_empty());
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.service, Service::Couples);
        assert_eq!(booking.date, NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());
    }

    #[test]
    fn unknown_service_passes_through() {
        let service: Service = serde_json::from_str("\"art-therapy\"").unwrap();
        assert_eq!(service, Service::Other("art-therapy".to_string()));
        assert_eq!(service.label(), "art-therapy");
        assert_eq!(serde_json::to_string(&service).unwrap(), "\"art-therapy\"");
    }

    #[test]
    fn feedback_keeps_type_field_name() {
        let feedback = Feedback {
            id: "f1".into(),
            name: "Ravi".into(),
            location: "Pune".into(),
            kind: "Parent".into(),
            message: "Very supportive sessions.".into(),
            approved: false,
            timestamp: Utc::now(),
            approved_at: None,
        };
        let value = serde_json::to_value(&feedback).unwrap();
        assert_eq!(value["type"], "Parent");
        assert!(value.get("approvedAt").is_none());
    }

    #[test]
    fn status_parses_from_form_value() {
        assert_eq!("confirmed".parse::<BookingStatus>(), Ok(BookingStatus::Confirmed));
        assert!("archived".parse::<BookingStatus>().is_err());
    }
}
