use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::{
    models::{Booking, BookingStatus, ContactMessage, Feedback, Service},
    notify::NotifyOutcome,
    state::AppState,
    validate::{self, ValidationError},
};

pub const CONTACT_SENT: &str = "Thank you! Your message has been sent. We will get back to you soon.";
pub const CONTACT_RECEIVED: &str =
    "Thank you! Your message has been received. We will get back to you soon.";
pub const FEEDBACK_RECEIVED: &str =
    "Thank you for your feedback! It will be reviewed and may be added to our testimonials.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

/// What happened to an accepted submission after validation.
#[derive(Debug, Clone)]
pub struct Accepted<T> {
    pub record: T,
    /// False when the store write failed; the visitor is still thanked.
    pub persisted: bool,
    /// `None` for forms that never notify.
    pub notification: Option<NotifyOutcome>,
}

impl Accepted<ContactMessage> {
    pub fn success_message(&self) -> &'static str {
        match self.notification {
            Some(NotifyOutcome::Failed) => CONTACT_RECEIVED,
            _ => CONTACT_SENT,
        }
    }
}

pub fn check_contact(form: &ContactForm) -> Result<(), ValidationError> {
    validate::name(&form.name)?;
    validate::email(&form.email)?;
    validate::contact_message(&form.message)?;
    Ok(())
}

/// Returns the parsed booking date and time on success.
pub fn check_booking(
    form: &BookingForm,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveTime), ValidationError> {
    validate::name(&form.name)?;
    validate::email(&form.email)?;
    validate::phone(&form.phone)?;
    validate::service(&form.service)?;
    let date = validate::date(&form.date)?;
    let time = validate::time(&form.time)?;
    validate::not_before(date, today)?;
    Ok((date, time))
}

pub fn check_feedback(form: &FeedbackForm) -> Result<(), ValidationError> {
    validate::name(&form.name)?;
    validate::feedback_message(&form.message)?;
    Ok(())
}

pub async fn submit_contact(
    state: &AppState,
    form: ContactForm,
) -> Result<Accepted<ContactMessage>, ValidationError> {
    check_contact(&form)?;

    let record = ContactMessage {
        id: String::new(),
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: non_blank(form.phone),
        message: form.message,
        timestamp: Utc::now(),
    };
    let (record, persisted) = persist(state.messages.append(record.clone()).await, record);
    let notification = state.mailer.send_contact(&record).await;

    Ok(Accepted {
        record,
        persisted,
        notification: Some(notification),
    })
}

pub async fn submit_booking(
    state: &AppState,
    form: BookingForm,
    today: NaiveDate,
) -> Result<Accepted<Booking>, ValidationError> {
    let (date, time) = check_booking(&form, today)?;

    let record = Booking {
        id: String::new(),
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        service: Service::from(form.service.trim().to_string()),
        date,
        time: time.format("%H:%M").to_string(),
        message: non_blank(form.message),
        status: BookingStatus::Pending,
        created_at: Utc::now(),
        updated_at: None,
    };
    let (record, persisted) = persist(state.bookings.append(record.clone()).await, record);
    let notification = state.mailer.send_booking(&record).await;

    Ok(Accepted {
        record,
        persisted,
        notification: Some(notification),
    })
}

pub async fn submit_feedback(
    state: &AppState,
    form: FeedbackForm,
) -> Result<Accepted<Feedback>, ValidationError> {
    check_feedback(&form)?;

    let record = Feedback {
        id: String::new(),
        name: form.name.trim().to_string(),
        location: form.location.trim().to_string(),
        kind: form.kind.trim().to_string(),
        message: form.message.trim().to_string(),
        approved: false,
        timestamp: Utc::now(),
        approved_at: None,
    };
    let (record, persisted) = persist(state.feedback.append(record.clone()).await, record);

    Ok(Accepted {
        record,
        persisted,
        notification: None,
    })
}

/// The store already logged the failure; the unsaved record is still shown.
fn persist<T, E>(result: Result<T, E>, fallback: T) -> (T, bool) {
    match result {
        Ok(saved) => (saved, true),
        Err(_) => (fallback, false),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
