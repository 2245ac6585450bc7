use std::cmp::Reverse;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};

use crate::{
    models::{Booking, BookingStatus, ContactMessage, Feedback},
    repo::Repository,
    storage::StorageError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Today,
    All,
    Feedback,
    Messages,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [
        AdminTab::Today,
        AdminTab::All,
        AdminTab::Feedback,
        AdminTab::Messages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AdminTab::Today => "today",
            AdminTab::All => "all",
            AdminTab::Feedback => "feedback",
            AdminTab::Messages => "messages",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AdminTab::Today => "Today's Bookings",
            AdminTab::All => "All Bookings",
            AdminTab::Feedback => "Pending Feedback",
            AdminTab::Messages => "Contact Messages",
        }
    }
}

impl FromStr for AdminTab {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        AdminTab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == value)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookingStats {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl BookingStats {
    pub fn tally(bookings: &[Booking]) -> Self {
        bookings.iter().fold(
            Self {
                total: bookings.len(),
                ..Self::default()
            },
            |mut stats, booking| {
                match booking.status {
                    BookingStatus::Pending => stats.pending += 1,
                    BookingStatus::Confirmed => stats.confirmed += 1,
                    BookingStatus::Completed => stats.completed += 1,
                    BookingStatus::Cancelled => stats.cancelled += 1,
                }
                stats
            },
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Bookings on `today`, earliest slot first, with their status counts.
pub fn today_bookings(bookings: Vec<Booking>, today: NaiveDate) -> (Vec<Booking>, BookingStats) {
    let mut todays: Vec<Booking> = bookings.into_iter().filter(|b| b.date == today).collect();
    todays.sort_by_key(Booking::slot);
    let stats = BookingStats::tally(&todays);
    (todays, stats)
}

/// Latest appointment first, optionally limited to one day.
pub fn all_bookings(bookings: Vec<Booking>, on: Option<NaiveDate>) -> Vec<Booking> {
    let mut selected: Vec<Booking> = match on {
        Some(day) => bookings.into_iter().filter(|b| b.date == day).collect(),
        None => bookings,
    };
    selected.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    selected
}

pub fn pending_feedback(feedback: Vec<Feedback>) -> Vec<Feedback> {
    feedback.into_iter().filter(|item| !item.approved).collect()
}

pub fn contact_messages(mut messages: Vec<ContactMessage>) -> Vec<ContactMessage> {
    messages.sort_by_key(|message| Reverse(message.timestamp));
    messages
}

/// Status buttons offered for a booking in `current` status.
pub fn available_actions(current: BookingStatus) -> Vec<BookingStatus> {
    [
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ]
    .into_iter()
    .filter(|status| *status != current)
    .collect()
}

pub async fn set_booking_status(
    repo: &Repository<Booking>,
    id: &str,
    status: BookingStatus,
) -> Result<Booking, WorkflowError> {
    let updated = repo
        .update(id, |booking| {
            booking.status = status;
            booking.updated_at = Some(Utc::now());
        })
        .await?;
    let booking = updated.ok_or_else(|| not_found("booking", id))?;
    log::info!("booking {id} marked {status}");
    Ok(booking)
}

/// Approving twice keeps the first approval time.
pub async fn approve_feedback(
    repo: &Repository<Feedback>,
    id: &str,
) -> Result<Feedback, WorkflowError> {
    let updated = repo
        .update(id, |item| {
            if !item.approved {
                item.approved = true;
                item.approved_at = Some(Utc::now());
            }
        })
        .await?;
    let item = updated.ok_or_else(|| not_found("feedback", id))?;
    log::info!("feedback {id} approved");
    Ok(item)
}

pub async fn reject_feedback(
    repo: &Repository<Feedback>,
    id: &str,
) -> Result<Feedback, WorkflowError> {
    let removed = repo.remove(id).await?;
    let item = removed.ok_or_else(|| not_found("feedback", id))?;
    log::info!("feedback {id} rejected");
    Ok(item)
}

fn not_found(kind: &'static str, id: &str) -> WorkflowError {
    WorkflowError::NotFound {
        kind,
        id: id.to_string(),
    }
}
