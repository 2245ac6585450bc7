use chrono::{Days, NaiveDate};

use crate::{
    filters::{long_date, time_12h},
    models::{Booking, Feedback},
};

pub const TESTIMONIAL_LIMIT: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct Testimonial {
    pub message: String,
    pub attribution: String,
}

/// Approved feedback, most recently approved first, capped at six cards.
/// An empty result means the page keeps its built-in testimonials.
pub fn testimonials(feedback: &[Feedback]) -> Vec<Testimonial> {
    let mut approved: Vec<&Feedback> = feedback.iter().filter(|item| item.approved).collect();
    approved.sort_by(|a, b| b.recency().cmp(&a.recency()));
    approved
        .into_iter()
        .take(TESTIMONIAL_LIMIT)
        .map(|item| Testimonial {
            message: item.message.clone(),
            attribution: match item.attribution() {
                parts if parts.is_empty() => item.name.clone(),
                parts => parts,
            },
        })
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct BookingConfirmation {
    pub name: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub email: String,
}

impl From<&Booking> for BookingConfirmation {
    fn from(booking: &Booking) -> Self {
        Self {
            name: booking.name.clone(),
            service: booking.service.label().to_string(),
            date: long_date(booking.date),
            time: time_12h(&booking.time),
            email: booking.email.clone(),
        }
    }
}

/// Earliest date offered by the booking date picker.
pub fn min_booking_date(today: NaiveDate) -> NaiveDate {
    today.checked_add_days(Days::new(1)).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::Service;
    use crate::testing::{booking, date, feedback, instant};

    #[test]
    fn only_approved_feedback_is_shown_newest_first() {
        let base = instant("2026-10-01T10:00:00Z");
        let mut items = Vec::new();
        for i in 0..8 {
            let mut item = feedback(&format!("Client {i}"), true);
            item.approved_at = Some(base + Duration::days(i));
            items.push(item);
        }
        items.push(feedback("Pending", false));

        let shown = testimonials(&items);
        assert_eq!(shown.len(), TESTIMONIAL_LIMIT);
        assert_eq!(shown[0].message, "Client 7 found the sessions helpful.");
        assert_eq!(shown[5].message, "Client 2 found the sessions helpful.");
        assert!(shown.iter().all(|t| !t.message.starts_with("Pending")));
    }

    #[test]
    fn approval_time_falls_back_to_submission_time() {
        let mut old = feedback("Old", true);
        old.timestamp = instant("2026-01-01T00:00:00Z");
        let mut newer = feedback("Newer", true);
        newer.timestamp = instant("2026-03-01T00:00:00Z");

        let shown = testimonials(&[old, newer]);
        assert!(shown[0].message.starts_with("Newer"));
        assert_eq!(shown[0].attribution, "Client, Bengaluru");
    }

    #[test]
    fn card_without_type_or_location_names_the_author() {
        let mut item = feedback("Meera", true);
        item.kind.clear();
        item.location.clear();
        assert_eq!(testimonials(&[item])[0].attribution, "Meera");
    }

    #[test]
    fn nothing_approved_yields_no_cards() {
        assert!(testimonials(&[feedback("Waiting", false)]).is_empty());
    }

    #[test]
    fn confirmation_uses_display_names() {
        let mut item = booking("Asha", "2026-10-19", "14:30");
        item.service = Service::Couples;
        let confirmation = BookingConfirmation::from(&item);
        assert_eq!(confirmation.service, "Couples & Family Therapy");
        assert_eq!(confirmation.date, "Monday, October 19, 2026");
        assert_eq!(confirmation.time, "2:30 PM");
    }

    #[test]
    fn date_picker_starts_tomorrow() {
        assert_eq!(min_booking_date(date("2026-12-31")), date("2027-01-01"));
    }
}
