use actix_web::{http::header, web, HttpResponse, Result};
use actix_web_httpauth::middleware::HttpAuthentication;
use askama::Template;
use serde::Deserialize;

use crate::{
    auth::{admin_validator, AuthUser},
    filters::{date_time, day_only, short_date, time_12h},
    models::{Booking, BookingStatus, ContactMessage, Feedback},
    notify::MetricsSnapshot,
    routes::today,
    state::AppState,
    templates::render,
    validate,
    workflow::{
        all_bookings, approve_feedback, available_actions, contact_messages, pending_feedback,
        reject_feedback, set_booking_status, today_bookings, AdminTab, BookingStats,
        WorkflowError,
    },
};

#[derive(Clone, Debug)]
struct StatCard {
    label: &'static str,
    value: usize,
}

#[derive(Clone, Debug)]
struct TabLink {
    value: &'static str,
    label: &'static str,
    active: bool,
}

#[derive(Clone, Debug)]
struct ActionButton {
    value: &'static str,
    label: &'static str,
}

#[derive(Clone, Debug)]
struct BookingView {
    id: String,
    date: String,
    time: String,
    name: String,
    service: String,
    email: String,
    phone: String,
    status: &'static str,
    status_label: &'static str,
    actions: Vec<ActionButton>,
}

#[derive(Clone, Debug)]
struct FeedbackView {
    id: String,
    name: String,
    attribution: String,
    message: String,
    submitted: String,
}

#[derive(Clone, Debug)]
struct MessageView {
    name: String,
    email: String,
    phone: String,
    has_phone: bool,
    message: String,
    received: String,
}

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    admin_name: String,
    tabs: Vec<TabLink>,
    tab: &'static str,
    return_to: String,
    notice: String,
    has_notice: bool,
    notifications: MetricsSnapshot,
    notifications_enabled: bool,
    stats: Vec<StatCard>,
    bookings: Vec<BookingView>,
    filter_date: String,
    feedback: Vec<FeedbackView>,
    messages: Vec<MessageView>,
    empty_text: String,
}

#[derive(Deserialize)]
struct AdminQuery {
    tab: Option<String>,
    date: Option<String>,
    notice: Option<String>,
}

#[derive(Deserialize)]
struct StatusForm {
    status: String,
    return_to: Option<String>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(HttpAuthentication::basic(admin_validator))
            .service(web::resource("").route(web::get().to(dashboard)))
            .service(web::resource("/").route(web::get().to(dashboard)))
            .service(
                web::resource("/bookings/{id}/status").route(web::post().to(update_booking_status)),
            )
            .service(web::resource("/feedback/{id}/approve").route(web::post().to(approve)))
            .service(web::resource("/feedback/{id}/reject").route(web::post().to(reject))),
    );
}

async fn dashboard(
    state: web::Data<AppState>,
    query: web::Query<AdminQuery>,
    auth: web::ReqData<AuthUser>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let tab: AdminTab = query
        .tab
        .as_deref()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();
    let filter_date = query
        .date
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| validate::date(value).ok());

    let mut page = AdminTemplate {
        admin_name: auth.username.clone(),
        tabs: AdminTab::ALL
            .into_iter()
            .map(|candidate| TabLink {
                value: candidate.as_str(),
                label: candidate.label(),
                active: candidate == tab,
            })
            .collect(),
        tab: tab.as_str(),
        return_to: return_path(tab, filter_date.map(|d| d.format("%Y-%m-%d").to_string())),
        notice: notice_text(query.notice.as_deref()).unwrap_or_default().to_string(),
        has_notice: notice_text(query.notice.as_deref()).is_some(),
        notifications: state.mailer.metrics(),
        notifications_enabled: state.mailer.enabled(),
        stats: Vec::new(),
        bookings: Vec::new(),
        filter_date: filter_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        feedback: Vec::new(),
        messages: Vec::new(),
        empty_text: String::new(),
    };

    match tab {
        AdminTab::Today => {
            let (todays, stats) = today_bookings(state.bookings.all().await, today());
            page.stats = stat_cards(stats);
            page.bookings = todays.into_iter().map(to_booking_view).collect();
            page.empty_text = "No bookings scheduled for today.".to_string();
        }
        AdminTab::All => {
            let bookings = all_bookings(state.bookings.all().await, filter_date);
            page.bookings = bookings.into_iter().map(to_booking_view).collect();
            page.empty_text = match filter_date {
                Some(day) => format!("No bookings found for {}.", short_date(day)),
                None => "No bookings found.".to_string(),
            };
        }
        AdminTab::Feedback => {
            let pending = pending_feedback(state.feedback.all().await);
            page.feedback = pending.into_iter().map(to_feedback_view).collect();
            page.empty_text = "No pending feedback to review.".to_string();
        }
        AdminTab::Messages => {
            let messages = contact_messages(state.messages.all().await);
            page.messages = messages.into_iter().map(to_message_view).collect();
            page.empty_text = "No messages received yet.".to_string();
        }
    }

    Ok(render(page))
}

async fn update_booking_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Form<StatusForm>,
) -> Result<HttpResponse> {
    let booking_id = path.into_inner();
    let form = form.into_inner();
    let Ok(status) = form.status.parse::<BookingStatus>() else {
        return Ok(HttpResponse::BadRequest().body("Unknown booking status"));
    };

    if let Err(err) = set_booking_status(&state.bookings, &booking_id, status).await {
        return workflow_failure(err);
    }

    let back = form
        .return_to
        .filter(|target| is_admin_path(target))
        .unwrap_or_else(|| return_path(AdminTab::All, None));
    Ok(see_other(&with_notice(&back, "booking_updated")))
}

async fn approve(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let feedback_id = path.into_inner();
    if let Err(err) = approve_feedback(&state.feedback, &feedback_id).await {
        return workflow_failure(err);
    }
    Ok(see_other("/admin?tab=feedback&notice=feedback_approved"))
}

async fn reject(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let feedback_id = path.into_inner();
    if let Err(err) = reject_feedback(&state.feedback, &feedback_id).await {
        return workflow_failure(err);
    }
    Ok(see_other("/admin?tab=feedback&notice=feedback_rejected"))
}

fn workflow_failure(err: WorkflowError) -> Result<HttpResponse> {
    match err {
        WorkflowError::NotFound { kind, id } => {
            Ok(HttpResponse::NotFound().body(format!("No {kind} found with id {id}")))
        }
        WorkflowError::Storage(err) => Err(actix_web::error::ErrorInternalServerError(err)),
    }
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location))
        .finish()
}

fn return_path(tab: AdminTab, date: Option<String>) -> String {
    match date {
        Some(date) => format!("/admin?tab={}&date={date}", tab.as_str()),
        None => format!("/admin?tab={}", tab.as_str()),
    }
}

/// Only pages inside the dashboard are valid redirect targets.
fn is_admin_path(target: &str) -> bool {
    target == "/admin" || target.starts_with("/admin?") || target.starts_with("/admin/")
}

fn with_notice(path: &str, notice: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}notice={notice}")
}

fn notice_text(key: Option<&str>) -> Option<&'static str> {
    match key? {
        "booking_updated" => Some("Booking status updated."),
        "feedback_approved" => Some("Feedback approved and added to testimonials!"),
        "feedback_rejected" => Some("Feedback rejected and removed."),
        _ => None,
    }
}

fn stat_cards(stats: BookingStats) -> Vec<StatCard> {
    vec![
        StatCard {
            label: "Total Bookings",
            value: stats.total,
        },
        StatCard {
            label: "Pending",
            value: stats.pending,
        },
        StatCard {
            label: "Confirmed",
            value: stats.confirmed,
        },
        StatCard {
            label: "Completed",
            value: stats.completed,
        },
        StatCard {
            label: "Cancelled",
            value: stats.cancelled,
        },
    ]
}

fn to_booking_view(booking: Booking) -> BookingView {
    BookingView {
        date: short_date(booking.date),
        time: time_12h(&booking.time),
        service: booking.service.short_label().to_string(),
        status: booking.status.as_str(),
        status_label: booking.status.label(),
        actions: available_actions(booking.status)
            .into_iter()
            .map(|status| ActionButton {
                value: status.as_str(),
                label: status.action_label(),
            })
            .collect(),
        id: booking.id,
        name: booking.name,
        email: booking.email,
        phone: booking.phone,
    }
}

fn to_feedback_view(item: Feedback) -> FeedbackView {
    FeedbackView {
        attribution: item.attribution(),
        submitted: day_only(item.timestamp),
        id: item.id,
        name: item.name,
        message: item.message,
    }
}

fn to_message_view(message: ContactMessage) -> MessageView {
    let phone = message.phone.unwrap_or_default();
    MessageView {
        received: date_time(message.timestamp),
        name: message.name,
        email: message.email,
        has_phone: !phone.trim().is_empty(),
        phone,
        message: message.message,
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{body::MessageBody, dev::ServiceResponse, http::StatusCode, test, web, App};

    use super::*;
    use crate::notify::{EmailConfig, Mailer};
    use crate::state::test_state;
    use crate::testing::{booking, feedback};

    const GOOD_AUTH: &str = "Basic YWRtaW46c2VjcmV0LXBhc3M=";
    const BAD_AUTH: &str = "Basic YWRtaW46d3Jvbmc=";

    async fn app_state() -> AppState {
        test_state(Mailer::new(EmailConfig::default()).unwrap()).await
    }

    async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
        let bytes = test::read_body(resp).await;
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[actix_web::test]
    async fn dashboard_requires_credentials() {
        let state = app_state().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let anonymous = test::TestRequest::get().uri("/admin").to_request();
        let resp = test::call_service(&app, anonymous).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let wrong = test::TestRequest::get()
            .uri("/admin")
            .insert_header((header::AUTHORIZATION, BAD_AUTH))
            .to_request();
        let resp = test::call_service(&app, wrong).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn all_bookings_tab_lists_and_filters() {
        let state = app_state().await;
        state.bookings.append(booking("Asha", "2026-10-20", "09:00")).await.unwrap();
        state.bookings.append(booking("Ben", "2026-10-22", "11:00")).await.unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/admin?tab=all&date=2026-10-22")
            .insert_header((header::AUTHORIZATION, GOOD_AUTH))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("Ben"));
        assert!(!body.contains("Asha"));
        assert!(body.contains("11:00 AM"));
    }

    #[actix_web::test]
    async fn status_update_redirects_and_persists() {
        let state = app_state().await;
        let stored = state
            .bookings
            .append(booking("Asha", "2026-10-20", "09:00"))
            .await
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/admin/bookings/{}/status", stored.id))
            .insert_header((header::AUTHORIZATION, GOOD_AUTH))
            .set_form([("status", "confirmed"), ("return_to", "/admin?tab=all")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/admin?tab=all&notice=booking_updated"
        );
        assert_eq!(state.bookings.all().await[0].status, BookingStatus::Confirmed);

        let missing = test::TestRequest::post()
            .uri("/admin/bookings/not-a-booking/status")
            .insert_header((header::AUTHORIZATION, GOOD_AUTH))
            .set_form([("status", "cancelled")])
            .to_request();
        let resp = test::call_service(&app, missing).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn redirect_outside_dashboard_falls_back_to_all_bookings() {
        let state = app_state().await;
        let stored = state
            .bookings
            .append(booking("Asha", "2026-10-20", "09:00"))
            .await
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/admin/bookings/{}/status", stored.id))
            .insert_header((header::AUTHORIZATION, GOOD_AUTH))
            .set_form([("status", "completed"), ("return_to", "/administrator")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/admin?tab=all&notice=booking_updated"
        );
    }

    #[::core::prelude::v1::test]
    fn admin_paths_are_matched_exactly() {
        assert!(is_admin_path("/admin"));
        assert!(is_admin_path("/admin?tab=feedback"));
        assert!(is_admin_path("/admin/"));
        assert!(!is_admin_path("/administrator"));
        assert!(!is_admin_path("https://example.com/admin"));
    }

    #[actix_web::test]
    async fn approve_and_reject_feedback() {
        let state = app_state().await;
        let keep = state.feedback.append(feedback("Keep", false)).await.unwrap();
        let drop = state.feedback.append(feedback("Drop", false)).await.unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure),
        )
        .await;

        let approve = test::TestRequest::post()
            .uri(&format!("/admin/feedback/{}/approve", keep.id))
            .insert_header((header::AUTHORIZATION, GOOD_AUTH))
            .to_request();
        assert_eq!(test::call_service(&app, approve).await.status(), StatusCode::SEE_OTHER);

        let reject = test::TestRequest::post()
            .uri(&format!("/admin/feedback/{}/reject", drop.id))
            .insert_header((header::AUTHORIZATION, GOOD_AUTH))
            .to_request();
        assert_eq!(test::call_service(&app, reject).await.status(), StatusCode::SEE_OTHER);

        let stored = state.feedback.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, keep.id);
        assert!(stored[0].approved);

        let page = test::TestRequest::get()
            .uri("/admin?tab=feedback&notice=feedback_approved")
            .insert_header((header::AUTHORIZATION, GOOD_AUTH))
            .to_request();
        let body = body_text(test::call_service(&app, page).await).await;
        assert!(body.contains("No pending feedback to review."));
        assert!(body.contains("Feedback approved and added to testimonials!"));
    }
}
