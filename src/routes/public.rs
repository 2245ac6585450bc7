use actix_web::{http::StatusCode, web, HttpResponse, Result};
use askama::Template;

use crate::{
    models::Service,
    render::{min_booking_date, testimonials, BookingConfirmation, Testimonial},
    routes::today,
    state::AppState,
    submit::{
        submit_booking, submit_contact, submit_feedback, BookingForm, ContactForm, FeedbackForm,
        FEEDBACK_RECEIVED,
    },
    templates::{render, render_status},
    validate::ValidationError,
};

#[derive(Clone, Debug)]
struct ServiceOption {
    value: String,
    label: String,
    selected: bool,
}

/// Inline message region under a form.
#[derive(Clone, Debug, Default)]
struct Notice {
    visible: bool,
    kind: &'static str,
    text: String,
}

impl Notice {
    fn success(text: &str) -> Self {
        Self {
            visible: true,
            kind: "success",
            text: text.to_string(),
        }
    }

    fn error(err: ValidationError) -> Self {
        Self {
            visible: true,
            kind: "error",
            text: err.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct ContactView {
    name: String,
    email: String,
    phone: String,
    message: String,
}

impl From<ContactForm> for ContactView {
    fn from(form: ContactForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            phone: form.phone.unwrap_or_default(),
            message: form.message,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct BookingView {
    name: String,
    email: String,
    phone: String,
    date: String,
    time: String,
    message: String,
}

impl From<BookingForm> for BookingView {
    fn from(form: BookingForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            phone: form.phone,
            date: form.date,
            time: form.time,
            message: form.message.unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug, Default)]
struct FeedbackView {
    name: String,
    location: String,
    kind: String,
    message: String,
}

impl From<FeedbackForm> for FeedbackView {
    fn from(form: FeedbackForm) -> Self {
        Self {
            name: form.name,
            location: form.location,
            kind: form.kind,
            message: form.message,
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    services: Vec<ServiceOption>,
    testimonials: Vec<Testimonial>,
    min_date: String,
    contact: ContactView,
    contact_notice: Notice,
    booking: BookingView,
    booking_notice: Notice,
    feedback: FeedbackView,
    feedback_notice: Notice,
    show_confirmation: bool,
    confirmation: BookingConfirmation,
}

impl HomeTemplate {
    async fn load(state: &AppState) -> Self {
        let feedback = state.feedback.all().await;
        Self {
            services: service_options(""),
            testimonials: testimonials(&feedback),
            min_date: min_booking_date(today()).format("%Y-%m-%d").to_string(),
            contact: ContactView::default(),
            contact_notice: Notice::default(),
            booking: BookingView::default(),
            booking_notice: Notice::default(),
            feedback: FeedbackView::default(),
            feedback_notice: Notice::default(),
            show_confirmation: false,
            confirmation: BookingConfirmation::default(),
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(home)))
        .service(web::resource("/contact").route(web::post().to(contact)))
        .service(web::resource("/book").route(web::post().to(book)))
        .service(web::resource("/feedback").route(web::post().to(feedback)))
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

async fn home(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(render(HomeTemplate::load(&state).await))
}

async fn contact(
    state: web::Data<AppState>,
    form: web::Form<ContactForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let mut page = HomeTemplate::load(&state).await;

    match submit_contact(&state, form.clone()).await {
        Ok(accepted) => {
            warn_unsaved("contact message", accepted.persisted);
            page.contact_notice = Notice::success(accepted.success_message());
            Ok(render(page))
        }
        Err(err) => {
            page.contact = ContactView::from(form);
            page.contact_notice = Notice::error(err);
            Ok(render_status(StatusCode::UNPROCESSABLE_ENTITY, page))
        }
    }
}

async fn book(state: web::Data<AppState>, form: web::Form<BookingForm>) -> Result<HttpResponse> {
    let form = form.into_inner();
    let mut page = HomeTemplate::load(&state).await;

    match submit_booking(&state, form.clone(), today()).await {
        Ok(accepted) => {
            warn_unsaved("booking", accepted.persisted);
            page.show_confirmation = true;
            page.confirmation = BookingConfirmation::from(&accepted.record);
            Ok(render(page))
        }
        Err(err) => {
            page.services = service_options(&form.service);
            page.booking = BookingView::from(form);
            page.booking_notice = Notice::error(err);
            Ok(render_status(StatusCode::UNPROCESSABLE_ENTITY, page))
        }
    }
}

async fn feedback(
    state: web::Data<AppState>,
    form: web::Form<FeedbackForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();

    match submit_feedback(&state, form.clone()).await {
        Ok(accepted) => {
            warn_unsaved("feedback", accepted.persisted);
            let mut page = HomeTemplate::load(&state).await;
            page.feedback_notice = Notice::success(FEEDBACK_RECEIVED);
            Ok(render(page))
        }
        Err(err) => {
            let mut page = HomeTemplate::load(&state).await;
            page.feedback = FeedbackView::from(form);
            page.feedback_notice = Notice::error(err);
            Ok(render_status(StatusCode::UNPROCESSABLE_ENTITY, page))
        }
    }
}

fn warn_unsaved(what: &str, persisted: bool) {
    if !persisted {
        log::warn!(target: "storage", "{what} accepted but not saved; visitor was thanked anyway");
    }
}

fn service_options(selected: &str) -> Vec<ServiceOption> {
    Service::KNOWN
        .iter()
        .map(|service| ServiceOption {
            value: service.value().to_string(),
            label: service.label().to_string(),
            selected: service.value() == selected,
        })
        .collect()
}
