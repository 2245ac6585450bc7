use std::env;

use crate::notify::{EmailConfig, DEFAULT_API_URL};

const DEFAULT_DATABASE_URL: &str = "sqlite://./data/clinic-desk.db";
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub admin_user: String,
    pub admin_password: String,
    pub email: EmailConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = EmailConfig::default();
        let email = EmailConfig {
            service_id: var_or("EMAILJS_SERVICE_ID", &defaults.service_id),
            contact_template_id: var_or("EMAILJS_CONTACT_TEMPLATE_ID", &defaults.contact_template_id),
            booking_template_id: var_or("EMAILJS_BOOKING_TEMPLATE_ID", &defaults.booking_template_id),
            public_key: var_or("EMAILJS_PUBLIC_KEY", &defaults.public_key),
            private_key: env::var("EMAILJS_PRIVATE_KEY")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            api_url: var_or("EMAILJS_API_URL", DEFAULT_API_URL),
            to_email: var_or("NOTIFY_TO_EMAIL", ""),
        };

        let admin_password = var_or("ADMIN_PASSWORD", "admin");
        if admin_password == "admin" {
            log::warn!("ADMIN_PASSWORD not set. Using default password 'admin'. Set ADMIN_PASSWORD in production.");
        }
        if !email.enabled() {
            log::warn!(
                target: "notify",
                "EmailJS is not configured; contact and booking emails will be skipped"
            );
        } else if email.to_email.is_empty() {
            log::warn!(target: "notify", "NOTIFY_TO_EMAIL not set; templates must supply a recipient");
        }

        Self {
            database_url: var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            admin_user: var_or("ADMIN_USER", "admin"),
            admin_password,
            email,
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
