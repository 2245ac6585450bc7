use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use crate::filters::{long_date, time_12h};
use crate::models::{Booking, ContactMessage};

pub const DEFAULT_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";
const PLACEHOLDER_PREFIX: &str = "YOUR_";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub service_id: String,
    pub contact_template_id: String,
    pub booking_template_id: String,
    pub public_key: String,
    pub private_key: Option<String>,
    pub api_url: String,
    pub to_email: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            service_id: "YOUR_SERVICE_ID".to_string(),
            contact_template_id: "YOUR_CONTACT_TEMPLATE_ID".to_string(),
            booking_template_id: "YOUR_BOOKING_TEMPLATE_ID".to_string(),
            public_key: "YOUR_PUBLIC_KEY".to_string(),
            private_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            to_email: String::new(),
        }
    }
}

impl EmailConfig {
    pub fn enabled(&self) -> bool {
        [
            &self.service_id,
            &self.contact_template_id,
            &self.booking_template_id,
            &self.public_key,
        ]
        .iter()
        .all(|value| is_configured(value))
    }
}

fn is_configured(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.starts_with(PLACEHOLDER_PREFIX)
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email service answered {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// The integration is not configured; nothing was attempted.
    Skipped,
    Failed,
}

#[derive(Debug, Default)]
pub struct NotifyMetrics {
    sent: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl NotifyMetrics {
    fn record(&self, outcome: NotifyOutcome) {
        let counter = match outcome {
            NotifyOutcome::Sent => &self.sent,
            NotifyOutcome::Skipped => &self.skipped,
            NotifyOutcome::Failed => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sent: self.sent.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: serde_json::Value,
}

/// Best-effort transactional email. Every send resolves to an outcome; errors
/// are logged and counted here and never reach the caller.
#[derive(Clone)]
pub struct Mailer {
    config: EmailConfig,
    client: reqwest::Client,
    metrics: Arc<NotifyMetrics>,
}

impl Mailer {
    pub fn new(config: EmailConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            config,
            client,
            metrics: Arc::new(NotifyMetrics::default()),
        })
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn send_contact(&self, message: &ContactMessage) -> NotifyOutcome {
        let params = json!({
            "from_name": message.name,
            "from_email": message.email,
            "phone": message.phone.as_deref().unwrap_or("Not provided"),
            "message": message.message,
            "to_email": self.config.to_email,
        });
        self.deliver("contact", &self.config.contact_template_id, &message.id, params)
            .await
    }

    pub async fn send_booking(&self, booking: &Booking) -> NotifyOutcome {
        let params = json!({
            "client_name": booking.name,
            "client_email": booking.email,
            "client_phone": booking.phone,
            "service": booking.service.label(),
            "date": long_date(booking.date),
            "time": time_12h(&booking.time),
            "message": booking
                .message
                .as_deref()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or("No additional message"),
            "to_email": self.config.to_email,
        });
        self.deliver("booking", &self.config.booking_template_id, &booking.id, params)
            .await
    }

    async fn deliver(
        &self,
        kind: &str,
        template_id: &str,
        record_id: &str,
        params: serde_json::Value,
    ) -> NotifyOutcome {
        let outcome = if !self.enabled() {
            log::debug!(target: "notify", "{kind} email for {record_id} skipped: email not configured");
            NotifyOutcome::Skipped
        } else {
            match self.post(template_id, params).await {
                Ok(()) => {
                    log::info!(target: "notify", "{kind} email sent for {record_id}");
                    NotifyOutcome::Sent
                }
                Err(err) => {
                    log::warn!(target: "notify", "{kind} email failed for {record_id}: {err}");
                    NotifyOutcome::Failed
                }
            }
        };
        self.metrics.record(outcome);
        outcome
    }

    async fn post(&self, template_id: &str, params: serde_json::Value) -> Result<(), NotifyError> {
        let request = SendRequest {
            service_id: &self.config.service_id,
            template_id,
            user_id: &self.config.public_key,
            access_token: self.config.private_key.as_deref(),
            template_params: params,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }
        Ok(())
    }
}

#[cfg(test)]
pub fn unreachable_config() -> EmailConfig {
    EmailConfig {
        service_id: "service_test".to_string(),
        contact_template_id: "template_contact".to_string(),
        booking_template_id: "template_booking".to_string(),
        public_key: "public_test".to_string(),
        private_key: None,
        api_url: "http://127.0.0.1:9/api/v1.0/email/send".to_string(),
        to_email: "clinic@example.com".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{booking, contact};

    #[test]
    fn placeholders_disable_sending() {
        assert!(!EmailConfig::default().enabled());

        let mut config = unreachable_config();
        assert!(config.enabled());
        config.booking_template_id = "  ".to_string();
        assert!(!config.enabled());
    }

    #[actix_web::test]
    async fn unconfigured_mailer_skips_and_counts() {
        let mailer = Mailer::new(EmailConfig::default()).unwrap();
        let outcome = mailer.send_contact(&contact("Jo", "2026-10-19T08:00:00Z")).await;

        assert_eq!(outcome, NotifyOutcome::Skipped);
        assert_eq!(
            mailer.metrics(),
            MetricsSnapshot {
                sent: 0,
                skipped: 1,
                failed: 0
            }
        );
    }

    #[actix_web::test]
    async fn transport_failure_is_reported_not_raised() {
        let mailer = Mailer::new(unreachable_config()).unwrap();
        let outcome = mailer.send_booking(&booking("Asha", "2026-10-20", "09:00")).await;

        assert_eq!(outcome, NotifyOutcome::Failed);
        assert_eq!(mailer.metrics().failed, 1);
    }

    #[test]
    fn send_request_uses_emailjs_field_names() {
        let request = SendRequest {
            service_id: "s",
            template_id: "t",
            user_id: "u",
            access_token: Some("k"),
            template_params: json!({"from_name": "Jo"}),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["accessToken"], "k");
        assert_eq!(value["template_params"]["from_name"], "Jo");
    }
}
