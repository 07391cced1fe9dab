use async_trait::async_trait;
use thiserror::Error;

use crate::{
    config::{PushConfig, WhatsAppConfig},
    models::{BookingRecord, TemplatedMessage},
    push,
    whatsapp::WhatsAppClient,
};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("{0} channel is not configured")]
    NotConfigured(&'static str),
    #[error("{0}")]
    Rejected(String),
}

/// Best-effort outbound channels. Callers log failures and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_generic(&self, booking: &BookingRecord) -> Result<(), NotifyError>;

    async fn send_templated(&self, message: &TemplatedMessage) -> Result<(), NotifyError>;
}

pub struct LiveNotifier {
    push: PushConfig,
    whatsapp: WhatsAppClient,
}

impl LiveNotifier {
    pub fn new(push: PushConfig, whatsapp: WhatsAppConfig) -> Result<Self, NotifyError> {
        Ok(Self {
            push,
            whatsapp: WhatsAppClient::new(whatsapp)?,
        })
    }
}

#[async_trait]
impl Notifier for LiveNotifier {
    async fn send_generic(&self, booking: &BookingRecord) -> Result<(), NotifyError> {
        push::notify_admin(&self.push, booking).await
    }

    async fn send_templated(&self, message: &TemplatedMessage) -> Result<(), NotifyError> {
        self.whatsapp.send_template(message).await
    }
}

pub fn booking_alert_text(booking: &BookingRecord) -> String {
    let message = if booking.message.is_empty() {
        "No message"
    } else {
        booking.message.as_str()
    };
    format!(
        "Name: {}\nPhone: {}\nService: {}\nDate & Time: {} {}\nMessage: {}",
        booking.first_name, booking.phone, booking.service, booking.date, booking.time, message
    )
}
