use serde::Deserialize;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder, URL_SAFE_NO_PAD,
};

use crate::{config::PushConfig, models::BookingRecord, notify::NotifyError};

#[derive(Debug, Deserialize)]
pub struct PushSubscriptionInput {
    pub endpoint: String,
    pub keys: PushKeys,
}

#[derive(Debug, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

pub fn booking_payload(booking: &BookingRecord) -> String {
    serde_json::json!({
        "title": "New booking request",
        "body": format!(
            "{} booked {} on {} {}",
            booking.first_name, booking.service, booking.date, booking.time
        ),
        "url": "/"
    })
    .to_string()
}

/// Pushes a new-booking alert to the administrator's browser subscription.
pub async fn notify_admin(config: &PushConfig, booking: &BookingRecord) -> Result<(), NotifyError> {
    if !config.enabled() {
        return Err(NotifyError::NotConfigured("web push"));
    }

    let subscription: PushSubscriptionInput = serde_json::from_str(&config.admin_subscription)
        .map_err(|err| NotifyError::Rejected(format!("invalid push subscription: {err}")))?;

    send_push(config, subscription, &booking_payload(booking))
        .await
        .map_err(|err| NotifyError::Rejected(format!("push send failed: {err}")))
}

async fn send_push(
    config: &PushConfig,
    subscription: PushSubscriptionInput,
    payload: &str,
) -> Result<(), WebPushError> {
    let subscription = SubscriptionInfo::new(
        subscription.endpoint,
        subscription.keys.p256dh,
        subscription.keys.auth,
    );
    let mut builder = WebPushMessageBuilder::new(&subscription);
    builder.set_payload(ContentEncoding::Aes128Gcm, payload.as_bytes());

    let mut vapid_builder =
        VapidSignatureBuilder::from_base64(&config.private_key, URL_SAFE_NO_PAD, &subscription)?;
    vapid_builder.add_claim("sub", config.subject.clone());

    builder.set_vapid_signature(vapid_builder.build()?);

    let client = IsahcWebPushClient::new()?;
    client.send(builder.build()?).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> BookingRecord {
        BookingRecord {
            timestamp: "2025-01-01T08:00:00.000Z".to_string(),
            service: "Thai Massage".to_string(),
            date: "2025-01-01".to_string(),
            time: "10:00".to_string(),
            first_name: "Ana".to_string(),
            email: "N/A".to_string(),
            phone: "555-1234".to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn payload_summarizes_booking() {
        let payload: serde_json::Value = serde_json::from_str(&booking_payload(&booking())).unwrap();
        assert_eq!(payload["title"], "New booking request");
        assert_eq!(payload["body"], "Ana booked Thai Massage on 2025-01-01 10:00");
    }

    #[actix_web::test]
    async fn unconfigured_push_is_an_error() {
        let err = notify_admin(&PushConfig::default(), &booking())
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured("web push")));
    }

    #[actix_web::test]
    async fn malformed_subscription_is_rejected() {
        let config = PushConfig {
            public_key: "pub".to_string(),
            private_key: "priv".to_string(),
            subject: "mailto:spa@example.com".to_string(),
            admin_subscription: "{not json".to_string(),
        };
        let err = notify_admin(&config, &booking()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected(_)));
    }
}
