use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{
    AdminVisitInput, AdminVisitRecord, BookingInput, BookingRecord, EMAIL_NOT_APPLICABLE,
};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s\-+()]+$").expect("phone pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill all required fields (service, date, time, name, phone).")]
    MissingBookingFields,
    #[error("Please fill all required fields (name, therapy name, date, price, payment mode).")]
    MissingVisitFields,
    #[error("Invalid email format.")]
    InvalidEmail,
    #[error("Invalid phone number format.")]
    InvalidPhone,
}

pub fn validate_booking(
    input: &BookingInput,
    received_at: DateTime<Utc>,
) -> Result<BookingRecord, ValidationError> {
    let (Some(service), Some(date), Some(time), Some(first_name), Some(phone)) = (
        present(&input.service),
        present(&input.date),
        present(&input.time),
        present(&input.first_name),
        present(&input.phone),
    ) else {
        return Err(ValidationError::MissingBookingFields);
    };

    let email = input.email.as_deref().filter(|email| !email.is_empty());
    if let Some(email) = email {
        if !EMAIL_PATTERN.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }
    }

    if !PHONE_PATTERN.is_match(phone) {
        return Err(ValidationError::InvalidPhone);
    }

    Ok(BookingRecord {
        timestamp: received_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        service: service.to_string(),
        date: date.to_string(),
        time: time.to_string(),
        first_name: first_name.to_string(),
        email: email.unwrap_or(EMAIL_NOT_APPLICABLE).to_string(),
        phone: phone.to_string(),
        message: input.message.clone().unwrap_or_default(),
    })
}

pub fn validate_admin_visit(input: &AdminVisitInput) -> Result<AdminVisitRecord, ValidationError> {
    let required = [
        &input.name,
        &input.therapy_name,
        &input.date,
        &input.price,
        &input.payment_mode,
    ];
    if required.iter().any(|field| present(field).is_none()) {
        return Err(ValidationError::MissingVisitFields);
    }

    let text = |field: &Option<String>| field.clone().unwrap_or_default();
    Ok(AdminVisitRecord {
        name: text(&input.name),
        room_no: text(&input.room_no),
        address: text(&input.address),
        contact: text(&input.contact),
        payment_mode: text(&input.payment_mode),
        time_in: text(&input.time_in),
        time_out: text(&input.time_out),
        therapy_name: text(&input.therapy_name),
        duration: text(&input.duration),
        therapist: text(&input.therapist),
        date: text(&input.date),
        membership: text(&input.membership),
        price: text(&input.price),
    })
}

/// Blank or whitespace-only counts as missing; the value itself is kept verbatim.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 30, 0).unwrap()
    }

    fn booking() -> BookingInput {
        BookingInput {
            service: Some("Massage".to_string()),
            date: Some("2025-01-01".to_string()),
            time: Some("10:00".to_string()),
            first_name: Some("Ana".to_string()),
            email: None,
            phone: Some("555-1234".to_string()),
            message: None,
        }
    }

    #[test]
    fn absent_email_normalizes_to_marker() {
        let record = validate_booking(&booking(), now()).unwrap();
        assert_eq!(record.email, "N/A");
        assert_eq!(record.message, "");
        assert_eq!(record.timestamp, "2025-01-01T08:30:00.000Z");
    }

    #[test]
    fn each_required_field_is_checked() {
        let blankers: [fn(&mut BookingInput); 5] = [
            |b| b.service = None,
            |b| b.date = Some(String::new()),
            |b| b.time = Some("   ".to_string()),
            |b| b.first_name = None,
            |b| b.phone = None,
        ];
        for blank in blankers {
            let mut input = booking();
            blank(&mut input);
            assert_eq!(
                validate_booking(&input, now()),
                Err(ValidationError::MissingBookingFields)
            );
        }
    }

    #[test]
    fn missing_fields_reported_before_format_problems() {
        let mut input = booking();
        input.service = None;
        input.phone = Some("abc123".to_string());
        input.email = Some("broken".to_string());
        assert_eq!(
            validate_booking(&input, now()),
            Err(ValidationError::MissingBookingFields)
        );
    }

    #[test]
    fn phone_with_letters_is_rejected() {
        for phone in ["abc123", "555-12x4", "+66 81 234 5678 ext", "555_1234"] {
            let mut input = booking();
            input.phone = Some(phone.to_string());
            assert_eq!(
                validate_booking(&input, now()),
                Err(ValidationError::InvalidPhone),
                "{phone}"
            );
        }
    }

    #[test]
    fn phone_digits_must_be_ascii() {
        for phone in ["๐๘๑ ๒๓๔ ๕๖๗๘", "１２３-４５６７", "٠١٢٣٤٥"] {
            let mut input = booking();
            input.phone = Some(phone.to_string());
            assert_eq!(
                validate_booking(&input, now()),
                Err(ValidationError::InvalidPhone),
                "{phone}"
            );
        }
    }

    #[test]
    fn phone_allows_punctuation_set() {
        let mut input = booking();
        input.phone = Some("+66 (81) 234-5678".to_string());
        assert!(validate_booking(&input, now()).is_ok());
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["ana.example.com", "ana@example", "ana @example.com", "@example.com"] {
            let mut input = booking();
            input.email = Some(email.to_string());
            assert_eq!(
                validate_booking(&input, now()),
                Err(ValidationError::InvalidEmail),
                "{email}"
            );
        }
    }

    #[test]
    fn blank_or_padded_email_is_rejected() {
        for email in [" ", " ana@example.com "] {
            let mut input = booking();
            input.email = Some(email.to_string());
            assert_eq!(
                validate_booking(&input, now()),
                Err(ValidationError::InvalidEmail),
                "{email:?}"
            );
        }
    }

    #[test]
    fn stored_values_are_not_trimmed() {
        let mut input = booking();
        input.first_name = Some("  Ana ".to_string());
        input.message = Some(" quiet room ".to_string());
        let record = validate_booking(&input, now()).unwrap();
        assert_eq!(record.first_name, "  Ana ");
        assert_eq!(record.message, " quiet room ");
    }

    #[test]
    fn valid_email_is_kept() {
        let mut input = booking();
        input.email = Some("ana@example.co.th".to_string());
        let record = validate_booking(&input, now()).unwrap();
        assert_eq!(record.email, "ana@example.co.th");
    }

    #[test]
    fn admin_visit_requires_five_fields() {
        let input = AdminVisitInput {
            name: Some("Mali".to_string()),
            therapy_name: Some("Thai Massage".to_string()),
            date: Some("2025-01-01".to_string()),
            price: Some("900".to_string()),
            payment_mode: None,
            ..Default::default()
        };
        assert_eq!(
            validate_admin_visit(&input),
            Err(ValidationError::MissingVisitFields)
        );
    }

    #[test]
    fn admin_visit_optionals_become_blank() {
        let input = AdminVisitInput {
            name: Some("Mali".to_string()),
            therapy_name: Some("Thai Massage".to_string()),
            date: Some("2025-01-01".to_string()),
            price: Some("900".to_string()),
            payment_mode: Some("Cash".to_string()),
            contact: Some("not a phone at all".to_string()),
            ..Default::default()
        };
        let record = validate_admin_visit(&input).unwrap();
        assert_eq!(record.room_no, "");
        assert_eq!(record.therapist, "");
        assert_eq!(record.contact, "not a phone at all");
    }
}
