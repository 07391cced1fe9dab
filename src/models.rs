use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const ROLE_ADMIN: &str = "admin";

/// Marker stored in the ledger when a customer leaves the email blank.
pub const EMAIL_NOT_APPLICABLE: &str = "N/A";

/// One ledger row as the backend returns it. Row 0 of any result is the header.
pub type LedgerRow = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Bookings,
    AdminVisits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowScope {
    Today,
    All,
    Admin,
}

/// Raw customer booking body. Every field is optional here so the validator
/// decides what is missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    #[serde(default, deserialize_with = "text_field")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub timestamp: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl BookingRecord {
    pub fn to_row(&self) -> LedgerRow {
        vec![
            self.timestamp.clone(),
            self.service.clone(),
            self.date.clone(),
            self.time.clone(),
            self.first_name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.message.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminVisitInput {
    #[serde(default, deserialize_with = "text_field")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub room_no: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub payment_mode: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub time_in: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub time_out: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub therapy_name: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub therapist: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub membership: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub price: Option<String>,
}

/// Staff-entered visit. Optional fields hold an empty string, never a marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminVisitRecord {
    pub name: String,
    pub room_no: String,
    pub address: String,
    pub contact: String,
    pub payment_mode: String,
    pub time_in: String,
    pub time_out: String,
    pub therapy_name: String,
    pub duration: String,
    pub therapist: String,
    pub date: String,
    pub membership: String,
    pub price: String,
}

impl AdminVisitRecord {
    pub fn to_row(&self) -> LedgerRow {
        vec![
            self.name.clone(),
            self.room_no.clone(),
            self.address.clone(),
            self.contact.clone(),
            self.payment_mode.clone(),
            self.time_in.clone(),
            self.time_out.clone(),
            self.therapy_name.clone(),
            self.duration.clone(),
            self.therapist.clone(),
            self.date.clone(),
            self.membership.clone(),
            self.price.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingReceipt {
    pub id: Option<u32>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedMessage {
    pub to: String,
    pub template_name: String,
    pub params: Vec<String>,
}

/// Accepts strings, numbers and booleans from the browser form and keeps them as text.
fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
