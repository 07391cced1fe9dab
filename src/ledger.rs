use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client as HttpClient, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    config::SheetsConfig,
    models::{LedgerRow, RowScope, SheetKind},
};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger is not configured")]
    NotConfigured,
    #[error("ledger credentials rejected: {0}")]
    Credentials(String),
    #[error("ledger request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("ledger returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReceipt {
    pub row_number: Option<u32>,
}

/// Append-and-read row store. Row 0 of every read is the header row.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn append(&self, kind: SheetKind, row: LedgerRow) -> Result<AppendReceipt, LedgerError>;

    async fn rows(&self, scope: RowScope) -> Result<Vec<LedgerRow>, LedgerError>;
}

pub struct SheetsLedger {
    config: SheetsConfig,
    http_client: HttpClient,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: Option<String>,
}

impl SheetsLedger {
    pub fn new(config: SheetsConfig) -> Result<Self, LedgerError> {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn sheet_name(&self, kind: SheetKind) -> &str {
        match kind {
            SheetKind::Bookings => &self.config.bookings_sheet,
            SheetKind::AdminVisits => &self.config.admin_sheet,
        }
    }

    fn values_url(&self, segment: &str) -> Result<Url, LedgerError> {
        let mut url = Url::parse(SHEETS_API)
            .map_err(|err| LedgerError::Credentials(format!("bad API url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| LedgerError::Credentials("bad API url".to_string()))?
            .push(&self.config.sheet_id)
            .push("values")
            .push(segment);
        Ok(url)
    }

    async fn access_token(&self) -> Result<String, LedgerError> {
        if !self.config.enabled() {
            return Err(LedgerError::NotConfigured);
        }

        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.config.service_account_email,
            scope: SHEETS_SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + 3600,
        };
        let key = EncodingKey::from_rsa_pem(self.config.private_key.as_bytes())
            .map_err(|err| LedgerError::Credentials(err.to_string()))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|err| LedgerError::Credentials(err.to_string()))?;

        let response = self
            .http_client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn read_sheet(&self, kind: SheetKind) -> Result<Vec<LedgerRow>, LedgerError> {
        let token = self.access_token().await?;
        let url = self.values_url(self.sheet_name(kind))?;

        let response = self.http_client.get(url).bearer_auth(token).send().await?;
        let range: ValueRange = ensure_success(response).await?.json().await?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

#[async_trait]
impl Ledger for SheetsLedger {
    async fn append(&self, kind: SheetKind, row: LedgerRow) -> Result<AppendReceipt, LedgerError> {
        let token = self.access_token().await?;
        let mut url = self.values_url(&format!("{}:append", self.sheet_name(kind)))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        let appended: AppendResponse = ensure_success(response).await?.json().await?;

        let row_number = appended
            .updates
            .and_then(|updates| updates.updated_range)
            .and_then(|range| row_number_from_range(&range));
        Ok(AppendReceipt { row_number })
    }

    async fn rows(&self, scope: RowScope) -> Result<Vec<LedgerRow>, LedgerError> {
        match scope {
            RowScope::All => self.read_sheet(SheetKind::Bookings).await,
            RowScope::Admin => self.read_sheet(SheetKind::AdminVisits).await,
            RowScope::Today => {
                let rows = self.read_sheet(SheetKind::Bookings).await?;
                let today = Utc::now().format("%Y-%m-%d").to_string();
                Ok(rows_for_day(rows, &today))
            }
        }
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LedgerError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(LedgerError::Rejected { status, body })
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `Sheet1!A7:H7` -> 7
fn row_number_from_range(range: &str) -> Option<u32> {
    let cells = range.rsplit('!').next()?;
    let first = cells.split(':').next()?;
    first
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '$')
        .parse()
        .ok()
}

/// Keeps the header plus the rows whose timestamp column falls on `day`.
pub fn rows_for_day(rows: Vec<LedgerRow>, day: &str) -> Vec<LedgerRow> {
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    std::iter::once(header)
        .chain(rows.filter(|row| row.first().is_some_and(|stamp| stamp.starts_with(day))))
        .collect()
}
