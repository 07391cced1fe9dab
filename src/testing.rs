//! In-memory collaborators for handler and pipeline tests.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    auth::AccessGuard,
    config::AppConfig,
    ledger::{AppendReceipt, Ledger, LedgerError},
    models::{
        AdminVisitInput, BookingInput, BookingRecord, LedgerRow, RowScope, SheetKind,
        TemplatedMessage,
    },
    notify::{Notifier, NotifyError},
    state::AppState,
};

pub const TEST_SECRET: &str = "test-jwt-secret";
pub const TEST_PASSWORD: &str = "lemongrass";

#[derive(Default)]
struct LedgerInner {
    fail_append: bool,
    next_row: Option<u32>,
    rows: Vec<LedgerRow>,
    appended: Vec<(SheetKind, LedgerRow)>,
    reads: Vec<RowScope>,
}

#[derive(Clone, Default)]
pub struct FakeLedger(Arc<Mutex<LedgerInner>>);

impl FakeLedger {
    pub fn failing_append() -> Self {
        let ledger = Self::default();
        ledger.0.lock().unwrap().fail_append = true;
        ledger
    }

    pub fn with_next_row(row: u32) -> Self {
        let ledger = Self::default();
        ledger.0.lock().unwrap().next_row = Some(row);
        ledger
    }

    pub fn with_rows(rows: Vec<LedgerRow>) -> Self {
        let ledger = Self::default();
        ledger.0.lock().unwrap().rows = rows;
        ledger
    }

    pub fn appended(&self) -> Vec<(SheetKind, LedgerRow)> {
        self.0.lock().unwrap().appended.clone()
    }

    pub fn reads(&self) -> Vec<RowScope> {
        self.0.lock().unwrap().reads.clone()
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn append(&self, kind: SheetKind, row: LedgerRow) -> Result<AppendReceipt, LedgerError> {
        let mut inner = self.0.lock().unwrap();
        if inner.fail_append {
            return Err(LedgerError::Rejected {
                status: 503,
                body: "backend unavailable".to_string(),
            });
        }
        inner.appended.push((kind, row));
        Ok(AppendReceipt {
            row_number: inner.next_row,
        })
    }

    async fn rows(&self, scope: RowScope) -> Result<Vec<LedgerRow>, LedgerError> {
        let mut inner = self.0.lock().unwrap();
        inner.reads.push(scope);
        Ok(inner.rows.clone())
    }
}

#[derive(Default)]
struct NotifierInner {
    fail: bool,
    generic: Vec<BookingRecord>,
    templated: Vec<TemplatedMessage>,
}

#[derive(Clone, Default)]
pub struct FakeNotifier(Arc<Mutex<NotifierInner>>);

impl FakeNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.0.lock().unwrap().fail = true;
        notifier
    }

    pub fn generic_calls(&self) -> usize {
        self.0.lock().unwrap().generic.len()
    }

    pub fn templated_calls(&self) -> usize {
        self.0.lock().unwrap().templated.len()
    }

    pub fn templated(&self) -> Vec<TemplatedMessage> {
        self.0.lock().unwrap().templated.clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send_generic(&self, booking: &BookingRecord) -> Result<(), NotifyError> {
        let mut inner = self.0.lock().unwrap();
        inner.generic.push(booking.clone());
        if inner.fail {
            return Err(NotifyError::Rejected("push endpoint gone".to_string()));
        }
        Ok(())
    }

    async fn send_templated(&self, message: &TemplatedMessage) -> Result<(), NotifyError> {
        let mut inner = self.0.lock().unwrap();
        inner.templated.push(message.clone());
        if inner.fail {
            return Err(NotifyError::Rejected("template rejected".to_string()));
        }
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    let vars: HashMap<String, String> = [
        ("JWT_SECRET", TEST_SECRET),
        ("ADMIN_PASSWORD", TEST_PASSWORD),
        ("ADMIN_WA_NUMBER", "66800000000"),
        ("LOGO_PATH", "/nonexistent/relaxspa/logo.png"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();
    AppConfig::from_vars(vars).unwrap()
}

pub fn test_state(ledger: FakeLedger, notifier: FakeNotifier) -> AppState {
    state_with_config(test_config(), ledger, notifier)
}

pub fn state_with_config(config: AppConfig, ledger: FakeLedger, notifier: FakeNotifier) -> AppState {
    let guard = AccessGuard::new(&config.auth).unwrap();
    AppState::new(config, Arc::new(ledger), Arc::new(notifier), guard)
}

pub fn with_logo(mut config: AppConfig, logo_path: PathBuf) -> AppConfig {
    config.logo_path = logo_path;
    config
}

pub fn booking_input() -> BookingInput {
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

pub fn visit_input() -> AdminVisitInput {
    AdminVisitInput {
        name: Some("Mali".to_string()),
        therapy_name: Some("Thai Massage".to_string()),
        date: Some("2025-01-01".to_string()),
        price: Some("900".to_string()),
        payment_mode: Some("Cash".to_string()),
        ..Default::default()
    }
}
