use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    export::{self, ExportError, ReportKind},
    ledger::LedgerError,
    models::{
        AdminVisitInput, BookingInput, BookingReceipt, BookingRecord, LedgerRow, RowScope,
        SheetKind, TemplatedMessage,
    },
    notify::booking_alert_text,
    slip::RenderError,
    state::AppState,
    validate::{validate_admin_visit, validate_booking, ValidationError},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] LedgerError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("no rows to export")]
    NoData,
}

/// Validate, append, then notify. Only the append can fail the request.
pub async fn submit_booking(
    state: &AppState,
    input: &BookingInput,
    received_at: DateTime<Utc>,
) -> Result<BookingReceipt, PipelineError> {
    let record = validate_booking(input, received_at)?;

    let receipt = state
        .ledger
        .append(SheetKind::Bookings, record.to_row())
        .await?;
    log::info!(
        "Booking from {} stored at row {:?}",
        record.first_name,
        receipt.row_number
    );

    notify_booking(state, &record).await;

    Ok(BookingReceipt {
        id: receipt.row_number,
        timestamp: record.timestamp,
    })
}

async fn notify_booking(state: &AppState, record: &BookingRecord) {
    if let Err(err) = state.notifier.send_generic(record).await {
        log::warn!("Booking notification failed: {err}");
    }

    let Some(to) = state.config.whatsapp.admin_number.clone() else {
        log::warn!("ADMIN_WA_NUMBER not set. Skipping WhatsApp alert.");
        return;
    };
    let message = TemplatedMessage {
        to,
        template_name: state.config.whatsapp.template_name.clone(),
        params: vec![booking_alert_text(record)],
    };
    if let Err(err) = state.notifier.send_templated(&message).await {
        log::warn!("WhatsApp notification failed: {err}");
    }
}

/// Validate, append, then render the visit slip for the stored record.
pub async fn submit_admin_visit(
    state: &AppState,
    input: &AdminVisitInput,
) -> Result<Vec<u8>, PipelineError> {
    let record = validate_admin_visit(input)?;

    let receipt = state
        .ledger
        .append(SheetKind::AdminVisits, record.to_row())
        .await?;
    log::info!(
        "Visit for {} stored at row {:?}",
        record.name,
        receipt.row_number
    );

    Ok(state.renderer.render(&record)?)
}

pub async fn export_report(state: &AppState, scope: RowScope) -> Result<Vec<u8>, PipelineError> {
    let rows = state.ledger.rows(scope).await?;
    if !has_data(&rows) {
        return Err(PipelineError::NoData);
    }

    let kind = match scope {
        RowScope::Admin => ReportKind::AdminVisits,
        RowScope::Today | RowScope::All => ReportKind::Bookings,
    };
    Ok(export::export(kind, &rows)?)
}

pub async fn today_booking_count(state: &AppState) -> Result<usize, LedgerError> {
    let rows = state.ledger.rows(RowScope::Today).await?;
    Ok(rows.len().saturating_sub(1))
}

fn has_data(rows: &[LedgerRow]) -> bool {
    rows.len() > 1
}
