use actix_web::{http::header, http::StatusCode, web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::{
    auth::AdminSession,
    error::ApiError,
    export::XLSX_CONTENT_TYPE,
    models::{AdminVisitInput, RowScope},
    pipeline::{self, PipelineError},
    state::AppState,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/admin/submit").route(web::post().to(submit_visit)))
        .service(web::resource("/admin/export").route(web::get().to(export_admin)))
        .service(web::resource("/export").route(web::get().to(export_today)))
        .service(web::resource("/export-all").route(web::get().to(export_all)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/stats").route(web::get().to(stats)));
}

async fn submit_visit(
    state: web::Data<AppState>,
    session: web::ReqData<AdminSession>,
    form: web::Json<AdminVisitInput>,
) -> Result<HttpResponse, ApiError> {
    let pdf = pipeline::submit_admin_visit(&state, &form)
        .await
        .map_err(|err| match err {
            PipelineError::Validation(err) => ApiError::Validation(err),
            other => ApiError::internal(
                "Failed to record visit.",
                &other,
                state.config.expose_error_details,
            ),
        })?;

    log::info!(
        "Visit slip issued to {} session (expires {})",
        session.role,
        session.expires_at
    );
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            r#"inline; filename="therapy-form.pdf""#,
        ))
        .body(pdf))
}

async fn export_admin(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let workbook = pipeline::export_report(&state, RowScope::Admin)
        .await
        .map_err(|err| {
            export_error(
                err,
                StatusCode::NOT_FOUND,
                "No admin data found",
                "Failed to export admin data",
                &state,
            )
        })?;
    Ok(attachment(workbook, "customervisits.xlsx"))
}

async fn export_today(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let workbook = pipeline::export_report(&state, RowScope::Today)
        .await
        .map_err(|err| {
            export_error(
                err,
                StatusCode::OK,
                "No submissions found for today.",
                "Failed to export data.",
                &state,
            )
        })?;
    let today = Utc::now().format("%Y-%m-%d");
    Ok(attachment(
        workbook,
        &format!("relax-thai-spa-bookings-{today}.xlsx"),
    ))
}

async fn export_all(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let workbook = pipeline::export_report(&state, RowScope::All)
        .await
        .map_err(|err| {
            export_error(
                err,
                StatusCode::NOT_FOUND,
                "No data found in the sheet.",
                "Failed to export all data.",
                &state,
            )
        })?;
    Ok(attachment(workbook, "relax-thai-spa-bookings-all.xlsx"))
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    let presence = |configured: bool| if configured { "configured" } else { "missing" };
    HttpResponse::Ok().json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "sheetId": presence(state.config.sheets.enabled()),
        "push": presence(state.config.push.enabled()),
        "whatsapp": presence(state.config.whatsapp.enabled()),
    }))
}

async fn stats(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let bookings = pipeline::today_booking_count(&state).await.map_err(|err| {
        ApiError::internal(
            "Failed to fetch statistics.",
            &err,
            state.config.expose_error_details,
        )
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "today": Utc::now().format("%Y-%m-%d").to_string(),
        "bookings": bookings,
    })))
}

fn export_error(
    err: PipelineError,
    no_data_status: StatusCode,
    no_data: &'static str,
    failure: &'static str,
    state: &AppState,
) -> ApiError {
    match err {
        PipelineError::NoData => ApiError::NoData {
            status: no_data_status,
            message: no_data,
        },
        other => ApiError::internal(failure, &other, state.config.expose_error_details),
    }
}

fn attachment(bytes: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(bytes)
}
