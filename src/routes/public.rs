use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::ApiError,
    models::BookingInput,
    pipeline::{self, PipelineError},
    state::AppState,
};

#[derive(Deserialize)]
struct PasswordForm {
    #[serde(default)]
    password: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/submit").route(web::post().to(submit_booking)))
        .service(web::resource("/admin/check-password").route(web::post().to(check_password)));
}

async fn submit_booking(
    state: web::Data<AppState>,
    form: web::Json<BookingInput>,
) -> Result<HttpResponse, ApiError> {
    let receipt = pipeline::submit_booking(&state, &form, Utc::now())
        .await
        .map_err(|err| match err {
            PipelineError::Validation(err) => ApiError::Validation(err),
            other => ApiError::internal(
                "Something went wrong. Please try again.",
                &other,
                state.config.expose_error_details,
            ),
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Appointment request submitted! We'll contact you soon.",
        "data": receipt,
    })))
}

async fn check_password(
    state: web::Data<AppState>,
    form: web::Json<PasswordForm>,
) -> Result<HttpResponse, ApiError> {
    let token = state.guard.issue_credential(&form.password)?;
    log::info!("Admin credential issued");
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "token": token })))
}
