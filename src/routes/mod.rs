pub mod admin;
pub mod assets;
pub mod public;

use actix_web::{middleware::from_fn, web, HttpResponse};

use crate::{auth::admin_guard, error::ApiError};

/// Mounts `/api`. The open endpoints come first; everything else under `/api`
/// passes the admin guard before routing, including unknown paths.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .configure(public::configure)
            .service(
                web::scope("")
                    .wrap(from_fn(admin_guard))
                    .configure(admin::configure)
                    .default_service(web::to(api_not_found)),
            ),
    );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected request body: {err}");
        ApiError::BadRequest("Invalid request body.".to_string()).into()
    })
}

async fn api_not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}
