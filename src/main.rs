mod auth;
mod config;
mod error;
mod export;
mod ledger;
mod models;
mod notify;
mod pipeline;
mod push;
mod routes;
mod slip;
mod state;
#[cfg(test)]
mod testing;
mod validate;
mod whatsapp;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use crate::{
    auth::AccessGuard, config::AppConfig, ledger::SheetsLedger, notify::LiveNotifier,
    state::AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = run().await {
        eprintln!("Startup error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let config = AppConfig::from_env()?;

    if !config.sheets.enabled() {
        log::warn!("Google Sheets credentials not set. Submissions will fail until SHEET_ID, GOOGLE_SERVICE_ACCOUNT_EMAIL and GOOGLE_PRIVATE_KEY are provided.");
    }
    if !config.push.enabled() {
        log::warn!("Web push not configured. Booking push alerts are disabled.");
    }
    if !config.whatsapp.enabled() {
        log::warn!("WhatsApp credentials not set. Template alerts are disabled.");
    }

    let guard = AccessGuard::new(&config.auth).map_err(|err| format!("password hash failed: {err}"))?;
    let ledger = SheetsLedger::new(config.sheets.clone())?;
    let notifier = LiveNotifier::new(config.push.clone(), config.whatsapp.clone())?;

    let address = config.server_address();
    let static_dir = config.static_dir.clone();
    let state = AppState::new(config, Arc::new(ledger), Arc::new(notifier), guard);

    log::info!("Starting Relax Thai Spa on http://{address}");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .configure(routes::configure)
            .configure(|cfg| routes::assets::configure(cfg, &static_dir))
    })
    .bind(address)?
    .run()
    .await?;

    Ok(())
}
