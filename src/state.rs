use std::sync::Arc;

use crate::{
    auth::AccessGuard,
    config::AppConfig,
    ledger::Ledger,
    notify::Notifier,
    slip::VisitSlipRenderer,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ledger: Arc<dyn Ledger>,
    pub notifier: Arc<dyn Notifier>,
    pub guard: Arc<AccessGuard>,
    pub renderer: Arc<VisitSlipRenderer>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        guard: AccessGuard,
    ) -> Self {
        let renderer = VisitSlipRenderer::new(config.logo_path.clone())
            .with_font(config.slip_font_path.clone());
        Self {
            config: Arc::new(config),
            ledger,
            notifier,
            guard: Arc::new(guard),
            renderer: Arc::new(renderer),
        }
    }
}
