use std::sync::Arc;

use services::api::BackendApi;
use services::{CategoryCatalog, Clock, SettingsService};

/// What the composition root must provide before launching the UI.
pub trait UiApp: Send + Sync {
    fn backend(&self) -> Arc<dyn BackendApi>;
    fn settings(&self) -> Arc<SettingsService>;
    fn catalog(&self) -> Arc<CategoryCatalog>;
    fn clock(&self) -> Clock;
}

#[derive(Clone)]
pub struct AppContext {
    backend: Arc<dyn BackendApi>,
    settings: Arc<SettingsService>,
    catalog: Arc<CategoryCatalog>,
    clock: Clock,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            backend: app.backend(),
            settings: app.settings(),
            catalog: app.catalog(),
            clock: app.clock(),
        }
    }

    #[must_use]
    pub fn backend(&self) -> Arc<dyn BackendApi> {
        Arc::clone(&self.backend)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CategoryCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
