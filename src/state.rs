use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{FallbackStore, Store};
use crate::notify::Notifier;
use crate::services::OrderService;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FallbackStore>,
    pub notifier: Notifier,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<FallbackStore>, config: Arc<AppConfig>) -> Self {
        let notifier = Notifier::from_config(&config, store.clone());
        Self { store, notifier, config }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(self.store(), &self.notifier, &self.config.shop)
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.security.jwt_secret
    }
}
