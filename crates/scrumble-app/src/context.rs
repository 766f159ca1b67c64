// Application context: built once at startup and handed to the controllers
// instead of each reaching for ambient globals.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::info;

use scrumble_core::api::{ApiClient, HttpTransport, ReqwestTransport};
use scrumble_core::config::Config;
use scrumble_core::credentials::{AdminKeyStore, FingerprintStore};
use scrumble_core::storage::LocalStorage;

use crate::admin::AdminController;
use crate::presenter::ArenaSettings;
use crate::voting::VotingController;

pub struct AppContext {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub fingerprints: FingerprintStore,
    pub admin_keys: AdminKeyStore,
}

impl AppContext {
    /// Wire everything over an explicit storage handle and transport.
    pub fn new(config: Config, storage: Arc<LocalStorage>, transport: Arc<dyn HttpTransport>) -> Self {
        let fingerprints = FingerprintStore::new(storage.clone());
        let admin_keys = AdminKeyStore::new(storage);
        let api = Arc::new(ApiClient::new(
            &config.api.base_url,
            transport,
            admin_keys.clone(),
        ));
        Self {
            config,
            api,
            fingerprints,
            admin_keys,
        }
    }

    /// Production wiring: on-disk storage and the reqwest transport.
    pub fn from_config(config: Config) -> Result<Self> {
        let path = config.storage_path();
        let storage = LocalStorage::open(&path)
            .with_context(|| format!("failed to open local storage at {}", path.display()))?;
        info!("Local storage at {}", path.display());
        Ok(Self::new(
            config,
            Arc::new(storage),
            Arc::new(ReqwestTransport::new()),
        ))
    }

    pub fn voting(&self) -> VotingController {
        VotingController::new(
            self.api.clone(),
            self.fingerprints.clone(),
            ArenaSettings {
                region: self.config.display.region.clone(),
                preview_overrides: self.config.preview_overrides.clone(),
            },
        )
    }

    pub fn admin(&self) -> AdminController {
        AdminController::new(self.api.clone(), self.admin_keys.clone())
    }
}
