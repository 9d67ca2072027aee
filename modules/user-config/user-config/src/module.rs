//! Module wiring for user configs.

use std::sync::Arc;

use figment::Figment;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};
use user_config_sdk::UserConfigApi;

use crate::config::UserConfigModuleConfig;
use crate::domain::repo::UserConfigRepository;
use crate::domain::service::Service;
use crate::infra::storage::migrations::Migrator;
use crate::infra::{InMemoryUserConfigRepository, SeaOrmUserConfigRepository};
use crate::local_client::UserConfigLocalClient;

/// User config module.
///
/// Holds the domain service once [`UserConfigModule::init`] has run and hands
/// out `UserConfigApi` clients backed by it.
pub struct UserConfigModule {
    service: arc_swap::ArcSwapOption<Service>,
}

impl Default for UserConfigModule {
    fn default() -> Self {
        Self {
            service: arc_swap::ArcSwapOption::from(None),
        }
    }
}

impl UserConfigModule {
    /// Run migrations and build the service on top of the given database.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or the migrations cannot be applied.
    pub async fn init(&self, figment: &Figment, db: DatabaseConnection) -> anyhow::Result<()> {
        info!("Initializing user_config module");

        let cfg = UserConfigModuleConfig::from_figment(figment)?;
        debug!(
            "Loaded user_config config: max_name_length={}, max_tags={}, default_page_size={}, max_page_size={}",
            cfg.max_name_length, cfg.max_tags, cfg.default_page_size, cfg.max_page_size
        );

        Migrator::up(&db, None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run user_config migrations: {e}"))?;

        self.install(Arc::new(SeaOrmUserConfigRepository::new(db)), &cfg);

        info!("User config module initialized");
        Ok(())
    }

    /// Build the service on a process-local store. Nothing is persisted.
    ///
    /// # Errors
    /// Fails if the configuration is invalid.
    pub fn init_in_memory(&self, figment: &Figment) -> anyhow::Result<()> {
        info!("Initializing user_config module with in-memory storage");

        let cfg = UserConfigModuleConfig::from_figment(figment)?;
        self.install(Arc::new(InMemoryUserConfigRepository::new()), &cfg);

        Ok(())
    }

    fn install(&self, repo: Arc<dyn UserConfigRepository>, cfg: &UserConfigModuleConfig) {
        let service = Arc::new(Service::new(repo, cfg.service_config()));
        self.service.store(Some(service));
    }

    /// Client for in-process consumers.
    ///
    /// # Errors
    /// Fails if the module has not been initialized.
    pub fn client(&self) -> anyhow::Result<Arc<dyn UserConfigApi>> {
        let service = self
            .service
            .load()
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?
            .clone();

        Ok(Arc::new(UserConfigLocalClient::new(service)))
    }
}
