//! Application state construction.

use std::sync::Arc;

use anyhow::Context;
use cashbook_service::{CashbookService, InMemoryRepository, MySqlRepository};

use crate::config::GatewayConfig;
use crate::router::AppState;

/// Storage selected at startup, kept so it can be closed on shutdown.
pub enum Storage {
    Memory,
    MySql(MySqlRepository),
}

impl Storage {
    pub async fn close(&self) {
        if let Storage::MySql(repository) = self {
            repository.close().await;
        }
    }
}

/// Build the shared state from `config`.
///
/// Connects to MySQL when database settings are present, otherwise falls
/// back to the in-memory store.
pub async fn initialize_app_state(config: &GatewayConfig) -> anyhow::Result<(AppState, Storage)> {
    tracing::info!("Initializing application components");

    let (service, storage) = match &config.database {
        Some(db_config) => {
            tracing::info!(
                "Connecting to MySQL at {}:{}/{}",
                db_config.host,
                db_config.port,
                db_config.database
            );
            let repository = MySqlRepository::connect(db_config)
                .await
                .context("failed to initialize MySQL storage")?;
            (
                CashbookService::new(Arc::new(repository.clone())),
                Storage::MySql(repository),
            )
        }
        None => {
            tracing::warn!("DATABASE_HOST not set, records are kept in memory only");
            (
                CashbookService::new(Arc::new(InMemoryRepository::new())),
                Storage::Memory,
            )
        }
    };

    let service = service.with_carry_policy(config.carry_policy);
    tracing::info!(
        "Cashbook service ready (storage: {}, carry policy: {:?})",
        service.backend(),
        service.carry_policy()
    );

    Ok((AppState::new(service, config.jwt.clone()), storage))
}
