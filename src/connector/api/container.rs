use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::{SubscriptionRepository, SubscriptionService};
use crate::{DuckdbSubscriptionRepository, InMemorySubscriptionRepository};

pub struct ContainerConfig {
    pub data_dir: String,
    /// Keep subscriptions in process memory instead of the DuckDB file.
    pub memory_storage: bool,
}

pub struct Container {
    subscription_service: Arc<SubscriptionService>,
    shutdown: CancellationToken,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let subscription_repo: Arc<dyn SubscriptionRepository> = if config.memory_storage {
            debug!("Using in-memory subscription storage");
            Arc::new(InMemorySubscriptionRepository::new())
        } else {
            let db_path = PathBuf::from(&config.data_dir).join("subtrack.duckdb");
            debug!("Using DuckDB subscription storage at {:?}", db_path);
            Arc::new(DuckdbSubscriptionRepository::new(&db_path)?)
        };

        Ok(Self::with_repository(subscription_repo))
    }

    /// Wires the service over an already constructed repository.
    pub fn with_repository(subscription_repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self {
            subscription_service: Arc::new(SubscriptionService::new(subscription_repo)),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn subscription_service(&self) -> Arc<SubscriptionService> {
        self.subscription_service.clone()
    }

    /// Cancelling this token aborts the command in flight.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
