//! Application state

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::BoxError;
use crate::analytics::AnalyticsService;
use crate::config::Config;
use crate::db::{DishRepository, MemoryStore, OrderRepository, PgStore, TableRepository};
use crate::orders::{BroadcastNotifier, OrderLifecycleService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderLifecycleService>,
    pub analytics: Arc<AnalyticsService>,
    /// Kitchen / waiter notification fan-out
    pub notifier: Arc<BroadcastNotifier>,
    /// Backing store name, reported by `/health`
    pub storage: &'static str,
}

impl AppState {
    /// Connect storage per `config` and wire the services
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let notifier = Arc::new(BroadcastNotifier::new(config.notify_channel_capacity));

        let Some(url) = config.database_url.as_deref() else {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is not persisted)");
            return Ok(Self::in_memory(Arc::new(MemoryStore::new()), notifier));
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect(url)
            .await?;
        tracing::info!(
            max_connections = config.db_max_connections,
            "Connected to PostgreSQL"
        );

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let store = Arc::new(PgStore::new(pool));
        Ok(Self::with_store(store.clone(), store.clone(), store, notifier, "postgres"))
    }

    /// State over a single in-memory store
    pub fn in_memory(store: Arc<MemoryStore>, notifier: Arc<BroadcastNotifier>) -> Self {
        Self::with_store(store.clone(), store.clone(), store, notifier, "memory")
    }

    fn with_store(
        orders: Arc<dyn OrderRepository>,
        tables: Arc<dyn TableRepository>,
        dishes: Arc<dyn DishRepository>,
        notifier: Arc<BroadcastNotifier>,
        storage: &'static str,
    ) -> Self {
        Self {
            orders: Arc::new(OrderLifecycleService::new(
                orders.clone(),
                tables,
                dishes,
                notifier.clone(),
            )),
            analytics: Arc::new(AnalyticsService::new(orders)),
            notifier,
            storage,
        }
    }
}
