use crate::config::{AppConfig, StorageBackend};
use crate::nutrition::foods::FoodLookup;
use crate::nutrition::nutritionix::{NutritionSource, NutritionixClient};
use crate::storage::{MemoryStore, PgStore, Store};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub foods: FoodLookup,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn Store> = match config.storage {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres storage backend")?;
                let pg = PgStore::connect(url, config.database_max_connections).await?;
                pg.migrate().await?;
                info!("using postgres storage");
                Arc::new(pg)
            }
            StorageBackend::Memory => {
                warn!("using in-memory storage; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let external = match &config.nutritionix {
            Some(cfg) => {
                info!(base_url = %cfg.base_url, "nutritionix lookup enabled");
                Some(Arc::new(NutritionixClient::new(cfg.clone())?) as Arc<dyn NutritionSource>)
            }
            None => None,
        };

        Ok(Self::from_parts(config, store, FoodLookup::new(external)))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn Store>, foods: FoodLookup) -> Self {
        Self {
            config,
            store,
            foods,
        }
    }

    /// In-memory state with fixed JWT settings and no external lookup.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            storage: StorageBackend::Memory,
            database_url: None,
            database_max_connections: 1,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            nutritionix: None,
        });

        Self::from_parts(config, Arc::new(MemoryStore::new()), FoodLookup::default())
    }
}
