use std::sync::Arc;

use crate::auth::repo::{MemoryUserStore, PgUserStore, UserStore};
use crate::cashcards::{CashCardStore, MemoryCashCardStore, PgCashCardStore};
use crate::config::{AppConfig, StoreBackend};
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cards: Arc<dyn CashCardStore>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        match config.backend {
            StoreBackend::Postgres => {
                let pool = db::connect(&config).await?;
                db::migrate(&pool).await?;
                Ok(Self {
                    cards: Arc::new(PgCashCardStore::new(pool.clone())),
                    users: Arc::new(PgUserStore::new(pool)),
                    config,
                })
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory stores; data is lost on restart");
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            cards: Arc::new(MemoryCashCardStore::new()),
            users: Arc::new(MemoryUserStore::new()),
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        use crate::config::{JwtConfig, PagingConfig};

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            backend: StoreBackend::Memory,
            database_url: None,
            max_connections: 1,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            paging: PagingConfig::default(),
            seed_demo_data: false,
        });
        Self::in_memory(config)
    }
}
