use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ImportService, SeaOrmAuthService, SpreadsheetImportService, TokenService,
};

/// Long-lived application state: the immutable configuration, the pooled
/// store and the domain services built on top of them.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub auth_service: Arc<dyn AuthService>,

    pub import_service: Arc<dyn ImportService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.database_url(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;

        let tokens = Arc::new(
            TokenService::new(&config.security)
                .map_err(|e| anyhow::anyhow!("Failed to initialize token service: {e}"))?,
        );

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), tokens.clone()))
            as Arc<dyn AuthService + Send + Sync + 'static>;

        let import_service = Arc::new(SpreadsheetImportService::new(store.clone()))
            as Arc<dyn ImportService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            auth_service,
            import_service,
        })
    }
}
