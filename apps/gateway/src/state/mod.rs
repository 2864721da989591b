// [apps/gateway/src/state/mod.rs]
/*!
 * Estado compartido del proceso. Una sola instancia de `AppState` se
 * clona (barato: todos los campos son `Arc` o tipos ya baratos de
 * clonar) y se inyecta en cada handler vía el extractor `State` de
 * axum.
 */

use crate::config::AppConfig;
use chrono::{DateTime, Utc};
use gatewayrs_domain_idempotency::{IdemStore, KeyMutexMap};
use gatewayrs_infra_db::{AuditRepository, DomainRepository, IdemRepository, PurchaseRepository, SpendRepository, TursoClient, UserRepository};
use gatewayrs_infra_rate_limiter::{spawn_sweeper, RateLimiter, RateLimiterConfig};
use gatewayrs_infra_registrar::{build_driver, RegistrarDriver};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub database_client: TursoClient,

    pub users: Arc<UserRepository>,
    pub domains: Arc<DomainRepository>,
    pub purchases: Arc<PurchaseRepository>,
    pub audit: Arc<AuditRepository>,
    pub spend: Arc<SpendRepository>,
    pub idem_store: Arc<dyn IdemStore>,

    pub registrar: Arc<dyn RegistrarDriver>,
    pub rate_limiter: Arc<RateLimiter>,
    pub purchase_mutex: Arc<KeyMutexMap>,

    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, database_client: TursoClient) -> Result<Self, String> {
        let registrar = build_driver(&config.registrar_driver_config())?;

        let rate_limiter = Arc::new(RateLimiter::new(RateLimiterConfig {
            requests_per_minute: config.rate_limit_rpm,
            burst_size: config.rate_limit_burst,
        }));
        spawn_sweeper(Arc::clone(&rate_limiter));

        let idem_repo = Arc::new(IdemRepository::new(database_client.clone()));

        info!(
            provider = %config.default_provider,
            dry_run = config.dry_run,
            "🧭 [STATE]: gateway application state assembled"
        );

        Ok(Self {
            config: Arc::new(config),
            users: Arc::new(UserRepository::new(database_client.clone())),
            domains: Arc::new(DomainRepository::new(database_client.clone())),
            purchases: Arc::new(PurchaseRepository::new(database_client.clone())),
            audit: Arc::new(AuditRepository::new(database_client.clone())),
            spend: Arc::new(SpendRepository::new(database_client.clone())),
            idem_store: idem_repo,
            registrar: Arc::from(registrar),
            rate_limiter,
            purchase_mutex: Arc::new(KeyMutexMap::new()),
            started_at: Utc::now(),
            database_client,
        })
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}
