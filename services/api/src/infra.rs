use amc_directory::config::AppConfig;
use amc_directory::directory::{
    connect_lazy, CompanyDirectory, ConnectionSummary, DatabaseMaintenance, FixedWindowLimiter,
    InMemoryRateLimitStore, PgCompanyStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type Directory = CompanyDirectory<PgCompanyStore, InMemoryRateLimitStore>;
pub(crate) type Maintenance = DatabaseMaintenance<PgCompanyStore>;

/// Services backed by one lazily connecting PostgreSQL pool.
pub(crate) struct Components {
    pub(crate) directory: Arc<Directory>,
    pub(crate) maintenance: Arc<Maintenance>,
    pub(crate) rate_limits: Arc<InMemoryRateLimitStore>,
}

impl Components {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        let store = Arc::new(PgCompanyStore::new(connect_lazy(&config.database)));
        let rate_limits = Arc::new(InMemoryRateLimitStore::default());

        let directory = Arc::new(CompanyDirectory::new(
            store.clone(),
            FixedWindowLimiter::new(rate_limits.clone(), config.rate_limit),
            config.environment,
        ));
        let maintenance = Arc::new(DatabaseMaintenance::new(
            store,
            ConnectionSummary::from(&config.database),
            config.environment,
        ));

        Self {
            directory,
            maintenance,
            rate_limits,
        }
    }

    pub(crate) fn maintenance_only(config: &AppConfig) -> Arc<Maintenance> {
        Self::from_config(config).maintenance
    }
}

/// Periodically drops expired rate-limit windows so idle clients do not accumulate.
pub(crate) fn spawn_rate_limit_sweeper(store: Arc<InMemoryRateLimitStore>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                debug!(purged, "purged expired rate limit windows");
            }
        }
    });
}
