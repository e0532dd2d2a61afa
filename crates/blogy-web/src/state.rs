use std::sync::Arc;

use blogy_core::{AuthGateway, PasswordHasher, Quota, RateLimitRegistry, TokenService, UserStore};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub gateway: Arc<AuthGateway>,
    /// Per-client token buckets, shared by every request.
    pub limiter: Arc<RateLimitRegistry>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Builds the auth core from a validated config.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn UserStore>,
        metrics: PrometheusHandle,
    ) -> anyhow::Result<Self> {
        let tokens = TokenService::new(
            &config.auth.jwt_secret,
            config.access_ttl(),
            config.refresh_ttl(),
        )?;
        let hasher = PasswordHasher::new(config.auth.hash_memory_kib, config.auth.hash_iterations)?;
        let gateway = AuthGateway::new(store, Arc::new(tokens), hasher)?;

        let limits = &config.rate_limit;
        let quota = Quota::per_minute(limits.requests_per_minute, limits.burst)?;

        Ok(Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            limiter: Arc::new(RateLimitRegistry::new(quota)),
            metrics,
        })
    }
}
