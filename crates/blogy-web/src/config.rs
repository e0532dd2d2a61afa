use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
    /// Key clients by `X-Forwarded-For` / `X-Real-IP`. Only safe behind a
    /// proxy that overwrites those headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_ttl_secs: default_access_ttl_secs(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
            hash_memory_kib: default_hash_memory_kib(),
            hash_iterations: default_hash_iterations(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_rpm(),
            burst: default_burst(),
            trust_proxy_headers: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origins: default_allowed_origins() }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_access_ttl_secs() -> u64 { 3600 }
fn default_refresh_ttl_secs() -> u64 { 7 * 24 * 3600 }
fn default_hash_memory_kib() -> u32 { 19 * 1024 }
fn default_hash_iterations() -> u32 { 2 }
fn default_rpm() -> u32 { 100 }
fn default_burst() -> u32 { 100 }

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

const WEAK_SECRETS: &[&str] = &[
    "your-secret-key",
    "change-me",
    "secret",
    "password",
    "jwt-secret",
];

impl ServerConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.refresh_ttl_secs)
    }

    /// Reads `BLOGY_CONFIG` (if set), applies `BLOGY_*` environment overrides,
    /// then validates.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("BLOGY_CONFIG").map(PathBuf::from).ok();

        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => ServerConfig::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.finalize()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {e}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `BLOGY_*` overrides looked up through `var`.
    pub fn apply_overrides<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = var("BLOGY_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(addr) = var("BLOGY_BIND_ADDR") {
            self.bind_addr = addr.parse()?;
        }
        if let Some(val) = var("BLOGY_ACCESS_TTL_SECS") {
            self.auth.access_ttl_secs = val.parse()?;
        }
        if let Some(val) = var("BLOGY_REFRESH_TTL_SECS") {
            self.auth.refresh_ttl_secs = val.parse()?;
        }
        if let Some(val) = var("BLOGY_RATE_LIMIT_RPM") {
            self.rate_limit.requests_per_minute = val.parse()?;
        }
        if let Some(val) = var("BLOGY_RATE_LIMIT_BURST") {
            self.rate_limit.burst = val.parse()?;
        }
        if let Some(val) = var("BLOGY_TRUST_PROXY_HEADERS") {
            self.rate_limit.trust_proxy_headers = val.parse()?;
        }
        if let Some(origins) = var("BLOGY_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    /// Startup checks. Anything returned here is fatal.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        if WEAK_SECRETS.iter().any(|&w| self.auth.jwt_secret == w) {
            anyhow::bail!(
                "JWT secret matches a known weak/placeholder value. \
                 Set a strong random secret via BLOGY_JWT_SECRET."
            );
        }
        if self.auth.jwt_secret.is_empty() {
            self.auth.jwt_secret = uuid::Uuid::new_v4().to_string();
            tracing::warn!(
                "No JWT secret configured. Generated random secret (will change on restart)."
            );
        } else if self.auth.jwt_secret.len() < 32 {
            tracing::warn!(
                "JWT secret is shorter than 32 characters. \
                 Consider using a stronger secret via BLOGY_JWT_SECRET."
            );
        }

        if self.auth.access_ttl_secs == 0 || self.auth.refresh_ttl_secs == 0 {
            anyhow::bail!("Token TTLs must be greater than zero");
        }
        if self.rate_limit.requests_per_minute == 0 || self.rate_limit.burst == 0 {
            anyhow::bail!("Rate limit and burst must be greater than zero");
        }
        Ok(())
    }
}
