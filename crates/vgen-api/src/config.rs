//! API configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_BODY: usize = 1024 * 1024;

/// HTTP server settings. Assembly settings live in `WorkerConfig`.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Allowed origins; `*` allows any origin without credentials
    pub cors_origins: Vec<String>,
    /// Largest accepted JSON body in bytes
    pub max_body_size: usize,
    /// `production` hides internal error details
    pub environment: String,
    /// Expose `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            max_body_size: DEFAULT_MAX_BODY,
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Read `API_HOST`, `API_PORT`, `CORS_ORIGINS`, `MAX_BODY_SIZE`, `ENVIRONMENT` and
    /// `METRICS_ENABLED`; unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: parsed("API_HOST").unwrap_or(defaults.host),
            port: parsed("API_PORT").unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .ok()
                .map(|s| split_origins(&s))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.cors_origins),
            max_body_size: parsed("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| matches!(v.as_str(), "true" | "1"))
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
