//! Process configuration from environment variables.

use std::time::Duration;

use scanrelay_scanner::EngineOptions;

/// Runtime configuration, read once at startup.
///
/// Every knob has a `SCANRELAY_*` environment variable; unset or empty means
/// the default. An unparsable numeric value logs a warning and falls back
/// rather than aborting startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `SCANRELAY_BIND`: listen address.
    pub bind_addr: String,
    /// `SCANRELAY_WORKERS`: concurrent scan workers.
    pub workers: usize,
    /// `SCANRELAY_REDIS_URL`: backing store; unset selects the in-memory
    /// store (dev/test only, results do not survive the process).
    pub redis_url: Option<String>,
    /// `SCANRELAY_RESULT_TTL_SECS`: retention window for stored results.
    pub item_ttl: Duration,
    /// `SCANRELAY_LOCK_TTL_SECS`: safety expiry for uniqueness locks.
    pub lock_ttl: Duration,
    /// `SCANRELAY_ENGINE_COMMAND`: external benchmark binary.
    pub engine_command: String,
    /// `SCANRELAY_ENGINE_TIMEOUT`: passed through to the engine (e.g. `5m`).
    pub engine_timeout: Option<String>,
    /// `SCANRELAY_ENGINE_INSECURE`: allow plain-HTTP/self-signed registries.
    pub engine_insecure: bool,
    /// `SCANRELAY_ENGINE_IGNORE`: checkpoint codes the engine should skip.
    pub engine_ignore: Option<String>,
    /// `SCANRELAY_ENGINE_CERT_PATH`: registry CA certificate path.
    pub engine_cert_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            workers: 5,
            redis_url: None,
            item_ttl: Duration::from_secs(300),
            lock_ttl: Duration::from_secs(300),
            engine_command: "cis-bench".to_string(),
            engine_timeout: None,
            engine_insecure: false,
            engine_ignore: None,
            engine_cert_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: var("SCANRELAY_BIND").unwrap_or(defaults.bind_addr),
            workers: numeric("SCANRELAY_WORKERS", defaults.workers),
            redis_url: var("SCANRELAY_REDIS_URL"),
            item_ttl: Duration::from_secs(numeric(
                "SCANRELAY_RESULT_TTL_SECS",
                defaults.item_ttl.as_secs(),
            )),
            lock_ttl: Duration::from_secs(numeric(
                "SCANRELAY_LOCK_TTL_SECS",
                defaults.lock_ttl.as_secs(),
            )),
            engine_command: var("SCANRELAY_ENGINE_COMMAND").unwrap_or(defaults.engine_command),
            engine_timeout: var("SCANRELAY_ENGINE_TIMEOUT"),
            engine_insecure: var("SCANRELAY_ENGINE_INSECURE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.engine_insecure),
            engine_ignore: var("SCANRELAY_ENGINE_IGNORE"),
            engine_cert_path: var("SCANRELAY_ENGINE_CERT_PATH"),
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            timeout: self.engine_timeout.clone(),
            insecure: self.engine_insecure,
            ignore: self.engine_ignore.clone(),
            cert_path: self.engine_cert_path.clone(),
        }
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn numeric<T: std::str::FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match var(name) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("invalid {name}={raw}; falling back to {default}");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane_without_environment() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.workers, 5);
        assert_eq!(config.item_ttl, Duration::from_secs(300));
        assert_eq!(config.lock_ttl, Duration::from_secs(300));
        assert!(config.redis_url.is_none());
        assert!(!config.engine_insecure);
    }

    #[test]
    fn engine_options_mirror_the_config() {
        let config = AppConfig {
            engine_timeout: Some("5m".to_string()),
            engine_insecure: true,
            engine_ignore: Some("CIS-DI-0005".to_string()),
            ..AppConfig::default()
        };

        let options = config.engine_options();
        assert_eq!(options.timeout.as_deref(), Some("5m"));
        assert!(options.insecure);
        assert_eq!(options.ignore.as_deref(), Some("CIS-DI-0005"));
        assert!(options.cert_path.is_none());
    }
}
