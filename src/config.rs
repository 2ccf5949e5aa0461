// Runtime configuration
//
// Defaults, then environment, then command-line flags (applied by the
// binaries).

use crate::db::{demo_applications, load_csv};
use crate::types::Application;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_SEED: &str = "CREDIT_LIMITS_SEED";
pub const ENV_ADDR: &str = "CREDIT_LIMITS_ADDR";
pub const ENV_DEBOUNCE_MS: &str = "CREDIT_LIMITS_DEBOUNCE_MS";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// CSV file with applications; demo data when unset
    pub seed_path: Option<PathBuf>,
    /// Address the API server binds to
    pub bind_addr: SocketAddr,
    /// Quiet period for the TUI search box
    pub search_debounce: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            seed_path: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            search_debounce: crate::filter::SEARCH_DEBOUNCE,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in practice)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = lookup(ENV_SEED).filter(|v| !v.trim().is_empty()) {
            config.seed_path = Some(PathBuf::from(path));
        }

        if let Some(addr) = lookup(ENV_ADDR) {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("{} is not a socket address: {}", ENV_ADDR, addr))?;
        }

        if let Some(ms) = lookup(ENV_DEBOUNCE_MS) {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("{} is not a number of milliseconds: {}", ENV_DEBOUNCE_MS, ms))?;
            config.search_debounce = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Applications the mock store starts with
    pub fn seed_applications(&self) -> Result<Vec<Application>> {
        match &self.seed_path {
            Some(path) => load_csv(path),
            None => Ok(demo_applications()),
        }
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // Ignore a second init (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.seed_applications().unwrap().len(), 5);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_SEED, "/tmp/seed.csv"),
            (ENV_ADDR, "0.0.0.0:8080"),
            (ENV_DEBOUNCE_MS, "50"),
        ]))
        .unwrap();

        assert_eq!(config.seed_path, Some(PathBuf::from("/tmp/seed.csv")));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.search_debounce, Duration::from_millis(50));
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(AppConfig::from_lookup(lookup(&[(ENV_ADDR, "localhost")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[(ENV_DEBOUNCE_MS, "soon")])).is_err());
    }

    #[test]
    fn test_missing_seed_file_is_error() {
        let config = AppConfig {
            seed_path: Some(PathBuf::from("/definitely/not/here.csv")),
            ..Default::default()
        };
        assert!(config.seed_applications().is_err());
    }
}
