// src/config.rs
//! Environment-driven service configuration. `.env` is honored in local
//! runs (loaded by the binary); every knob has a default so the service
//! boots with no configuration at all.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::risk::Thresholds;

// --- env names & defaults ---
pub const ENV_PORT: &str = "PORT";
pub const ENV_SEED_PATH: &str = "SBRI_SEED_PATH";
pub const ENV_THRESHOLDS_PATH: &str = "SBRI_THRESHOLDS_PATH";
pub const ENV_REGISTRY_BASE_URL: &str = "REGISTRY_BASE_URL";
pub const ENV_REGISTRY_API_KEY: &str = "REGISTRY_API_KEY";
pub const ENV_REGISTRY_RATE_CAPACITY: &str = "REGISTRY_RATE_CAPACITY";
pub const ENV_REGISTRY_RATE_REFILL_SECS: &str = "REGISTRY_RATE_REFILL_SECS";
pub const ENV_DEV_LOG: &str = "SBRI_DEV_LOG";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SEED_PATH: &str = "data/seed.json";
pub const DEFAULT_THRESHOLDS_PATH: &str = "config/thresholds.toml";
pub const DEFAULT_RATE_CAPACITY: u32 = 10;
pub const DEFAULT_RATE_REFILL_SECS: u64 = 1;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub seed_path: PathBuf,
    /// Global default cut-points; per-industry overrides come from the store.
    pub default_thresholds: Thresholds,
    /// Registry proxy; absent when no base URL is configured.
    pub registry: Option<RegistryConfig>,
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub rate_capacity: u32,
    pub rate_refill: Duration,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env_var(ENV_PORT)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let seed_path = env_var(ENV_SEED_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_PATH));

        let thresholds_path = env_var(ENV_THRESHOLDS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_THRESHOLDS_PATH));
        let default_thresholds = load_thresholds_or_default(&thresholds_path);

        let registry = env_var(ENV_REGISTRY_BASE_URL).map(|base_url| RegistryConfig {
            base_url,
            api_key: env_var(ENV_REGISTRY_API_KEY),
            rate_capacity: env_var(ENV_REGISTRY_RATE_CAPACITY)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RATE_CAPACITY),
            rate_refill: Duration::from_secs(
                env_var(ENV_REGISTRY_RATE_REFILL_SECS)
                    .and_then(|v| v.trim().parse().ok())
                    .filter(|&s| s > 0)
                    .unwrap_or(DEFAULT_RATE_REFILL_SECS),
            ),
        });

        Self {
            port,
            seed_path,
            default_thresholds,
            registry,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThresholdsFile {
    #[serde(default)]
    thresholds: ThresholdsSection,
}

#[derive(Debug, Default, Deserialize)]
struct ThresholdsSection {
    high: Option<f64>,
    medium: Option<f64>,
}

/// Parse global default thresholds from a TOML string. Each field falls back
/// independently; out-of-range or non-finite values revert to the default,
/// and an inverted pair is swapped to keep a valid band order.
pub fn thresholds_from_toml_str(s: &str) -> anyhow::Result<Thresholds> {
    let file: ThresholdsFile = toml::from_str(s)?;
    let mut t = Thresholds::default();
    if let Some(h) = file.thresholds.high.filter(|v| v.is_finite() && (0.0..=100.0).contains(v)) {
        t.high = h;
    }
    if let Some(m) = file.thresholds.medium.filter(|v| v.is_finite() && (0.0..=100.0).contains(v)) {
        t.medium = m;
    }
    if t.high < t.medium {
        std::mem::swap(&mut t.high, &mut t.medium);
    }
    Ok(t)
}

fn load_thresholds_or_default(path: &Path) -> Thresholds {
    match std::fs::read_to_string(path) {
        Ok(s) => thresholds_from_toml_str(&s).unwrap_or_default(),
        Err(_) => Thresholds::default(),
    }
}

/// Dev logging gate: SBRI_DEV_LOG=1 AND a dev environment (debug build or
/// APP_ENV in {local, development, dev}).
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short, anonymized identifier for log lines. Never log raw company numbers.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn thresholds_toml_merges_per_field() {
        let t = thresholds_from_toml_str("[thresholds]\nhigh = 80.0\n").unwrap();
        assert_eq!(t.high, 80.0);
        assert_eq!(t.medium, 40.0);

        let t = thresholds_from_toml_str("[thresholds]\nmedium = 30.0\n").unwrap();
        assert_eq!(t.high, 70.0);
        assert_eq!(t.medium, 30.0);

        let t = thresholds_from_toml_str("").unwrap();
        assert_eq!(t, Thresholds::default());
    }

    #[test]
    fn thresholds_toml_sanitizes_bad_values() {
        // Out of range reverts to default.
        let t = thresholds_from_toml_str("[thresholds]\nhigh = 250.0\n").unwrap();
        assert_eq!(t.high, 70.0);

        // Inverted pair is swapped to keep band order valid.
        let t = thresholds_from_toml_str("[thresholds]\nhigh = 20.0\nmedium = 60.0\n").unwrap();
        assert_eq!(t.high, 60.0);
        assert_eq!(t.medium, 20.0);
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("00000006");
        let b = anon_hash("00000006");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(a, anon_hash("00000007"));
    }

    #[serial_test::serial]
    #[test]
    fn from_env_reads_overrides_and_defaults() {
        std::env::remove_var(ENV_PORT);
        std::env::remove_var(ENV_REGISTRY_BASE_URL);
        std::env::remove_var(ENV_THRESHOLDS_PATH);
        std::env::remove_var(ENV_SEED_PATH);

        let cfg = AppConfig::from_env();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert!(cfg.registry.is_none());
        assert_eq!(cfg.seed_path, PathBuf::from(DEFAULT_SEED_PATH));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\nhigh = 75.0\nmedium = 45.0").unwrap();

        std::env::set_var(ENV_PORT, "8080");
        std::env::set_var(ENV_THRESHOLDS_PATH, file.path());
        std::env::set_var(ENV_REGISTRY_BASE_URL, "https://registry.example");
        std::env::set_var(ENV_REGISTRY_RATE_CAPACITY, "3");

        let cfg = AppConfig::from_env();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.default_thresholds.high, 75.0);
        assert_eq!(cfg.default_thresholds.medium, 45.0);
        let reg = cfg.registry.expect("registry configured");
        assert_eq!(reg.base_url, "https://registry.example");
        assert_eq!(reg.rate_capacity, 3);

        std::env::remove_var(ENV_PORT);
        std::env::remove_var(ENV_THRESHOLDS_PATH);
        std::env::remove_var(ENV_REGISTRY_BASE_URL);
        std::env::remove_var(ENV_REGISTRY_RATE_CAPACITY);
    }
}
