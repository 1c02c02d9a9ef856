use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sanctum_core::GateConfig;

use crate::constants::{
    DEFAULT_LOCKOUT_SECONDS, DEFAULT_MAX_PIN_ATTEMPTS, DEFAULT_REMOTE_TIMEOUT_SECONDS,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct SanctumConfig {
    pub store: StoreSection,
    #[serde(default)]
    pub security: SecuritySection,
    pub cache: CacheSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
    /// Owner of the PIN record in this store
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecuritySection {
    /// Consecutive wrong PINs before a lockout; 0 disables the limit
    #[serde(default = "default_max_pin_attempts")]
    pub max_pin_attempts: u32,
    #[serde(default = "default_remote_timeout_seconds")]
    pub remote_timeout_seconds: u64,
    #[serde(default = "default_lockout_seconds")]
    pub lockout_seconds: u64,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            max_pin_attempts: DEFAULT_MAX_PIN_ATTEMPTS,
            remote_timeout_seconds: DEFAULT_REMOTE_TIMEOUT_SECONDS,
            lockout_seconds: DEFAULT_LOCKOUT_SECONDS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheSection {
    pub path: String,
}

fn default_max_pin_attempts() -> u32 {
    DEFAULT_MAX_PIN_ATTEMPTS
}

fn default_remote_timeout_seconds() -> u64 {
    DEFAULT_REMOTE_TIMEOUT_SECONDS
}

fn default_lockout_seconds() -> u64 {
    DEFAULT_LOCKOUT_SECONDS
}

impl SanctumConfig {
    pub fn new(store_path: PathBuf, cache_path: PathBuf) -> Self {
        Self {
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
                user_id: Uuid::new_v4(),
            },
            security: SecuritySection::default(),
            cache: CacheSection {
                path: cache_path.to_string_lossy().to_string(),
            },
        }
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store.path)
    }

    pub fn cache_path(&self) -> PathBuf {
        PathBuf::from(&self.cache.path)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.security.remote_timeout_seconds.max(1))
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig::new()
            .max_attempts(self.security.max_pin_attempts)
            .remote_timeout(self.remote_timeout())
            .lockout(Duration::from_secs(self.security.lockout_seconds))
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("sanctum.db"))
}

pub fn default_cache_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_cache_dir()?.join("local.json"))
}

pub fn read_config(path: &Path) -> anyhow::Result<SanctumConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &SanctumConfig) -> anyhow::Result<()> {
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    sanctum_core::fs::write_atomic(path, contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

pub fn xdg_cache_dir() -> anyhow::Result<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", &[".cache"])
}

fn xdg_dir(variable: &str, fallback: &[&str]) -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(variable) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("sanctum"));
        }
    }
    let mut path = home_dir()?;
    for segment in fallback {
        path.push(segment);
    }
    Ok(path.join("sanctum"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sanctum").join("config.toml");
        let config = SanctumConfig::new(dir.path().join("s.db"), dir.path().join("c.json"));

        write_config(&path, &config).unwrap();
        let loaded = read_config(&path).unwrap();

        assert_eq!(loaded.store.user_id, config.store.user_id);
        assert_eq!(loaded.store_path(), dir.path().join("s.db"));
        assert_eq!(loaded.security.max_pin_attempts, DEFAULT_MAX_PIN_ATTEMPTS);
    }

    #[test]
    fn test_security_section_defaults_when_missing() {
        let contents = format!(
            "[store]\npath = \"/tmp/s.db\"\nuser_id = \"{}\"\n\n[cache]\npath = \"/tmp/c.json\"\n",
            Uuid::new_v4()
        );
        let config: SanctumConfig = toml::from_str(&contents).unwrap();
        assert_eq!(config.security.max_pin_attempts, DEFAULT_MAX_PIN_ATTEMPTS);
        assert_eq!(
            config.remote_timeout(),
            Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECONDS)
        );
        assert_eq!(
            config.gate_config().lockout,
            Duration::from_secs(DEFAULT_LOCKOUT_SECONDS)
        );
    }

    #[test]
    fn test_zero_attempts_means_unbounded() {
        let mut config = SanctumConfig::new(PathBuf::from("s.db"), PathBuf::from("c.json"));
        config.security.max_pin_attempts = 0;
        assert_eq!(
            config.gate_config().max_attempts,
            sanctum_core::gate::AttemptLimit::Unbounded
        );
    }
}
