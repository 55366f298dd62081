use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};
use url::Url;

/// Where the forecast service lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Forecast endpoint, relative to `base_url`.
    pub endpoint: String,
    /// Liveness endpoint, relative to `base_url`.
    pub health: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            endpoint: "predict".to_string(),
            health: "health".to_string(),
        }
    }
}

impl BackendConfig {
    pub fn forecast_url(&self) -> Result<Url> {
        join_url(&self.base_url, &self.endpoint)
    }

    pub fn health_url(&self) -> Result<Url> {
        join_url(&self.base_url, &self.health)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Language tag used for every spoken reply.
    pub locale: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self { locale: "en-US".to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// use_mock = false
/// notice_ms = 2200
///
/// [backend]
/// base_url = "http://localhost:8000"
/// endpoint = "predict"
///
/// [voice]
/// locale = "en-US"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    /// Initial state of the mock toggle.
    pub use_mock: bool,
    /// How long transient notices stay visible, in milliseconds.
    pub notice_ms: u64,
    pub voice: VoiceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            use_mock: false,
            notice_ms: 2200,
            voice: VoiceConfig::default(),
        }
    }
}

impl Config {
    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-buddy", "buddy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Join `path` onto `base` with exactly one `/` between them, keeping any
/// path prefix already on `base`.
pub fn join_url(base: &str, path: &str) -> Result<Url> {
    let mut base =
        Url::parse(base.trim()).with_context(|| format!("Invalid backend base URL: {base}"))?;

    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }

    base.join(path.trim().trim_start_matches('/'))
        .with_context(|| format!("Invalid endpoint path: {path}"))
}
