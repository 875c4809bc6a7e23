use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env::VarError,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const HISTORY_FILE: &str = "search_history.json";
pub const FAVORITES_FILE: &str = "cities.json";

pub const ENV_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_BASE_URL: &str = "OPENWEATHER_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "WEATHER_TIMEOUT_SECS";
pub const ENV_DATA_DIR: &str = "WEATHER_DATA_DIR";

/// Settings stored on disk by `weather configure`. Every field is optional;
/// environment variables take precedence over it.
///
/// Example TOML:
/// api_key = "..."
/// timeout_secs = 5
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub data_dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Load the config file from the platform config directory, or an empty
    /// default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save to the platform config directory, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
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
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = project_dirs()
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Resolved, read-only settings. Built once at startup and handed to the
/// client and the stores.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Config {
    /// Defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            data_dir: default_data_dir(),
        }
    }

    /// Read the config file, then overlay the process environment.
    pub fn load() -> Result<Self> {
        let file = ConfigFile::load()?;
        Self::resolve(&file, |key| std::env::var(key))
    }

    /// Merge file settings with an environment lookup. Environment wins.
    pub fn resolve<F>(file: &ConfigFile, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let env = |var: &str| -> Option<String> {
            lookup(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = env(ENV_API_KEY)
            .or_else(|| file.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured. Set {ENV_API_KEY} or add it to a .env file.\n\
                     Hint: run `weather configure` and enter your API key."
                )
            })?;

        let base_url = env(ENV_BASE_URL)
            .or_else(|| file.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match env(ENV_TIMEOUT_SECS) {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("Invalid value for {ENV_TIMEOUT_SECS}: '{raw}'"))?,
            None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let data_dir = env(ENV_DATA_DIR)
            .map(PathBuf::from)
            .or_else(|| file.data_dir.clone())
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            api_key,
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            data_dir,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.data_dir.join(FAVORITES_FILE)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather-cli")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
