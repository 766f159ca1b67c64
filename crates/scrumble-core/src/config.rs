// Configuration loading and parsing (config/scrumble.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides `api.base_url`.
pub const API_BASE_ENV: &str = "SCRUMBLE_API_BASE";

const CONFIG_FILE: &str = "scrumble.toml";
const DEFAULT_REGION: &str = "Chattanooga";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Preview URLs keyed by slugified entry id or name.
    #[serde(default)]
    pub preview_overrides: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// Backend root. Empty means "not configured".
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Path of the SQLite file backing local storage. `None` selects the
    /// platform data directory.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Config {
    /// Resolve where local storage lives on disk.
    pub fn storage_path(&self) -> PathBuf {
        if let Some(path) = self.storage.path.as_deref().filter(|p| !p.trim().is_empty()) {
            return PathBuf::from(path);
        }
        match directories::ProjectDirs::from("", "", "scrumble") {
            Some(dirs) => dirs.data_dir().join("storage.db"),
            None => PathBuf::from("scrumble-storage.db"),
        }
    }

    /// Replace `api.base_url` when the override is present.
    pub fn apply_api_base_override(&mut self, value: Option<String>) {
        if let Some(base) = value {
            self.api.base_url = base;
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/scrumble.toml` relative to `base_dir`.
///
/// Does not copy defaults and ignores the environment; see `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` with any `*.toml` from `defaults/` that the user has not
/// created yet. Returns the files written; existing files are left alone.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (true, _) => {}
        (false, true) => return Ok(vec![]),
        (false, false) => {
            return Err(copy_error(format!(
                "no defaults/ or config/ under {}; pass --base-dir pointing at the scrumble checkout",
                base_dir.display()
            )));
        }
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut copied = Vec::new();
    for source in default_toml_files(&defaults_dir)? {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(file_name);
        if seed_file(&source, &target)? {
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Regular `*.toml` files in `dir`, sorted so seeding order is stable.
fn default_toml_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let listing = std::fs::read_dir(dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", dir.display())))?;
    let mut files = Vec::new();
    for item in listing {
        let path = item
            .map_err(|e| copy_error(format!("cannot list {}: {e}", dir.display())))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Copy `source` to `target` unless `target` already exists. The
/// `create_new` open makes the existence check and the create one step.
fn seed_file(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    use std::io::Write;

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    let content = std::fs::read(source)
        .map_err(|e| copy_error(format!("cannot read {}: {e}", source.display())))?;
    dest.write_all(&content)
        .map_err(|e| copy_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Load config relative to `base_dir`, copying defaults first and applying
/// the `SCRUMBLE_API_BASE` override.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    let mut config = load_config_from(base_dir)?;
    config.apply_api_base_override(std::env::var(API_BASE_ENV).ok());
    validate(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let base = config.api.base_url.trim();
    if !base.is_empty() && !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".into(),
            message: format!("must start with http:// or https://, got {base:?}"),
        });
    }

    if config.display.region.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "display.region".into(),
            message: "must not be empty".into(),
        });
    }

    for (key, url) in &config.preview_overrides {
        if url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("preview_overrides.{key}"),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
