//! # Polyphon Configuration Module
//!
//! Configuration management for the Polyphon music hub:
//! - Loading configuration from YAML files
//! - Merging with the embedded default configuration
//! - Environment variable overrides (`POLYPHON_CONFIG__SECTION__KEY=value`)
//! - Typed getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use polyconfig::get_config;
//!
//! let config = get_config();
//! let port = config.get_http_port();
//! let cache_dir = config.get_audio_cache_dir()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;

/// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("polyphon.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load Polyphon configuration"));
}

const ENV_CONFIG_DIR: &str = "POLYPHON_CONFIG";
const ENV_PREFIX: &str = "POLYPHON_CONFIG__";

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_BASE_URL: &str = "http://localhost";
const DEFAULT_AUDIO_CACHE_DIR: &str = "audio";

/// Generates a getter/setter pair for boolean values with a default.
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Generates a getter for string values with a default.
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => s,
                _ => $default.to_string(),
            }
        }

        pub fn $setter(&self, value: &str) -> Result<()> {
            self.set_value($path, Value::String(value.to_string()))
        }
    };
}

/// Configuration manager for Polyphon
///
/// Holds the merged YAML value tree and provides typed accessors. The
/// structure is designed to live behind an `Arc` (see [`get_config`]); all
/// mutation goes through the internal mutex.
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        if !directory.is_empty() {
            return directory.to_string();
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Using config directory from env");
            return env_path;
        }

        if Path::new(".polyphon").exists() {
            return ".polyphon".to_string();
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(".polyphon");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        ".polyphon".to_string()
    }

    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(anyhow!("Configuration path is not a directory"));
        }

        // Check write permission up front so later saves cannot surprise us
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Loads the configuration from the specified directory
    ///
    /// The directory is searched in order: the `directory` argument, the
    /// `POLYPHON_CONFIG` environment variable, `.polyphon` in the current
    /// directory, then `.polyphon` in the user's home directory. The embedded
    /// defaults are merged with the external `config.yaml` if present, then
    /// environment overrides are applied.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&config_dir))?;
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut merged: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            let external: Value = serde_yaml::from_slice(&data)?;
            merge_yaml(&mut merged, &external);
        } else {
            info!(config_file = %path, "Config file not found, using embedded defaults");
        }

        let mut config_value = lower_keys(merged);
        Self::apply_env_overrides(&mut config_value);

        Ok(Self {
            config_dir,
            path,
            data: Mutex::new(config_value),
        })
    }

    /// Returns the configuration directory
    pub fn config_dir(&self) -> &str {
        &self.config_dir
    }

    /// Persists the current configuration to `config.yaml`
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["server", "http_port"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.data.lock().unwrap();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key, value);
            } else {
                let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();
                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    /// Resolves a relative or absolute path and creates the directory if needed
    fn resolve_and_create_dir(&self, dir_path: &str) -> Result<String> {
        let path = Path::new(dir_path);
        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.config_dir).join(path)
        };

        if !absolute_path.exists() {
            fs::create_dir_all(&absolute_path)?;
            info!(directory = %absolute_path.display(), "Created cache directory");
        }

        Ok(absolute_path.to_string_lossy().to_string())
    }

    // ============= Typed accessors =============

    /// Returns the HTTP port the server listens on
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["server", "http_port"]) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u16::try_from(v).ok())
                .unwrap_or(DEFAULT_HTTP_PORT),
            _ => DEFAULT_HTTP_PORT,
        }
    }

    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["server", "http_port"], Value::Number(port.into()))
    }

    impl_string_config!(
        get_base_url,
        set_base_url,
        &["server", "base_url"],
        DEFAULT_BASE_URL
    );

    /// Returns the audio cache directory, creating it if necessary
    pub fn get_audio_cache_dir(&self) -> Result<String> {
        let configured = match self.get_value(&["cache", "audio_dir"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => DEFAULT_AUDIO_CACHE_DIR.to_string(),
        };
        self.resolve_and_create_dir(&configured)
    }

    impl_bool_config!(
        get_ytm_enabled,
        set_ytm_enabled,
        &["sources", "ytmusic", "enabled"],
        true
    );

    impl_string_config!(
        get_ytm_api_base,
        set_ytm_api_base,
        &["sources", "ytmusic", "api_base"],
        ""
    );

    impl_bool_config!(
        get_pandora_enabled,
        set_pandora_enabled,
        &["sources", "pandora", "enabled"],
        false
    );

    /// Returns the Pandora account credentials, if both are configured
    pub fn get_pandora_credentials(&self) -> Option<(String, String)> {
        let username = match self.get_value(&["sources", "pandora", "username"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => return None,
        };
        let password = match self.get_value(&["sources", "pandora", "password"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => return None,
        };
        Some((username, password))
    }

    impl_bool_config!(
        get_prefetch_enabled,
        set_prefetch_enabled,
        &["prefetch", "enabled"],
        true
    );

    impl_string_config!(get_log_level, set_log_level, &["logging", "level"], "info");
}

/// Recursively merges `external` on top of `default`
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // Scalars and sequences are replaced wholesale
        (d, e) => *d = e.clone(),
    }
}

/// Lowercases every mapping key so lookups are case-insensitive
fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let new_key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(new_key, lower_keys(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys).collect()),
        _ => value,
    }
}

/// Returns the global configuration singleton
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}
