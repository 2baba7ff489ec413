//! Shared configuration for sensornet tools.
//!
//! TOML profiles (file + env), translation to
//! `sensornet_core::DashboardConfig`, and the TOML-backed store that
//! persists the operator profile.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use sensornet_core::{CoreError, DashboardConfig, Persistence, TlsMode};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, falling back to the default profile.
    pub fn resolve_profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name.to_owned(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// HTTP timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Telemetry polling cadence, seconds. 0 disables polling.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// How long `toggle --wait` waits for a push confirmation, seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            search_debounce_ms: default_search_debounce_ms(),
            command_timeout: default_command_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    5
}
fn default_search_debounce_ms() -> u64 {
    500
}
fn default_command_timeout() -> u64 {
    10
}

/// A named dashboard server profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Server root URL (e.g., "http://127.0.0.1:8000").
    pub server: String,

    /// Push websocket URL. Derived from `server` when absent.
    pub push_url: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override telemetry polling cadence.
    pub poll_interval: Option<u64>,

    /// Give up on the push channel after this many failed reconnects.
    pub reconnect_max_retries: Option<u32>,
}

impl Profile {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    ProjectDirs::from("com", "sensornet", "sensornet").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("sensornet");
            p
        },
        |dirs| dirs.config_dir().to_path_buf(),
    )
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Where the operator profile is persisted.
pub fn operator_profile_path() -> PathBuf {
    config_dir().join("operator.toml")
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + `SENSORNET_*` environment variables.
///
/// A missing file yields the defaults. Nested keys use a double
/// underscore, e.g. `SENSORNET_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SENSORNET_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "config loaded");
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile → DashboardConfig ───────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

/// Build a `DashboardConfig` from a profile and the global defaults.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    let base_url = parse_url("server", &profile.server)?;
    let mut config = DashboardConfig::new(base_url)?;

    if let Some(ref push) = profile.push_url {
        config.push_url = parse_url("push_url", push)?;
    }

    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.telemetry_poll_interval =
        Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval));
    config.search_debounce = Duration::from_millis(defaults.search_debounce_ms);
    config.command_timeout = Duration::from_secs(defaults.command_timeout);
    config.reconnect.max_retries = profile.reconnect_max_retries;

    Ok(config)
}

// ── TOML persistence ────────────────────────────────────────────────

/// `Persistence` backed by a single TOML file.
///
/// A missing file loads as `None`; parent directories are created on
/// save.
#[derive(Debug, Clone)]
pub struct TomlStore<T> {
    path: PathBuf,
    _value: PhantomData<fn() -> T>,
}

impl<T> TomlStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn persistence_error(path: &Path, err: impl std::fmt::Display) -> CoreError {
    CoreError::Persistence {
        message: format!("{}: {err}", path.display()),
    }
}

impl<T> Persistence<T> for TomlStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(persistence_error(&self.path, e)),
        };
        toml::from_str(&raw)
            .map(Some)
            .map_err(|e| persistence_error(&self.path, e))
    }

    fn save(&self, value: &T) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| persistence_error(parent, e))?;
        }
        let raw = toml::to_string_pretty(value).map_err(|e| persistence_error(&self.path, e))?;
        std::fs::write(&self.path, raw).map_err(|e| persistence_error(&self.path, e))?;
        debug!(path = %self.path.display(), "saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use sensornet_core::{OperatorProfile, ProfileEditor, ProfileField};

    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.defaults.poll_interval, 5);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
output = "json"

[profiles.lab]
server = "http://10.0.0.5:8000"
timeout = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.search_debounce_ms, 500);

        let (name, profile) = cfg.resolve_profile(None).unwrap();
        assert_eq!(name, "lab");
        assert_eq!(profile.server, "http://10.0.0.5:8000");
        assert_eq!(profile.timeout, Some(5));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("http://127.0.0.1:8000"));

        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn unknown_profile_is_reported() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.resolve_profile(Some("nope")),
            Err(ConfigError::UnknownProfile { ref name }) if name == "nope"
        ));
    }

    #[test]
    fn profile_translates_to_dashboard_config() {
        let profile = Profile {
            timeout: Some(3),
            poll_interval: Some(0),
            reconnect_max_retries: Some(4),
            ..Profile::new("https://gateway.local/iot/")
        };
        let config = profile_to_dashboard_config(&profile, &Defaults::default()).unwrap();

        assert_eq!(config.push_url.as_str(), "wss://gateway.local/iot/ws/devices/");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.telemetry_poll_interval.is_zero());
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.reconnect.max_retries, Some(4));
        assert!(matches!(config.tls, TlsMode::System));
    }

    #[test]
    fn explicit_push_url_wins() {
        let profile = Profile {
            push_url: Some("ws://10.0.0.9:9000/push".into()),
            insecure: Some(true),
            ..Profile::new("http://10.0.0.5:8000")
        };
        let config = profile_to_dashboard_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(config.push_url.as_str(), "ws://10.0.0.9:9000/push");
        assert!(matches!(config.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn bad_server_url_is_a_validation_error() {
        let err = profile_to_dashboard_config(&Profile::new("not a url"), &Defaults::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "server"));
    }

    #[test]
    fn toml_store_round_trips_operator_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlStore::<OperatorProfile>::new(dir.path().join("operator.toml"));
        assert_eq!(store.load().unwrap(), None);

        let mut editor = ProfileEditor::mount(store.clone()).unwrap();
        editor.set_field(ProfileField::Name, "Operator One").unwrap();
        editor
            .set_field(ProfileField::Github, "https://github.com/op1")
            .unwrap();

        let reloaded = ProfileEditor::mount(store).unwrap();
        assert_eq!(reloaded.get().name, "Operator One");
        assert_eq!(reloaded.get().github, "https://github.com/op1");
    }

    #[test]
    fn corrupt_store_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operator.toml");
        std::fs::write(&path, "name = [").unwrap();

        let store = TomlStore::<OperatorProfile>::new(path);
        assert!(matches!(
            store.load(),
            Err(CoreError::Persistence { .. })
        ));
    }
}
