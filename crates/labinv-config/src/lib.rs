//! Shared configuration for labinv front ends.
//!
//! TOML profiles, secret resolution (env + keyring + plaintext), and
//! translation to `labinv_core::LabConfig`. The CLI layers its global
//! flag overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use labinv_core::{AuthCredentials, DEFAULT_BREAKPOINT, Endpoints, LabConfig};

/// Service name for system keyring entries.
pub const KEYRING_SERVICE: &str = "labinv";

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "LABINV_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {secret} configured for profile '{profile}'")]
    NoCredentials { profile: String, secret: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named lab profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
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

/// A named lab profile: one project plus the credentials to reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Document-store project id.
    #[serde(default)]
    pub project_id: String,

    /// Web API key for identity and documents (plaintext; prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Account email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Account password (plaintext; prefer keyring).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Generative model API key. AI commands are disabled without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_api_key_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,

    /// Image host API key. Image upload is disabled without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_api_key_env: Option<String>,

    // Endpoint overrides (emulators, self-hosted gateways).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Override timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Mobile/desktop viewport breakpoint in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<u32>,

    /// Barcode detector polling period in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval_ms: Option<u64>,
}

/// Secrets a profile can hold, with their keyring suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    ApiKey,
    Password,
    AiApiKey,
    ImageApiKey,
}

impl SecretKind {
    pub fn keyring_suffix(self) -> &'static str {
        match self {
            Self::ApiKey => "api-key",
            Self::Password => "password",
            Self::AiApiKey => "ai-api-key",
            Self::ImageApiKey => "image-api-key",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ApiKey => "API key",
            Self::Password => "password",
            Self::AiApiKey => "AI API key",
            Self::ImageApiKey => "image host API key",
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `LABINV_CONFIG`, then platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "labinv", "labinv").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("labinv");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. `LABINV_` variables override file values,
/// with `__` separating nested keys (`LABINV_DEFAULTS__OUTPUT=json`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LABINV_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
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

// ── Secret resolution ───────────────────────────────────────────────

/// Keyring entry for one of a profile's secrets.
pub fn keyring_entry(profile_name: &str, kind: SecretKind) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/{}", kind.keyring_suffix()),
    )?)
}

/// Store a secret in the system keyring.
pub fn store_secret(profile_name: &str, kind: SecretKind, value: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name, kind)?.set_password(value)?;
    Ok(())
}

/// Remove a secret from the system keyring. Returns `false` when there
/// was nothing stored.
pub fn forget_secret(profile_name: &str, kind: SecretKind) -> Result<bool, ConfigError> {
    match keyring_entry(profile_name, kind)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Look a secret up through the chain: env var named by the profile,
/// then the system keyring, then the plaintext value.
fn lookup_secret(
    env_name: Option<&str>,
    plaintext: Option<&str>,
    profile_name: &str,
    kind: SecretKind,
) -> Option<SecretString> {
    // 1. Profile's *_env → env var lookup
    if let Some(val) = env_name
        .and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.is_empty())
    {
        return Some(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(secret) = keyring_entry(profile_name, kind)
        .and_then(|e| e.get_password().map_err(ConfigError::from)) {
        return Some(SecretString::from(secret));
    }

    // 3. Plaintext in config
    plaintext
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::from(v.to_owned()))
}

/// Resolve the web API key, which every session needs.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    lookup_secret(
        profile.api_key_env.as_deref(),
        profile.api_key.as_deref(),
        profile_name,
        SecretKind::ApiKey,
    )
    .ok_or_else(|| no_credentials(profile_name, SecretKind::ApiKey))
}

/// Optional generative model key.
pub fn resolve_ai_api_key(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    lookup_secret(
        profile.ai_api_key_env.as_deref(),
        profile.ai_api_key.as_deref(),
        profile_name,
        SecretKind::AiApiKey,
    )
}

/// Optional image host key.
pub fn resolve_image_api_key(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    lookup_secret(
        profile.image_api_key_env.as_deref(),
        profile.image_api_key.as_deref(),
        profile_name,
        SecretKind::ImageApiKey,
    )
}

/// Resolve sign-in credentials (email + password) without CLI flags.
///
/// Email: profile, then `LABINV_EMAIL`. Password: `LABINV_PASSWORD`,
/// then keyring, then plaintext.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<AuthCredentials, ConfigError> {
    let email = profile
        .email
        .clone()
        .filter(|e| !e.is_empty())
        .or_else(|| std::env::var("LABINV_EMAIL").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
            secret: "email".into(),
        })?;

    let password = lookup_secret(
        Some("LABINV_PASSWORD"),
        profile.password.as_deref(),
        profile_name,
        SecretKind::Password,
    )
    .ok_or_else(|| no_credentials(profile_name, SecretKind::Password))?;

    Ok(AuthCredentials { email, password })
}

fn no_credentials(profile_name: &str, kind: SecretKind) -> ConfigError {
    ConfigError::NoCredentials {
        profile: profile_name.into(),
        secret: kind.label().into(),
    }
}

// ── Translation to LabConfig ────────────────────────────────────────

fn checked_url(field: &str, value: Option<&String>) -> Result<Option<String>, ConfigError> {
    match value {
        None => Ok(None),
        Some(raw) => {
            url::Url::parse(raw).map_err(|e| ConfigError::Validation {
                field: field.into(),
                reason: format!("invalid URL '{raw}': {e}"),
            })?;
            Ok(Some(raw.clone()))
        }
    }
}

/// Build a `LabConfig` from a profile, with no flag overrides.
///
/// Suitable for long-lived consumers: enables a 60 s background refresh.
pub fn profile_to_lab_config(profile: &Profile, profile_name: &str) -> Result<LabConfig, ConfigError> {
    if profile.project_id.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "project_id".into(),
            reason: format!("profile '{profile_name}' has no project_id"),
        });
    }

    let endpoints = Endpoints {
        identity: checked_url("identity_url", profile.identity_url.as_ref())?,
        token: checked_url("token_url", profile.token_url.as_ref())?,
        documents: checked_url("documents_url", profile.documents_url.as_ref())?,
        generative: checked_url("ai_url", profile.ai_url.as_ref())?,
        image: checked_url("image_url", profile.image_url.as_ref())?,
    };

    let defaults = LabConfig::default();
    Ok(LabConfig {
        project_id: profile.project_id.trim().to_owned(),
        api_key: resolve_api_key(profile, profile_name)?,
        ai_api_key: resolve_ai_api_key(profile, profile_name),
        ai_model: profile.ai_model.clone(),
        image_api_key: resolve_image_api_key(profile, profile_name),
        endpoints,
        timeout: Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout)),
        breakpoint: profile.breakpoint.unwrap_or(DEFAULT_BREAKPOINT),
        scan_interval: profile
            .scan_interval_ms
            .map_or(defaults.scan_interval, Duration::from_millis),
        refresh_interval_secs: 60,
        ..defaults
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn profile() -> Profile {
        Profile {
            project_id: "lab-demo".into(),
            api_key: Some("web-key".into()),
            email: Some("ada@lab.test".into()),
            password: Some("hunter22".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults, Defaults::default());
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
default_profile = "bench"

[defaults]
output = "json"

[profiles.bench]
project_id = "lab-demo"
api_key_env = "BENCH_KEY"
email = "ada@lab.test"
breakpoint = 900
scan_interval_ms = 250
"#,
        );

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("bench"));
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.timeout, 30);

        let bench = &cfg.profiles["bench"];
        assert_eq!(bench.project_id, "lab-demo");
        assert_eq!(bench.api_key_env.as_deref(), Some("BENCH_KEY"));
        assert_eq!(bench.breakpoint, Some(900));
        assert_eq!(bench.scan_interval_ms, Some(250));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), profile());
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[profiles.default]"));
        assert!(!text.contains("ai_url"), "unset options are omitted:\n{text}");

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn plaintext_secrets_resolve_last() {
        let p = Profile {
            api_key_env: Some("LABINV_TEST_SURELY_UNSET_VAR".into()),
            ..profile()
        };
        let key = resolve_api_key(&p, "config-test-plaintext").unwrap();
        assert_eq!(key.expose_secret(), "web-key");
    }

    #[test]
    fn missing_api_key_is_reported() {
        let p = Profile {
            api_key: None,
            ..profile()
        };
        let err = resolve_api_key(&p, "config-test-missing").unwrap_err();
        assert_eq!(
            err.to_string(),
            "no API key configured for profile 'config-test-missing'"
        );
    }

    #[test]
    fn optional_keys_stay_absent() {
        let p = profile();
        assert!(resolve_ai_api_key(&p, "config-test-optional").is_none());
        assert!(resolve_image_api_key(&p, "config-test-optional").is_none());
    }

    #[test]
    fn lab_config_from_profile() {
        let p = Profile {
            documents_url: Some("http://localhost:8080".into()),
            breakpoint: Some(1024),
            scan_interval_ms: Some(250),
            timeout: Some(5),
            ai_api_key: Some("ai-key".into()),
            ..profile()
        };

        let lab = profile_to_lab_config(&p, "config-test-lab").unwrap();
        assert_eq!(lab.project_id, "lab-demo");
        assert_eq!(lab.endpoints.documents.as_deref(), Some("http://localhost:8080"));
        assert!(lab.endpoints.identity.is_none());
        assert_eq!(lab.breakpoint, 1024);
        assert_eq!(lab.scan_interval, Duration::from_millis(250));
        assert_eq!(lab.timeout, Duration::from_secs(5));
        assert_eq!(lab.ai_api_key.unwrap().expose_secret(), "ai-key");
    }

    #[test]
    fn lab_config_requires_project() {
        let p = Profile {
            project_id: "  ".into(),
            ..profile()
        };
        assert!(matches!(
            profile_to_lab_config(&p, "config-test-project"),
            Err(ConfigError::Validation { ref field, .. }) if field == "project_id"
        ));
    }

    #[test]
    fn lab_config_rejects_bad_endpoint() {
        let p = Profile {
            identity_url: Some("not a url".into()),
            ..profile()
        };
        assert!(matches!(
            profile_to_lab_config(&p, "config-test-url"),
            Err(ConfigError::Validation { ref field, .. }) if field == "identity_url"
        ));
    }
}
