//! CLI configuration: thin wrapper around `labinv_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--project, --api-key, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use labinv_core::{AuthCredentials, LabConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use labinv_config::{
    Config, Profile, SecretKind, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Load the active profile, falling back to an empty one when the
/// flags carry everything needed.
pub fn active_profile(global: &GlobalOpts) -> Result<(String, Profile), CliError> {
    let cfg = load_config_or_default();
    let name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&name) {
        return Ok((name, profile.clone()));
    }
    if global.project.is_some() && global.api_key.is_some() {
        return Ok((name, Profile::default()));
    }
    if cfg.profiles.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    Err(CliError::ProfileNotFound {
        name,
        available: available.join(", "),
    })
}

/// Translate a `Profile` + global flags into a `LabConfig`.
///
/// CLI flag overrides take priority over profile values. A CLI run
/// needs one snapshot, so the background refresh stays off.
pub fn resolve_lab_config(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<LabConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref project) = global.project {
        profile.project_id.clone_from(project);
    }
    if let Some(ref key) = global.api_key {
        profile.api_key = Some(key.clone());
        profile.api_key_env = None;
    }

    let mut config = labinv_config::profile_to_lab_config(&profile, profile_name)?;
    config.timeout = Duration::from_secs(global.timeout);
    config.refresh_interval_secs = 0;
    config.profile_poll_interval = Duration::ZERO;
    Ok(config)
}

/// Resolve sign-in credentials, prompting on a terminal when the
/// password is not stored anywhere.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, CliError> {
    match labinv_config::resolve_credentials(profile, profile_name) {
        Ok(creds) => Ok(creds),
        Err(labinv_config::ConfigError::NoCredentials { secret, .. }) if secret == "password" => {
            let email = profile
                .email
                .clone()
                .or_else(|| std::env::var("LABINV_EMAIL").ok())
                .unwrap_or_default();
            let password = prompt_password(&email)?;
            Ok(AuthCredentials { email, password })
        }
        Err(e) => Err(e.into()),
    }
}

/// Read a password from the terminal without echo.
pub fn prompt_password(email: &str) -> Result<SecretString, CliError> {
    let prompt = if email.is_empty() {
        "Password: ".to_owned()
    } else {
        format!("Password for {email}: ")
    };
    let password = rpassword::prompt_password(prompt)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

/// Resolve everything a connected command needs.
pub fn resolve(global: &GlobalOpts) -> Result<(LabConfig, AuthCredentials), CliError> {
    let (name, profile) = active_profile(global)?;
    let lab_config = resolve_lab_config(&profile, &name, global)?;
    let credentials = resolve_credentials(&profile, &name)?;
    Ok((lab_config, credentials))
}
