//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SecretArg};
use crate::config::{self, Config, Profile, SecretKind};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with every plaintext secret masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for p in cfg.profiles.values_mut() {
        for secret in [
            &mut p.api_key,
            &mut p.password,
            &mut p.ai_api_key,
            &mut p.image_api_key,
        ] {
            if secret.is_some() {
                *secret = Some(MASK.into());
            }
        }
    }
    cfg
}

/// Format config for display as TOML-like text, secrets masked.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "project_id = \"{}\"", p.project_id);
        let strings = [
            ("api_key", p.api_key.as_ref().map(|_| MASK.to_owned())),
            ("api_key_env", p.api_key_env.clone()),
            ("email", p.email.clone()),
            ("password", p.password.as_ref().map(|_| MASK.to_owned())),
            ("ai_api_key", p.ai_api_key.as_ref().map(|_| MASK.to_owned())),
            ("ai_api_key_env", p.ai_api_key_env.clone()),
            ("ai_model", p.ai_model.clone()),
            ("image_api_key", p.image_api_key.as_ref().map(|_| MASK.to_owned())),
            ("image_api_key_env", p.image_api_key_env.clone()),
            ("identity_url", p.identity_url.clone()),
            ("token_url", p.token_url.clone()),
            ("documents_url", p.documents_url.clone()),
            ("ai_url", p.ai_url.clone()),
            ("image_url", p.image_url.clone()),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = \"{value}\"");
            }
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(bp) = p.breakpoint {
            let _ = writeln!(out, "breakpoint = {bp}");
        }
        if let Some(ms) = p.scan_interval_ms {
            let _ = writeln!(out, "scan_interval_ms = {ms}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: &str,
    profile_name: &str,
    kind: SecretKind,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {}?", kind.label()))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        labinv_config::store_secret(profile_name, kind, secret)?;
        eprintln!("   ✓ {} stored in system keyring", kind.label());
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

/// Prompt for an optional secret; empty input skips it.
fn prompt_optional_secret(profile_name: &str, kind: SecretKind) -> Result<Option<String>, CliError> {
    let value = rpassword::prompt_password(format!("{} (leave empty to skip): ", kind.label()))
        .map_err(prompt_err)?;
    if value.is_empty() {
        return Ok(None);
    }
    prompt_keyring_storage(&value, profile_name, kind)
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str, what: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {what}"),
    })
}

/// Apply one `config set` key to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    let normalized = key.replace('-', "_");
    match normalized.as_str() {
        "project_id" | "project" => profile.project_id = value,
        "api_key" => profile.api_key = Some(value),
        "api_key_env" => profile.api_key_env = Some(value),
        "email" => profile.email = Some(value),
        "ai_api_key" => profile.ai_api_key = Some(value),
        "ai_api_key_env" => profile.ai_api_key_env = Some(value),
        "ai_model" => profile.ai_model = Some(value),
        "image_api_key" => profile.image_api_key = Some(value),
        "image_api_key_env" => profile.image_api_key_env = Some(value),
        "identity_url" => profile.identity_url = Some(value),
        "token_url" => profile.token_url = Some(value),
        "documents_url" => profile.documents_url = Some(value),
        "ai_url" => profile.ai_url = Some(value),
        "image_url" => profile.image_url = Some(value),
        "timeout" => profile.timeout = Some(parse_number(key, &value, "a number (seconds)")?),
        "breakpoint" => profile.breakpoint = Some(parse_number(key, &value, "a width in pixels")?),
        "scan_interval_ms" => {
            profile.scan_interval_ms = Some(parse_number(key, &value, "a number (milliseconds)")?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: project_id, api_key, \
                     api_key_env, email, ai_api_key, ai_api_key_env, ai_model, image_api_key, \
                     image_api_key_env, identity_url, token_url, documents_url, ai_url, \
                     image_url, timeout, breakpoint, scan_interval_ms"
                ),
            });
        }
    }
    Ok(())
}

impl From<SecretArg> for SecretKind {
    fn from(arg: SecretArg) -> Self {
        match arg {
            SecretArg::Password => Self::Password,
            SecretArg::ApiKey => Self::ApiKey,
            SecretArg::AiApiKey => Self::AiApiKey,
            SecretArg::ImageApiKey => Self::ImageApiKey,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("labinv configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let project_id: String = Input::new()
                .with_prompt("Project id")
                .interact_text()
                .map_err(prompt_err)?;

            let key = rpassword::prompt_password("Web API key: ").map_err(prompt_err)?;
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "api_key".into(),
                    reason: "API key cannot be empty".into(),
                });
            }
            let api_key = prompt_keyring_storage(&key, &profile_name, SecretKind::ApiKey)?;

            let email: String = Input::new()
                .with_prompt("Account email (leave empty to skip)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let password = if email.is_empty() {
                None
            } else {
                prompt_optional_secret(&profile_name, SecretKind::Password)?
            };

            let ai_api_key = prompt_optional_secret(&profile_name, SecretKind::AiApiKey)?;
            let image_api_key = prompt_optional_secret(&profile_name, SecretKind::ImageApiKey)?;

            let profile = Profile {
                project_id,
                api_key,
                email: Some(email).filter(|e| !e.is_empty()),
                password,
                ai_api_key,
                image_api_key,
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: labinv auth whoami");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: labinv config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { secret } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }

            let kind = SecretKind::from(secret);
            let value = rpassword::prompt_password(format!("{}: ", kind.label()))
                .map_err(prompt_err)?;
            if value.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            labinv_config::store_secret(&profile_name, kind, &value)?;
            if !global.quiet {
                eprintln!(
                    "✓ {} stored in system keyring for profile '{profile_name}'",
                    kind.label()
                );
            }
            Ok(())
        }
    }
}
