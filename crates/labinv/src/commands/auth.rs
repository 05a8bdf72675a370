//! Account command handlers: login, signup, logout, whoami.
//!
//! Login and signup talk to the identity service directly instead of
//! going through a one-shot session, since there may be no stored
//! credentials yet.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use labinv_core::{AuthCredentials, AuthUser, Lab, Profile};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config::{self, SecretKind};
use crate::error::CliError;
use crate::output;

use super::profile;

#[derive(Debug, Serialize)]
struct WhoAmI {
    uid: String,
    email: Option<String>,
    profile: Option<Profile>,
}

fn whoami_detail(w: &WhoAmI) -> String {
    match &w.profile {
        Some(p) => profile::detail(p),
        None => output::detail_lines(&[
            ("UID", Some(w.uid.clone())),
            ("Email", w.email.clone()),
        ]),
    }
}

fn prompt_email(flag: Option<String>, stored: Option<&str>) -> Result<String, CliError> {
    if let Some(email) = flag.or_else(|| stored.map(str::to_owned)) {
        return Ok(email);
    }
    dialoguer::Input::<String>::new()
        .with_prompt("Email")
        .interact_text()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

fn prompt_new_password() -> Result<SecretString, CliError> {
    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    if password.chars().count() < 6 {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "must be at least 6 characters".into(),
        });
    }
    Ok(SecretString::from(password))
}

fn report_signed_in(user: &AuthUser, verb: &str, global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    match &user.email {
        Some(email) => eprintln!("{verb} as {email} ({})", user.uid),
        None => eprintln!("{verb} ({})", user.uid),
    }
}

/// Remember the email (and optionally the password) on the active profile.
fn remember(profile_name: &str, email: &str, password: Option<&str>) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    let entry = cfg.profiles.entry(profile_name.to_owned()).or_default();
    if entry.email.as_deref() != Some(email) {
        entry.email = Some(email.to_owned());
        config::save_config(&cfg)?;
    }
    if let Some(password) = password {
        labinv_config::store_secret(profile_name, SecretKind::Password, password)?;
    }
    Ok(())
}

pub async fn handle(args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Login { email, save } => {
            let (name, stored) = config::active_profile(global)?;
            let lab_config = config::resolve_lab_config(&stored, &name, global)?;
            let email = prompt_email(email, stored.email.as_deref())?;
            let password = match labinv_config::resolve_credentials(&stored, &name) {
                Ok(creds) if creds.email == email => creds.password,
                _ => config::prompt_password(&email)?,
            };

            let lab = Lab::new(lab_config)?;
            let user = lab
                .sign_in(AuthCredentials {
                    email: email.clone(),
                    password: password.clone(),
                })
                .await?;
            lab.sign_out().await;
            report_signed_in(&user, "Signed in", global);

            let saved = save.then(|| password.expose_secret().to_owned());
            remember(&name, &email, saved.as_deref())?;
            Ok(())
        }

        AuthCommand::Signup { email } => {
            let (name, stored) = config::active_profile(global)?;
            let lab_config = config::resolve_lab_config(&stored, &name, global)?;
            let email = prompt_email(email, None)?;
            let password = prompt_new_password()?;

            let lab = Lab::new(lab_config)?;
            let user = lab.sign_up(AuthCredentials { email: email.clone(), password }).await?;
            lab.sign_out().await;
            report_signed_in(&user, "Account created", global);
            remember(&name, &email, None)?;
            Ok(())
        }

        AuthCommand::Logout => {
            let cfg = config::load_config_or_default();
            let name = config::active_profile_name(global, &cfg);
            let removed = labinv_config::forget_secret(&name, SecretKind::Password)?;
            if !global.quiet {
                if removed {
                    eprintln!("Stored password removed for profile '{name}'");
                } else {
                    eprintln!("No stored password for profile '{name}'");
                }
            }
            Ok(())
        }

        AuthCommand::Whoami => {
            let (lab_config, credentials) = config::resolve(global)?;
            Lab::oneshot(lab_config, credentials, |lab| async move {
                Ok(show_whoami(&lab, global).await)
            })
            .await?
        }
    }
}

async fn show_whoami(lab: &Lab, global: &GlobalOpts) -> Result<(), CliError> {
    let user = profile::signed_in_user(lab).await?;
    let stored = lab.fetch_profile(&user.uid).await?;
    let report = WhoAmI {
        uid: user.uid,
        email: user.email,
        profile: stored,
    };
    let out = output::render_single(&global.output, &report, whoami_detail, |w| w.uid.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
