//! Profile command handlers.

use std::str::FromStr;

use labinv_core::{
    AuthUser, Command as CoreCommand, CommandResult, Gender, Lab, Profile, ProfileUpdate,
    Salutation,
};

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::error::CliError;
use crate::output;

pub(super) fn detail(p: &Profile) -> String {
    output::detail_lines(&[
        ("UID", Some(p.uid.clone())),
        ("Name", Some(p.display())),
        ("Email", p.email.clone()),
        ("Post", p.post.clone()),
        ("Phone", p.phone.clone()),
        ("Salutation", p.salutation.map(|s| s.to_string())),
        ("Gender", p.gender.map(|g| g.to_string())),
        ("Joined", p.created_at.clone()),
        ("Updated", p.updated_at.clone()),
    ])
}

pub(super) async fn signed_in_user(lab: &Lab) -> Result<AuthUser, CliError> {
    lab.current_user()
        .await
        .ok_or_else(|| CliError::from(labinv_core::CoreError::NotSignedIn))
}

/// The stored profile, or a bare one when the user never filled it in.
pub(super) async fn load(lab: &Lab, user: &AuthUser) -> Result<Profile, CliError> {
    Ok(lab.fetch_profile(&user.uid).await?.unwrap_or_else(|| Profile {
        uid: user.uid.clone(),
        email: user.email.clone(),
        ..Profile::default()
    }))
}

fn parse_choice<T: FromStr>(
    field: &str,
    raw: Option<String>,
    allowed: &str,
) -> Result<Option<T>, CliError> {
    raw.map(|r| {
        r.parse::<T>().map_err(|_| CliError::Validation {
            field: field.into(),
            reason: format!("expected one of {allowed}, got '{r}'"),
        })
    })
    .transpose()
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, CliError> {
    value.ok_or_else(|| CliError::Validation {
        field: field.into(),
        reason: format!("is required; pass --{}", field.replace('_', "-")),
    })
}

struct ProfileFlags {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    post: Option<String>,
    salutation: Option<String>,
    gender: Option<String>,
}

/// Flags override the stored profile field by field.
fn merge(current: &Profile, flags: ProfileFlags) -> Result<ProfileUpdate, CliError> {
    let salutation =
        parse_choice::<Salutation>("salutation", flags.salutation, "Mr, Ms, Mrs, Dr, Prof")?
            .or(current.salutation);
    let gender =
        parse_choice::<Gender>("gender", flags.gender, "Male, Female, Other")?.or(current.gender);

    Ok(ProfileUpdate {
        first_name: flags
            .first_name
            .or_else(|| current.first_name.clone())
            .unwrap_or_default(),
        last_name: flags
            .last_name
            .or_else(|| current.last_name.clone())
            .unwrap_or_default(),
        phone: flags
            .phone
            .or_else(|| current.phone.clone())
            .unwrap_or_default(),
        post: flags.post.or_else(|| current.post.clone()),
        salutation: required("salutation", salutation)?,
        gender: required("gender", gender)?,
    })
}

pub async fn handle(lab: &Lab, args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let user = signed_in_user(lab).await?;

    match args.command {
        ProfileCommand::Show => {
            let profile = load(lab, &user).await?;
            let out = output::render_single(&global.output, &profile, detail, |p| p.uid.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::Update {
            first_name,
            last_name,
            phone,
            post,
            salutation,
            gender,
        } => {
            let current = load(lab, &user).await?;
            let update = merge(
                &current,
                ProfileFlags {
                    first_name,
                    last_name,
                    phone,
                    post,
                    salutation,
                    gender,
                },
            )?;
            let result = lab.execute(CoreCommand::UpdateProfile(update)).await?;
            if let CommandResult::Profile(profile) = result {
                if !global.quiet {
                    eprintln!("Profile updated");
                }
                let out =
                    output::render_single(&global.output, &profile, detail, |p| p.uid.clone())?;
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }
    }
}
