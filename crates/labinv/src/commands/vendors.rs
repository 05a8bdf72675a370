//! Vendor command handlers.

use std::sync::Arc;

use tabled::Tabled;

use labinv_core::{Command as CoreCommand, CommandResult, Lab, Vendor, VendorDraft, VendorKind};

use crate::cli::{GlobalOpts, VendorFields, VendorKindArg, VendorsArgs, VendorsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VendorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Website")]
    website: String,
    #[tabled(rename = "Last Edit")]
    edited_by: String,
}

impl From<&Arc<Vendor>> for VendorRow {
    fn from(v: &Arc<Vendor>) -> Self {
        Self {
            id: v.id.to_string(),
            name: v.name.clone(),
            kind: v.kind.map(|k| k.to_string()).unwrap_or_default(),
            website: v.website.clone().unwrap_or_default(),
            edited_by: v.updated_by.as_ref().map(|u| u.label()).unwrap_or_default(),
        }
    }
}

fn detail(v: &Vendor) -> String {
    let edited = v.updated_by.as_ref().map(|u| {
        let mut label = u.label();
        if let Some(device) = u.device.as_deref() {
            label.push_str(&format!(" on {device}"));
        }
        if let Some(at) = v.updated_at.as_deref() {
            label.push_str(&format!(", {at}"));
        }
        label
    });
    output::detail_lines(&[
        ("ID", Some(v.id.to_string())),
        ("Name", Some(v.name.clone())),
        ("Kind", v.kind.map(|k| k.to_string())),
        ("Website", v.website.clone()),
        ("Phone", v.phone.clone()),
        ("Address", v.address.clone()),
        ("Last Edit", edited),
    ])
}

impl From<VendorKindArg> for VendorKind {
    fn from(arg: VendorKindArg) -> Self {
        match arg {
            VendorKindArg::Online => Self::Online,
            VendorKindArg::Offline => Self::Offline,
        }
    }
}

fn draft(name: String, fields: VendorFields) -> VendorDraft {
    VendorDraft {
        name,
        kind: fields.kind.map(VendorKind::from),
        website: util::non_empty(fields.website),
        phone: util::non_empty(fields.phone),
        address: util::non_empty(fields.address),
    }
}

/// Edits replace the whole form, so unspecified fields keep their
/// current values.
fn merged_draft(current: &Vendor, name: Option<String>, fields: VendorFields) -> VendorDraft {
    VendorDraft {
        name: name.unwrap_or_else(|| current.name.clone()),
        kind: fields.kind.map(VendorKind::from).or(current.kind),
        website: util::non_empty(fields.website).or_else(|| current.website.clone()),
        phone: util::non_empty(fields.phone).or_else(|| current.phone.clone()),
        address: util::non_empty(fields.address).or_else(|| current.address.clone()),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(lab: &Lab, args: VendorsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        VendorsCommand::List => {
            let snap = lab.vendors_snapshot();
            let out = output::render_list(
                &global.output,
                &snap,
                |v| VendorRow::from(v),
                |v| v.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VendorsCommand::Get { id } => {
            let vendor = util::resolve_vendor(lab, &id)?;
            let out = output::render_single(
                &global.output,
                vendor.as_ref(),
                detail,
                |v| v.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VendorsCommand::Add { name, fields } => {
            let result = lab
                .execute(CoreCommand::CreateVendor(draft(name, fields)))
                .await?;
            if let CommandResult::Vendor(vendor) = result {
                if !global.quiet {
                    eprintln!("Vendor added");
                }
                output::print_output(&vendor.id.to_string(), global.quiet);
            }
            Ok(())
        }

        VendorsCommand::Update { id, name, fields } => {
            let current = util::resolve_vendor(lab, &id)?;
            lab.execute(CoreCommand::UpdateVendor {
                id: current.id.clone(),
                draft: merged_draft(&current, name, fields),
            })
            .await?;
            if !global.quiet {
                eprintln!("Vendor updated");
            }
            Ok(())
        }

        VendorsCommand::Delete { id } => {
            let vendor = util::resolve_vendor(lab, &id)?;
            if !util::confirm(&format!("Delete vendor '{}'?", vendor.name), global.yes)? {
                return Ok(());
            }
            lab.execute(CoreCommand::DeleteVendor {
                id: vendor.id.clone(),
            })
            .await?;
            if !global.quiet {
                eprintln!("Vendor deleted");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vendor() -> Vendor {
        serde_json::from_value(serde_json::json!({
            "id": "v1",
            "name": "Mouser",
            "type": "Online",
            "website": "https://mouser.com",
            "phone": "+1 800 346 6873",
            "updatedAt": "2026-03-01T10:00:00.000Z",
            "updatedBy": {
                "uid": "u1",
                "displayName": "Ada Lovelace",
                "post": "Lab Manager",
                "device": "Desktop"
            }
        }))
        .unwrap()
    }

    fn no_fields() -> VendorFields {
        VendorFields {
            kind: None,
            website: None,
            phone: None,
            address: None,
        }
    }

    #[test]
    fn update_keeps_unspecified_fields() {
        let merged = merged_draft(
            &vendor(),
            None,
            VendorFields {
                phone: Some("+44 1234".into()),
                ..no_fields()
            },
        );
        assert_eq!(merged.name, "Mouser");
        assert_eq!(merged.kind, Some(VendorKind::Online));
        assert_eq!(merged.website.as_deref(), Some("https://mouser.com"));
        assert_eq!(merged.phone.as_deref(), Some("+44 1234"));
    }

    #[test]
    fn detail_names_the_last_editor_and_device() {
        let out = detail(&vendor());
        assert!(out.contains("Ada Lovelace (Lab Manager) on Desktop"));
    }

    #[test]
    fn blank_fields_are_dropped_from_new_drafts() {
        let d = draft(
            "Digikey".into(),
            VendorFields {
                website: Some(String::new()),
                kind: Some(VendorKindArg::Offline),
                ..no_fields()
            },
        );
        assert_eq!(d.website, None);
        assert_eq!(d.kind, Some(VendorKind::Offline));
    }
}
