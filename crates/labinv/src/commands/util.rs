//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use labinv_core::{EntityId, InventoryItem, Lab, Vendor};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve an item identifier (document id or barcode) via snapshot lookup.
pub fn resolve_item(lab: &Lab, identifier: &str) -> Result<Arc<InventoryItem>, CliError> {
    let store = lab.store();
    store
        .item_by_id(&EntityId::from(identifier))
        .or_else(|| store.item_by_barcode(identifier))
        .ok_or_else(|| CliError::not_found("item", identifier, "items list"))
}

/// Resolve a vendor identifier via snapshot lookup.
pub fn resolve_vendor(lab: &Lab, identifier: &str) -> Result<Arc<Vendor>, CliError> {
    lab.store()
        .vendor_by_id(&EntityId::from(identifier))
        .ok_or_else(|| CliError::not_found("vendor", identifier, "vendors list"))
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Spinner on stderr for slow remote calls; hidden when quiet or piped.
pub fn spinner(message: &str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Treat blank strings as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
