// ── Command API ──
//
// Every write against the document store flows through one `Command`
// enum. The `Lab` routes each variant to the document client and
// writes the result through to the DataStore.

use std::fmt;

use crate::error::CoreError;
use crate::model::{
    EntityId, InventoryItem, ItemType, ItemUpdate, NewItem, Profile, ProfileUpdate, Vendor,
    VendorDraft,
};

/// A command plus the channel its result goes back on.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Inventory ────────────────────────────────────────────────────
    CreateItem(NewItem),
    UpdateItem { id: EntityId, update: ItemUpdate },
    DeleteItem { id: EntityId },

    // ── Vendors ──────────────────────────────────────────────────────
    CreateVendor(VendorDraft),
    UpdateVendor { id: EntityId, draft: VendorDraft },
    DeleteVendor { id: EntityId },

    // ── Taxonomy ─────────────────────────────────────────────────────
    CreateItemType { name: String },

    // ── Account ──────────────────────────────────────────────────────
    UpdateProfile(ProfileUpdate),
}

impl Command {
    /// Short human label, used in logs and failure reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateItem(_) => "add item",
            Self::UpdateItem { .. } => "update item",
            Self::DeleteItem { .. } => "delete item",
            Self::CreateVendor(_) => "add vendor",
            Self::UpdateVendor { .. } => "update vendor",
            Self::DeleteVendor { .. } => "delete vendor",
            Self::CreateItemType { .. } => "add item type",
            Self::UpdateProfile(_) => "update profile",
        }
    }

    /// Local validation, run before anything is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::CreateItem(item) => item.validate(),
            Self::UpdateItem { update, .. } => update.validate(),
            Self::CreateVendor(draft) | Self::UpdateVendor { draft, .. } => draft.validate(),
            Self::UpdateProfile(update) => update.validate(),
            Self::DeleteItem { .. } | Self::DeleteVendor { .. } | Self::CreateItemType { .. } => {
                Ok(())
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Ok,
    Item(InventoryItem),
    Vendor(Vendor),
    ItemType(ItemType),
    Profile(Profile),
}
