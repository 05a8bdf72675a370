// ── Domain model ──
//
// Canonical types for everything the lab stores. Field names follow the
// camelCase document layout so decoded documents map one-to-one.

pub mod entity_id;
pub mod item;
pub mod item_type;
pub mod profile;
pub mod vendor;

pub use entity_id::EntityId;
pub use item::{DEFAULT_UNIT, InventoryItem, ItemUpdate, NewItem};
pub use item_type::{DEFAULT_ITEM_TYPES, ItemType, color_for};
pub use profile::{Gender, Profile, ProfileUpdate, Salutation};
pub use vendor::{UpdatedBy, Vendor, VendorDraft, VendorKind};

/// Collection names in the document store.
pub mod collections {
    pub const INVENTORY: &str = "inventory";
    pub const VENDORS: &str = "vendors";
    pub const ITEM_TYPES: &str = "inventoryItemTypes";
    pub const USERS: &str = "users";
}
