// ── Full refresh and write-through ──
//
// Applies listings and single-document write results to the DataStore.

use chrono::Utc;

use super::DataStore;
use crate::model::{EntityId, InventoryItem, ItemType, Vendor};

impl DataStore {
    /// Replace all three collections with fresh listings.
    pub(crate) fn apply_full_refresh(
        &self,
        items: Vec<InventoryItem>,
        vendors: Vec<Vendor>,
        item_types: Vec<ItemType>,
    ) {
        self.items
            .replace_all(items.into_iter().map(|i| (i.id.clone(), i)));
        self.vendors
            .replace_all(vendors.into_iter().map(|v| (v.id.clone(), v)));
        self.item_types
            .replace_all(item_types.into_iter().map(|t| (t.id.clone(), t)));
        self.last_full_refresh.send_replace(Some(Utc::now()));
    }

    pub(crate) fn put_item(&self, item: InventoryItem) {
        self.items.upsert(item.id.clone(), item);
    }

    pub(crate) fn put_vendor(&self, vendor: Vendor) {
        self.vendors.upsert(vendor.id.clone(), vendor);
    }

    pub(crate) fn put_item_type(&self, item_type: ItemType) {
        self.item_types.upsert(item_type.id.clone(), item_type);
    }

    pub(crate) fn drop_item(&self, id: &EntityId) {
        self.items.remove(id);
    }

    pub(crate) fn drop_vendor(&self, id: &EntityId) {
        self.vendors.remove(id);
    }


    /// Forget everything (sign-out).
    pub(crate) fn clear(&self) {
        self.items.clear();
        self.vendors.clear();
        self.item_types.clear();
        self.last_full_refresh.send_replace(None);
    }
}
