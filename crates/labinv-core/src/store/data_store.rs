// ── Central reactive data store ──
//
// Local mirror of the lab's collections. The `Lab` fills it from full
// listings and patches it after each successful write.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{EntityId, InventoryItem, ItemType, Vendor};

fn by_item_name(a: &InventoryItem, b: &InventoryItem) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

fn by_vendor_name(a: &Vendor, b: &Vendor) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

fn by_type_name(a: &ItemType, b: &ItemType) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Reactive store for inventory items, vendors and item types.
///
/// Every snapshot is ordered by name, case-insensitively.
pub struct DataStore {
    pub(crate) items: EntityCollection<InventoryItem>,
    pub(crate) vendors: EntityCollection<Vendor>,
    pub(crate) item_types: EntityCollection<ItemType>,
    pub(crate) last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (last_full_refresh, _) = watch::channel(None);
        Self {
            items: EntityCollection::new(by_item_name),
            vendors: EntityCollection::new(by_vendor_name),
            item_types: EntityCollection::new(by_type_name),
            last_full_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn items_snapshot(&self) -> Arc<Vec<Arc<InventoryItem>>> {
        self.items.snapshot()
    }

    pub fn vendors_snapshot(&self) -> Arc<Vec<Arc<Vendor>>> {
        self.vendors.snapshot()
    }

    pub fn item_types_snapshot(&self) -> Arc<Vec<Arc<ItemType>>> {
        self.item_types.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn item_by_id(&self, id: &EntityId) -> Option<Arc<InventoryItem>> {
        self.items.get(id)
    }

    /// Cached item with this barcode. The document store is the
    /// authority; this only searches what was last listed.
    pub fn item_by_barcode(&self, code: &str) -> Option<Arc<InventoryItem>> {
        self.items
            .snapshot()
            .iter()
            .find(|i| i.barcode.as_deref() == Some(code))
            .cloned()
    }

    pub fn vendor_by_id(&self, id: &EntityId) -> Option<Arc<Vendor>> {
        self.vendors.get(id)
    }

    /// Item type names: the built-in defaults followed by custom ones.
    pub fn item_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = crate::model::DEFAULT_ITEM_TYPES
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        for t in self.item_types.snapshot().iter() {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&t.name)) {
                names.push(t.name.clone());
            }
        }
        names
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    /// How long ago the last full refresh occurred, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_full_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
