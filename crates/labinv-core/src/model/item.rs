// ── Inventory items ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::EntityId;
use crate::error::CoreError;

pub const DEFAULT_UNIT: &str = "pcs";

/// One stocked part, stored in the `inventory` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    /// ISO-8601 creation time as written by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl InventoryItem {
    /// Quantity with unit for display, e.g. `"250 pcs"`.
    pub fn stock_label(&self) -> String {
        match (self.quantity, self.unit.as_deref()) {
            (Some(q), Some(u)) => format!("{q} {u}"),
            (Some(q), None) => q.to_string(),
            (None, _) => "-".into(),
        }
    }
}

/// Fields for a new inventory item.
///
/// A UUID barcode is generated at creation; the unit defaults to `pcs`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub item_type: String,
    pub quantity: i64,
    pub unit: Option<String>,
    pub value: Option<String>,
    pub part_number: Option<String>,
    pub description: Option<String>,
}

impl NewItem {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().chars().count() < 2 {
            return Err(CoreError::validation(
                "Name must be at least 2 characters.",
            ));
        }
        if self.item_type.trim().is_empty() {
            return Err(CoreError::validation("Please select an item type."));
        }
        if self.quantity < 0 {
            return Err(CoreError::validation("Quantity cannot be negative."));
        }
        if self.unit.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(CoreError::validation("Unit is required."));
        }
        Ok(())
    }

    /// Document body for the `inventory` collection.
    pub(crate) fn into_fields(self, barcode: String, created_at: String) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), self.name.trim().into());
        map.insert("type".into(), self.item_type.into());
        map.insert("quantity".into(), self.quantity.into());
        map.insert(
            "unit".into(),
            self.unit.unwrap_or_else(|| DEFAULT_UNIT.into()).into(),
        );
        map.insert("value".into(), self.value.unwrap_or_default().into());
        insert_opt(&mut map, "partNumber", self.part_number);
        insert_opt(&mut map, "description", self.description);
        map.insert("barcode".into(), barcode.into());
        map.insert("createdAt".into(), created_at.into());
        map
    }
}

/// Partial update of an existing item. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub item_type: Option<String>,
    pub value: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub part_number: Option<String>,
    pub description: Option<String>,
    pub barcode: Option<String>,
    pub vendor_id: Option<EntityId>,
    pub rate: Option<f64>,
    pub image_url: Option<String>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::validation("Nothing to update."));
        }
        if self
            .name
            .as_deref()
            .is_some_and(|n| n.trim().chars().count() < 2)
        {
            return Err(CoreError::validation(
                "Name must be at least 2 characters.",
            ));
        }
        if self.value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(CoreError::validation("Value is required."));
        }
        if self.quantity.is_some_and(|q| q < 0) {
            return Err(CoreError::validation("Quantity cannot be negative."));
        }
        if self.rate.is_some_and(|r| !r.is_finite() || r < 0.0) {
            return Err(CoreError::validation("Rate must be a non-negative number."));
        }
        Ok(())
    }

    pub(crate) fn into_fields(self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "name", self.name.map(|n| n.trim().to_owned()));
        insert_opt(&mut map, "type", self.item_type);
        insert_opt(&mut map, "value", self.value);
        if let Some(q) = self.quantity {
            map.insert("quantity".into(), q.into());
        }
        insert_opt(&mut map, "unit", self.unit);
        insert_opt(&mut map, "partNumber", self.part_number);
        insert_opt(&mut map, "description", self.description);
        insert_opt(&mut map, "barcode", self.barcode);
        insert_opt(&mut map, "vendorId", self.vendor_id.map(|v| v.to_string()));
        if let Some(r) = self.rate {
            map.insert("rate".into(), r.into());
        }
        insert_opt(&mut map, "imageUrl", self.image_url);
        map
    }
}

pub(crate) fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(v) = value {
        map.insert(key.into(), Value::String(v));
    }
}
