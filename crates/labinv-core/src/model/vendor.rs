// ── Vendors ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use super::EntityId;
use super::item::insert_opt;
use crate::device::DeviceClass;
use crate::error::CoreError;

/// Where a vendor sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum VendorKind {
    Online,
    Offline,
}

/// Who last edited a vendor, and from which kind of device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedBy {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl UpdatedBy {
    /// `"Ada Lovelace (Lab Manager)"`, or just the name without a post.
    pub fn label(&self) -> String {
        let name = self.display_name.as_deref().unwrap_or(&self.uid);
        match self.post.as_deref().filter(|p| !p.is_empty()) {
            Some(post) => format!("{name} ({post})"),
            None => name.to_owned(),
        }
    }
}

/// A supplier, stored in the `vendors` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: EntityId,
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<VendorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UpdatedBy>,
}

/// Vendor form fields, used for both create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorDraft {
    pub name: String,
    pub kind: Option<VendorKind>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl VendorDraft {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().chars().count() < 2 {
            return Err(CoreError::validation(
                "Name must be at least 2 characters.",
            ));
        }
        if let Some(site) = self.website.as_deref().filter(|s| !s.is_empty()) {
            if url::Url::parse(site).is_err() {
                return Err(CoreError::validation("Please enter a valid URL."));
            }
        }
        Ok(())
    }

    pub(crate) fn into_fields(self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), self.name.trim().into());
        insert_opt(&mut map, "type", self.kind.map(|k| k.to_string()));
        insert_opt(&mut map, "website", self.website);
        insert_opt(&mut map, "phone", self.phone);
        insert_opt(&mut map, "address", self.address);
        map
    }
}

/// Stamp an edit with its author and device.
pub(crate) fn stamp_edit(
    fields: &mut Map<String, Value>,
    editor: &UpdatedBy,
    device: DeviceClass,
    now: String,
) {
    let mut by = editor.clone();
    if let Some(label) = device.label() {
        by.device = Some(label.to_owned());
    }
    fields.insert("updatedAt".into(), now.into());
    fields.insert(
        "updatedBy".into(),
        serde_json::to_value(by).unwrap_or(Value::Null),
    );
}
