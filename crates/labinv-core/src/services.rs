// ── Data and AI collaborators ──
//
// Narrow async seams used by the scan loop and the AI commands, so both
// can run against in-memory fakes.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::model::InventoryItem;

/// Barcode → item resolution.
#[async_trait]
pub trait ItemLookup: Send + Sync {
    /// First item whose `barcode` equals `code`, if any.
    async fn find_by_barcode(&self, code: &str) -> Result<Option<InventoryItem>, CoreError>;
}

/// Fields sent to the model when enhancing an item description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionInput {
    pub name: String,
    pub item_type: String,
    pub value: String,
    pub part_number: Option<String>,
}

impl From<&InventoryItem> for DescriptionInput {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            item_type: item.item_type.clone(),
            value: item.value.clone(),
            part_number: item.part_number.clone(),
        }
    }
}

/// Hosted language model features. Errors propagate; nothing retries.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Summarize a research paper's text.
    async fn summarize(&self, paper_text: &str) -> Result<String, CoreError>;

    /// Write a product description for an inventory item.
    async fn enhance_description(&self, input: &DescriptionInput) -> Result<String, CoreError>;
}
