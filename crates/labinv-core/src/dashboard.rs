// ── Inventory overview ──
//
// Figures derived from the store snapshots: stock value, low-stock
// count, per-type breakdown and the newest items.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::model::InventoryItem;
use crate::store::DataStore;

/// Items with fewer units than this are low on stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// How many of the newest items the summary lists.
pub const RECENT_ITEM_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub item_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Sum of `quantity * rate`; a missing rate or quantity counts as zero.
    pub total_value: f64,
    pub low_stock: usize,
    pub item_count: usize,
    pub vendor_count: usize,
    /// Largest group first, ties by name.
    pub by_type: Vec<TypeCount>,
    /// Newest first by `createdAt`. Items without a creation time are left out.
    pub recent: Vec<Arc<InventoryItem>>,
}

impl DashboardSummary {
    pub fn compute(items: &[Arc<InventoryItem>], vendor_count: usize) -> Self {
        let total_value = items
            .iter()
            .map(|i| f64::from(i.quantity.unwrap_or(0)) * i.rate.unwrap_or(0.0))
            .sum();

        let low_stock = items
            .iter()
            .filter(|i| i.quantity.is_some_and(|q| q < LOW_STOCK_THRESHOLD))
            .count();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for item in items {
            *counts.entry(item.item_type.as_str()).or_default() += 1;
        }
        let mut by_type: Vec<TypeCount> = counts
            .into_iter()
            .map(|(item_type, count)| TypeCount {
                item_type: item_type.to_owned(),
                count,
            })
            .collect();
        by_type.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.item_type.cmp(&b.item_type)));

        // RFC 3339 timestamps in UTC order lexically.
        let mut recent: Vec<Arc<InventoryItem>> = items
            .iter()
            .filter(|i| i.created_at.is_some())
            .cloned()
            .collect();
        recent.sort_by_key(|i| Reverse(i.created_at.clone()));
        recent.truncate(RECENT_ITEM_LIMIT);

        Self {
            total_value,
            low_stock,
            item_count: items.len(),
            vendor_count,
            by_type,
            recent,
        }
    }
}

impl DataStore {
    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::compute(&self.items_snapshot(), self.vendor_count())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::EntityId;

    fn item(id: &str, kind: &str, quantity: Option<u32>, rate: Option<f64>) -> Arc<InventoryItem> {
        Arc::new(InventoryItem {
            id: EntityId::new(id),
            name: format!("part {id}"),
            item_type: kind.into(),
            value: String::new(),
            quantity,
            unit: Some("pcs".into()),
            part_number: None,
            description: None,
            barcode: None,
            image_url: None,
            vendor_id: None,
            rate,
            created_at: None,
        })
    }

    fn created(id: &str, at: &str) -> Arc<InventoryItem> {
        let mut i = (*item(id, "IC", Some(20), None)).clone();
        i.created_at = Some(at.into());
        Arc::new(i)
    }

    #[test]
    fn value_sums_quantity_times_rate() {
        let items = vec![
            item("a", "Resistor", Some(100), Some(0.5)),
            item("b", "IC", Some(4), Some(12.25)),
            item("c", "IC", Some(30), None),
            item("d", "Misc", None, Some(99.0)),
        ];
        let s = DashboardSummary::compute(&items, 0);
        assert!((s.total_value - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn low_stock_is_strictly_below_threshold() {
        let items = vec![
            item("a", "IC", Some(0), None),
            item("b", "IC", Some(9), None),
            item("c", "IC", Some(10), None),
            item("d", "IC", None, None),
        ];
        assert_eq!(DashboardSummary::compute(&items, 0).low_stock, 2);
    }

    #[test]
    fn types_are_counted_largest_first() {
        let items = vec![
            item("a", "Resistor", Some(1), None),
            item("b", "IC", Some(1), None),
            item("c", "IC", Some(1), None),
            item("d", "Capacitor", Some(1), None),
        ];
        let s = DashboardSummary::compute(&items, 3);
        let order: Vec<(&str, usize)> = s
            .by_type
            .iter()
            .map(|t| (t.item_type.as_str(), t.count))
            .collect();
        assert_eq!(order, vec![("IC", 2), ("Capacitor", 1), ("Resistor", 1)]);
        assert_eq!(s.item_count, 4);
        assert_eq!(s.vendor_count, 3);
    }

    #[test]
    fn recent_keeps_newest_five_with_timestamps() {
        let mut items: Vec<_> = (1..=7)
            .map(|d| created(&format!("i{d}"), &format!("2024-03-0{d}T10:00:00.000Z")))
            .collect();
        items.push(item("undated", "IC", Some(1), None));

        let s = DashboardSummary::compute(&items, 0);
        let ids: Vec<&str> = s.recent.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["i7", "i6", "i5", "i4", "i3"]);
    }

    #[test]
    fn empty_store_is_all_zero() {
        let s = DataStore::new().dashboard();
        assert_eq!(s.item_count, 0);
        assert_eq!(s.low_stock, 0);
        assert!(s.by_type.is_empty() && s.recent.is_empty());
        assert!(s.total_value.abs() < f64::EPSILON);
    }
}
