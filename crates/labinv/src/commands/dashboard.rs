//! Inventory overview.

use std::sync::Arc;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use labinv_core::{DashboardSummary, InventoryItem, LOW_STOCK_THRESHOLD, Lab, TypeCount};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    item_type: String,
    #[tabled(rename = "Items")]
    count: usize,
}

impl From<&TypeCount> for TypeRow {
    fn from(t: &TypeCount) -> Self {
        Self {
            item_type: t.item_type.clone(),
            count: t.count,
        }
    }
}

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    item_type: String,
    #[tabled(rename = "Stock")]
    stock: String,
    #[tabled(rename = "Added")]
    added: String,
}

impl From<&Arc<InventoryItem>> for RecentRow {
    fn from(i: &Arc<InventoryItem>) -> Self {
        Self {
            name: i.name.clone(),
            item_type: i.item_type.clone(),
            stock: i.stock_label(),
            // Date part of the RFC 3339 timestamp.
            added: i
                .created_at
                .as_deref()
                .and_then(|at| at.split('T').next())
                .unwrap_or_default()
                .to_owned(),
        }
    }
}

fn detail(s: &DashboardSummary) -> String {
    let mut out = output::detail_lines(&[
        ("Total value", Some(format!("{:.2}", s.total_value))),
        (
            "Low on stock",
            Some(format!("{} (under {LOW_STOCK_THRESHOLD})", s.low_stock)),
        ),
        ("Items", Some(s.item_count.to_string())),
        ("Vendors", Some(s.vendor_count.to_string())),
    ]);

    if !s.by_type.is_empty() {
        let rows: Vec<TypeRow> = s.by_type.iter().map(TypeRow::from).collect();
        out.push_str("\n\nBy type\n");
        out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    }
    if !s.recent.is_empty() {
        let rows: Vec<RecentRow> = s.recent.iter().map(RecentRow::from).collect();
        out.push_str("\n\nRecently added\n");
        out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    }
    out
}

fn plain(s: &DashboardSummary) -> String {
    format!(
        "value={:.2}\nlow_stock={}\nitems={}\nvendors={}",
        s.total_value, s.low_stock, s.item_count, s.vendor_count
    )
}

pub fn handle(lab: &Lab, global: &GlobalOpts) -> Result<(), CliError> {
    let summary = lab.dashboard();
    let out = output::render_single(&global.output, &summary, detail, plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use labinv_core::EntityId;

    use super::*;

    fn summary() -> DashboardSummary {
        let item = Arc::new(InventoryItem {
            id: EntityId::new("i1"),
            name: "NE555".into(),
            item_type: "IC".into(),
            value: String::new(),
            quantity: Some(4),
            unit: Some("pcs".into()),
            part_number: None,
            description: None,
            barcode: None,
            image_url: None,
            vendor_id: None,
            rate: Some(12.5),
            created_at: Some("2024-05-01T09:30:00.000Z".into()),
        });
        DashboardSummary::compute(&[item], 2)
    }

    #[test]
    fn table_view_lists_figures_and_sections() {
        let out = detail(&summary());
        assert!(out.contains("Total value"));
        assert!(out.contains("50.00"));
        assert!(out.contains("1 (under 10)"));
        assert!(out.contains("By type"));
        assert!(out.contains("Recently added"));
        assert!(out.contains("2024-05-01"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let out = detail(&DashboardSummary::compute(&[], 0));
        assert!(!out.contains("By type"));
        assert!(!out.contains("Recently added"));
    }

    #[test]
    fn plain_is_key_value_lines() {
        assert_eq!(
            plain(&summary()),
            "value=50.00\nlow_stock=1\nitems=1\nvendors=2"
        );
    }
}
