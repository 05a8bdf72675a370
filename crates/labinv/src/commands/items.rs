//! Inventory item command handlers.

use std::sync::Arc;

use tabled::Tabled;

use labinv_core::{
    Command as CoreCommand, CommandResult, InventoryItem, ItemLookup, ItemUpdate, Lab, NewItem,
};

use crate::cli::{GlobalOpts, ItemFields, ItemsArgs, ItemsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    item_type: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Stock")]
    stock: String,
    #[tabled(rename = "Part No.")]
    part_number: String,
}

impl From<&Arc<InventoryItem>> for ItemRow {
    fn from(i: &Arc<InventoryItem>) -> Self {
        Self {
            id: i.id.to_string(),
            name: i.name.clone(),
            item_type: i.item_type.clone(),
            value: i.value.clone(),
            stock: i.stock_label(),
            part_number: i.part_number.clone().unwrap_or_default(),
        }
    }
}

pub(super) fn detail(i: &InventoryItem, lab: Option<&Lab>) -> String {
    let vendor = i.vendor_id.as_ref().map(|id| {
        lab.and_then(|l| l.store().vendor_by_id(id))
            .map_or_else(|| id.to_string(), |v| v.name.clone())
    });
    output::detail_lines(&[
        ("ID", Some(i.id.to_string())),
        ("Name", Some(i.name.clone())),
        ("Type", Some(i.item_type.clone())),
        ("Value", Some(i.value.clone())),
        ("Stock", Some(i.stock_label())),
        ("Part No.", i.part_number.clone()),
        ("Barcode", i.barcode.clone()),
        ("Vendor", vendor),
        ("Rate", i.rate.map(|r| format!("{r:.2}"))),
        ("Image", i.image_url.clone()),
        ("Created", i.created_at.clone()),
        ("Description", i.description.clone()),
    ])
}

fn matches_search(item: &InventoryItem, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [
        Some(item.name.as_str()),
        Some(item.value.as_str()),
        item.part_number.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

fn into_update(fields: ItemFields) -> ItemUpdate {
    ItemUpdate {
        item_type: util::non_empty(fields.item_type),
        quantity: fields.quantity,
        unit: fields.unit,
        value: fields.value,
        part_number: fields.part_number,
        description: fields.description,
        ..ItemUpdate::default()
    }
}

fn print_item(lab: &Lab, item: &InventoryItem, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        item,
        |i| detail(i, Some(lab)),
        |i| i.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(lab: &Lab, args: ItemsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ItemsCommand::List { r#type, search } => {
            let snap: Vec<_> = lab
                .items_snapshot()
                .iter()
                .filter(|i| {
                    r#type
                        .as_deref()
                        .is_none_or(|t| i.item_type.eq_ignore_ascii_case(t))
                })
                .filter(|i| search.as_deref().is_none_or(|s| matches_search(i, s)))
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &snap,
                |i| ItemRow::from(i),
                |i| i.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ItemsCommand::Get { id } => {
            let item = util::resolve_item(lab, &id)?;
            print_item(lab, &item, global)
        }

        ItemsCommand::Add { name, fields } => {
            let new_item = NewItem {
                name,
                item_type: fields.item_type.unwrap_or_default(),
                quantity: fields.quantity.unwrap_or(0),
                unit: fields.unit,
                value: fields.value,
                part_number: fields.part_number,
                description: fields.description,
            };
            let result = lab.execute(CoreCommand::CreateItem(new_item)).await?;
            if let CommandResult::Item(item) = result {
                if !global.quiet {
                    eprintln!(
                        "Item added with barcode {}",
                        item.barcode.as_deref().unwrap_or("-")
                    );
                }
                print_item(lab, &item, global)?;
            }
            Ok(())
        }

        ItemsCommand::Update {
            id,
            name,
            fields,
            vendor,
            rate,
        } => {
            let item = util::resolve_item(lab, &id)?;
            let vendor_id = match vendor {
                Some(v) => Some(util::resolve_vendor(lab, &v)?.id.clone()),
                None => None,
            };
            let update = ItemUpdate {
                name,
                vendor_id,
                rate,
                ..into_update(fields)
            };
            lab.execute(CoreCommand::UpdateItem {
                id: item.id.clone(),
                update,
            })
            .await?;
            if !global.quiet {
                eprintln!("Item updated");
            }
            Ok(())
        }

        ItemsCommand::Delete { id } => {
            let item = util::resolve_item(lab, &id)?;
            if !util::confirm(&format!("Delete item '{}'?", item.name), global.yes)? {
                return Ok(());
            }
            lab.execute(CoreCommand::DeleteItem {
                id: item.id.clone(),
            })
            .await?;
            if !global.quiet {
                eprintln!("Item deleted");
            }
            Ok(())
        }

        ItemsCommand::Find { barcode } => {
            let item = lab
                .find_by_barcode(&barcode)
                .await?
                .ok_or_else(|| CliError::not_found("item with barcode", &barcode, "items list"))?;
            print_item(lab, &item, global)
        }

        ItemsCommand::Image { id, file } => {
            let item = util::resolve_item(lab, &id)?;
            let bytes = tokio::fs::read(&file).await?;
            let spinner = util::spinner("Uploading image...", global);
            let uploaded = lab.upload_image(&bytes).await;
            spinner.finish_and_clear();
            let url = uploaded?;
            lab.execute(CoreCommand::UpdateItem {
                id: item.id.clone(),
                update: ItemUpdate {
                    image_url: Some(url.clone()),
                    ..ItemUpdate::default()
                },
            })
            .await?;
            if !global.quiet {
                eprintln!("Image attached");
            }
            output::print_output(&url, global.quiet);
            Ok(())
        }
    }
}
