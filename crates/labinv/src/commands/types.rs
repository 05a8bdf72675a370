//! Item type command handlers.

use serde::Serialize;
use tabled::Tabled;

use labinv_core::model::{DEFAULT_ITEM_TYPES, color_for};
use labinv_core::{Command as CoreCommand, CommandResult, ItemType, Lab};

use crate::cli::{GlobalOpts, TypesArgs, TypesCommand};
use crate::error::CliError;
use crate::output;

/// One row of the type picker: built-in or stored.
#[derive(Debug, Serialize, Tabled)]
struct TypeEntry {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Source")]
    source: &'static str,
}

/// Built-ins first, then custom types not shadowing a built-in.
fn entries(custom: &[std::sync::Arc<ItemType>]) -> Vec<TypeEntry> {
    let mut out: Vec<TypeEntry> = DEFAULT_ITEM_TYPES
        .iter()
        .map(|name| TypeEntry {
            name: (*name).to_owned(),
            color: color_for(name),
            source: "built-in",
        })
        .collect();
    for t in custom {
        if out.iter().any(|e| e.name.eq_ignore_ascii_case(&t.name)) {
            continue;
        }
        out.push(TypeEntry {
            name: t.name.clone(),
            color: if t.color.is_empty() {
                color_for(&t.name)
            } else {
                t.color.clone()
            },
            source: "custom",
        });
    }
    out
}

pub async fn handle(lab: &Lab, args: TypesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        TypesCommand::List => {
            let list = entries(&lab.item_types_snapshot());
            let out = output::render_list(
                &global.output,
                &list,
                |e| TypeEntry {
                    name: e.name.clone(),
                    color: format!("hsl({})", e.color),
                    source: e.source,
                },
                |e| e.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TypesCommand::Add { name } => {
            let result = lab.execute(CoreCommand::CreateItemType { name }).await?;
            if let CommandResult::ItemType(t) = result {
                if !global.quiet {
                    eprintln!("Item type '{}' added", t.name);
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use labinv_core::EntityId;

    use super::*;

    #[test]
    fn custom_types_follow_built_ins_without_duplicates() {
        let custom = vec![
            Arc::new(ItemType {
                id: EntityId::from("t1"),
                name: "resistor".into(),
                color: String::new(),
            }),
            Arc::new(ItemType {
                id: EntityId::from("t2"),
                name: "Sensor".into(),
                color: "10 60% 65%".into(),
            }),
        ];
        let list = entries(&custom);
        assert_eq!(list.len(), DEFAULT_ITEM_TYPES.len() + 1);
        let last = list.last().unwrap();
        assert_eq!(last.name, "Sensor");
        assert_eq!(last.color, "10 60% 65%");
        assert_eq!(last.source, "custom");
    }
}
