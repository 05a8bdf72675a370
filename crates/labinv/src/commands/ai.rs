//! AI command handlers: paper summaries and item descriptions.

use tokio::io::AsyncReadExt;

use labinv_core::{Command as CoreCommand, DescriptionInput, ItemUpdate, Lab, TextGenerator};

use crate::cli::{AiArgs, AiCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

async fn read_paper(file: Option<std::path::PathBuf>) -> Result<String, CliError> {
    let text = match file {
        Some(path) => tokio::fs::read_to_string(&path).await?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    if text.trim().is_empty() {
        return Err(CliError::Validation {
            field: "paper".into(),
            reason: "no text to summarize".into(),
        });
    }
    Ok(text)
}

pub async fn handle(lab: &Lab, args: AiArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AiCommand::Summarize { file } => {
            let paper = read_paper(file).await?;
            let spinner = util::spinner("Summarizing...", global);
            let summary = lab.summarize(&paper).await;
            spinner.finish_and_clear();
            output::print_output(&summary?, global.quiet);
            Ok(())
        }

        AiCommand::Enhance { id, save } => {
            let item = util::resolve_item(lab, &id)?;
            let input = DescriptionInput::from(item.as_ref());
            let spinner = util::spinner("Writing description...", global);
            let description = lab.enhance_description(&input).await;
            spinner.finish_and_clear();
            let description = description?;

            if save {
                lab.execute(CoreCommand::UpdateItem {
                    id: item.id.clone(),
                    update: ItemUpdate {
                        description: Some(description.clone()),
                        ..ItemUpdate::default()
                    },
                })
                .await?;
                if !global.quiet {
                    eprintln!("Description saved to '{}'", item.name);
                }
            }
            output::print_output(&description, global.quiet);
            Ok(())
        }
    }
}
