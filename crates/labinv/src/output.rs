//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use labinv_core::{Notification, NotifyLevel};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// One notification line for stderr, colored by level.
pub fn format_notification(notification: &Notification, color: bool) -> String {
    let tag = match notification.level {
        NotifyLevel::Info => "info",
        NotifyLevel::Warning => "warning",
        NotifyLevel::Error => "error",
    };
    if !color {
        return format!("{tag}: {notification}");
    }
    let tag = match notification.level {
        NotifyLevel::Info => tag.cyan().to_string(),
        NotifyLevel::Warning => tag.yellow().bold().to_string(),
        NotifyLevel::Error => tag.red().bold().to_string(),
    };
    format!("{tag}: {notification}")
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact` / `yaml`: serializes the original data
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views are key/value
/// listings rather than rows.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// `label: value` lines, skipping empty values.
pub fn detail_lines(fields: &[(&str, Option<String>)]) -> String {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    fields
        .iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{label:<width$}  {v}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    out.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Part {
        id: String,
        name: String,
    }

    #[derive(Tabled)]
    struct PartRow {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn parts() -> Vec<Part> {
        vec![
            Part {
                id: "a1".into(),
                name: "10k resistor".into(),
            },
            Part {
                id: "b2".into(),
                name: "NE555".into(),
            },
        ]
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &parts(),
            |p| PartRow {
                name: p.name.clone(),
            },
            |p| p.id.clone(),
        )
        .unwrap();
        assert_eq!(out, "a1\nb2");
    }

    #[test]
    fn table_shows_renamed_header() {
        let out = render_list(
            &OutputFormat::Table,
            &parts(),
            |p| PartRow {
                name: p.name.clone(),
            },
            |p| p.id.clone(),
        )
        .unwrap();
        assert!(out.contains("Name"));
        assert!(out.contains("NE555"));
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_single(
            &OutputFormat::JsonCompact,
            &parts()[0],
            |_| String::new(),
            |p| p.id.clone(),
        )
        .unwrap();
        assert_eq!(out, r#"{"id":"a1","name":"10k resistor"}"#);
    }

    #[test]
    fn detail_lines_skip_empty_values() {
        let out = detail_lines(&[
            ("Name", Some("NE555".into())),
            ("Part No.", None),
            ("Value", Some(String::new())),
        ]);
        assert_eq!(out, "Name  NE555");
    }

    #[test]
    fn uncolored_notification_has_level_tag() {
        let n = Notification::warning("Scanner", "Barcode detection is not supported");
        assert_eq!(
            format_notification(&n, false),
            "warning: Scanner: Barcode detection is not supported"
        );
    }
}
