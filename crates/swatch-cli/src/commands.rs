use std::io::Write;
use std::path::Path;

use serde::Serialize;
use swatch_core::config::AppConfig;
use swatch_core::{Registry, ResolvedValue, SwatchError, Theme};

use crate::cli::{Cli, Command};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Swatch(#[from] SwatchError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    name: &'a str,
    components: usize,
    roles: usize,
    categories: usize,
}

/// Execute `cli` against `config`, writing results to `out`.
pub fn run(cli: &Cli, config: &AppConfig, out: &mut impl Write) -> Result<(), CliError> {
    let theme = cli
        .theme
        .unwrap_or(config.appearance.mode)
        .resolve(detect_system_theme);

    let source = match &cli.command {
        Command::Check { file: Some(file) } => Some(file.as_path()),
        _ => cli.tokens.as_deref().or(config.tokens.source.as_deref()),
    };
    let registry = load_registry(source)?;
    tracing::debug!(theme = %theme, name = registry.name(), "registry loaded");

    match &cli.command {
        Command::Resolve { component, variant } => {
            let style = registry.resolve(theme, component, variant.as_deref())?;
            if cli.json {
                writeln!(out, "{}", serde_json::to_string_pretty(&style)?)?;
            } else {
                for (field, value) in &style.fields {
                    write_field(out, 0, field, value)?;
                }
            }
        }
        Command::Primitive { category, key } => {
            let token = registry.get_primitive(category, key)?;
            if cli.json {
                writeln!(out, "{}", serde_json::to_string(token)?)?;
            } else {
                writeln!(out, "{token}")?;
            }
        }
        Command::Semantic { role } => {
            let token = registry.resolve_semantic(theme, role)?;
            if cli.json {
                writeln!(out, "{}", serde_json::to_string(token)?)?;
            } else {
                writeln!(out, "{token}")?;
            }
        }
        Command::Components => write_list(out, cli.json, &registry.list_components())?,
        Command::Variants { component } => {
            write_list(out, cli.json, &registry.list_variants(component)?)?;
        }
        Command::Check { .. } => {
            let report = CheckReport {
                name: registry.name(),
                components: registry.list_components().len(),
                roles: registry.list_roles(Theme::Light).len(),
                categories: registry.list_categories().len(),
            };
            if cli.json {
                writeln!(out, "{}", serde_json::to_string(&report)?)?;
            } else {
                writeln!(
                    out,
                    "ok: {} ({} components, {} roles per theme, {} primitive categories)",
                    report.name, report.components, report.roles, report.categories
                )?;
            }
        }
        Command::Export { output } => {
            let json = serde_json::to_string_pretty(&registry.export()?)?;
            match output {
                Some(path) => {
                    std::fs::write(path, json)?;
                    tracing::info!(path = %path.display(), "export written");
                }
                None => writeln!(out, "{json}")?,
            }
        }
    }
    Ok(())
}

fn load_registry(source: Option<&Path>) -> Result<Registry, SwatchError> {
    match source {
        Some(path) => Registry::from_path(path),
        None => Registry::embedded(),
    }
}

/// Host appearance; `None` when the platform can't say.
fn detect_system_theme() -> Option<Theme> {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => Some(Theme::Dark),
        Ok(dark_light::Mode::Light) => Some(Theme::Light),
        _ => None,
    }
}

fn write_field(
    out: &mut impl Write,
    depth: usize,
    field: &str,
    value: &ResolvedValue,
) -> std::io::Result<()> {
    let indent = "  ".repeat(depth);
    match value {
        ResolvedValue::Token(token) => writeln!(out, "{indent}{field}: {token}"),
        ResolvedValue::Group(fields) => {
            writeln!(out, "{indent}{field}:")?;
            for (sub, sub_value) in fields {
                write_field(out, depth + 1, sub, sub_value)?;
            }
            Ok(())
        }
    }
}

fn write_list(out: &mut impl Write, json: bool, items: &[&str]) -> Result<(), CliError> {
    if json {
        writeln!(out, "{}", serde_json::to_string(items)?)?;
    } else {
        for item in items {
            writeln!(out, "{item}")?;
        }
    }
    Ok(())
}
