use std::path::PathBuf;

use clap::{Parser, Subcommand};
use swatch_core::config::ThemeMode;

#[derive(Debug, Parser)]
#[command(name = "swatch", version, about = "Resolve design tokens for components and themes")]
pub struct Cli {
    /// Design document to use instead of the configured one.
    #[arg(long, global = true, value_name = "FILE")]
    pub tokens: Option<PathBuf>,

    /// light, dark or system. Defaults to the configured appearance.
    #[arg(long, global = true)]
    pub theme: Option<ThemeMode>,

    /// Print machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a component (and optional variant) for the active theme.
    Resolve {
        component: String,
        variant: Option<String>,
    },
    /// Print a raw primitive, e.g. `spacing 3`.
    Primitive { category: String, key: String },
    /// Print a semantic role for the active theme, e.g. `status.error`.
    Semantic { role: String },
    /// List components in document order.
    Components,
    /// List the variants of a component.
    Variants { component: String },
    /// Validate a design document without resolving anything.
    Check {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Dump every primitive, role and resolved style as JSON.
    Export {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli =
            Cli::try_parse_from(["swatch", "--theme", "dark", "resolve", "button", "primary"])
                .unwrap();
        assert_eq!(cli.theme, Some(ThemeMode::Dark));
        assert!(matches!(
            cli.command,
            Command::Resolve { ref component, variant: Some(ref v) } if component == "button" && v == "primary"
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["swatch", "components", "--json"]).unwrap();
        assert!(cli.json);
        assert!(cli.theme.is_none());
    }

    #[test]
    fn test_rejects_unknown_theme() {
        assert!(Cli::try_parse_from(["swatch", "--theme", "sepia", "components"]).is_err());
    }
}
