//! # Stats Command Implementation
//!
//! Print per-language translation statistics for the catalogs in scope. This
//! command only reads local files; it needs neither an API token nor a clean
//! working copy.

use anyhow::Result;
use clap::{Args, ValueEnum};

use catalog_sync::catalog::store::FileCatalogStore;
use catalog_sync::sync::stats::{collect_stats, LanguageStats};

use super::{explain_run_error, load_config, Globals, ScopeArgs};

/// Output format for statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum StatsFormat {
    /// Aligned columns
    #[default]
    Text,
    /// A JSON array
    Json,
}

/// Show local translation statistics
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: StatsFormat,
}

fn render_text(stats: &[LanguageStats]) -> String {
    let mut out = format!(
        "{:<12} {:<10} {:>6} {:>6} {:>6} {:>5}",
        "RESOURCE", "LANGUAGE", "MSGS", "DONE", "FUZZY", "PCT"
    );
    for row in stats {
        out.push('\n');
        out.push_str(&row.to_string());
    }
    out
}

/// Execute the `stats` command.
pub fn execute(globals: &Globals, args: StatsArgs) -> Result<()> {
    let config = load_config(globals)?;
    let stats = collect_stats(&config, &FileCatalogStore, &args.scope.into())
        .map_err(|e| explain_run_error(&config, e))?;
    match args.format {
        StatsFormat::Text if stats.is_empty() => println!("No translations found."),
        StatsFormat::Text => println!("{}", render_text(&stats)),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_has_header_and_rows() {
        let stats = vec![LanguageStats {
            resource: "deeds_ux".to_string(),
            language: "de".to_string(),
            messages: 4,
            translated: 2,
            fuzzy: 0,
            percent_translated: 50,
        }];
        let text = render_text(&stats);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("RESOURCE"));
        assert!(lines[1].starts_with("deeds_ux"));
        assert!(lines[1].ends_with("50%"));
    }
}
