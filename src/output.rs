//! # Output Configuration
//!
//! Controls how the CLI renders run summaries: colored markers or plain
//! text, based on terminal capabilities and user preferences.
//!
//! The following environment variables and flags are respected:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! Diff coloring is separate: `compare --colordiff` always colors diffs,
//! whatever this configuration says.

use std::env;

use console::Style;

use crate::sync::{RunReport, SkipReason, Workflow};

/// Output configuration for controlling colors and markers.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: "always", "never", or "auto".
    /// In auto mode colors are disabled by `NO_COLOR`, `CLICOLOR=0`,
    /// `TERM=dumb` or a non-TTY stdout (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, otherwise the plain text
/// alternative.
///
/// ```rust
/// use catalog_sync::output::{OutputConfig, emoji};
///
/// let config = OutputConfig::from_env_and_flag("never");
/// assert_eq!(emoji(&config, "✅", "[OK]"), "[OK]");
/// ```
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Summary printed after a workflow finishes.
///
/// Dry runs are marked so the numbers are read as "would have".
pub fn render_summary(
    config: &OutputConfig,
    workflow: Workflow,
    dry_run: bool,
    report: &RunReport,
) -> String {
    let marker = if report.skipped.is_empty() {
        config.paint(Style::new().green(), emoji(config, "✅", "[OK]"))
    } else {
        config.paint(Style::new().yellow(), emoji(config, "⚠️", "[WARN]"))
    };
    let title = if dry_run {
        format!("{} finished (dry run)", workflow)
    } else {
        format!("{} finished", workflow)
    };

    let mut out = format!("{} {}\n{}", marker, config.paint(Style::new().bold(), &title), report);
    if !report.skipped.is_empty() {
        out.push_str("\n\nSkipped:");
        for reason in &report.skipped {
            out.push_str(&format!("\n  {}", render_skip(config, reason)));
        }
    }
    out
}

fn render_skip(config: &OutputConfig, reason: &SkipReason) -> String {
    config.paint(Style::new().yellow(), &reason.to_string())
}
