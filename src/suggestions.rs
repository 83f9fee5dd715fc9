//! # Error Suggestions
//!
//! Helper functions for turning failures into messages that say what went
//! wrong AND how to fix it. The binary routes library errors through
//! [`explain`] before printing them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_sync::suggestions;
//!
//! let config = config::load(&path).map_err(suggestions::explain)?;
//! ```

use std::path::Path;

use crate::error::Error;

/// Generate an error for when the configuration file is not found.
///
/// Includes hints about:
/// - Creating a new config file
/// - Using the -c/--config flag
/// - Using the CATALOG_SYNC_CONFIG environment variable
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a .catalog-sync.yaml file next to your translation data\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set CATALOG_SYNC_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for a missing or empty API token.
pub fn missing_api_token() -> anyhow::Error {
    anyhow::anyhow!(
        "No API token for the translation service\n\n\
         hint: Pass --api-token <TOKEN>\n\
         hint: Set TRANSIFEX_API_TOKEN environment variable"
    )
}

/// Generate an error for a working copy with uncommitted changes.
pub fn dirty_working_copy(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Repository is dirty, cannot continue: {path}\n\n\
         hint: Commit or stash your changes, then run again\n\
         hint: Check with 'git -C {path} status'",
        path = path.display()
    )
}

/// Generate an error for a resource scope that matches nothing.
///
/// Suggests the closest configured slug, if any is close.
pub fn unknown_resource(slug: &str, known: &[&str]) -> anyhow::Error {
    let did_you_mean = find_similar(slug, known)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown resource: {slug}{did_you_mean}\n\n\
         Configured resources are: {known}\n\
         hint: --domain accepts a resource slug, gettext domain or group",
        known = known.join(", ")
    )
}

/// Convert a library error into a CLI error, attaching hints where the
/// failure has an obvious remedy.
pub fn explain(error: Error) -> anyhow::Error {
    match error {
        Error::NotFound { path } if path.extension().is_some_and(|ext| ext == "yaml") => {
            config_not_found(&path)
        }
        Error::DirtyWorkingCopy { path } => dirty_working_copy(&path),
        Error::Config {
            message,
            hint: Some(hint),
        } => anyhow::anyhow!("Configuration error: {message}\n\nhint: {hint}"),
        Error::Transport {
            operation,
            url,
            message,
        } => anyhow::anyhow!(
            "Request to the translation service failed: {operation} {url}: {message}\n\n\
             hint: Check network access and the api_url setting\n\
             hint: A 401 response means the API token is wrong or expired"
        ),
        other => anyhow::Error::new(other),
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (a_len, b_len) = (a_chars.len(), b_chars.len());

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut previous: Vec<usize> = (0..=b_len).collect();
    let mut current = vec![0usize; b_len + 1];
    for i in 1..=a_len {
        current[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_not_found_includes_hints() {
        let path = Path::new("/some/path/.catalog-sync.yaml");
        let message = config_not_found(path).to_string();

        assert!(message.contains("Configuration file not found"));
        assert!(message.contains("/some/path/.catalog-sync.yaml"));
        assert!(message.contains("-c/--config"));
        assert!(message.contains("CATALOG_SYNC_CONFIG"));
    }

    #[test]
    fn test_unknown_resource_suggests_similar() {
        let message = unknown_resource("deed_ux", &["deeds_ux", "by_4-0"]).to_string();
        assert!(message.contains("Unknown resource: deed_ux"));
        assert!(message.contains("Did you mean 'deeds_ux'?"));
        assert!(message.contains("deeds_ux, by_4-0"));
    }

    #[test]
    fn test_unknown_resource_no_suggestion_for_very_different() {
        let message = unknown_resource("foobar", &["deeds_ux"]).to_string();
        assert!(!message.contains("Did you mean"));
    }

    #[test]
    fn test_explain_dirty_working_copy() {
        let error = Error::DirtyWorkingCopy {
            path: PathBuf::from("/data"),
        };
        let message = explain(error).to_string();
        assert!(message.contains("Repository is dirty"));
        assert!(message.contains("git -C /data status"));
    }

    #[test]
    fn test_explain_config_hint() {
        let error = Error::Config {
            message: "remote.project is empty".to_string(),
            hint: Some("Set 'project:' in the remote block".to_string()),
        };
        let message = explain(error).to_string();
        assert!(message.contains("hint: Set 'project:'"));
    }

    #[test]
    fn test_explain_passes_other_errors_through() {
        let error = Error::UnknownResource {
            slug: "nope".to_string(),
        };
        let explained = explain(error);
        assert!(explained.downcast_ref::<Error>().is_some());
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("deeds_ux", "deeds_ux"), 0);
        assert_eq!(edit_distance("deed_ux", "deeds_ux"), 1);
        assert_eq!(edit_distance("by_4-0", "by_3-0"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn test_find_similar() {
        let candidates = ["deeds_ux", "by_4-0", "by-sa_4-0"];
        assert_eq!(find_similar("deeds-ux", &candidates), Some("deeds_ux"));
        assert_eq!(find_similar("by_40", &candidates), Some("by_4-0"));
        assert_eq!(find_similar("licenses", &candidates), None);
    }
}
