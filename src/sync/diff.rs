//! Unified diffs for `compare`
//!
//! Entries are rendered as they would appear in a PO file and diffed line by
//! line with unlimited context, so the whole entry (comments and the full
//! msgid included) is always shown.

use crate::catalog::{po, MessageEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

/// Line-level edit script via longest common subsequence.
fn edit_script<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<(Op, &'a str)> {
    let (n, m) = (old.len(), new.len());
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut script = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            script.push((Op::Equal, old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            script.push((Op::Delete, old[i]));
            i += 1;
        } else {
            script.push((Op::Insert, new[j]));
            j += 1;
        }
    }
    script.extend(old[i..].iter().map(|line| (Op::Delete, *line)));
    script.extend(new[j..].iter().map(|line| (Op::Insert, *line)));
    script
}

fn format_range(start: usize, length: usize) -> String {
    match length {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

/// Unified diff of two texts with full context.
///
/// Returns no lines when the texts are equal.
pub fn unified_diff(old: &str, new: &str, from_label: &str, to_label: &str) -> Vec<String> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    if old_lines == new_lines {
        return Vec::new();
    }

    let mut diff = vec![
        format!("--- {}", from_label),
        format!("+++ {}", to_label),
        format!(
            "@@ -{} +{} @@",
            format_range(0, old_lines.len()),
            format_range(0, new_lines.len())
        ),
    ];
    diff.extend(
        edit_script(&old_lines, &new_lines)
            .into_iter()
            .map(|(op, line)| match op {
                Op::Equal => format!(" {}", line),
                Op::Delete => format!("-{}", line),
                Op::Insert => format!("+{}", line),
            }),
    );
    diff
}

/// Diff one local entry against the remote entry at the same position.
///
/// A missing remote entry diffs against nothing.
pub fn diff_entry(
    local: &MessageEntry,
    remote: Option<&MessageEntry>,
    from_label: &str,
    to_label: &str,
) -> Vec<String> {
    let remote = remote.map(po::render_entry).unwrap_or_default();
    unified_diff(&po::render_entry(local), &remote, from_label, to_label)
}

/// Color diff lines the way `colordiff` does.
///
/// Emits the fixed 16-color SGR codes `colordiff` uses, whatever the
/// terminal reports. Callers decide whether color is wanted at all.
pub fn colorize(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| {
            let code = if line.starts_with("---") {
                91
            } else if line.starts_with("+++") {
                92
            } else if line.starts_with('@') {
                36
            } else if line.starts_with('-') {
                31
            } else if line.starts_with('+') {
                32
            } else {
                90
            };
            format!("\u{1b}[{}m{}\u{1b}[0m", code, line)
        })
        .collect()
}

/// Join diff lines for display, colored or not.
pub fn render(lines: &[String], color: bool) -> String {
    if color {
        colorize(lines).join("\n")
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_texts_have_no_diff() {
        assert!(unified_diff("a\nb\n", "a\nb\n", "x", "y").is_empty());
    }

    #[test]
    fn test_unified_diff_full_context() {
        let diff = unified_diff("a\nb\nc\n", "a\nB\nc\n", "local", "remote");
        assert_eq!(
            diff,
            vec![
                "--- local",
                "+++ remote",
                "@@ -1,3 +1,3 @@",
                " a",
                "-b",
                "+B",
                " c",
            ]
        );
    }

    #[test]
    fn test_diff_against_nothing() {
        let diff = unified_diff("a\n", "", "local", "remote");
        assert_eq!(diff, vec!["--- local", "+++ remote", "@@ -1 +0,0 @@", "-a"]);
    }

    #[test]
    fn test_diff_entry_shows_translation_change() {
        let local = MessageEntry::new("Attribution", "");
        let remote = MessageEntry::new("Attribution", "Namensnennung");
        let diff = diff_entry(&local, Some(&remote), "by_4-0 PO File de.po", "by_4-0 Remote de");
        assert!(diff.contains(&" msgid \"Attribution\"".to_string()));
        assert!(diff.contains(&"-msgstr \"\"".to_string()));
        assert!(diff.contains(&"+msgstr \"Namensnennung\"".to_string()));
    }

    #[test]
    fn test_colorize_codes() {
        let lines = vec![
            "--- a".to_string(),
            "+++ b".to_string(),
            "@@ -1 +1 @@".to_string(),
            "-x".to_string(),
            "+y".to_string(),
            " z".to_string(),
        ];
        let colored = colorize(&lines);
        assert!(colored[0].starts_with("\u{1b}[91m"));
        assert!(colored[1].starts_with("\u{1b}[92m"));
        assert!(colored[2].starts_with("\u{1b}[36m"));
        assert!(colored[3].starts_with("\u{1b}[31m"));
        assert!(colored[4].starts_with("\u{1b}[32m"));
        assert!(colored[5].starts_with("\u{1b}[90m"));
        assert!(colored.iter().all(|line| line.ends_with("\u{1b}[0m")));
    }

    #[test]
    fn test_render_plain() {
        let lines = vec!["--- a".to_string(), "+++ b".to_string()];
        assert_eq!(render(&lines, false), "--- a\n+++ b");
    }
}
