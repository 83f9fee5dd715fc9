//! PO text format
//!
//! Parsing and serialization of gettext PO files. The serializer writes the
//! same layout the gettext tools and `polib` write (header first, one blank
//! line between entries, strings wrapped at 78 columns) so that rewriting an
//! unchanged catalog produces an unchanged file.

use std::collections::BTreeMap;
use std::path::Path;

use super::{Catalog, MessageEntry};
use crate::error::{Error, Result};

/// Wrap width used for quoted strings, matching `polib`.
const WRAP_WIDTH: usize = 78;

/// Which string a continuation line (`"..."`) appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Context,
    Id,
    PluralId,
    Str(usize),
}

/// An entry being assembled while reading lines.
#[derive(Debug, Default)]
struct Pending {
    comments: Vec<String>,
    flags: Vec<String>,
    obsolete: bool,
    context: Option<String>,
    id: Option<String>,
    plural_id: Option<String>,
    strs: BTreeMap<usize, String>,
    start_line: usize,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.comments.is_empty() && self.flags.is_empty() && self.id.is_none() && self.context.is_none()
    }

    fn has_msgstr(&self) -> bool {
        !self.strs.is_empty()
    }
}

struct Parser<'a> {
    path: &'a Path,
    catalog: Catalog,
    pending: Pending,
    field: Field,
    seen_header: bool,
}

/// Decode catalog bytes, rejecting anything that is not UTF-8.
pub fn decode<'a>(bytes: &'a [u8], location: &Path) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| {
        let valid = e.valid_up_to();
        Error::CatalogParse {
            path: location.to_path_buf(),
            line: bytes[..valid].iter().filter(|b| **b == b'\n').count() + 1,
            message: format!("invalid UTF-8 at byte {}", valid),
        }
    })
}

/// Parse PO bytes (as downloaded) into a catalog stored at `location`.
pub fn parse_bytes(bytes: &[u8], location: &Path) -> Result<Catalog> {
    parse(decode(bytes, location)?, location)
}

/// Parse PO text into a catalog stored at `location`.
pub fn parse(text: &str, location: &Path) -> Result<Catalog> {
    let mut parser = Parser {
        path: location,
        catalog: Catalog::new(location),
        pending: Pending::default(),
        field: Field::None,
        seen_header: false,
    };

    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    for (index, raw) in text.lines().enumerate() {
        parser.line(index + 1, raw.trim_end())?;
    }
    parser.flush()?;
    Ok(parser.catalog)
}

impl Parser<'_> {
    fn error(&self, line: usize, message: impl Into<String>) -> Error {
        Error::CatalogParse {
            path: self.path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    fn line(&mut self, number: usize, line: &str) -> Result<()> {
        if line.is_empty() {
            if self.pending.id.is_some() {
                self.flush()?;
            }
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("#~") {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            if rest.starts_with('|') || rest.is_empty() {
                self.comment(line.to_string())?;
                return Ok(());
            }
            if !self.pending.obsolete && self.pending.id.is_some() && self.pending.has_msgstr() {
                self.flush()?;
            }
            self.pending.obsolete = true;
            return self.keyword(number, rest);
        }

        if let Some(flags) = line.strip_prefix("#,") {
            if self.pending.has_msgstr() {
                self.flush()?;
            }
            for flag in flags.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                if !self.pending.flags.iter().any(|f| f == flag) {
                    self.pending.flags.push(flag.to_string());
                }
            }
            self.field = Field::None;
            return Ok(());
        }

        if line.starts_with('#') {
            return self.comment(line.to_string());
        }

        self.keyword(number, line)
    }

    fn comment(&mut self, line: String) -> Result<()> {
        if self.pending.has_msgstr() {
            self.flush()?;
        }
        self.pending.comments.push(line);
        self.field = Field::None;
        Ok(())
    }

    fn keyword(&mut self, number: usize, line: &str) -> Result<()> {
        if self.pending.start_line == 0 {
            self.pending.start_line = number;
        }

        if line.starts_with('"') {
            let value = unquote(line).ok_or_else(|| self.error(number, "malformed string"))?;
            let target = match self.field {
                Field::None => return Err(self.error(number, "string without keyword")),
                Field::Context => self.pending.context.get_or_insert_with(String::new),
                Field::Id => self.pending.id.get_or_insert_with(String::new),
                Field::PluralId => self.pending.plural_id.get_or_insert_with(String::new),
                Field::Str(index) => self.pending.strs.entry(index).or_default(),
            };
            target.push_str(&value);
            return Ok(());
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim_start()),
            None => return Err(self.error(number, format!("unexpected line '{}'", line))),
        };
        let value = unquote(rest).ok_or_else(|| self.error(number, "malformed string"))?;

        match keyword {
            "msgctxt" => {
                if self.pending.id.is_some() {
                    self.flush()?;
                    self.pending.start_line = number;
                }
                self.pending.context = Some(value);
                self.field = Field::Context;
            }
            "msgid" => {
                if self.pending.id.is_some() {
                    self.flush()?;
                    self.pending.start_line = number;
                }
                self.pending.id = Some(value);
                self.field = Field::Id;
            }
            "msgid_plural" => {
                self.pending.plural_id = Some(value);
                self.field = Field::PluralId;
            }
            "msgstr" => {
                self.pending.strs.insert(0, value);
                self.field = Field::Str(0);
            }
            other => {
                let index = other
                    .strip_prefix("msgstr[")
                    .and_then(|rest| rest.strip_suffix(']'))
                    .and_then(|index| index.parse::<usize>().ok())
                    .ok_or_else(|| self.error(number, format!("unknown keyword '{}'", other)))?;
                self.pending.strs.insert(index, value);
                self.field = Field::Str(index);
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        self.field = Field::None;
        if pending.is_empty() {
            return Ok(());
        }

        let has_msgstr = pending.has_msgstr();
        let Some(id) = pending.id else {
            // Trailing comments with no entry are dropped.
            return Ok(());
        };
        if !has_msgstr {
            return Err(self.error(pending.start_line, format!("msgid '{}' has no msgstr", id)));
        }

        let mut strs = pending.strs.into_values();
        let translation = strs.next().unwrap_or_default();
        let plural_translations: Vec<String> = strs.collect();

        if !self.seen_header && id.is_empty() && pending.context.is_none() && !pending.obsolete {
            self.seen_header = true;
            self.catalog.header_comments = pending.comments;
            self.catalog.header_flags = pending.flags;
            for line in translation.split('\n').filter(|l| !l.trim().is_empty()) {
                if let Some((key, value)) = line.split_once(':') {
                    self.catalog.metadata.insert_raw(key.trim(), value.trim_start());
                }
            }
            return Ok(());
        }

        let entry = MessageEntry {
            context: pending.context,
            id,
            plural_id: pending.plural_id,
            translation,
            plural_translations,
            flags: pending.flags,
            comments: pending.comments,
            obsolete: pending.obsolete,
        };
        let line = pending.start_line;
        self.catalog.push(entry).map_err(|e| match e {
            Error::CatalogParse { path, message, .. } => Error::CatalogParse { path, line, message },
            other => other,
        })
    }
}

/// Strip the surrounding quotes of a PO string literal and unescape it.
fn unquote(literal: &str) -> Option<String> {
    let inner = literal.trim().strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => return None,
        }
    }
    Some(out)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Split `text` into whitespace-terminated words and pack them into lines of
/// at most `width` characters. Hyphenated words may also break after a
/// hyphen, the way `polib` wraps. Words longer than `width` get a line of
/// their own. Whitespace is kept, so joining the lines yields `text` again.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_space = false;
    for (i, &ch) in chars.iter().enumerate() {
        if ch == ' ' {
            in_space = true;
        } else if in_space {
            words.push(std::mem::take(&mut current));
            in_space = false;
        }
        current.push(ch);
        if ch == '-' && breaks_after_hyphen(&chars, i) {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    for word in words {
        if !line.is_empty() && line.chars().count() + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        line.push_str(&word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Whether the hyphen at `i` ends a wrappable chunk: two letters (or
/// `x-y`) before it and at least two letters (or `x-y`) after it.
fn breaks_after_hyphen(chars: &[char], i: usize) -> bool {
    let letter = |at: Option<usize>| {
        at.and_then(|at| chars.get(at))
            .is_some_and(|ch| ch.is_alphabetic())
    };
    let hyphen = |at: Option<usize>| at.and_then(|at| chars.get(at)) == Some(&'-');
    let before = letter(i.checked_sub(1))
        && (letter(i.checked_sub(2))
            || (hyphen(i.checked_sub(2)) && letter(i.checked_sub(3))));
    let after = letter(Some(i + 1))
        && (letter(Some(i + 2)) || (hyphen(Some(i + 2)) && letter(Some(i + 3))));
    before && after
}

fn write_string(out: &mut String, prefix: &str, keyword: &str, value: &str) {
    let segments: Vec<&str> = value.split_inclusive('\n').collect();
    let escaped = escape(value);
    let single_width = prefix.len() + keyword.len() + 3 + escaped.chars().count();

    if segments.len() <= 1 && single_width <= WRAP_WIDTH {
        out.push_str(&format!("{}{} \"{}\"\n", prefix, keyword, escaped));
        return;
    }

    out.push_str(&format!("{}{} \"\"\n", prefix, keyword));
    for segment in segments {
        for chunk in wrap(&escape(segment), WRAP_WIDTH - 2) {
            out.push_str(&format!("{}\"{}\"\n", prefix, chunk));
        }
    }
}

fn write_entry(out: &mut String, entry: &MessageEntry) {
    let (previous, comments): (Vec<&String>, Vec<&String>) = entry
        .comments
        .iter()
        .partition(|line| line.starts_with("#|") || line.starts_with("#~|"));
    for line in comments {
        out.push_str(line);
        out.push('\n');
    }
    if !entry.flags.is_empty() {
        out.push_str(&format!("#, {}\n", entry.flags.join(", ")));
    }
    for line in previous {
        out.push_str(line);
        out.push('\n');
    }

    let prefix = if entry.obsolete { "#~ " } else { "" };
    if let Some(context) = &entry.context {
        write_string(out, prefix, "msgctxt", context);
    }
    write_string(out, prefix, "msgid", &entry.id);
    match &entry.plural_id {
        Some(plural_id) => {
            write_string(out, prefix, "msgid_plural", plural_id);
            write_string(out, prefix, "msgstr[0]", &entry.translation);
            for (index, translation) in entry.plural_translations.iter().enumerate() {
                write_string(out, prefix, &format!("msgstr[{}]", index + 1), translation);
            }
        }
        None => write_string(out, prefix, "msgstr", &entry.translation),
    }
}

/// Render a single entry the way it appears in a PO file.
pub fn render_entry(entry: &MessageEntry) -> String {
    let mut out = String::new();
    write_entry(&mut out, entry);
    out
}

/// Serialize a catalog to PO text.
pub fn serialize(catalog: &Catalog) -> String {
    let mut out = String::new();

    for line in &catalog.header_comments {
        out.push_str(line);
        out.push('\n');
    }
    if !catalog.header_flags.is_empty() {
        out.push_str(&format!("#, {}\n", catalog.header_flags.join(", ")));
    }
    out.push_str("msgid \"\"\n");
    let header: String = catalog
        .metadata
        .iter()
        .map(|(key, value)| format!("{}: {}\n", key, value))
        .collect();
    write_string(&mut out, "", "msgstr", &header);

    for entry in catalog.entries() {
        out.push('\n');
        write_entry(&mut out, entry);
    }
    out
}
