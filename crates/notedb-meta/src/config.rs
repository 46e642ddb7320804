//! The git-config text format used by metadata files.
//!
//! ```text
//! [checker]
//!     name = my-checker
//!     repository = test-repo
//!     description = "  leading spaces are quoted"
//! ```
//!
//! Section and key names compare case-insensitively. A key may repeat; a
//! single-valued read returns the last occurrence. Values are unquoted and
//! unescaped on parse (`\\`, `\"`, `\n`, `\t`, `\b`), and `#` or `;` outside
//! quotes starts a comment. Writing quotes any value that would not survive
//! a parse otherwise, so `parse(to_text(c))` reads back the same values.

use std::fmt::Write as _;

/// A line of config text could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {reason}")]
pub struct ConfigParseError {
    pub line: usize,
    pub reason: String,
}

impl ConfigParseError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Section {
    name: String,
    subsection: Option<String>,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str, subsection: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            subsection: subsection.map(str::to_string),
            entries: Vec::new(),
        }
    }

    fn matches(&self, name: &str, subsection: Option<&str>) -> bool {
        self.name.eq_ignore_ascii_case(name) && self.subsection.as_deref() == subsection
    }
}

/// An ordered, mutable git-config document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GitConfig {
    sections: Vec<Section>,
}

impl GitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config text. Empty text yields an empty config.
    pub fn parse(text: &str) -> Result<Self, ConfigParseError> {
        let mut config = Self::new();
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') {
                let (name, subsection) = parse_section_header(line, line_no)?;
                config.sections.push(Section {
                    name,
                    subsection,
                    entries: Vec::new(),
                });
                continue;
            }
            let Some(section) = config.sections.last_mut() else {
                return Err(ConfigParseError::new(line_no, "key outside of any section"));
            };
            let (key, value) = match line.split_once('=') {
                Some((key, raw_value)) => (key.trim(), parse_value(raw_value, line_no)?),
                // A bare key is a boolean flag.
                None => (strip_comment(line), "true".to_string()),
            };
            if !is_valid_key(key) {
                return Err(ConfigParseError::new(
                    line_no,
                    format!("invalid key name {key:?}"),
                ));
            }
            section.entries.push((key.to_string(), value));
        }
        Ok(config)
    }

    /// Render as text. Sections without entries are omitted.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for section in self.sections.iter().filter(|s| !s.entries.is_empty()) {
            match &section.subsection {
                None => {
                    let _ = writeln!(out, "[{}]", section.name);
                }
                Some(sub) => {
                    let escaped = sub.replace('\\', "\\\\").replace('"', "\\\"");
                    let _ = writeln!(out, "[{} \"{}\"]", section.name, escaped);
                }
            }
            for (key, value) in &section.entries {
                if value.is_empty() {
                    let _ = writeln!(out, "\t{key} =");
                } else {
                    let _ = writeln!(out, "\t{key} = {}", format_value(value));
                }
            }
        }
        out
    }

    /// Returns `true` if no section holds any entry.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.entries.is_empty())
    }

    /// The last value of `key`, if set.
    pub fn get_string(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<&str> {
        self.values(section, subsection, key).last()
    }

    /// Every value of `key`, in file order.
    pub fn get_string_list(&self, section: &str, subsection: Option<&str>, key: &str) -> Vec<&str> {
        self.values(section, subsection, key).collect()
    }

    /// Distinct key names present in the section, in first-seen order.
    pub fn names(&self, section: &str, subsection: Option<&str>) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for s in self.sections.iter().filter(|s| s.matches(section, subsection)) {
            for (key, _) in &s.entries {
                if !names.iter().any(|n| n.eq_ignore_ascii_case(key)) {
                    names.push(key.clone());
                }
            }
        }
        names
    }

    /// Replace every value of `key` with `value`.
    pub fn set_string(&mut self, section: &str, subsection: Option<&str>, key: &str, value: &str) {
        self.set_string_list(section, subsection, key, [value]);
    }

    /// Replace every value of `key` with `values`, keeping the position of
    /// the first existing occurrence. An empty list unsets the key.
    pub fn set_string_list<I, S>(
        &mut self,
        section: &str,
        subsection: Option<&str>,
        key: &str,
        values: I,
    )
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.unset(section, subsection, key);
            return;
        }

        let mut first_hit: Option<(usize, usize)> = None;
        for (si, s) in self.sections.iter_mut().enumerate() {
            if !s.matches(section, subsection) {
                continue;
            }
            let mut kept = 0;
            s.entries.retain(|(k, _)| {
                if k.eq_ignore_ascii_case(key) {
                    if first_hit.is_none() {
                        first_hit = Some((si, kept));
                    }
                    false
                } else {
                    kept += 1;
                    true
                }
            });
        }

        let (si, at) = match first_hit {
            Some(hit) => hit,
            None => match self
                .sections
                .iter()
                .position(|s| s.matches(section, subsection))
            {
                Some(si) => (si, self.sections[si].entries.len()),
                None => {
                    self.sections.push(Section::new(section, subsection));
                    (self.sections.len() - 1, 0)
                }
            },
        };
        let entries = &mut self.sections[si].entries;
        for (offset, value) in values.into_iter().enumerate() {
            entries.insert(at + offset, (key.to_string(), value));
        }
    }

    /// Remove every value of `key`.
    pub fn unset(&mut self, section: &str, subsection: Option<&str>, key: &str) {
        for s in self
            .sections
            .iter_mut()
            .filter(|s| s.matches(section, subsection))
        {
            s.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        }
    }

    fn values<'a, 'k>(
        &'a self,
        section: &'k str,
        subsection: Option<&'k str>,
        key: &'k str,
    ) -> impl DoubleEndedIterator<Item = &'a str> + 'k
    where
        'a: 'k,
    {
        self.sections
            .iter()
            .filter(move |s| s.matches(section, subsection))
            .flat_map(|s| s.entries.iter())
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

fn parse_section_header(
    line: &str,
    line_no: usize,
) -> Result<(String, Option<String>), ConfigParseError> {
    let inner = &line[1..];
    let name_end = inner
        .find(|c: char| c == ']' || c == '"' || c.is_whitespace())
        .ok_or_else(|| ConfigParseError::new(line_no, "unterminated section header"))?;
    let name = &inner[..name_end];
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(ConfigParseError::new(
            line_no,
            format!("invalid section name {name:?}"),
        ));
    }

    let rest = inner[name_end..].trim_start();
    let (subsection, after) = match rest.strip_prefix('"') {
        Some(quoted) => {
            let mut sub = String::new();
            let mut chars = quoted.chars();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => sub.push(chars.next().ok_or_else(|| {
                        ConfigParseError::new(line_no, "dangling escape in subsection")
                    })?),
                    '"' => {
                        closed = true;
                        break;
                    }
                    c => sub.push(c),
                }
            }
            if !closed {
                return Err(ConfigParseError::new(line_no, "unterminated subsection"));
            }
            (Some(sub), chars.as_str().trim_start())
        }
        None => (None, rest),
    };

    let after = after
        .strip_prefix(']')
        .ok_or_else(|| ConfigParseError::new(line_no, "expected ']' after section name"))?;
    let trailing = after.trim();
    if !(trailing.is_empty() || trailing.starts_with('#') || trailing.starts_with(';')) {
        return Err(ConfigParseError::new(
            line_no,
            "unexpected text after section header",
        ));
    }
    Ok((name.to_string(), subsection))
}

fn parse_value(raw: &str, line_no: usize) -> Result<String, ConfigParseError> {
    let mut out = String::new();
    // Unquoted whitespace is kept only when more value text follows it.
    let mut pending = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                flush_pending(&mut out, &mut pending);
                in_quotes = !in_quotes;
            }
            '\\' => {
                flush_pending(&mut out, &mut pending);
                let escaped = chars
                    .next()
                    .ok_or_else(|| {
                        ConfigParseError::new(line_no, "dangling escape at end of line")
                    })?;
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'b' => '\u{8}',
                    '\\' => '\\',
                    '"' => '"',
                    other => {
                        return Err(ConfigParseError::new(
                            line_no,
                            format!("invalid escape sequence \\{other}"),
                        ))
                    }
                });
            }
            '#' | ';' if !in_quotes => break,
            c if c.is_whitespace() && !in_quotes => pending.push(c),
            c => {
                flush_pending(&mut out, &mut pending);
                out.push(c);
            }
        }
    }

    if in_quotes {
        return Err(ConfigParseError::new(line_no, "unterminated quoted value"));
    }
    Ok(out)
}

fn flush_pending(out: &mut String, pending: &mut String) {
    if !out.is_empty() {
        out.push_str(pending);
    }
    pending.clear();
}

fn strip_comment(line: &str) -> &str {
    match line.find(['#', ';']) {
        Some(idx) => line[..idx].trim_end(),
        None => line,
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn format_value(value: &str) -> String {
    let quote = value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
        || value.contains(['#', ';']);

    let mut out = String::with_capacity(value.len() + 2);
    if quote {
        out.push('"');
    }
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            c => out.push(c),
        }
    }
    if quote {
        out.push('"');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn values_outlive_lookup_keys() {
        let config = GitConfig::parse("[checker]\n\tblocking = A\n\tblocking = B\n").unwrap();
        let (single, list) = {
            let key = String::from("blocking");
            let section = String::from("checker");
            (
                config.get_string(&section, None, &key),
                config.get_string_list(&section, None, &key),
            )
        };
        assert_eq!(single, Some("B"));
        assert_eq!(list, vec!["A", "B"]);
    }

    #[test]
    fn parse_simple_section() {
        let config = GitConfig::parse("[checker]\n\tname = my-checker\n\trepository = test-repo\n")
            .unwrap();
        assert_eq!(config.get_string("checker", None, "name"), Some("my-checker"));
        assert_eq!(config.get_string("checker", None, "repository"), Some("test-repo"));
        assert_eq!(config.get_string("checker", None, "url"), None);
    }

    #[test]
    fn empty_text_is_empty_config() {
        let config = GitConfig::parse("").unwrap();
        assert!(config.is_empty());
        assert_eq!(config.to_text(), "");
    }

    #[test]
    fn names_are_case_insensitive() {
        let config = GitConfig::parse("[Checker]\n\tRepository = r\n").unwrap();
        assert_eq!(config.get_string("checker", None, "repository"), Some("r"));
    }

    #[test]
    fn last_value_wins_for_single_reads() {
        let config = GitConfig::parse("[checker]\n\tblocking = a\n\tblocking = b\n").unwrap();
        assert_eq!(config.get_string("checker", None, "blocking"), Some("b"));
        assert_eq!(
            config.get_string_list("checker", None, "blocking"),
            vec!["a", "b"]
        );
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "# top\n\n[checker] ; trailing\n\tname = x # inline\n; another\n";
        let config = GitConfig::parse(text).unwrap();
        assert_eq!(config.get_string("checker", None, "name"), Some("x"));
    }

    #[test]
    fn quoted_values_keep_whitespace_and_comment_chars() {
        let config = GitConfig::parse("[c]\n\tv = \"  a # b ; c  \"\n").unwrap();
        assert_eq!(config.get_string("c", None, "v"), Some("  a # b ; c  "));
    }

    #[test]
    fn escapes_are_decoded() {
        let config = GitConfig::parse("[c]\n\tv = a\\tb\\nc\\\\d\\\"e\n").unwrap();
        assert_eq!(config.get_string("c", None, "v"), Some("a\tb\nc\\d\"e"));
    }

    #[test]
    fn internal_whitespace_is_kept() {
        let config = GitConfig::parse("[c]\n\tv = a  b   \n").unwrap();
        assert_eq!(config.get_string("c", None, "v"), Some("a  b"));
    }

    #[test]
    fn bare_key_is_true() {
        let config = GitConfig::parse("[c]\n\tflag\n").unwrap();
        assert_eq!(config.get_string("c", None, "flag"), Some("true"));
    }

    #[test]
    fn subsections_are_distinct() {
        let config = GitConfig::parse("[remote \"origin\"]\n\turl = a\n[remote]\n\turl = b\n").unwrap();
        assert_eq!(config.get_string("remote", Some("origin"), "url"), Some("a"));
        assert_eq!(config.get_string("remote", None, "url"), Some("b"));
        let text = config.to_text();
        assert!(text.contains("[remote \"origin\"]"));
        assert_eq!(GitConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn parse_errors_report_line() {
        let err = GitConfig::parse("[checker]\n\tname = \"open\n").unwrap_err();
        assert_eq!(err.line, 2);

        let err = GitConfig::parse("name = x\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.reason.contains("outside"));

        assert!(GitConfig::parse("[checker\n").is_err());
        assert!(GitConfig::parse("[checker] junk\n").is_err());
        assert!(GitConfig::parse("[c]\n\tv = a\\q\n").is_err());
        assert!(GitConfig::parse("[c]\n\t1bad = x\n").is_err());
    }

    #[test]
    fn set_replaces_in_place() {
        let mut config =
            GitConfig::parse("[checker]\n\tname = a\n\turl = u\n\tname = b\n").unwrap();
        config.set_string("checker", None, "name", "c");
        assert_eq!(config.to_text(), "[checker]\n\tname = c\n\turl = u\n");
    }

    #[test]
    fn set_list_and_unset() {
        let mut config = GitConfig::new();
        config.set_string("checker", None, "name", "n");
        config.set_string_list("checker", None, "blocking", ["x", "y"]);
        assert_eq!(
            config.to_text(),
            "[checker]\n\tname = n\n\tblocking = x\n\tblocking = y\n"
        );

        config.set_string_list("checker", None, "blocking", Vec::<String>::new());
        assert!(config.get_string_list("checker", None, "blocking").is_empty());

        config.unset("checker", None, "name");
        assert!(config.is_empty());
        assert_eq!(config.to_text(), "");
    }

    #[test]
    fn names_in_first_seen_order() {
        let config =
            GitConfig::parse("[checker]\n\tname = a\n\tblocking = x\n\tBlocking = y\n").unwrap();
        assert_eq!(config.names("checker", None), vec!["name", "blocking"]);
    }

    #[test]
    fn empty_value_round_trips() {
        let mut config = GitConfig::new();
        config.set_string("c", None, "v", "");
        let parsed = GitConfig::parse(&config.to_text()).unwrap();
        assert_eq!(parsed.get_string("c", None, "v"), Some(""));
    }

    proptest! {
        #[test]
        fn values_survive_a_text_round_trip(value in "[a-zA-Z0-9 #;\"\\\\=\\[\\]\t]{0,40}") {
            let mut config = GitConfig::new();
            config.set_string("checker", None, "description", &value);
            let parsed = GitConfig::parse(&config.to_text()).unwrap();
            prop_assert_eq!(parsed.get_string("checker", None, "description"), Some(value.as_str()));
        }
    }
}
