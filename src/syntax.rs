//! Line-level grammar shared by every dialect.
//!
//! Database files are read one line at a time. A line is either a keyword
//! line (`CLASS`, `FORMAT`, `DATA`, `END_DATA`, each optionally behind
//! indentation and `#` markers), a row continuation (`| ...`), a comment, a
//! blank line, or free text. The helpers here only classify and split lines;
//! deciding what a line means is left to the dialect parsers.

use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

// Keywords are upper case and must end on a word boundary, so `DATABASE`
// and `FORMAT_VERSION` are plain text.
static RE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*(?:#[# \t]*)?)(CLASS|FORMAT|END_DATA|DATA)\b(.*)$").unwrap()
});

static RE_CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:#[# \t]*)?(\|.*)$").unwrap());

// "# Unit: Metric", "# Units : mm" (value ends at the next colon)
static RE_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[ \t]*#[# \t]*unit[a-z]*[ \t]*:([^:]*)").unwrap());

// -- Keyword lines ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Class,
    Format,
    Data,
    EndData,
}

/// A line that starts with one of the grammar keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordLine<'a> {
    pub keyword: Keyword,
    /// Indentation and comment marker in front of the keyword.
    pub prefix: &'a str,
    /// Everything after the keyword, untrimmed.
    pub rest: &'a str,
}

impl KeywordLine<'_> {
    /// True when the keyword sits behind a `#` marker.
    pub fn is_commented(&self) -> bool {
        self.prefix.contains('#')
    }
}

/// Recognize a keyword line.
pub fn keyword(line: &str) -> Option<KeywordLine<'_>> {
    let caps = RE_KEYWORD.captures(line)?;
    let keyword = match &caps[2] {
        "CLASS" => Keyword::Class,
        "FORMAT" => Keyword::Format,
        "END_DATA" => Keyword::EndData,
        _ => Keyword::Data,
    };
    Some(KeywordLine {
        keyword,
        prefix: caps.get(1).map_or("", |m| m.as_str()),
        rest: caps.get(3).map_or("", |m| m.as_str()),
    })
}

/// Return the payload of a row continuation line, starting at its first `|`.
pub fn continuation(line: &str) -> Option<&str> {
    RE_CONTINUATION
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// `#` and `//` comments. Keyword lines behind `#` also satisfy this, so
/// callers check [`keyword`] first.
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#') || trimmed.starts_with("//")
}

/// Extract the value of a `# Unit: <value>` comment.
pub fn unit_label(line: &str) -> Option<&str> {
    let value = RE_UNIT.captures(line)?.get(1)?.as_str().trim();
    (!value.is_empty()).then_some(value)
}

/// Leading spaces and tabs of a line.
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

// -- Values and field names ---------------------------------------------------

/// Split a pipe-delimited payload into trimmed values.
///
/// Everything before the first `|` is ignored. Empty values are kept,
/// including the trailing one produced by a trailing pipe. Text from the
/// first `//` or `#` inside a value is an inline comment and is dropped.
pub fn split_values(payload: &str) -> Vec<String> {
    let Some(start) = payload.find('|') else {
        return Vec::new();
    };
    payload[start + 1..].split('|').map(clean_value).collect()
}

fn clean_value(raw: &str) -> String {
    let cut = [raw.find("//"), raw.find('#')]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(raw.len());
    raw[..cut].trim().to_string()
}

/// True for tokens made only of `A-Z`, `0-9` and `_`.
pub fn is_field_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// Whitespace-separated tokens that look like field names. Prose on
/// documentation-style FORMAT lines is filtered out.
pub fn field_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|t| is_field_token(t))
        .map(str::to_string)
        .collect()
}
