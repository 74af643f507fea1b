//! Dialect detection from a file name and a sample of its lines.

use crate::syntax::{self, Keyword};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How many leading lines are inspected when the file name says nothing.
pub const SNIFF_LINES: usize = 400;

/// The five database dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Tools,
    Holders,
    Shanks,
    Trackpoints,
    SegmentedTools,
}

impl Kind {
    /// Detection priority: more specific names before the generic "tool".
    pub const ALL: [Kind; 5] = [
        Kind::Holders,
        Kind::Shanks,
        Kind::Trackpoints,
        Kind::SegmentedTools,
        Kind::Tools,
    ];

    /// The file name NX ships for this dialect.
    pub fn canonical_file_name(self) -> &'static str {
        match self {
            Kind::Tools => "tool_database.dat",
            Kind::Holders => "holder_database.dat",
            Kind::Shanks => "shank_database.dat",
            Kind::Trackpoints => "trackpoint_database.dat",
            Kind::SegmentedTools => "segmented_tool_database.dat",
        }
    }

    fn name_hint(self) -> &'static str {
        match self {
            Kind::Tools => "tool",
            Kind::Holders => "holder",
            Kind::Shanks => "shank",
            Kind::Trackpoints => "trackpoint",
            Kind::SegmentedTools => "segmented",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Tools => "Tools",
            Kind::Holders => "Holders",
            Kind::Shanks => "Shanks",
            Kind::Trackpoints => "Trackpoints",
            Kind::SegmentedTools => "SegmentedTools",
        };
        f.write_str(name)
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "tool" | "tools" => Ok(Kind::Tools),
            "holder" | "holders" => Ok(Kind::Holders),
            "shank" | "shanks" => Ok(Kind::Shanks),
            "trackpoint" | "trackpoints" => Ok(Kind::Trackpoints),
            "segmented" | "segmentedtool" | "segmentedtools" => Ok(Kind::SegmentedTools),
            _ => Err(format!(
                "unknown kind: {}. Use tools, holders, shanks, trackpoints or segmented",
                s
            )),
        }
    }
}

/// Infer the dialect of a file.
///
/// Evidence in order: the file name, a canonical file name quoted in the
/// first [`SNIFF_LINES`] lines, then distinguishing `FORMAT` fields. Falls
/// back to [`Kind::Tools`].
pub fn detect_kind<S: AsRef<str>>(path: &Path, sample: &[S]) -> Kind {
    kind_from_file_name(path)
        .or_else(|| kind_from_header(sample))
        .or_else(|| kind_from_formats(sample))
        .unwrap_or(Kind::Tools)
}

pub fn kind_from_file_name(path: &Path) -> Option<Kind> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();
    Kind::ALL
        .into_iter()
        .find(|kind| name.contains(kind.name_hint()))
}

pub fn kind_from_header<S: AsRef<str>>(sample: &[S]) -> Option<Kind> {
    sample.iter().take(SNIFF_LINES).find_map(|line| {
        let lower = line.as_ref().to_lowercase();
        Kind::ALL
            .into_iter()
            .find(|kind| lower.contains(kind.canonical_file_name()))
    })
}

/// Classify by the fields of each `FORMAT` declaration, continuation lines
/// included.
pub fn kind_from_formats<S: AsRef<str>>(sample: &[S]) -> Option<Kind> {
    let mut block: Option<HashSet<String>> = None;

    for line in sample.iter().take(SNIFF_LINES).map(AsRef::as_ref) {
        if let Some(kw) = syntax::keyword(line) {
            if let Some(fields) = block.take() {
                if let Some(kind) = kind_from_fields(&fields) {
                    return Some(kind);
                }
            }
            if kw.keyword == Keyword::Format {
                block = Some(syntax::field_tokens(kw.rest).into_iter().collect());
            }
            continue;
        }
        let Some(fields) = block.as_mut() else {
            continue;
        };
        if syntax::is_blank(line) || syntax::is_comment(line) {
            continue;
        }
        let more = syntax::field_tokens(line);
        if more.is_empty() {
            if let Some(kind) = block.take().as_ref().and_then(kind_from_fields) {
                return Some(kind);
            }
        } else {
            fields.extend(more);
        }
    }

    block.as_ref().and_then(kind_from_fields)
}

fn kind_from_fields(fields: &HashSet<String>) -> Option<Kind> {
    let has = |name: &str| fields.contains(name);

    if has("RTYPE") && (has("HTYPE") || has("MTS") || has("MAXOFF") || has("MINDIA")) {
        return Some(Kind::Holders);
    }
    if has("RTYPE") && (has("STYPE") || (has("SEQ") && has("DIAM") && has("TAPER"))) {
        return Some(Kind::Shanks);
    }
    if has("DEFTYPE") {
        return Some(Kind::Trackpoints);
    }
    if has("SWEEP") {
        return Some(Kind::SegmentedTools);
    }
    None
}
